//! Host seam for leafdrv drivers.
//!
//! Drivers in this workspace are leaf modules: the host owns PCI
//! enumeration, interrupt routing, scheduling and DMA memory. This crate
//! narrows each of those to a small trait or type so a driver can be
//! driven by a real platform or by simulated hardware in tests.
//!
//! # What This Crate Does
//!
//! - Register access (`RegisterIo`, volatile `Mmio`)
//! - PCI configuration access, ID probe, MBAR lookup, command bits
//! - DMA region description (CPU pointer + bus address)
//! - IRQ line description and controller hook
//! - Cooperative yield for busy-waits
//! - Debug hexdump through `log`
//!
//! # What This Crate Does NOT Do
//!
//! - Device-specific register programming
//! - Protocol logic (Ethernet, sensor registers, etc.)

#![cfg_attr(not(test), no_std)]

pub mod debug;
pub mod dma;
pub mod error;
pub mod irq;
pub mod mmio;
pub mod pci;
pub mod sched;

pub use dma::DmaRegion;
pub use error::{DriverError, Result};
pub use irq::{IrqController, IrqLine, Sense};
pub use mmio::{Mmio, RegisterIo};
pub use pci::{ConfigSpace, PciBdf, PciBus, PciId};
pub use sched::{SpinYield, Yield};
