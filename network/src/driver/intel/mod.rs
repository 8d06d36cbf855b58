//! Intel e1000 network driver.
//!
//! Single TX and single RX descriptor, no rings. Transmit is synchronous,
//! receive is driven by the RX overrun interrupt.
//!
//! # Supported Devices
//! - 82540EM (0x100E) - QEMU `-device e1000`, default at 00:03.0
//!
//! # Reference
//! PCI/PCI-X Family of Gigabit Ethernet Controllers SDM, Section 14

pub mod desc;
pub mod e1000;
pub mod regs;

// Re-exports
pub use e1000::{probe, E1000Config, E1000DmaArea, E1000};

use leafdrv_hwinit::{PciBdf, PciId};

/// Intel PCI Vendor ID.
pub const INTEL_VENDOR_ID: u16 = 0x8086;

/// 82540EM device ID.
pub const I82540EM_DEVICE_ID: u16 = 0x100E;

/// PCI identity the driver binds to.
pub const E1000_PCI_ID: PciId = PciId::new(INTEL_VENDOR_ID, I82540EM_DEVICE_ID);

/// Where QEMU's i440fx machine places the first e1000.
pub const DEFAULT_BDF: PciBdf = PciBdf::new(0, 3, 0);
