//! leafdrv network drivers
//!
//! Intel 82540EM (e1000) Ethernet driver and the glue that feeds its frames
//! into smoltcp.
//!
//! The driver owns one TX and one RX descriptor in a caller-provided DMA
//! region. Transmit is synchronous; receive runs from the device interrupt
//! and hands frames to a [`NetInterface`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod driver;
pub mod stack;
pub mod types;

pub use driver::{E1000Config, E1000DmaArea, EthernetApi, EthernetCaps, NetInterface, E1000};
pub use leafdrv_hwinit::{DriverError, Result};
pub use stack::{DeviceAdapter, FrameQueue};
pub use types::{LinkType, MacAddress, NetPkt};
