//! leafdrv sensor drivers
//!
//! Register transports for ST sensors. A transport binds a bus handle to a
//! [`RegisterContext`], the read/write pair the register-level helpers are
//! written against.

#![cfg_attr(not(test), no_std)]

pub mod ctx;
pub mod iis2mdc;

pub use ctx::RegisterContext;
pub use iis2mdc::{Iis2mdcSpi, Iis2mdcSpiConfig, SpiWireMode};
pub use leafdrv_hwinit::{DriverError, Result};
