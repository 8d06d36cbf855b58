//! ST IIS2MDC 3-axis magnetometer.
//!
//! Only the SPI register transport lives here; measurement logic is written
//! against [`RegisterContext`](crate::RegisterContext) and is bus-agnostic.
//!
//! # Reference
//! IIS2MDC datasheet DS12917

pub mod regs;
pub mod spi;

// Re-exports
pub use regs::{device_id, spi_mode_get, spi_mode_set, CfgRegC, SpiWireMode, IIS2MDC_ID};
pub use spi::{Iis2mdcSpi, Iis2mdcSpiConfig, MAX_TRANSFER, SPI_MODE, SPI_READ};
