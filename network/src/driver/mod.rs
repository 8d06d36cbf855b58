//! Driver abstraction module.
//!
//! Provides the driver/host traits and driver implementations.

pub mod intel;
pub mod traits;

// Re-exports
pub use intel::{E1000Config, E1000DmaArea, E1000};
pub use traits::{EthernetApi, EthernetCaps, NetInterface};
