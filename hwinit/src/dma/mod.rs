//! DMA memory description.

pub mod region;

pub use region::DmaRegion;
