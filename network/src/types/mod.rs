//! Shared data types module.

pub mod ethernet;

// Re-exports
pub use ethernet::{
    LinkType, MacAddress, NetPkt, ETH_ALEN, ETH_FCS_LEN, ETH_FRAME_MAX, ETH_HLEN, ETH_MTU,
};
