//! Ethernet frame types and helpers.
//!
//! # Reference
//! IEEE 802.3

use alloc::vec::Vec;

use leafdrv_hwinit::{DriverError, Result};

pub const ETH_ALEN: usize = 6;
pub const ETH_HLEN: usize = 14;
pub const ETH_MTU: usize = 1500;
/// Largest frame handed to the NIC (header + MTU, FCS added by hardware).
pub const ETH_FRAME_MAX: usize = ETH_HLEN + ETH_MTU;
/// Trailing frame check sequence left on received frames.
pub const ETH_FCS_LEN: usize = 4;

/// MAC address type.
pub type MacAddress = [u8; ETH_ALEN];

/// Link layer kind passed along with a link address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
}

/// Network packet buffer.
///
/// Owns a byte buffer with a fixed reservation decided at allocation time.
/// Writes past the reservation fail instead of growing the buffer, so the
/// receive path never allocates more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetPkt {
    data: Vec<u8>,
    reserved: usize,
}

impl NetPkt {
    /// Reserve room for `len` bytes.
    ///
    /// Returns `None` when the allocator cannot satisfy the request.
    pub fn alloc(len: usize) -> Option<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len).ok()?;
        Some(Self { data, reserved: len })
    }

    /// Packet holding a copy of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let mut pkt = Self::alloc(bytes.len())?;
        pkt.data.extend_from_slice(bytes);
        Some(pkt)
    }

    /// Packet taking ownership of an already filled buffer.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let reserved = data.len();
        Self { data, reserved }
    }

    /// Append bytes within the reservation.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.data.len() + bytes.len() > self.reserved {
            return Err(DriverError::Io);
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Copy the whole packet into the front of `dst`.
    pub fn read_into(&self, dst: &mut [u8]) -> Result<()> {
        let dst = dst.get_mut(..self.data.len()).ok_or(DriverError::Io)?;
        dst.copy_from_slice(&self.data);
        Ok(())
    }

    /// Bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Take the underlying bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
