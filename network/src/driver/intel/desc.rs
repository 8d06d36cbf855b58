//! Legacy TX/RX descriptor layouts.
//!
//! Descriptors live in DMA memory the NIC writes behind our back, so they
//! are only ever touched through raw pointers with volatile accesses.
//! No references to a live descriptor are created.

use core::ptr::{addr_of, addr_of_mut, read_volatile, write_volatile};

/// Legacy transmit descriptor.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TxDesc {
    /// Buffer bus address.
    pub addr: u64,
    /// Bytes to send.
    pub len: u16,
    /// Checksum offset.
    pub cso: u8,
    /// Command bits (`TDESC_*`).
    pub cmd: u8,
    /// Status bits, written back by hardware.
    pub sta: u8,
    /// Checksum start.
    pub css: u8,
    pub special: u16,
}

/// Legacy receive descriptor.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RxDesc {
    /// Buffer bus address.
    pub addr: u64,
    /// Buffer size on arm; received length (FCS included) on write-back.
    pub len: u16,
    /// Packet checksum.
    pub csum: u16,
    /// Status bits, written back by hardware.
    pub sta: u8,
    /// Error bits, written back by hardware.
    pub err: u8,
    pub special: u16,
}

const _: () = assert!(core::mem::size_of::<TxDesc>() == 16);
const _: () = assert!(core::mem::size_of::<RxDesc>() == 16);

impl TxDesc {
    /// Fill in a descriptor for one buffer and clear its status.
    ///
    /// Status is cleared first so a stale done bit from the previous
    /// transmit cannot satisfy the next wait.
    ///
    /// # Safety
    /// `desc` must point to a valid, DMA-visible descriptor.
    #[inline]
    pub unsafe fn arm(desc: *mut TxDesc, addr: u64, len: u16, cmd: u8) {
        write_volatile(addr_of_mut!((*desc).sta), 0);
        write_volatile(addr_of_mut!((*desc).addr), addr);
        write_volatile(addr_of_mut!((*desc).len), len);
        write_volatile(addr_of_mut!((*desc).cmd), cmd);
    }

    /// Current status byte.
    ///
    /// # Safety
    /// `desc` must point to a valid descriptor.
    #[inline]
    pub unsafe fn status(desc: *const TxDesc) -> u8 {
        read_volatile(addr_of!((*desc).sta))
    }
}

impl RxDesc {
    /// Point a descriptor at an empty buffer.
    ///
    /// # Safety
    /// `desc` must point to a valid, DMA-visible descriptor.
    #[inline]
    pub unsafe fn arm(desc: *mut RxDesc, addr: u64, len: u16) {
        write_volatile(addr_of_mut!((*desc).addr), addr);
        write_volatile(addr_of_mut!((*desc).len), len);
        write_volatile(addr_of_mut!((*desc).err), 0);
        write_volatile(addr_of_mut!((*desc).sta), 0);
    }

    /// Snapshot of the descriptor as hardware left it.
    ///
    /// # Safety
    /// `desc` must point to a valid descriptor.
    #[inline]
    pub unsafe fn read(desc: *const RxDesc) -> RxDesc {
        read_volatile(desc)
    }
}
