//! Memory-mapped register access.
//!
//! # Safety
//! - Address must be valid MMIO address
//! - Address must be properly aligned
//! - Address must be mapped with appropriate (uncached) attributes

use core::ptr::NonNull;

/// 32-bit register window.
///
/// Offsets are byte offsets from the start of the window. Accesses take
/// `&self`: device registers are shared and every access may have side
/// effects (read-to-clear, doorbells), so implementations must not cache.
pub trait RegisterIo {
    /// Read a 32-bit register.
    fn read32(&self, offset: u32) -> u32;

    /// Write a 32-bit register.
    fn write32(&self, offset: u32, value: u32);
}

/// Volatile MMIO window over a mapped BAR.
#[derive(Debug)]
pub struct Mmio {
    base: NonNull<u8>,
}

impl Mmio {
    /// Wrap a mapped register window.
    ///
    /// Returns `None` for a null base.
    ///
    /// # Safety
    /// `base` must be a valid, mapped, 4-byte aligned MMIO address that
    /// stays mapped for the lifetime of the returned value, and every
    /// offset later passed to `read32`/`write32` must lie inside it.
    pub unsafe fn new(base: u64) -> Option<Self> {
        NonNull::new(base as usize as *mut u8).map(|base| Self { base })
    }

    /// Base address of the window.
    #[inline]
    pub fn base(&self) -> u64 {
        self.base.as_ptr() as usize as u64
    }
}

impl RegisterIo for Mmio {
    #[inline]
    fn read32(&self, offset: u32) -> u32 {
        unsafe {
            let reg = self.base.as_ptr().add(offset as usize) as *const u32;
            core::ptr::read_volatile(reg)
        }
    }

    #[inline]
    fn write32(&self, offset: u32, value: u32) {
        unsafe {
            let reg = self.base.as_ptr().add(offset as usize) as *mut u32;
            core::ptr::write_volatile(reg, value)
        }
    }
}

// Safety: the window is plain device memory; serialization is the driver's job.
unsafe impl Send for Mmio {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_base_rejected() {
        assert!(unsafe { Mmio::new(0) }.is_none());
    }

    #[test]
    fn test_read_write_roundtrip_on_memory() {
        let mut window = [0u32; 8];
        let mmio = unsafe { Mmio::new(window.as_mut_ptr() as u64) }.unwrap();

        mmio.write32(0x8, 0xDEAD_BEEF);
        mmio.write32(0x1C, 7);

        assert_eq!(mmio.read32(0x8), 0xDEAD_BEEF);
        assert_eq!(mmio.read32(0x1C), 7);
        assert_eq!(mmio.read32(0x0), 0);
        drop(mmio);
        assert_eq!(window[2], 0xDEAD_BEEF);
        assert_eq!(window[7], 7);
    }
}
