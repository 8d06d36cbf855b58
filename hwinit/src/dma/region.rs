//! DMA region abstraction.
//!
//! Generic DMA-capable memory region. Layout-specific offsets belong in drivers.

/// DMA-capable memory region.
///
/// Contains both CPU-accessible pointer and device-visible bus address.
/// Drivers are responsible for their own layout within this region.
#[derive(Clone, Copy)]
pub struct DmaRegion {
    cpu_ptr: *mut u8,
    bus_addr: u64,
    size: usize,
}

impl DmaRegion {
    /// Create a new DMA region.
    ///
    /// # Safety
    /// - `cpu_ptr` must point to `size` bytes of valid DMA-capable memory
    ///   that nothing else accesses while a driver owns the region
    /// - `bus_addr` must be the corresponding device-visible address
    /// - Memory must be identity-mapped or IOMMU configured
    pub const unsafe fn new(cpu_ptr: *mut u8, bus_addr: u64, size: usize) -> Self {
        Self { cpu_ptr, bus_addr, size }
    }

    /// Region over identity-mapped memory (bus address == CPU address).
    ///
    /// # Safety
    /// Same as [`DmaRegion::new`].
    pub unsafe fn identity(cpu_ptr: *mut u8, size: usize) -> Self {
        Self::new(cpu_ptr, cpu_ptr as usize as u64, size)
    }

    /// CPU base pointer.
    #[inline]
    pub const fn cpu_base(&self) -> *mut u8 {
        self.cpu_ptr
    }

    /// Bus base address (what devices see).
    #[inline]
    pub const fn bus_base(&self) -> u64 {
        self.bus_addr
    }

    /// Total size in bytes.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Get CPU pointer at offset.
    ///
    /// # Safety
    /// Offset must be within region bounds.
    #[inline]
    pub unsafe fn cpu_at(&self, offset: usize) -> *mut u8 {
        self.cpu_ptr.add(offset)
    }

    /// Get bus address at offset.
    #[inline]
    pub const fn bus_at(&self, offset: usize) -> u64 {
        self.bus_addr + offset as u64
    }

    /// Non-null, at least `min_size` bytes, base aligned to `align`.
    pub fn fits(&self, min_size: usize, align: usize) -> bool {
        !self.cpu_ptr.is_null()
            && self.size >= min_size
            && (self.cpu_ptr as usize) % align == 0
            && self.bus_addr % align as u64 == 0
    }
}

unsafe impl Send for DmaRegion {}
unsafe impl Sync for DmaRegion {}

impl core::fmt::Debug for DmaRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaRegion")
            .field("cpu_ptr", &self.cpu_ptr)
            .field("bus_addr", &format_args!("{:#x}", self.bus_addr))
            .field("size", &format_args!("{:#x}", self.size))
            .finish()
    }
}
