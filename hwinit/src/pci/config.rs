//! PCI configuration space access.
//!
//! Dword-granular accessors keyed by bus/device/function. The legacy
//! CF8/CFC mechanism is provided for x86_64 hosts; other hosts implement
//! [`ConfigSpace`] over ECAM or their own bus driver.

// ═══════════════════════════════════════════════════════════════════════════
// ADDRESSING
// ═══════════════════════════════════════════════════════════════════════════

/// PCI device address (bus/device/function).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PciBdf {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciBdf {
    /// Create new PCI address.
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self { bus, device, function }
    }
}

impl core::fmt::Display for PciBdf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ACCESS TRAIT
// ═══════════════════════════════════════════════════════════════════════════

/// Raw configuration space access.
///
/// `offset` is a byte offset and must be dword aligned.
pub trait ConfigSpace {
    /// Read a dword from configuration space.
    fn read32(&self, bdf: PciBdf, offset: u8) -> u32;

    /// Write a dword to configuration space.
    fn write32(&self, bdf: PciBdf, offset: u8, value: u32);
}

// ═══════════════════════════════════════════════════════════════════════════
// PCI STANDARD OFFSETS
// ═══════════════════════════════════════════════════════════════════════════

/// PCI configuration space standard offsets.
pub mod offset {
    pub const VENDOR_ID: u8 = 0x00;
    pub const DEVICE_ID: u8 = 0x02;
    pub const COMMAND: u8 = 0x04;
    pub const STATUS: u8 = 0x06;
    pub const CLASS_CODE: u8 = 0x08;
    pub const HEADER_TYPE: u8 = 0x0C;
    pub const BAR0: u8 = 0x10;
    pub const BAR5: u8 = 0x24;
    pub const INT_LINE: u8 = 0x3C;
}

/// Command register bits.
pub mod cmd {
    /// I/O space enable.
    pub const IO: u16 = 1 << 0;
    /// Memory space enable.
    pub const MEM: u16 = 1 << 1;
    /// Bus master enable.
    pub const MASTER: u16 = 1 << 2;
}

/// BAR encoding bits.
pub mod bar {
    /// Set for I/O space BARs.
    pub const IO: u32 = 1 << 0;
    /// Memory BAR type field (bits 1-2).
    pub const TYPE_MASK: u32 = 0x06;
    /// 64-bit memory BAR type.
    pub const TYPE_64: u32 = 0x04;
    /// Address bits of a memory BAR.
    pub const MEM_ADDR_MASK: u32 = 0xFFFF_FFF0;
}

// ═══════════════════════════════════════════════════════════════════════════
// LEGACY CF8/CFC MECHANISM
// ═══════════════════════════════════════════════════════════════════════════

/// Legacy configuration mechanism #1 via I/O ports 0xCF8/0xCFC.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PortIoConfig;

#[cfg(target_arch = "x86_64")]
impl PortIoConfig {
    const ADDRESS_PORT: u16 = 0xCF8;
    const DATA_PORT: u16 = 0xCFC;

    /// Create the accessor.
    ///
    /// # Safety
    /// Caller must have I/O port privilege and be the only user of
    /// 0xCF8/0xCFC while accesses are in flight.
    pub const unsafe fn new() -> Self {
        Self
    }

    #[inline]
    fn address(bdf: PciBdf, offset: u8) -> u32 {
        0x8000_0000
            | ((bdf.bus as u32) << 16)
            | (((bdf.device & 0x1F) as u32) << 11)
            | (((bdf.function & 0x07) as u32) << 8)
            | ((offset & 0xFC) as u32)
    }

    #[inline]
    unsafe fn outl(port: u16, value: u32) {
        core::arch::asm!(
            "out dx, eax",
            in("dx") port,
            in("eax") value,
            options(nostack, preserves_flags)
        );
    }

    #[inline]
    unsafe fn inl(port: u16) -> u32 {
        let value: u32;
        core::arch::asm!(
            "in eax, dx",
            in("dx") port,
            out("eax") value,
            options(nostack, preserves_flags)
        );
        value
    }
}

#[cfg(target_arch = "x86_64")]
impl ConfigSpace for PortIoConfig {
    fn read32(&self, bdf: PciBdf, offset: u8) -> u32 {
        unsafe {
            Self::outl(Self::ADDRESS_PORT, Self::address(bdf, offset));
            Self::inl(Self::DATA_PORT)
        }
    }

    fn write32(&self, bdf: PciBdf, offset: u8, value: u32) {
        unsafe {
            Self::outl(Self::ADDRESS_PORT, Self::address(bdf, offset));
            Self::outl(Self::DATA_PORT, value);
        }
    }
}
