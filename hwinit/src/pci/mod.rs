//! PCI probe and BAR helpers.
//!
//! [`PciBus`] is what drivers call: match an ID at a fixed location, find a
//! memory BAR, flip command bits. It is implemented for every
//! [`ConfigSpace`], so hosts only provide raw dword access.
//!
//! # Reference
//! PCI Local Bus Spec 3.0, §6.1-6.2.5

pub mod config;

#[cfg(target_arch = "x86_64")]
pub use config::PortIoConfig;
pub use config::{bar, cmd, offset, ConfigSpace, PciBdf};

/// Vendor/device ID pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciId {
    pub vendor: u16,
    pub device: u16,
}

impl PciId {
    pub const fn new(vendor: u16, device: u16) -> Self {
        Self { vendor, device }
    }

    /// Layout of the ID dword at config offset 0.
    #[inline]
    pub const fn as_dword(self) -> u32 {
        ((self.device as u32) << 16) | self.vendor as u32
    }
}

/// Driver-facing PCI operations.
pub trait PciBus {
    /// Whether the function at `bdf` carries `id`.
    fn probe(&self, bdf: PciBdf, id: PciId) -> bool;

    /// Address of the `index`-th memory BAR, skipping I/O and empty BARs.
    fn get_mbar(&self, bdf: PciBdf, index: usize) -> Option<u64>;

    /// Set (`on == true`) or clear the given command register bits.
    fn set_cmd(&self, bdf: PciBdf, bits: u16, on: bool);
}

impl<T: ConfigSpace + ?Sized> PciBus for T {
    fn probe(&self, bdf: PciBdf, id: PciId) -> bool {
        self.read32(bdf, offset::VENDOR_ID) == id.as_dword()
    }

    fn get_mbar(&self, bdf: PciBdf, index: usize) -> Option<u64> {
        let mut remaining = index;
        let mut reg = offset::BAR0;

        while reg <= offset::BAR5 {
            let raw = self.read32(bdf, reg);

            if raw & bar::IO != 0 {
                reg += 4;
                continue;
            }

            let is_64 = raw & bar::TYPE_MASK == bar::TYPE_64;
            let low = (raw & bar::MEM_ADDR_MASK) as u64;
            let addr = if is_64 && reg < offset::BAR5 {
                ((self.read32(bdf, reg + 4) as u64) << 32) | low
            } else {
                low
            };

            reg += if is_64 { 8 } else { 4 };

            // Unimplemented BARs read back as zero
            if addr == 0 {
                continue;
            }

            if remaining == 0 {
                return Some(addr);
            }
            remaining -= 1;
        }

        None
    }

    fn set_cmd(&self, bdf: PciBdf, bits: u16, on: bool) {
        let dword = self.read32(bdf, offset::COMMAND);
        let command = dword as u16;
        let command = if on { command | bits } else { command & !bits };

        // Status half is write-1-to-clear; write zeros there
        self.write32(bdf, offset::COMMAND, command as u32);
        log::trace!(target: "pci", "{}: command {:#06x}", bdf, command);
    }
}
