//! Intel 82540EM register definitions.
//!
//! Only the registers the single-descriptor driver touches.
//!
//! # Reference
//! PCI/PCI-X Family of Gigabit Ethernet Controllers SDM, Section 13

// ═══════════════════════════════════════════════════════════════════════════
// REGISTERS
// ═══════════════════════════════════════════════════════════════════════════

/// Device registers, by MMIO offset.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    /// Device Control.
    Ctrl = 0x0000,
    /// Interrupt Cause Read (clear on read).
    Icr = 0x00C0,
    /// Interrupt Cause Set.
    Ics = 0x00C8,
    /// Interrupt Mask Set/Read.
    Ims = 0x00D0,
    /// Receive Control.
    Rctl = 0x0100,
    /// Transmit Control.
    Tctl = 0x0400,
    /// Receive Descriptor Base Address Low.
    Rdbal = 0x2800,
    /// Receive Descriptor Base Address High.
    Rdbah = 0x2804,
    /// Receive Descriptor Length (bytes).
    Rdlen = 0x2808,
    /// Receive Descriptor Head.
    Rdh = 0x2810,
    /// Receive Descriptor Tail.
    Rdt = 0x2818,
    /// Transmit Descriptor Base Address Low.
    Tdbal = 0x3800,
    /// Transmit Descriptor Base Address High.
    Tdbah = 0x3804,
    /// Transmit Descriptor Length (bytes).
    Tdlen = 0x3808,
    /// Transmit Descriptor Head.
    Tdh = 0x3810,
    /// Transmit Descriptor Tail.
    Tdt = 0x3818,
    /// Receive Address Low (MAC bytes 0-3).
    Ral = 0x5400,
    /// Receive Address High (MAC bytes 4-5 + flags).
    Rah = 0x5404,
}

impl Reg {
    /// Every register, in offset order.
    pub const ALL: [Reg; 18] = [
        Reg::Ctrl,
        Reg::Icr,
        Reg::Ics,
        Reg::Ims,
        Reg::Rctl,
        Reg::Tctl,
        Reg::Rdbal,
        Reg::Rdbah,
        Reg::Rdlen,
        Reg::Rdh,
        Reg::Rdt,
        Reg::Tdbal,
        Reg::Tdbah,
        Reg::Tdlen,
        Reg::Tdh,
        Reg::Tdt,
        Reg::Ral,
        Reg::Rah,
    ];

    /// MMIO byte offset.
    #[inline]
    pub const fn offset(self) -> u32 {
        self as u32
    }

    /// Datasheet mnemonic, for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Reg::Ctrl => "CTRL",
            Reg::Icr => "ICR",
            Reg::Ics => "ICS",
            Reg::Ims => "IMS",
            Reg::Rctl => "RCTL",
            Reg::Tctl => "TCTL",
            Reg::Rdbal => "RDBAL",
            Reg::Rdbah => "RDBAH",
            Reg::Rdlen => "RDLEN",
            Reg::Rdh => "RDH",
            Reg::Rdt => "RDT",
            Reg::Tdbal => "TDBAL",
            Reg::Tdbah => "TDBAH",
            Reg::Tdlen => "TDLEN",
            Reg::Tdh => "TDH",
            Reg::Tdt => "TDT",
            Reg::Ral => "RAL",
            Reg::Rah => "RAH",
        }
    }

    /// Register at `offset`, if the driver knows it.
    pub fn from_offset(offset: u32) -> Option<Reg> {
        Self::ALL.iter().copied().find(|r| r.offset() == offset)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REGISTER BITS
// ═══════════════════════════════════════════════════════════════════════════

/// Set Link Up.
pub const CTRL_SLU: u32 = 1 << 6;

/// Transmitter Enable.
pub const TCTL_EN: u32 = 1 << 1;

/// Receiver Enable.
pub const RCTL_EN: u32 = 1 << 1;
/// Multicast Promiscuous Enable.
pub const RCTL_MPE: u32 = 1 << 4;

/// Transmit Descriptor Written Back.
pub const ICR_TXDW: u32 = 1 << 0;
/// Transmit Queue Empty.
pub const ICR_TXQE: u32 = 1 << 1;
/// Receiver Overrun; QEMU raises it for every frame on a one-entry ring.
pub const ICR_RXO: u32 = 1 << 6;

/// Receiver Overrun interrupt mask.
pub const IMS_RXO: u32 = 1 << 6;

// ═══════════════════════════════════════════════════════════════════════════
// DESCRIPTOR BITS
// ═══════════════════════════════════════════════════════════════════════════

/// TX command: End Of Packet.
pub const TDESC_EOP: u8 = 1 << 0;
/// TX command: Report Status.
pub const TDESC_RS: u8 = 1 << 3;
/// TX status: Descriptor Done.
pub const TDESC_STA_DD: u8 = 1 << 0;

/// RX status: Descriptor Done.
pub const RDESC_STA_DD: u8 = 1 << 0;

/// Size of a legacy descriptor in bytes.
pub const DESC_SIZE: u32 = 16;
