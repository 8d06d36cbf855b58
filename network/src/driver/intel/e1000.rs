//! Intel 82540EM driver implementation.
//!
//! # DMA Layout
//! ```text
//! 0x0000  TX descriptor (16 B)
//! 0x0010  RX descriptor (16 B)
//! 0x0020  TX buffer     (2 KiB)
//! 0x0820  RX buffer     (2 KiB)
//! ```
//!
//! # Reference
//! PCI/PCI-X Family of Gigabit Ethernet Controllers SDM, Sections 3.2-3.3, 14

use core::sync::atomic::{fence, Ordering};

use leafdrv_hwinit::pci::cmd;
use leafdrv_hwinit::{
    DmaRegion, DriverError, IrqController, IrqLine, PciBdf, PciBus, RegisterIo, Result, Sense,
    SpinYield, Yield,
};
use log::{debug, error, info, trace};

use super::desc::{RxDesc, TxDesc};
use super::regs::{self, Reg};
use super::{DEFAULT_BDF, E1000_PCI_ID};
use crate::driver::traits::{EthernetApi, EthernetCaps, NetInterface};
use crate::types::{LinkType, MacAddress, NetPkt, ETH_FCS_LEN, ETH_FRAME_MAX};

const LOG_TARGET: &str = "eth_e1000";

// ═══════════════════════════════════════════════════════════════════════════
// DMA LAYOUT
// ═══════════════════════════════════════════════════════════════════════════

/// Size of each packet buffer; matches RCTL.BSIZE = 2048.
pub const BUFFER_SIZE: usize = 2048;

pub const TX_DESC_OFFSET: usize = 0x0000;
pub const RX_DESC_OFFSET: usize = 0x0010;
pub const TX_BUFFER_OFFSET: usize = 0x0020;
pub const RX_BUFFER_OFFSET: usize = TX_BUFFER_OFFSET + BUFFER_SIZE;

/// Bytes of DMA memory one device needs.
pub const DMA_SIZE: usize = RX_BUFFER_OFFSET + BUFFER_SIZE;

/// Descriptor base registers need 16-byte alignment.
pub const DMA_ALIGN: usize = 16;

/// Statically allocatable DMA backing for one device.
#[repr(C, align(16))]
pub struct E1000DmaArea([u8; DMA_SIZE]);

impl E1000DmaArea {
    pub const fn new() -> Self {
        Self([0; DMA_SIZE])
    }

    /// Describe this area as an identity-mapped DMA region.
    ///
    /// # Safety
    /// The memory must be identity-mapped for the device (no IOMMU
    /// translation, bus address == CPU address) and below any DMA
    /// addressing limit of the platform.
    pub unsafe fn identity_region(&'static mut self) -> DmaRegion {
        DmaRegion::identity(self.0.as_mut_ptr(), DMA_SIZE)
    }
}

impl Default for E1000DmaArea {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

/// E1000 driver configuration (devicetree-equivalent values).
#[derive(Debug, Clone)]
pub struct E1000Config {
    /// PCI location probed for the device.
    pub bdf: PciBdf,
    /// Interrupt line connected during init.
    pub irq: IrqLine,
    /// Yields to wait for TX write-back before giving up.
    ///
    /// `None` waits forever, which hangs the caller if the device never
    /// completes the descriptor.
    pub tx_spin_limit: Option<u32>,
}

impl Default for E1000Config {
    fn default() -> Self {
        Self {
            bdf: DEFAULT_BDF,
            irq: IrqLine::new(11, 3, Sense::Level),
            tx_spin_limit: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DRIVER
// ═══════════════════════════════════════════════════════════════════════════

/// Intel 82540EM network driver.
///
/// After `init`, transmit and the interrupt service routine both take
/// `&self`: they own disjoint descriptors, so the ISR may preempt a
/// transmit that is waiting for write-back. Transmits must be serialized
/// by the caller.
pub struct E1000<R: RegisterIo, Y: Yield = SpinYield> {
    /// Register window (BAR 0).
    regs: R,
    /// Descriptor and buffer memory.
    dma: DmaRegion,
    /// Called while waiting for TX write-back.
    yielder: Y,
    config: E1000Config,
    /// Filled in by `init`.
    mac: MacAddress,
}

/// Probe for the device and enable its memory window and bus mastering.
///
/// Returns the MMIO base of BAR 0; the host maps it and builds the
/// register window passed to [`E1000::new`].
pub fn probe<P: PciBus + ?Sized>(pci: &P, bdf: PciBdf) -> Result<u64> {
    if !pci.probe(bdf, E1000_PCI_ID) {
        debug!(target: LOG_TARGET, "{}: no 82540EM", bdf);
        return Err(DriverError::NoDevice);
    }

    let mbar = pci.get_mbar(bdf, 0).ok_or_else(|| {
        error!(target: LOG_TARGET, "{}: no memory BAR", bdf);
        DriverError::NoDevice
    })?;

    pci.set_cmd(bdf, cmd::MEM | cmd::MASTER, true);

    info!(target: LOG_TARGET, "{}: 82540EM registers at {:#x}", bdf, mbar);
    Ok(mbar)
}

impl<R: RegisterIo, Y: Yield> E1000<R, Y> {
    /// Bind a register window and DMA memory.
    ///
    /// Fails with `NoMemory` if `dma` is smaller than [`DMA_SIZE`] or not
    /// 16-byte aligned.
    pub fn new(regs: R, dma: DmaRegion, yielder: Y, config: E1000Config) -> Result<Self> {
        if !dma.fits(DMA_SIZE, DMA_ALIGN) {
            error!(target: LOG_TARGET, "DMA region unusable: {:?}", dma);
            return Err(DriverError::NoMemory);
        }

        Ok(Self { regs, dma, yielder, config, mac: [0; 6] })
    }

    // ───────────────────────────────────────────────────────────────────
    // Register access
    // ───────────────────────────────────────────────────────────────────

    #[inline]
    fn iow32(&self, reg: Reg, value: u32) {
        trace!(target: LOG_TARGET, "iow32 {} {:#010x}", reg.name(), value);
        self.regs.write32(reg.offset(), value);
    }

    #[inline]
    fn ior32(&self, reg: Reg) -> u32 {
        let value = self.regs.read32(reg.offset());
        trace!(target: LOG_TARGET, "ior32 {} {:#010x}", reg.name(), value);
        value
    }

    #[inline]
    fn tx_desc(&self) -> *mut TxDesc {
        unsafe { self.dma.cpu_at(TX_DESC_OFFSET) as *mut TxDesc }
    }

    #[inline]
    fn rx_desc(&self) -> *mut RxDesc {
        unsafe { self.dma.cpu_at(RX_DESC_OFFSET) as *mut RxDesc }
    }

    /// Write both halves of a 64-bit descriptor base.
    fn set_base(&self, lo: Reg, hi: Reg, bus: u64) {
        self.iow32(lo, bus as u32);
        self.iow32(hi, (bus >> 32) as u32);
    }

    // ───────────────────────────────────────────────────────────────────
    // Init
    // ───────────────────────────────────────────────────────────────────

    fn setup(&mut self, iface: &dyn NetInterface, irq: &mut dyn IrqController) -> Result<()> {
        // TX: one descriptor, idle until the first transmit arms it
        unsafe { core::ptr::write_volatile(self.tx_desc(), TxDesc::default()) };
        self.set_base(Reg::Tdbal, Reg::Tdbah, self.dma.bus_at(TX_DESC_OFFSET));
        self.iow32(Reg::Tdlen, regs::DESC_SIZE);
        self.iow32(Reg::Tdh, 0);
        self.iow32(Reg::Tdt, 0);
        self.iow32(Reg::Tctl, regs::TCTL_EN);

        // RX: one descriptor, owned by hardware from the start
        self.arm_rx_desc();
        self.set_base(Reg::Rdbal, Reg::Rdbah, self.dma.bus_at(RX_DESC_OFFSET));
        self.iow32(Reg::Rdlen, regs::DESC_SIZE);
        self.iow32(Reg::Rdh, 0);
        self.iow32(Reg::Rdt, 1);

        self.iow32(Reg::Ims, regs::IMS_RXO);

        let ral = self.ior32(Reg::Ral);
        let rah = self.ior32(Reg::Rah);
        self.mac[..4].copy_from_slice(&ral.to_le_bytes());
        self.mac[4..].copy_from_slice(&rah.to_le_bytes()[..2]);

        iface.ethernet_init();
        iface.set_link_addr(self.mac, LinkType::Ethernet);

        irq.connect(&self.config.irq)?;
        irq.enable(self.config.irq.irq);

        self.iow32(Reg::Ctrl, regs::CTRL_SLU);
        self.iow32(Reg::Rctl, regs::RCTL_EN | regs::RCTL_MPE);

        debug!(target: LOG_TARGET, "done, mac {:02x?}", self.mac);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────
    // TX
    // ───────────────────────────────────────────────────────────────────

    /// Send `len` bytes already in the TX buffer and wait for write-back.
    fn tx(&self, len: usize) -> Result<()> {
        self.tx_with(len, || self.yielder.yield_now())
    }

    fn tx_with(&self, len: usize, mut yield_now: impl FnMut()) -> Result<()> {
        #[cfg(feature = "verbose_debug")]
        leafdrv_hwinit::debug::hexdump(
            LOG_TARGET,
            format_args!("tx: {} byte(s)", len),
            unsafe { core::slice::from_raw_parts(self.dma.cpu_at(TX_BUFFER_OFFSET), len) },
        );

        let desc = self.tx_desc();
        unsafe {
            TxDesc::arm(
                desc,
                self.dma.bus_at(TX_BUFFER_OFFSET),
                len as u16,
                regs::TDESC_EOP | regs::TDESC_RS,
            );
        }

        // Descriptor and buffer must be visible before the doorbell
        fence(Ordering::SeqCst);
        self.iow32(Reg::Tdt, 1);

        let mut spins: u32 = 0;
        let sta = loop {
            let sta = unsafe { TxDesc::status(desc) };
            if sta != 0 {
                break sta;
            }
            if let Some(limit) = self.config.tx_spin_limit {
                if spins >= limit {
                    error!(target: LOG_TARGET, "TX write-back timed out after {} yields", spins);
                    return Err(DriverError::Io);
                }
            }
            spins = spins.wrapping_add(1);
            yield_now();
        };

        debug!(target: LOG_TARGET, "tx.sta: {:#04x}", sta);

        if sta & regs::TDESC_STA_DD != 0 {
            Ok(())
        } else {
            Err(DriverError::Io)
        }
    }

    // ───────────────────────────────────────────────────────────────────
    // RX
    // ───────────────────────────────────────────────────────────────────

    fn arm_rx_desc(&self) {
        unsafe {
            RxDesc::arm(
                self.rx_desc(),
                self.dma.bus_at(RX_BUFFER_OFFSET),
                BUFFER_SIZE as u16,
            );
        }
    }

    /// Pull the frame out of the RX descriptor.
    ///
    /// Runs in interrupt context: one allocation, one copy, no blocking.
    fn rx(&self, iface: &dyn NetInterface) -> Option<NetPkt> {
        let desc = unsafe { RxDesc::read(self.rx_desc()) };

        debug!(target: LOG_TARGET, "rx.sta: {:#04x}", desc.sta);

        if desc.sta & regs::RDESC_STA_DD == 0 {
            error!(target: LOG_TARGET, "RX descriptor not ready");
            return None;
        }

        let pkt = self.rx_frame(&desc, iface);

        // Hand the descriptor back to hardware for the next frame
        self.arm_rx_desc();
        fence(Ordering::SeqCst);
        self.iow32(Reg::Rdt, 1);

        pkt
    }

    fn rx_frame(&self, desc: &RxDesc, iface: &dyn NetInterface) -> Option<NetPkt> {
        // Hardware length includes the FCS and is bounded by the buffer
        let len = match (desc.len as usize).checked_sub(ETH_FCS_LEN) {
            Some(len) if len > 0 && desc.len as usize <= BUFFER_SIZE => len,
            _ => {
                error!(target: LOG_TARGET, "Invalid RX descriptor length: {}", desc.len);
                return None;
            }
        };

        // Buffer contents are only valid after the DD bit was observed
        fence(Ordering::Acquire);
        let frame = unsafe { core::slice::from_raw_parts(self.dma.cpu_at(RX_BUFFER_OFFSET), len) };

        #[cfg(feature = "verbose_debug")]
        leafdrv_hwinit::debug::hexdump(LOG_TARGET, format_args!("rx: {} byte(s)", len), frame);

        let Some(mut pkt) = iface.alloc_rx(len) else {
            error!(target: LOG_TARGET, "Out of buffers");
            return None;
        };

        if pkt.write(frame).is_err() {
            error!(target: LOG_TARGET, "Out of memory for received frame");
            return None;
        }

        Some(pkt)
    }

    /// Interrupt service routine.
    ///
    /// Reads (and thereby clears) ICR. TX causes are ignored since transmit
    /// polls its descriptor; RX overrun delivers the pending frame.
    pub fn isr(&self, iface: &dyn NetInterface) {
        let mut icr = self.ior32(Reg::Icr);

        icr &= !(regs::ICR_TXDW | regs::ICR_TXQE);

        if icr & regs::ICR_RXO != 0 {
            icr &= !regs::ICR_RXO;

            match self.rx(iface) {
                Some(pkt) => iface.recv_data(pkt),
                None => iface.update_errors_rx(),
            }
        }

        if icr != 0 {
            error!(target: LOG_TARGET, "Unhandled interrupt, ICR: {:#x}", icr);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ETHERNET API
// ═══════════════════════════════════════════════════════════════════════════

impl<R: RegisterIo, Y: Yield> EthernetApi for E1000<R, Y> {
    fn init(&mut self, iface: &dyn NetInterface, irq: &mut dyn IrqController) -> Result<()> {
        self.setup(iface, irq)
    }

    fn capabilities(&self) -> EthernetCaps {
        EthernetCaps::LINK_10BASE_T | EthernetCaps::LINK_100BASE_T | EthernetCaps::LINK_1000BASE_T
    }

    fn send(&self, pkt: &NetPkt) -> Result<()> {
        let len = pkt.len();
        if len > ETH_FRAME_MAX {
            error!(target: LOG_TARGET, "TX frame too large: {} byte(s)", len);
            return Err(DriverError::Io);
        }

        let txb = unsafe {
            core::slice::from_raw_parts_mut(self.dma.cpu_at(TX_BUFFER_OFFSET), BUFFER_SIZE)
        };
        pkt.read_into(txb)?;

        self.tx(len)
    }

    fn mac_address(&self) -> MacAddress {
        self.mac
    }
}
