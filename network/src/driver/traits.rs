//! Driver trait definitions.
//!
//! Two seams: [`EthernetApi`] is what a NIC driver offers the host (its
//! capability table), [`NetInterface`] is what the host's network interface
//! offers the driver.

use bitflags::bitflags;
use leafdrv_hwinit::{IrqController, Result};

use crate::types::{LinkType, MacAddress, NetPkt};

bitflags! {
    /// Hardware capabilities advertised to the network stack.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EthernetCaps: u32 {
        const TX_CHKSUM_OFFLOAD = 1 << 0;
        const RX_CHKSUM_OFFLOAD = 1 << 1;
        const HW_VLAN = 1 << 2;
        const AUTO_NEGOTIATION_SET = 1 << 3;
        const LINK_10BASE_T = 1 << 4;
        const LINK_100BASE_T = 1 << 5;
        const LINK_1000BASE_T = 1 << 6;
        const DUPLEX_SET = 1 << 7;
        const PROMISC_MODE = 1 << 9;
    }
}

/// Host network interface, as seen by a driver.
///
/// Methods take `&self` because the interface is shared between the
/// driver's normal call path and its interrupt service routine;
/// implementations must be interrupt-safe and must not block.
pub trait NetInterface {
    /// Bring up the Ethernet L2 state of the interface.
    fn ethernet_init(&self);

    /// Record the interface's link-layer address.
    fn set_link_addr(&self, mac: MacAddress, link: LinkType);

    /// Allocate a receive packet with room for `len` bytes.
    ///
    /// Must not block; `None` means no buffer is available right now.
    fn alloc_rx(&self, len: usize) -> Option<NetPkt>;

    /// Hand a received packet to the stack.
    fn recv_data(&self, pkt: NetPkt);

    /// Count one dropped receive.
    fn update_errors_rx(&self);
}

/// Ethernet driver capability table.
pub trait EthernetApi {
    /// Program the device and attach it to `iface`.
    fn init(&mut self, iface: &dyn NetInterface, irq: &mut dyn IrqController) -> Result<()>;

    /// Hardware capabilities.
    fn capabilities(&self) -> EthernetCaps;

    /// Transmit one packet. Returns once the hardware is done with it.
    ///
    /// Takes `&self` so the driver can be shared with its interrupt
    /// service routine; callers still serialize sends.
    fn send(&self, pkt: &NetPkt) -> Result<()>;

    /// MAC address read from the device during `init`.
    fn mac_address(&self) -> MacAddress;
}
