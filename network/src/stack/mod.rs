//! smoltcp integration layer.
//!
//! This module provides the bridge between leafdrv Ethernet drivers and the
//! smoltcp TCP/IP stack.
//!
//! # Components
//!
//! - [`FrameQueue`] - `NetInterface` the driver's ISR delivers frames into
//! - [`DeviceAdapter`] - Adapts an `EthernetApi` driver plus its queue to
//!   smoltcp's `Device` trait
//!
//! # Usage
//!
//! ```ignore
//! use leafdrv_net::driver::intel::{self, E1000, E1000Config, E1000DmaArea};
//! use leafdrv_net::stack::{DeviceAdapter, FrameQueue};
//!
//! static QUEUE: FrameQueue = FrameQueue::new(8);
//! static mut DMA: E1000DmaArea = E1000DmaArea::new();
//!
//! let mbar = intel::e1000::probe(&pci, config.bdf)?;
//! let mut nic = E1000::new(map_bar(mbar), unsafe { DMA.identity_region() }, SpinYield, config)?;
//! nic.init(&QUEUE, &mut pic)?;
//!
//! // Shared from here on: the IRQ handler runs `nic.isr(&QUEUE)`
//! let nic = &nic;
//! let mut device = DeviceAdapter::new(nic, &QUEUE);
//! iface.poll(now, &mut device, &mut sockets);
//! ```

use alloc::collections::VecDeque;
use alloc::vec;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::{trace, warn};
use smoltcp::phy::{Device, DeviceCapabilities, Medium, RxToken, TxToken};
use smoltcp::time::Instant;
use spin::Mutex;

use crate::driver::traits::{EthernetApi, NetInterface};
use crate::types::{LinkType, MacAddress, NetPkt, ETH_FRAME_MAX};

const LOG_TARGET: &str = "net_stack";

/// Frames a queue holds when the host has no better number.
pub const DEFAULT_QUEUE_DEPTH: usize = 8;

// ═══════════════════════════════════════════════════════════════════════════
// FRAME QUEUE
// ═══════════════════════════════════════════════════════════════════════════

/// Bounded receive queue shared between a driver ISR and the poll loop.
///
/// The ISR is the only producer, the adapter the only consumer. Allocation
/// is refused once `capacity` frames are waiting, which the driver reports
/// as an RX error.
///
/// The producer side never spins on the lock: if the interrupt lands while
/// the consumer holds it, the frame is dropped and counted.
pub struct FrameQueue {
    frames: Mutex<VecDeque<NetPkt>>,
    capacity: usize,
    link_addr: Mutex<Option<MacAddress>>,
    up: AtomicBool,
    rx_errors: AtomicU32,
    delivered: AtomicU32,
}

impl FrameQueue {
    pub const fn new(capacity: usize) -> Self {
        Self {
            frames: Mutex::new(VecDeque::new()),
            capacity,
            link_addr: Mutex::new(None),
            up: AtomicBool::new(false),
            rx_errors: AtomicU32::new(0),
            delivered: AtomicU32::new(0),
        }
    }

    /// Oldest waiting frame.
    pub fn pop(&self) -> Option<NetPkt> {
        self.frames.lock().pop_front()
    }

    /// Frames waiting.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Link address the driver reported, once attached.
    pub fn mac(&self) -> Option<MacAddress> {
        *self.link_addr.lock()
    }

    /// Whether a driver has brought the interface up.
    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }

    /// Receives the driver dropped.
    pub fn rx_errors(&self) -> u32 {
        self.rx_errors.load(Ordering::Relaxed)
    }

    /// Frames accepted into the queue.
    pub fn delivered(&self) -> u32 {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_DEPTH)
    }
}

impl NetInterface for FrameQueue {
    fn ethernet_init(&self) {
        self.up.store(true, Ordering::Release);
    }

    fn set_link_addr(&self, mac: MacAddress, _link: LinkType) {
        *self.link_addr.lock() = Some(mac);
    }

    fn alloc_rx(&self, len: usize) -> Option<NetPkt> {
        let waiting = self.frames.try_lock()?.len();
        if waiting >= self.capacity {
            return None;
        }
        NetPkt::alloc(len)
    }

    fn recv_data(&self, pkt: NetPkt) {
        match self.frames.try_lock() {
            Some(mut frames) if frames.len() < self.capacity => {
                frames.push_back(pkt);
                self.delivered.fetch_add(1, Ordering::Relaxed);
            }
            _ => self.update_errors_rx(),
        }
    }

    fn update_errors_rx(&self) {
        self.rx_errors.fetch_add(1, Ordering::Relaxed);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DEVICE ADAPTER
// ═══════════════════════════════════════════════════════════════════════════

/// Thin adapter that exposes an Ethernet driver to smoltcp.
///
/// Borrows the driver shared, so the interrupt handler can keep calling
/// into it while smoltcp polls.
pub struct DeviceAdapter<'a, D: EthernetApi> {
    device: &'a D,
    queue: &'a FrameQueue,
    tx_errors: u32,
}

impl<'a, D: EthernetApi> DeviceAdapter<'a, D> {
    pub fn new(device: &'a D, queue: &'a FrameQueue) -> Self {
        Self { device, queue, tx_errors: 0 }
    }

    /// Transmits the driver rejected.
    pub fn tx_errors(&self) -> u32 {
        self.tx_errors
    }

    pub fn device(&self) -> &D {
        self.device
    }
}

impl<'a, D: EthernetApi> Device for DeviceAdapter<'a, D> {
    type RxToken<'b> = AdapterRxToken where Self: 'b;
    type TxToken<'b> = AdapterTxToken<'b, D> where Self: 'b;

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.max_transmission_unit = ETH_FRAME_MAX;
        caps.medium = Medium::Ethernet;
        caps
    }

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        let pkt = self.queue.pop()?;
        trace!(target: LOG_TARGET, "rx {} byte(s)", pkt.len());
        Some((
            AdapterRxToken { pkt },
            AdapterTxToken { device: self.device, tx_errors: &mut self.tx_errors },
        ))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        Some(AdapterTxToken { device: self.device, tx_errors: &mut self.tx_errors })
    }
}

/// Owns one frame popped from the queue.
pub struct AdapterRxToken {
    pkt: NetPkt,
}

impl RxToken for AdapterRxToken {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let mut buf = self.pkt.into_vec();
        f(&mut buf)
    }
}

pub struct AdapterTxToken<'b, D: EthernetApi> {
    device: &'b D,
    tx_errors: &'b mut u32,
}

impl<'b, D: EthernetApi> TxToken for AdapterTxToken<'b, D> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let mut buf = vec![0u8; len];
        let result = f(&mut buf);

        // smoltcp expects `result` regardless of whether the frame left
        if let Err(e) = self.device.send(&NetPkt::from_vec(buf)) {
            warn!(target: LOG_TARGET, "tx of {} byte(s) failed: {}", len, e);
            *self.tx_errors = self.tx_errors.wrapping_add(1);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::traits::EthernetCaps;
    use leafdrv_hwinit::{DriverError, IrqController, Result};
    use std::cell::RefCell;
    use std::vec::Vec;

    #[derive(Default)]
    struct FakeDriver {
        sent: RefCell<Vec<Vec<u8>>>,
        fail: bool,
    }

    impl EthernetApi for FakeDriver {
        fn init(&mut self, iface: &dyn NetInterface, _irq: &mut dyn IrqController) -> Result<()> {
            iface.ethernet_init();
            iface.set_link_addr([2, 0, 0, 0, 0, 1], LinkType::Ethernet);
            Ok(())
        }

        fn capabilities(&self) -> EthernetCaps {
            EthernetCaps::LINK_1000BASE_T
        }

        fn send(&self, pkt: &NetPkt) -> Result<()> {
            if self.fail {
                return Err(DriverError::Io);
            }
            self.sent.borrow_mut().push(pkt.as_slice().to_vec());
            Ok(())
        }

        fn mac_address(&self) -> MacAddress {
            [2, 0, 0, 0, 0, 1]
        }
    }

    struct NoIrq;

    impl IrqController for NoIrq {
        fn connect(&mut self, _line: &leafdrv_hwinit::IrqLine) -> Result<()> {
            Ok(())
        }

        fn enable(&mut self, _irq: u32) {}
    }

    fn deliver(queue: &FrameQueue, bytes: &[u8]) -> bool {
        match queue.alloc_rx(bytes.len()) {
            Some(mut pkt) => {
                pkt.write(bytes).unwrap();
                queue.recv_data(pkt);
                true
            }
            None => {
                queue.update_errors_rx();
                false
            }
        }
    }

    #[test]
    fn test_queue_records_attach() {
        let queue = FrameQueue::default();
        let mut drv = FakeDriver::default();
        assert!(!queue.is_up());

        drv.init(&queue, &mut NoIrq).unwrap();

        assert!(queue.is_up());
        assert_eq!(queue.mac(), Some([2, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn test_queue_refuses_when_full() {
        let queue = FrameQueue::new(2);
        assert!(deliver(&queue, &[1; 60]));
        assert!(deliver(&queue, &[2; 60]));
        assert!(!deliver(&queue, &[3; 60]));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.delivered(), 2);
        assert_eq!(queue.rx_errors(), 1);

        assert_eq!(queue.pop().unwrap().as_slice(), &[1; 60]);
        assert!(deliver(&queue, &[4; 60]));
    }

    #[test]
    fn test_producer_does_not_spin_on_held_lock() {
        let queue = FrameQueue::default();
        let pkt = NetPkt::from_slice(&[1; 60]).unwrap();

        {
            // Consumer preempted mid-pop
            let _held = queue.frames.lock();
            assert!(queue.alloc_rx(60).is_none());
            queue.recv_data(pkt);
        }

        assert_eq!(queue.rx_errors(), 1);
        assert_eq!(queue.delivered(), 0);
        assert!(queue.is_empty());
        assert!(deliver(&queue, &[2; 60]));
    }

    #[test]
    fn test_adapter_receive_drains_queue_in_order() {
        let queue = FrameQueue::default();
        let drv = FakeDriver::default();
        deliver(&queue, &[0xAA; 64]);
        deliver(&queue, &[0xBB; 70]);

        let mut dev = DeviceAdapter::new(&drv, &queue);
        let now = Instant::from_millis(0);

        let (rx, _) = dev.receive(now).unwrap();
        assert_eq!(rx.consume(|buf| buf.to_vec()), vec![0xAA; 64]);
        let (rx, _) = dev.receive(now).unwrap();
        assert_eq!(rx.consume(|buf| buf.len()), 70);
        assert!(dev.receive(now).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_adapter_transmit_sends_through_driver() {
        let queue = FrameQueue::default();
        let drv = FakeDriver::default();

        {
            let mut dev = DeviceAdapter::new(&drv, &queue);
            let tx = dev.transmit(Instant::from_millis(0)).unwrap();
            let written = tx.consume(42, |buf| {
                buf.fill(0x5A);
                buf.len()
            });
            assert_eq!(written, 42);
            assert_eq!(dev.tx_errors(), 0);
        }

        assert_eq!(*drv.sent.borrow(), vec![vec![0x5A; 42]]);
    }

    #[test]
    fn test_driver_stays_reachable_while_adapted() {
        let queue = FrameQueue::default();
        let drv = FakeDriver::default();
        let mut dev = DeviceAdapter::new(&drv, &queue);

        let tx = dev.transmit(Instant::from_millis(0)).unwrap();
        tx.consume(60, |buf| buf.fill(1));

        // Interrupt-side access through the same shared borrow
        assert_eq!(drv.sent.borrow().len(), 1);
        assert_eq!(drv.mac_address(), [2, 0, 0, 0, 0, 1]);

        let tx = dev.transmit(Instant::from_millis(1)).unwrap();
        tx.consume(60, |buf| buf.fill(2));
        assert_eq!(drv.sent.borrow().len(), 2);
    }

    #[test]
    fn test_adapter_counts_tx_failures() {
        let queue = FrameQueue::default();
        let drv = FakeDriver { fail: true, ..Default::default() };
        let mut dev = DeviceAdapter::new(&drv, &queue);

        let tx = dev.transmit(Instant::from_millis(0)).unwrap();
        assert_eq!(tx.consume(60, |_| 7), 7);
        assert_eq!(dev.tx_errors(), 1);
    }

    #[test]
    fn test_adapter_capabilities() {
        let queue = FrameQueue::default();
        let drv = FakeDriver::default();
        let dev = DeviceAdapter::new(&drv, &queue);

        let caps = dev.capabilities();
        assert_eq!(caps.max_transmission_unit, ETH_FRAME_MAX);
        assert_eq!(caps.medium, Medium::Ethernet);
        assert_eq!(dev.device().capabilities(), EthernetCaps::LINK_1000BASE_T);
    }
}
