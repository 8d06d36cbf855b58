//! IIS2MDC SPI transport.
//!
//! Every access is one chip-select window: a header byte carrying the
//! register address and the read bit, then the payload.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error as _, Mode, Operation, SpiBus, SpiDevice, MODE_3};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use leafdrv_hwinit::{DriverError, Result};
use log::{debug, error};

use super::regs::{spi_mode_set, SpiWireMode};
use crate::ctx::RegisterContext;

const LOG_TARGET: &str = "iis2mdc";

/// Header bit selecting a read.
pub const SPI_READ: u8 = 1 << 7;

/// Largest payload of one transfer.
pub const MAX_TRANSFER: usize = 64;

/// Clock polarity/phase the sensor samples with.
pub const SPI_MODE: Mode = MODE_3;

/// Transport configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iis2mdcSpiConfig {
    /// Switch the sensor to 4-wire SPI during init.
    pub full_duplex: bool,
}

impl Default for Iis2mdcSpiConfig {
    fn default() -> Self {
        Self { full_duplex: cfg!(feature = "spi_full_duplex") }
    }
}

/// IIS2MDC register context over an SPI device.
pub struct Iis2mdcSpi<D: SpiDevice> {
    bus: D,
}

impl<D: SpiDevice> Iis2mdcSpi<D> {
    /// Bind `bus` and apply `config` to the sensor.
    pub fn init(bus: D, config: Iis2mdcSpiConfig) -> Result<Self> {
        let mut ctx = Self { bus };

        if config.full_duplex {
            spi_mode_set(&mut ctx, SpiWireMode::FourWire).map_err(|_| {
                error!(target: LOG_TARGET, "Unable to switch to 4-wire SPI");
                DriverError::Io
            })?;
        }

        Ok(ctx)
    }

    /// Give the bus back.
    pub fn release(self) -> D {
        self.bus
    }
}

impl<B, CS> Iis2mdcSpi<ExclusiveDevice<B, CS, NoDelay>>
where
    B: SpiBus,
    CS: OutputPin,
{
    /// Bind a bus whose chip-select is a plain GPIO.
    ///
    /// Fails with `NoDevice` if the pin cannot be driven to its idle level.
    pub fn with_gpio_cs(bus: B, cs: CS, config: Iis2mdcSpiConfig) -> Result<Self> {
        let device = ExclusiveDevice::new_no_delay(bus, cs).map_err(|_| {
            error!(target: LOG_TARGET, "Unable to get GPIO SPI CS device");
            DriverError::NoDevice
        })?;

        debug!(target: LOG_TARGET, "SPI GPIO CS configured");
        Self::init(device, config)
    }
}

impl<D: SpiDevice> RegisterContext for Iis2mdcSpi<D> {
    fn read_reg(&mut self, reg: u8, buf: &mut [u8]) -> Result<()> {
        if buf.len() > MAX_TRANSFER {
            return Err(DriverError::Io);
        }

        let header = [reg | SPI_READ];
        self.bus
            .transaction(&mut [Operation::Write(&header), Operation::Read(buf)])
            .map_err(|e| {
                error!(target: LOG_TARGET, "read {:#04x} failed: {:?}", reg, e.kind());
                DriverError::Io
            })
    }

    fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<()> {
        if data.len() > MAX_TRANSFER {
            return Err(DriverError::Io);
        }

        let header = [reg & !SPI_READ];
        self.bus
            .transaction(&mut [Operation::Write(&header), Operation::Write(data)])
            .map_err(|e| {
                error!(target: LOG_TARGET, "write {:#04x} failed: {:?}", reg, e.kind());
                DriverError::Io
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iis2mdc::regs::{self, spi_mode_get, CFG_REG_C, IIS2MDC_ID, WHO_AM_I};
    use embedded_hal::spi::{ErrorKind, ErrorType, Polarity, Phase};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    // ───────────────────────────────────────────────────────────────────
    // Simulated sensor behind a chip-select
    // ───────────────────────────────────────────────────────────────────

    /// Register file plus a log of raw bus traffic.
    struct Sensor {
        regs: [u8; 0x80],
        /// Bytes clocked out per transaction.
        mosi: Vec<Vec<u8>>,
        fail: bool,
    }

    impl Sensor {
        fn new() -> Self {
            let mut regs = [0u8; 0x80];
            regs[WHO_AM_I as usize] = IIS2MDC_ID;
            Self { regs, mosi: Vec::new(), fail: false }
        }
    }

    struct FakeDevice(Rc<RefCell<Sensor>>);

    impl ErrorType for FakeDevice {
        type Error = ErrorKind;
    }

    impl SpiDevice for FakeDevice {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> core::result::Result<(), ErrorKind> {
            let mut s = self.0.borrow_mut();
            if s.fail {
                return Err(ErrorKind::Other);
            }

            let mut out = Vec::new();
            let mut addr: Option<(usize, bool)> = None;

            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        for &b in bytes.iter() {
                            out.push(b);
                            match addr {
                                None => addr = Some(((b & !SPI_READ) as usize, b & SPI_READ != 0)),
                                Some((a, false)) => {
                                    s.regs[a] = b;
                                    addr = Some((a + 1, false));
                                }
                                Some((_, true)) => {}
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        if let Some((a, true)) = addr {
                            buf.copy_from_slice(&s.regs[a..a + buf.len()]);
                            addr = Some((a + buf.len(), true));
                        }
                    }
                    _ => {}
                }
            }

            s.mosi.push(out);
            Ok(())
        }
    }

    fn sensor() -> (Rc<RefCell<Sensor>>, Iis2mdcSpi<FakeDevice>) {
        let state = Rc::new(RefCell::new(Sensor::new()));
        let ctx = Iis2mdcSpi::init(FakeDevice(state.clone()), Iis2mdcSpiConfig { full_duplex: false })
            .unwrap();
        (state, ctx)
    }

    #[test]
    fn test_read_sets_read_bit() {
        let (state, mut ctx) = sensor();
        state.borrow_mut().regs[0x68..0x6E].copy_from_slice(&[1, 2, 3, 4, 5, 6]);

        let mut out = [0u8; 6];
        ctx.read_reg(regs::OUTX_L_REG, &mut out).unwrap();

        assert_eq!(out, [1, 2, 3, 4, 5, 6]);
        assert_eq!(state.borrow().mosi, vec![vec![0xE8]]);
    }

    #[test]
    fn test_write_clears_read_bit() {
        let (state, mut ctx) = sensor();

        // Caller passing an address with bit 7 set still writes
        ctx.write_reg(regs::CFG_REG_A | 0x80, &[0x8C, 0x02]).unwrap();

        let s = state.borrow();
        assert_eq!(s.mosi, vec![vec![0x60, 0x8C, 0x02]]);
        assert_eq!(&s.regs[0x60..0x62], &[0x8C, 0x02]);
    }

    #[test]
    fn test_transfer_limit() {
        let (state, mut ctx) = sensor();

        let mut big = [0u8; MAX_TRANSFER + 1];
        assert_eq!(ctx.read_reg(regs::OUTX_L_REG, &mut big), Err(DriverError::Io));
        assert_eq!(ctx.write_reg(regs::OFFSET_X_REG_L, &big), Err(DriverError::Io));
        assert!(state.borrow().mosi.is_empty());

        let mut max = [0u8; MAX_TRANSFER];
        ctx.read_reg(0x00, &mut max).unwrap();
    }

    #[test]
    fn test_bus_error_is_io() {
        let (state, mut ctx) = sensor();
        state.borrow_mut().fail = true;

        let mut out = [0u8; 1];
        assert_eq!(ctx.read_reg(WHO_AM_I, &mut out), Err(DriverError::Io));
        assert_eq!(ctx.write_reg(CFG_REG_C, &[0]), Err(DriverError::Io));
    }

    #[test]
    fn test_init_full_duplex_selects_four_wire() {
        let state = Rc::new(RefCell::new(Sensor::new()));
        state.borrow_mut().regs[CFG_REG_C as usize] = 0x10;

        let mut ctx =
            Iis2mdcSpi::init(FakeDevice(state.clone()), Iis2mdcSpiConfig { full_duplex: true }).unwrap();

        assert_eq!(state.borrow().regs[CFG_REG_C as usize], 0x14);
        assert_eq!(spi_mode_get(&mut ctx), Ok(SpiWireMode::FourWire));
    }

    #[test]
    fn test_init_full_duplex_bus_failure() {
        let state = Rc::new(RefCell::new(Sensor::new()));
        state.borrow_mut().fail = true;

        let result = Iis2mdcSpi::init(FakeDevice(state), Iis2mdcSpiConfig { full_duplex: true });
        assert!(matches!(result, Err(DriverError::Io)));
    }

    #[test]
    fn test_init_half_duplex_leaves_sensor_untouched() {
        let (state, _ctx) = sensor();
        assert!(state.borrow().mosi.is_empty());
    }

    #[test]
    fn test_spi_mode_is_mode_3() {
        assert_eq!(SPI_MODE.polarity, Polarity::IdleHigh);
        assert_eq!(SPI_MODE.phase, Phase::CaptureOnSecondTransition);
    }

    // ───────────────────────────────────────────────────────────────────
    // GPIO chip-select
    // ───────────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct Wire {
        /// Chip-select levels, in order.
        cs: Vec<bool>,
        mosi: Vec<u8>,
        miso: Vec<u8>,
    }

    struct FakeBus(Rc<RefCell<Wire>>);

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl SpiBus for FakeBus {
        fn read(&mut self, words: &mut [u8]) -> core::result::Result<(), ErrorKind> {
            let mut w = self.0.borrow_mut();
            for word in words.iter_mut() {
                *word = if w.miso.is_empty() { 0 } else { w.miso.remove(0) };
            }
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> core::result::Result<(), ErrorKind> {
            self.0.borrow_mut().mosi.extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> core::result::Result<(), ErrorKind> {
            self.write(write)?;
            self.read(read)
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> core::result::Result<(), ErrorKind> {
            let out = words.to_vec();
            self.read(words)?;
            self.write(&out)
        }

        fn flush(&mut self) -> core::result::Result<(), ErrorKind> {
            Ok(())
        }
    }

    struct FakePin {
        wire: Rc<RefCell<Wire>>,
        broken: bool,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = embedded_hal::digital::ErrorKind;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
            if self.broken {
                return Err(embedded_hal::digital::ErrorKind::Other);
            }
            self.wire.borrow_mut().cs.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
            if self.broken {
                return Err(embedded_hal::digital::ErrorKind::Other);
            }
            self.wire.borrow_mut().cs.push(true);
            Ok(())
        }
    }

    #[test]
    fn test_gpio_cs_frames_each_access() {
        let wire = Rc::new(RefCell::new(Wire::default()));
        wire.borrow_mut().miso.push(IIS2MDC_ID);

        let mut ctx = Iis2mdcSpi::with_gpio_cs(
            FakeBus(wire.clone()),
            FakePin { wire: wire.clone(), broken: false },
            Iis2mdcSpiConfig { full_duplex: false },
        )
        .unwrap();

        assert_eq!(regs::device_id(&mut ctx), Ok(IIS2MDC_ID));

        let w = wire.borrow();
        // Idle high at bind, then one low/high window
        assert_eq!(w.cs, vec![true, false, true]);
        assert_eq!(w.mosi, vec![WHO_AM_I | SPI_READ]);
    }

    #[test]
    fn test_gpio_cs_unusable_pin() {
        let wire = Rc::new(RefCell::new(Wire::default()));

        let result = Iis2mdcSpi::with_gpio_cs(
            FakeBus(wire.clone()),
            FakePin { wire, broken: true },
            Iis2mdcSpiConfig::default(),
        );

        assert!(matches!(result, Err(DriverError::NoDevice)));
    }
}
