//! Register access context.

use leafdrv_hwinit::Result;

/// Multi-byte register access on one device.
///
/// Register helpers take any context, so the same code runs over SPI, I2C
/// or a simulated device.
pub trait RegisterContext {
    /// Read `buf.len()` bytes starting at `reg`.
    fn read_reg(&mut self, reg: u8, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `reg`.
    fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<()>;
}

impl<C: RegisterContext + ?Sized> RegisterContext for &mut C {
    fn read_reg(&mut self, reg: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_reg(reg, buf)
    }

    fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<()> {
        (**self).write_reg(reg, data)
    }
}
