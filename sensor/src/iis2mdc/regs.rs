//! IIS2MDC register map and register-level helpers.
//!
//! # Reference
//! IIS2MDC datasheet DS12917, Section 8

use bitflags::bitflags;
use leafdrv_hwinit::Result;

use crate::ctx::RegisterContext;

pub const OFFSET_X_REG_L: u8 = 0x45;
pub const OFFSET_X_REG_H: u8 = 0x46;
pub const OFFSET_Y_REG_L: u8 = 0x47;
pub const OFFSET_Y_REG_H: u8 = 0x48;
pub const OFFSET_Z_REG_L: u8 = 0x49;
pub const OFFSET_Z_REG_H: u8 = 0x4A;
pub const WHO_AM_I: u8 = 0x4F;
pub const CFG_REG_A: u8 = 0x60;
pub const CFG_REG_B: u8 = 0x61;
pub const CFG_REG_C: u8 = 0x62;
pub const INT_CTRL_REG: u8 = 0x63;
pub const INT_SOURCE_REG: u8 = 0x64;
pub const INT_THS_L_REG: u8 = 0x65;
pub const INT_THS_H_REG: u8 = 0x66;
pub const STATUS_REG: u8 = 0x67;
pub const OUTX_L_REG: u8 = 0x68;
pub const TEMP_OUT_L_REG: u8 = 0x6E;

/// WHO_AM_I contents.
pub const IIS2MDC_ID: u8 = 0x40;

bitflags! {
    /// CFG_REG_C fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CfgRegC: u8 {
        const DRDY_ON_PIN = 1 << 0;
        const SELF_TEST = 1 << 1;
        /// 4-wire SPI (SDO enabled).
        const SPI_4WIRE = 1 << 2;
        const BLE = 1 << 3;
        const BDU = 1 << 4;
        const I2C_DIS = 1 << 5;
        const INT_ON_PIN = 1 << 6;
    }
}

/// SPI wiring the sensor expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpiWireMode {
    /// Bidirectional SDI, power-on default.
    #[default]
    ThreeWire,
    /// Separate SDO line.
    FourWire,
}

fn read_u8<C: RegisterContext + ?Sized>(ctx: &mut C, reg: u8) -> Result<u8> {
    let mut value = [0u8; 1];
    ctx.read_reg(reg, &mut value)?;
    Ok(value[0])
}

/// Select 3- or 4-wire SPI, keeping the other CFG_REG_C fields.
pub fn spi_mode_set<C: RegisterContext + ?Sized>(ctx: &mut C, mode: SpiWireMode) -> Result<()> {
    let mut cfg = CfgRegC::from_bits_retain(read_u8(ctx, CFG_REG_C)?);
    cfg.set(CfgRegC::SPI_4WIRE, mode == SpiWireMode::FourWire);
    ctx.write_reg(CFG_REG_C, &[cfg.bits()])
}

pub fn spi_mode_get<C: RegisterContext + ?Sized>(ctx: &mut C) -> Result<SpiWireMode> {
    let cfg = CfgRegC::from_bits_retain(read_u8(ctx, CFG_REG_C)?);
    Ok(if cfg.contains(CfgRegC::SPI_4WIRE) {
        SpiWireMode::FourWire
    } else {
        SpiWireMode::ThreeWire
    })
}

/// WHO_AM_I; [`IIS2MDC_ID`] on a genuine part.
pub fn device_id<C: RegisterContext + ?Sized>(ctx: &mut C) -> Result<u8> {
    read_u8(ctx, WHO_AM_I)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafdrv_hwinit::DriverError;

    /// Flat register file with auto-increment.
    struct RegFile {
        regs: [u8; 0x80],
        fail: bool,
    }

    impl RegFile {
        fn new() -> Self {
            let mut regs = [0u8; 0x80];
            regs[WHO_AM_I as usize] = IIS2MDC_ID;
            Self { regs, fail: false }
        }
    }

    impl RegisterContext for RegFile {
        fn read_reg(&mut self, reg: u8, buf: &mut [u8]) -> Result<()> {
            if self.fail {
                return Err(DriverError::Io);
            }
            let start = reg as usize;
            buf.copy_from_slice(&self.regs[start..start + buf.len()]);
            Ok(())
        }

        fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<()> {
            if self.fail {
                return Err(DriverError::Io);
            }
            let start = reg as usize;
            self.regs[start..start + data.len()].copy_from_slice(data);
            Ok(())
        }
    }

    #[test]
    fn test_spi_mode_set_preserves_other_fields() {
        let mut ctx = RegFile::new();
        ctx.regs[CFG_REG_C as usize] = (CfgRegC::BDU | CfgRegC::DRDY_ON_PIN).bits();

        spi_mode_set(&mut ctx, SpiWireMode::FourWire).unwrap();
        assert_eq!(ctx.regs[CFG_REG_C as usize], 0x15);
        assert_eq!(spi_mode_get(&mut ctx), Ok(SpiWireMode::FourWire));

        spi_mode_set(&mut ctx, SpiWireMode::ThreeWire).unwrap();
        assert_eq!(ctx.regs[CFG_REG_C as usize], 0x11);
        assert_eq!(spi_mode_get(&mut ctx), Ok(SpiWireMode::ThreeWire));
    }

    #[test]
    fn test_device_id() {
        let mut ctx = RegFile::new();
        assert_eq!(device_id(&mut ctx), Ok(IIS2MDC_ID));
    }

    #[test]
    fn test_bus_errors_propagate() {
        let mut ctx = RegFile::new();
        ctx.fail = true;
        assert_eq!(spi_mode_set(&mut ctx, SpiWireMode::FourWire), Err(DriverError::Io));
        assert_eq!(device_id(&mut ctx), Err(DriverError::Io));
    }
}
