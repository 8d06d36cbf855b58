//! Interrupt line description and controller hook.
//!
//! The host owns the interrupt controller and the vector table. A driver
//! describes its line (from devicetree or PCI config) and asks the host to
//! route it; the host then calls the driver's service routine.

use crate::error::Result;

/// Trigger mode of an interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    #[default]
    Level,
    Edge,
}

/// One interrupt line as the host describes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqLine {
    /// Controller input number.
    pub irq: u32,
    /// Host priority; meaning is controller-specific.
    pub priority: u32,
    /// Trigger mode.
    pub sense: Sense,
}

impl IrqLine {
    pub const fn new(irq: u32, priority: u32, sense: Sense) -> Self {
        Self { irq, priority, sense }
    }
}

/// Host interrupt controller.
pub trait IrqController {
    /// Route `line` to the calling driver's service routine.
    fn connect(&mut self, line: &IrqLine) -> Result<()>;

    /// Unmask the line.
    fn enable(&mut self, irq: u32);
}
