//! Cooperative scheduling hook for busy-waits.

/// Give up the processor while polling hardware.
///
/// Hosts with a scheduler yield to other threads; bare-metal hosts spin.
pub trait Yield {
    fn yield_now(&self);
}

/// Spin-loop hint, no scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinYield;

impl Yield for SpinYield {
    #[inline]
    fn yield_now(&self) {
        core::hint::spin_loop();
    }
}
