//! ISR-safe [`Port`] wrapper using critical sections.
//!
//! Grounded on the teacher's `SharedEmac`: all access goes through
//! `critical_section::with()`, so the same [`SharedPort`] can be touched
//! from task code and, if a platform's INT_N is a true interrupt rather
//! than a poller, from that interrupt handler too.

use super::primitives::CriticalSectionCell;
use crate::message::{DataRole, PowerRole};
use crate::port::Port;

/// ISR-safe wrapper around one port's [`Port`] state.
///
/// ```ignore
/// static PORT: SharedPort = SharedPort::new(PowerRole::Sink, DataRole::Ufp);
///
/// PORT.with(|port| {
///     port.pe.explicit_contract = true;
/// });
/// ```
pub struct SharedPort {
    inner: CriticalSectionCell<Port>,
}

impl SharedPort {
    /// Create a new shared port (const, suitable for static initialization).
    #[must_use]
    pub const fn new(power_role: PowerRole, data_role: DataRole) -> Self {
        Self {
            inner: CriticalSectionCell::new(Port::new(power_role, data_role)),
        }
    }

    /// Execute a closure with exclusive access to the port.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Port) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Port) -> R,
    {
        self.inner.try_with(f)
    }
}
