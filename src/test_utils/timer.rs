//! A host-side stand-in for [`embedded_hal_async::delay::DelayNs`].
//!
//! Adapted from the teacher's synchronous `MockDelay`: instead of timing
//! real nanoseconds, every delay resolves on its first poll and simply
//! records how long it was asked to wait, so `tasks::*`'s `T_*_MS` waits can
//! be driven deterministically by [`super::block_on`] without a real clock.

use core::cell::RefCell;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

/// Records every delay requested of it; always resolves immediately.
#[derive(Debug, Default)]
pub struct MockTimer {
    requested_ns: RefCell<Vec<u64>>,
}

impl MockTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in milliseconds, in call order.
    #[must_use]
    pub fn requested_ms(&self) -> Vec<u64> {
        self.requested_ns
            .borrow()
            .iter()
            .map(|ns| ns / 1_000_000)
            .collect()
    }
}

impl DelayNs for MockTimer {
    async fn delay_ns(&mut self, ns: u32) {
        self.requested_ns.borrow_mut().push(u64::from(ns));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::block_on;

    #[test]
    fn records_requested_delays_in_milliseconds() {
        let mut timer = MockTimer::new();
        block_on(timer.delay_ms(250));
        block_on(timer.delay_ms(1000));
        assert_eq!(timer.requested_ms(), std::vec![250, 1000]);
    }
}
