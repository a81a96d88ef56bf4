//! Typed event channels: the async replacement for ChibiOS's
//! `chEvtSignal`/`chEvtWaitAny`.
//!
//! Each concurrent task (`tasks::protocol_rx`, `tasks::protocol_tx`,
//! `tasks::hard_reset`, `tasks::policy_engine`) owns one [`EventChannel`]
//! keyed by its own bitmask-convertible event enum. Signalling ORs bits into
//! a pending mask and wakes the task; waiting clears and returns whichever
//! subset of a requested mask is pending, parking on the shared
//! [`AtomicWaker`] via `core::future::poll_fn` otherwise — the same waker
//! foundation the teacher uses for `receive_async`/`transmit_async`.

use core::future::poll_fn;
use core::task::Poll;

use super::primitives::{AtomicWaker, CriticalSectionCell};

/// A multi-bit event channel for one task.
///
/// `signal`/`signal_many` are safe to call from an interrupt context (the
/// INT_N dispatcher does exactly this); `wait` is only ever called from the
/// owning task.
pub struct EventChannel {
    pending: CriticalSectionCell<u32>,
    waker: AtomicWaker,
}

impl EventChannel {
    /// An empty channel, suitable for `static` initialization.
    pub const fn new() -> Self {
        Self {
            pending: CriticalSectionCell::new(0),
            waker: AtomicWaker::new(),
        }
    }

    /// OR a single event bit into the pending mask and wake the waiter.
    pub fn signal(&self, bit: u32) {
        self.pending.with(|pending| *pending |= bit);
        self.waker.wake();
    }

    /// OR a combined mask of event bits into the pending mask and wake the
    /// waiter once, mirroring `lib/src/int_n.c`'s pattern of combining
    /// several interrupt bits into one `chEvtSignal` call.
    pub fn signal_many(&self, mask: u32) {
        self.pending.with(|pending| *pending |= mask);
        self.waker.wake();
    }

    /// Wait until any bit in `mask` is pending, then clear and return the
    /// full set of matching bits (there may be more than one if several
    /// were signalled before this was polled).
    pub async fn wait_any(&self, mask: u32) -> u32 {
        poll_fn(|cx| {
            let matched = self
                .pending
                .with(|pending| {
                    let hit = *pending & mask;
                    if hit != 0 {
                        *pending &= !hit;
                    }
                    hit
                });
            if matched != 0 {
                Poll::Ready(matched)
            } else {
                self.waker.register(cx.waker());
                Poll::Pending
            }
        })
        .await
    }

    /// Non-blocking poll for any bit in `mask`, clearing and returning the
    /// matching subset without awaiting. Used by the INT_N dispatcher's
    /// non-async poll loop style and by tests.
    pub fn try_wait_any(&self, mask: u32) -> Option<u32> {
        self.pending.with(|pending| {
            let hit = *pending & mask;
            if hit == 0 {
                None
            } else {
                *pending &= !hit;
                Some(hit)
            }
        })
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}
