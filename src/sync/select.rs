//! Race two futures to completion: the async replacement for ChibiOS's
//! `chEvtWaitAnyTimeout`, which every long wait in `tasks::policy_engine` and
//! `tasks::hard_reset` is built from.
//!
//! Neither the teacher nor any other crate in this workspace's dependency
//! tree provides a select/race combinator (no `futures`, no
//! `embassy-futures`), so this is hand-rolled on top of `core::pin::pin!` and
//! `core::future::poll_fn` rather than pulling in an extra dependency for one
//! function.

use core::future::{poll_fn, Future};
use core::task::Poll;

use embedded_hal_async::delay::DelayNs;

use super::event::EventChannel;

/// The result of [`select`]: which of the two futures completed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Either<A, B> {
    /// The first future completed.
    Left(A),
    /// The second future completed.
    Right(B),
}

/// Poll `a` and `b` concurrently, resolving to whichever completes first.
///
/// If both are ready on the same poll, `a` wins (matches the firmware's
/// event-mask check happening before its timer check in every
/// `chEvtWaitAnyTimeout` call site).
pub async fn select<A, B>(a: A, b: B) -> Either<A::Output, B::Output>
where
    A: Future,
    B: Future,
{
    let mut a = core::pin::pin!(a);
    let mut b = core::pin::pin!(b);
    poll_fn(move |cx| {
        if let Poll::Ready(value) = a.as_mut().poll(cx) {
            return Poll::Ready(Either::Left(value));
        }
        if let Poll::Ready(value) = b.as_mut().poll(cx) {
            return Poll::Ready(Either::Right(value));
        }
        Poll::Pending
    })
    .await
}

/// Wait for any bit in `mask` to be signalled on `channel`, or for
/// `timeout_ms` to elapse first.
///
/// Returns `None` on timeout, matching `chEvtWaitAnyTimeout`'s `0` return
/// (the original firmware then checks `evt == 0` to detect the timeout
/// branch).
pub async fn wait_any_timeout<D: DelayNs>(
    channel: &EventChannel,
    timer: &mut D,
    mask: u32,
    timeout_ms: u32,
) -> Option<u32> {
    match select(channel.wait_any(mask), timer.delay_ms(timeout_ms)).await {
        Either::Left(bits) => Some(bits),
        Either::Right(()) => None,
    }
}
