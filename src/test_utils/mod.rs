//! Testing utilities and mock implementations, adapted from the teacher's
//! own `test_utils` (`MockMdioBus`/`MockDelay`): host-side doubles for the
//! PHY, the Device Policy Manager, and the timer, plus a tiny single-future
//! executor for driving `tasks::*`'s async functions from `#[test]`.
//!
//! Only available when running `cargo test`.

#![cfg(test)]
#![allow(missing_docs)]

extern crate std;

pub mod dpm;
pub mod phy;
pub mod timer;

use core::future::Future;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

fn noop_raw_waker() -> RawWaker {
    fn clone(_: *const ()) -> RawWaker {
        noop_raw_waker()
    }
    fn no_op(_: *const ()) {}
    static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
    RawWaker::new(core::ptr::null(), &VTABLE)
}

/// Drive `future` to completion by polling it in a tight loop with a no-op
/// waker.
///
/// None of the futures under test here ever return `Pending` without a
/// scripted double being the reason (an empty [`phy::ScriptedPhy`] queue, an
/// un-elapsed [`timer::MockTimer`]); there is no real I/O to wait on, so a
/// spin loop is sufficient and keeps this executor dependency-free.
pub fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = core::pin::pin!(future);
    // SAFETY: the vtable's functions are all no-ops over a null pointer.
    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    loop {
        if let Poll::Ready(value) = future.as_mut().poll(&mut cx) {
            return value;
        }
    }
}
