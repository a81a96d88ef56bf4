//! A bounded, single-item-at-a-time mailbox: the async replacement for
//! ChibiOS's `chMBPost`/`chMBFetch`.
//!
//! The original firmware posts whole `union pd_msg *` pointers between
//! threads through fixed-size `mailbox_t`s; [`Mailbox`] carries
//! [`crate::message::MessageBuffer`]s (or any `Copy` payload) by value
//! through a `heapless::Deque`, guarded the same way as [`super::event`]'s
//! channel — a `CriticalSectionCell` for the queue plus one [`super::primitives::AtomicWaker`]
//! per side so posting from an ISR and awaiting from a task compose safely.

use core::future::poll_fn;
use core::task::Poll;

use heapless::Deque;

use super::primitives::{AtomicWaker, CriticalSectionCell};

/// A bounded FIFO mailbox holding up to `N` messages of type `T`.
pub struct Mailbox<T, const N: usize> {
    queue: CriticalSectionCell<Deque<T, N>>,
    not_empty: AtomicWaker,
    not_full: AtomicWaker,
}

impl<T, const N: usize> Mailbox<T, N> {
    /// An empty mailbox, suitable for `static` initialization.
    pub const fn new() -> Self {
        Self {
            queue: CriticalSectionCell::new(Deque::new()),
            not_empty: AtomicWaker::new(),
            not_full: AtomicWaker::new(),
        }
    }

    /// Post a message without blocking, returning it back if the mailbox is
    /// already full (callers decide whether that is an error or a reason to
    /// drop the oldest entry, mirroring `chMBPost`'s `TIME_IMMEDIATE` usage
    /// in the dispatcher, which never blocks).
    pub fn try_post(&self, item: T) -> Result<(), T> {
        let result = self.queue.with(|queue| queue.push_back(item));
        if result.is_ok() {
            self.not_empty.wake();
        }
        result
    }

    /// Fetch a message without blocking, or `None` if the mailbox is empty.
    pub fn try_fetch(&self) -> Option<T> {
        let item = self.queue.with(heapless::Deque::pop_front);
        if item.is_some() {
            self.not_full.wake();
        }
        item
    }

    /// Post a message, waiting for space if the mailbox is full.
    pub async fn post(&self, mut item: T) {
        loop {
            match self.try_post(item) {
                Ok(()) => return,
                Err(rejected) => {
                    item = rejected;
                    self.wait_for_space().await;
                }
            }
        }
    }

    /// Fetch the next message, waiting if the mailbox is empty.
    pub async fn fetch(&self) -> T {
        loop {
            if let Some(item) = self.try_fetch() {
                return item;
            }
            self.wait_for_message().await;
        }
    }

    async fn wait_for_message(&self) {
        poll_fn(|cx| {
            if self.queue.with(|q| !q.is_empty()) {
                Poll::Ready(())
            } else {
                self.not_empty.register(cx.waker());
                Poll::Pending
            }
        })
        .await;
    }

    async fn wait_for_space(&self) {
        poll_fn(|cx| {
            if self.queue.with(|q| q.len() < N) {
                Poll::Ready(())
            } else {
                self.not_full.register(cx.waker());
                Poll::Pending
            }
        })
        .await;
    }
}

impl<T, const N: usize> Default for Mailbox<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
