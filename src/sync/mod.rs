//! Synchronization and concurrency support for the sink stack's five
//! cooperative tasks.
//!
//! - **Primitives** (`primitives`): Low-level synchronization types
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!   - [`AtomicWaker`] - Async waker storage for interrupts
//!
//! - **Events** (`event`): the async analogue of ChibiOS `chEvtSignal`/
//!   `chEvtWaitAny` — [`EventChannel`], one per task, keyed by that task's
//!   own event bitmask.
//!
//! - **Mailboxes** (`mailbox`): the async analogue of `chMBPost`/
//!   `chMBFetch` — [`Mailbox`], used to hand [`crate::message::MessageBuffer`]s
//!   between tasks.
//!
//! - **Shared port** (`shared`): [`SharedPort`], an ISR-safe wrapper around
//!   [`crate::port::Port`] for code that must touch port state from both
//!   task and interrupt context.
//!
//! - **Select** (`select`): [`select`]/[`wait_any_timeout`], a hand-rolled
//!   race combinator standing in for `chEvtWaitAnyTimeout` since no
//!   `futures`/`embassy-futures` dependency is in the stack.
//!
//! # Example
//!
//! ```ignore
//! use usb_pd_sink::sync::{EventChannel, Mailbox};
//!
//! static PRL_RX_EVENTS: EventChannel = EventChannel::new();
//! static PE_INBOX: Mailbox<usb_pd_sink::message::MessageBuffer, 2> = Mailbox::new();
//! ```

pub mod event;
pub mod mailbox;
pub mod primitives;
pub mod select;
pub mod shared;

pub use event::EventChannel;
pub use mailbox::Mailbox;
pub use primitives::{AtomicWaker, CriticalSectionCell};
pub use select::{select, wait_any_timeout, Either};
pub use shared::SharedPort;
