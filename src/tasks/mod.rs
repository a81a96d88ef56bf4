//! The five cooperative tasks that make up one USB-PD sink port, and the
//! channels wiring them together.
//!
//! Grounded on the ChibiOS thread functions in `lib/src/*.c`: each submodule
//! here is one thread, translated into an `async fn` that runs forever,
//! taking `&SharedPort`/`&Channels`/the caller's [`crate::phy::PhyDriver`]
//! and [`crate::dpm::DevicePolicyManager`] instead of reaching into module
//! statics. Wiring five tasks together for one port is left to the caller's
//! executor — this crate has no opinion on whether that's
//! `embassy-executor`, a blocking RTOS thread per task, or a hand-rolled
//! `select!` loop; [`channels::Channels`] and [`crate::sync::SharedPort`] are
//! `Send + Sync` and work under any of them.

pub mod channels;
pub mod events;
pub mod hard_reset;
pub mod int_n;
pub mod policy_engine;
pub mod protocol_rx;
pub mod protocol_tx;

pub use channels::Channels;
