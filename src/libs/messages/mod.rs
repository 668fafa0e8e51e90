//! User-facing text and the macros that print it.
//!
//! All strings live in the [`Message`] enum (`types.rs`) and its `Display`
//! implementation (`display.rs`). Code never formats user-visible text
//! inline; it picks a variant and hands it to one of the `msg_*!` macros.

pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;
