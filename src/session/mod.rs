//! Per-camera session tracking.
//!
//! A session moves `New -> Active -> Finishing -> Done`. `Finishing` is
//! reached once per round and is what triggers the completion command;
//! `Done` sessions go back to `Active` when the camera lists new media.

mod state;
mod tracker;
#[cfg(test)]
mod tests;

pub use state::{FinishEvent, FinishReason, ItemStatus, SessionState};
pub use tracker::{Presence, Session, SessionTracker};
