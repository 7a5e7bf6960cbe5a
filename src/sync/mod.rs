//! The discovery/enumerate/fetch/delete/notify loop.

mod engine;

pub use engine::{SyncEngine, SyncSettings};
