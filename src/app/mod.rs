mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod types;


pub use orchestrator::CamdumpOrchestrator;
pub use types::{ComponentState, ShutdownReason};
