use crate::fetcher::FetchReceipt;
use std::fmt;

/// Lifecycle of one camera's session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Just discovered, nothing fetched yet
    New,
    /// At least one item fetched in the current round
    Active,
    /// A finish event was raised; the completion command is due
    Finishing,
    /// The completion command ran (or none is configured)
    Done,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::New => "new",
            SessionState::Active => "active",
            SessionState::Finishing => "finishing",
            SessionState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why a session finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// A pass over the listing found nothing new
    Idle,
    /// Browsing the content directory failed
    EnumerationFailed,
    /// The loop was interrupted while servicing the camera
    Interrupted,
}

/// Raised once per round when a session finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishEvent {
    pub camera: String,
    pub fetched: u32,
    pub total: Option<u32>,
    pub reason: FinishReason,
}

/// What the session knows about a listed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// Never attempted in this run
    Unseen,
    /// A previous fetch failed; retry it, but it is not new
    Failed,
    /// Already stored locally; only the remote delete is outstanding
    Persisted(FetchReceipt),
}
