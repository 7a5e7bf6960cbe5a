use super::{FinishEvent, FinishReason, ItemStatus, SessionState};
use crate::camera::CameraId;
use crate::fetcher::FetchReceipt;
use crate::media::LogicalMediaItem;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

/// Per-camera progress for one continuous attachment
#[derive(Debug, Clone)]
pub struct Session {
    pub id: CameraId,
    pub session_id: Uuid,
    pub state: SessionState,
    /// Logical items fetched in the current round
    pub fetched: u32,
    /// `TotalMatches` seen when the current round started
    pub total: Option<u32>,
    /// The camera answered the latest discovery pass
    pub present: bool,
    /// A previous round of this run reached `Done`
    pub synced_before: bool,
    pub started_at: DateTime<Utc>,
    /// Remote object ids stored locally whose delete is still outstanding
    persisted: HashMap<String, FetchReceipt>,
    /// Remote object ids whose last fetch failed
    failed: HashSet<String>,
}

impl Session {
    fn new(id: CameraId) -> Self {
        Self {
            id,
            session_id: Uuid::new_v4(),
            state: SessionState::New,
            fetched: 0,
            total: None,
            present: true,
            synced_before: false,
            started_at: Utc::now(),
            persisted: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    fn transition(&mut self, to: SessionState) {
        if self.state != to {
            debug!("Session {} for {}: {} -> {}", self.session_id, self.id, self.state, to);
            self.state = to;
        }
    }

    fn finish_event(&self, reason: FinishReason) -> FinishEvent {
        FinishEvent {
            camera: self.id.friendly_name.clone(),
            fetched: self.fetched,
            total: self.total,
            reason,
        }
    }
}

/// Changes in camera presence between two discovery passes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Presence {
    pub appeared: Vec<CameraId>,
    pub lost: Vec<CameraId>,
}

/// Owns every camera session of the run
#[derive(Default)]
pub struct SessionTracker {
    sessions: Mutex<HashMap<CameraId, Session>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark which cameras answered discovery.
    ///
    /// A camera that disappears mid-round keeps its session and resumes it
    /// when it comes back. One that disappears after finishing starts over
    /// as `New`, remembering that it was already synced.
    pub fn reconcile(&self, discovered: &[CameraId]) -> Presence {
        let mut sessions = self.sessions.lock();
        let mut presence = Presence::default();
        let current: HashSet<&CameraId> = discovered.iter().collect();

        for session in sessions.values_mut() {
            if session.present && !current.contains(&session.id) {
                session.present = false;
                if session.state == SessionState::Done {
                    session.transition(SessionState::New);
                    session.synced_before = true;
                }
                presence.lost.push(session.id.clone());
            }
        }

        for id in discovered {
            match sessions.get_mut(id) {
                Some(session) if session.present => {}
                Some(session) => {
                    session.present = true;
                    presence.appeared.push(id.clone());
                }
                None => {
                    sessions.insert(id.clone(), Session::new(id.clone()));
                    presence.appeared.push(id.clone());
                }
            }
        }

        presence
    }

    /// Prepare for a pass over the camera's listing
    pub fn begin_pass(&self, id: &CameraId) {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(id.clone()));
        if session.state != SessionState::Active {
            session.total = None;
        }
    }

    /// Record `TotalMatches` of the listing; frozen once a round is active
    pub fn record_total(&self, id: &CameraId, total: u32) {
        if let Some(session) = self.sessions.lock().get_mut(id) {
            if session.state != SessionState::Active && session.total.is_none() {
                session.total = Some(total);
            }
        }
    }

    /// Items are tracked per remote object, so a constituent left behind by
    /// a partial delete is still recognised when it is listed on its own.
    pub fn classify(&self, id: &CameraId, item: &LogicalMediaItem) -> ItemStatus {
        let sessions = self.sessions.lock();
        let Some(session) = sessions.get(id) else {
            return ItemStatus::Unseen;
        };

        let mut receipts = item
            .object_ids()
            .map(|object_id| session.persisted.get(object_id));
        if let Some(Some(first)) = receipts.next() {
            if receipts.all(|receipt| receipt.is_some()) {
                return ItemStatus::Persisted(first.clone());
            }
        }

        if item.object_ids().any(|object_id| session.failed.contains(object_id)) {
            ItemStatus::Failed
        } else {
            ItemStatus::Unseen
        }
    }

    /// Count a newly stored item toward the round, activating the session.
    /// An item with a constituent already stored is not counted again.
    pub fn record_fetched(&self, id: &CameraId, item: &LogicalMediaItem, receipt: FetchReceipt) {
        let mut sessions = self.sessions.lock();
        let Some(session) = sessions.get_mut(id) else {
            return;
        };

        let stored_before = item
            .object_ids()
            .any(|object_id| session.persisted.contains_key(object_id));
        for object_id in item.object_ids() {
            session.failed.remove(object_id);
            session.persisted.insert(object_id.to_string(), receipt.clone());
        }
        if stored_before {
            return;
        }

        match session.state {
            SessionState::New | SessionState::Done => {
                if session.state == SessionState::Done {
                    info!("New media on {}, starting another round", session.id);
                }
                session.fetched = 0;
                session.started_at = Utc::now();
                session.transition(SessionState::Active);
            }
            SessionState::Active | SessionState::Finishing => {}
        }
        session.fetched += 1;
    }

    pub fn record_failed(&self, id: &CameraId, item: &LogicalMediaItem) {
        if let Some(session) = self.sessions.lock().get_mut(id) {
            session
                .failed
                .extend(item.object_ids().map(str::to_string));
        }
    }

    /// Forget objects the camera no longer holds. Their ids may be reused
    /// for new shots.
    pub fn record_deleted(&self, id: &CameraId, object_ids: &[String]) {
        if let Some(session) = self.sessions.lock().get_mut(id) {
            for object_id in object_ids {
                session.persisted.remove(object_id);
            }
        }
    }

    /// Objects stored locally that are still waiting to be deleted
    pub fn pending_deletes(&self, id: &CameraId) -> usize {
        self.sessions
            .lock()
            .get(id)
            .map_or(0, |session| session.persisted.len())
    }

    /// Close a service pass. Returns the finish event when this pass ends a
    /// round; an already finished session never raises a second one.
    pub fn end_pass(&self, id: &CameraId, reason: FinishReason) -> Option<FinishEvent> {
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(id)?;

        match session.state {
            SessionState::New if session.synced_before => {
                session.transition(SessionState::Done);
                None
            }
            SessionState::New | SessionState::Active => {
                let elapsed = Utc::now().signed_duration_since(session.started_at);
                info!(
                    "Round on {} finished after {}s ({} fetched, {:?})",
                    session.id,
                    elapsed.num_seconds(),
                    session.fetched,
                    reason
                );
                session.transition(SessionState::Finishing);
                Some(session.finish_event(reason))
            }
            SessionState::Finishing | SessionState::Done => None,
        }
    }

    /// The completion command for the finished round has run
    pub fn mark_done(&self, id: &CameraId) {
        if let Some(session) = self.sessions.lock().get_mut(id) {
            if session.state == SessionState::Finishing {
                session.transition(SessionState::Done);
                session.synced_before = true;
            }
        }
    }

    pub fn get(&self, id: &CameraId) -> Option<Session> {
        self.sessions.lock().get(id).cloned()
    }

    pub fn state(&self, id: &CameraId) -> Option<SessionState> {
        self.sessions.lock().get(id).map(|session| session.state)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
