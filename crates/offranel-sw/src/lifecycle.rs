//! Worker version lifecycle.
//!
//! The browser owns the install → waiting → active sequencing; this module
//! models just enough of it to enforce the update guarantees: a version
//! whose install fails never replaces the running one, and activation
//! retires the previous version.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Unique identifier for a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionId(u64);

impl VersionId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Lifecycle state of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    /// Created, install not yet run.
    #[default]
    Parsed,
    /// Install event in progress.
    Installing,
    /// Installed, waiting behind the running version.
    Installed,
    /// Activate event in progress.
    Activating,
    /// Active and controlling pages.
    Activated,
    /// Replaced, or install failed.
    Redundant,
}

impl WorkerState {
    /// Whether this version may intercept fetches.
    pub fn is_active(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }
}

/// One version of the worker script.
#[derive(Debug, Clone)]
pub struct WorkerVersion {
    /// Unique id.
    pub id: VersionId,

    /// Current state.
    pub state: WorkerState,

    /// Time of the last state change.
    pub state_changed_at: Instant,
}

impl WorkerVersion {
    fn new() -> Self {
        Self {
            id: VersionId::new(),
            state: WorkerState::Parsed,
            state_changed_at: Instant::now(),
        }
    }

    fn set_state(&mut self, state: WorkerState) {
        self.state = state;
        self.state_changed_at = Instant::now();
    }
}

/// Tracks which version is installing, waiting, and active.
#[derive(Debug, Default)]
pub struct Registration {
    /// Version whose install event is running.
    pub installing: Option<WorkerVersion>,

    /// Version installed but not yet in control.
    pub waiting: Option<WorkerVersion>,

    /// Version currently in control.
    pub active: Option<WorkerVersion>,
}

impl Registration {
    /// Create an empty registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin installing a new version. Returns its id.
    pub fn start_install(&mut self) -> VersionId {
        let mut version = WorkerVersion::new();
        version.set_state(WorkerState::Installing);
        let id = version.id;
        self.installing = Some(version);
        id
    }

    /// Move the installing version to the waiting slot.
    pub fn install_complete(&mut self) -> Option<VersionId> {
        let mut version = self.installing.take()?;
        version.set_state(WorkerState::Installed);
        info!(version = version.id.raw(), "worker version installed");
        let id = version.id;
        self.waiting = Some(version);
        Some(id)
    }

    /// Discard the installing version; the running one stays in control.
    pub fn fail_install(&mut self) -> Option<VersionId> {
        let mut version = self.installing.take()?;
        version.set_state(WorkerState::Redundant);
        info!(version = version.id.raw(), "worker version install failed");
        Some(version.id)
    }

    /// Promote the waiting version, retiring the previously active one.
    pub fn activate(&mut self) -> Option<VersionId> {
        let mut version = self.waiting.take()?;
        version.set_state(WorkerState::Activating);

        if let Some(mut old) = self.active.take() {
            old.set_state(WorkerState::Redundant);
            info!(version = old.id.raw(), "worker version retired");
        }

        version.set_state(WorkerState::Activated);
        info!(version = version.id.raw(), "worker version activated");
        let id = version.id;
        self.active = Some(version);
        Some(id)
    }

    /// Id of the active version, if any.
    pub fn active_id(&self) -> Option<VersionId> {
        self.active.as_ref().map(|v| v.id)
    }

    /// Whether a version is in control.
    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }
}
