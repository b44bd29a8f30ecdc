//! Timetable generation run: progress events and the client-side state
//! machine that consumes them.
//!
//! A run moves `Idle -> Connecting -> Receiving -> {Succeeded | Failed}`.
//! [`GenerationRun::apply`] is the single transition function: it consumes
//! one [`GenerationEvent`] and updates the run. It performs no I/O, so the
//! whole lifecycle can be exercised by feeding it synthetic events. The
//! connection driver that feeds it live events lives in the client crate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Level};

// ---------------------------------------------------------------------------
// Status tags sent by the generation service
// ---------------------------------------------------------------------------

/// Generation accepted; sent once before any level event.
pub const STATUS_STARTED: &str = "started";
/// A level is about to be scheduled.
pub const STATUS_STARTING: &str = "starting";
pub const STATUS_LOADING: &str = "loading";
pub const STATUS_BUILDING: &str = "building";
pub const STATUS_CONSTRAINTS: &str = "constraints";
pub const STATUS_SOLVING: &str = "solving";
pub const STATUS_EXTRACTING: &str = "extracting";
/// All levels done, slots are being saved.
pub const STATUS_FINALIZING: &str = "finalizing";
/// A level (or, with level 0, the whole run) finished.
pub const STATUS_COMPLETED: &str = "completed";
/// A level could not be scheduled. A terminal `error` event follows.
pub const STATUS_FAILED: &str = "failed";
/// Terminal: the timetable was generated and saved.
pub const STATUS_SUCCESS: &str = "success";
/// Terminal: the run failed.
pub const STATUS_ERROR: &str = "error";

// ---------------------------------------------------------------------------
// Levels and messages
// ---------------------------------------------------------------------------

/// Academic levels in the order the service schedules them.
pub const GENERATION_LEVELS: [Level; 4] = [5, 4, 3, 2];

/// Level events below this value describe the run as a whole
/// (e.g. `finalizing`) rather than an academic level.
pub const FIRST_ACADEMIC_LEVEL: Level = 1;

/// Used when an `error` event arrives without a usable message.
pub const DEFAULT_ERROR_MESSAGE: &str = "Timetable generation failed";
/// The connection to the generation endpoint could not be opened.
pub const CONNECTION_ERROR_MESSAGE: &str = "Could not connect to the generation service";
/// The connection dropped before a terminal event arrived.
pub const CONNECTION_LOST_MESSAGE: &str =
    "Connection to the generation service was lost before generation finished";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Progress report for one academic level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: Level,
    /// Phase tag, e.g. [`STATUS_SOLVING`] or [`STATUS_COMPLETED`].
    pub status: String,
    /// Overall run percentage, 0-100.
    pub percentage: f64,
    pub message: String,
}

impl LevelProgress {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    /// Whether this event describes an academic level rather than the whole run.
    pub fn is_academic_level(&self) -> bool {
        self.level >= FIRST_ACADEMIC_LEVEL
    }
}

/// One inbound message of a generation run, already interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// Progress for a level. Replaces the current snapshot when the level is
    /// an academic level.
    Level(LevelProgress),
    /// Non-terminal message without a level (e.g. `started`).
    Notice {
        status: String,
        message: Option<String>,
    },
    /// Terminal success.
    Success { message: Option<String> },
    /// Terminal failure reported by the service.
    Error { message: Option<String> },
}

impl GenerationEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationEvent::Success { .. } | GenerationEvent::Error { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Lifecycle state of a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    /// No run in progress.
    #[default]
    Idle,
    /// `start` was called; no message received yet.
    Connecting,
    /// At least one non-terminal message received.
    Receiving,
    Succeeded,
    Failed,
}

impl GenerationStatus {
    /// A connection is (or is about to be) open for this run.
    pub fn is_active(self) -> bool {
        matches!(self, GenerationStatus::Connecting | GenerationStatus::Receiving)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GenerationStatus::Succeeded | GenerationStatus::Failed)
    }
}

/// What [`GenerationRun::apply`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The current level snapshot was replaced.
    Progress,
    /// A level-less message was acknowledged.
    Notice,
    /// The run entered [`GenerationStatus::Succeeded`].
    Succeeded,
    /// The run entered [`GenerationStatus::Failed`].
    Failed,
    /// The run is not active; the event had no effect.
    Ignored,
}

/// Immutable view of a run, published to observers after every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationSnapshot {
    pub status: GenerationStatus,
    pub timetable_id: Option<DbId>,
    /// Latest level event. Superseded events are not retained.
    pub current: Option<LevelProgress>,
    /// Level Completion Set: levels reported `completed` during this run.
    pub completed_levels: BTreeMap<Level, bool>,
    /// Terminal error message when `status` is `Failed`.
    pub error: Option<String>,
    /// Message attached to the success event, if any.
    pub success_message: Option<String>,
}

impl GenerationSnapshot {
    pub fn is_level_completed(&self, level: Level) -> bool {
        self.completed_levels.get(&level).copied().unwrap_or(false)
    }
}

/// Per-connection generation state.
///
/// Owned by exactly one connection driver; no locking is involved.
#[derive(Debug, Default)]
pub struct GenerationRun {
    status: GenerationStatus,
    timetable_id: Option<DbId>,
    current: Option<LevelProgress>,
    completed_levels: BTreeMap<Level, bool>,
    error: Option<String>,
    success_message: Option<String>,
}

impl GenerationRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh run already in `Connecting` for `timetable_id`.
    pub fn for_timetable(timetable_id: DbId) -> Self {
        Self {
            status: GenerationStatus::Connecting,
            timetable_id: Some(timetable_id),
            ..Self::default()
        }
    }

    /// Begin a run for `timetable_id`, discarding anything left from a
    /// previous run.
    ///
    /// Fails with [`CoreError::Conflict`] while another run is active.
    pub fn start(&mut self, timetable_id: DbId) -> Result<(), CoreError> {
        if self.status.is_active() {
            return Err(CoreError::Conflict(format!(
                "Generation for timetable {} is already in progress",
                self.timetable_id.unwrap_or_default()
            )));
        }
        self.reset();
        self.timetable_id = Some(timetable_id);
        self.status = GenerationStatus::Connecting;
        Ok(())
    }

    /// Apply one inbound event. Events are applied strictly in arrival order.
    pub fn apply(&mut self, event: GenerationEvent) -> Applied {
        if !self.status.is_active() {
            return Applied::Ignored;
        }

        match event {
            // Whole-run phases (`finalizing`, level 0 `completed`) are not level progress.
            GenerationEvent::Level(progress) if !progress.is_academic_level() => {
                self.status = GenerationStatus::Receiving;
                Applied::Notice
            }
            GenerationEvent::Level(progress) => {
                self.status = GenerationStatus::Receiving;
                if progress.is_completed() {
                    // Only ever set to true: a completed level never reverts.
                    self.completed_levels.insert(progress.level, true);
                }
                self.current = Some(progress);
                Applied::Progress
            }
            GenerationEvent::Notice { .. } => {
                self.status = GenerationStatus::Receiving;
                Applied::Notice
            }
            GenerationEvent::Success { message } => {
                self.status = GenerationStatus::Succeeded;
                self.success_message = message;
                Applied::Succeeded
            }
            GenerationEvent::Error { message } => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
                self.fail(message);
                Applied::Failed
            }
        }
    }

    /// The connection could not be established.
    pub fn connection_failed(&mut self) -> Applied {
        self.transport_failure(CONNECTION_ERROR_MESSAGE)
    }

    /// The connection dropped before a terminal event.
    pub fn connection_lost(&mut self) -> Applied {
        self.transport_failure(CONNECTION_LOST_MESSAGE)
    }

    /// The consumer abandoned the run.
    ///
    /// An active run is discarded and the machine returns to `Idle`. A
    /// finished run keeps its outcome.
    pub fn cancel(&mut self) {
        if self.status.is_active() {
            self.reset();
        }
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn timetable_id(&self) -> Option<DbId> {
        self.timetable_id
    }

    pub fn current(&self) -> Option<&LevelProgress> {
        self.current.as_ref()
    }

    pub fn completed_levels(&self) -> &BTreeMap<Level, bool> {
        &self.completed_levels
    }

    pub fn is_level_completed(&self, level: Level) -> bool {
        self.completed_levels.get(&level).copied().unwrap_or(false)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn snapshot(&self) -> GenerationSnapshot {
        GenerationSnapshot {
            status: self.status,
            timetable_id: self.timetable_id,
            current: self.current.clone(),
            completed_levels: self.completed_levels.clone(),
            error: self.error.clone(),
            success_message: self.success_message.clone(),
        }
    }

    // ---- private helpers ----

    fn transport_failure(&mut self, message: &str) -> Applied {
        if !self.status.is_active() {
            return Applied::Ignored;
        }
        self.fail(message.to_string());
        Applied::Failed
    }

    fn fail(&mut self, message: String) {
        self.status = GenerationStatus::Failed;
        self.error = Some(message);
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
