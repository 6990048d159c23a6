// crates/shard-scaler-core/src/runtime/sinks.rs
// ============================================================================
// Module: Scaling Event Sinks
// Description: JSON-line sinks for scaling events and a run-scoped logger.
// Purpose: Route structured events to stderr, a file, memory, or nowhere.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! Sinks serialize each [`ScalingEvent`] as one JSON line. Write failures are
//! swallowed; logging never changes the outcome of a run. [`EventLog`] binds
//! a sink to an optional run id so call sites only name the step and message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::events::EventLevel;
use crate::core::events::ScalingEvent;
use crate::core::events::ScalingStep;
use crate::core::identifiers::RunId;
use crate::interfaces::ScalingEventSink;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Event sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl ScalingEventSink for StderrEventSink {
    fn record(&self, event: &ScalingEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Event sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ScalingEventSink for FileEventSink {
    fn record(&self, event: &ScalingEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op event sink.
pub struct NoopEventSink;

impl ScalingEventSink for NoopEventSink {
    fn record(&self, _event: &ScalingEvent) {}
}

/// Event sink that keeps events in memory for inspection.
#[derive(Debug, Default, Clone)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Arc<Mutex<Vec<ScalingEvent>>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ScalingEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns the recorded events for one step.
    #[must_use]
    pub fn events_for(&self, step: ScalingStep) -> Vec<ScalingEvent> {
        self.events().into_iter().filter(|event| event.step == step).collect()
    }
}

impl ScalingEventSink for MemoryEventSink {
    fn record(&self, event: &ScalingEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Event Log
// ============================================================================

/// Sink handle bound to an optional run id.
#[derive(Clone)]
pub struct EventLog {
    /// Destination sink.
    sink: Arc<dyn ScalingEventSink>,
    /// Run the events belong to.
    run_id: Option<RunId>,
}

impl EventLog {
    /// Creates a log that is not bound to a run.
    #[must_use]
    pub fn new(sink: Arc<dyn ScalingEventSink>) -> Self {
        Self {
            sink,
            run_id: None,
        }
    }

    /// Creates a log that discards every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopEventSink))
    }

    /// Returns a copy bound to a run id.
    #[must_use]
    pub fn for_run(&self, run_id: RunId) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            run_id: Some(run_id),
        }
    }

    /// Records an informational event.
    pub fn info(&self, step: ScalingStep, message: impl Into<String>) {
        self.emit(EventLevel::Info, step, message);
    }

    /// Records a warning event.
    pub fn warn(&self, step: ScalingStep, message: impl Into<String>) {
        self.emit(EventLevel::Warn, step, message);
    }

    /// Records an error event.
    pub fn error(&self, step: ScalingStep, message: impl Into<String>) {
        self.emit(EventLevel::Error, step, message);
    }

    /// Builds and records an event.
    fn emit(&self, level: EventLevel, step: ScalingStep, message: impl Into<String>) {
        self.sink.record(&ScalingEvent::new(self.run_id.clone(), level, step, message));
    }
}
