//! Pipeline telemetry events and sinks.
//!
//! The orchestrator records one event per stage outcome. Sinks are
//! synchronous and infallible so that telemetry can never fail a run.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A stage finished successfully.
    StageCompleted {
        /// Stage name, e.g. `export`.
        stage: String,
    },
    /// A lenient stage failed and the run continued.
    StageTolerated {
        /// Stage name.
        stage: String,
        /// Failure message.
        message: String,
    },
    /// A stage was not run.
    StageSkipped {
        /// Stage name.
        stage: String,
        /// Why it was skipped.
        reason: String,
    },
}

impl TelemetryEvent {
    /// Name of the stage the event describes.
    #[must_use]
    pub fn stage(&self) -> &str {
        match self {
            Self::StageCompleted { stage }
            | Self::StageTolerated { stage, .. }
            | Self::StageSkipped { stage, .. } => stage,
        }
    }
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// Stdout is left untouched so the binary's own output stays parseable.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// In-memory sink for asserting on recorded events.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::{Mutex, PoisonError};

    use super::{TelemetryEvent, TelemetrySink};

    /// Sink keeping every event in arrival order.
    #[derive(Debug, Default)]
    pub struct RecordingTelemetrySink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingTelemetrySink {
        /// Creates an empty sink.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Events recorded so far.
        #[must_use]
        pub fn events(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Names of stages that completed, in order.
        #[must_use]
        pub fn completed_stages(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    TelemetryEvent::StageCompleted { stage } => Some(stage),
                    _ => None,
                })
                .collect()
        }
    }

    impl TelemetrySink for RecordingTelemetrySink {
        fn record(&self, event: TelemetryEvent) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event);
        }
    }
}
