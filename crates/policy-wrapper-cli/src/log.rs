// crates/policy-wrapper-cli/src/log.rs
// ============================================================================
// Module: Event Log Sink
// Description: JSON-lines telemetry sink for wrapper engine events.
// Purpose: Emit one structured record per engine event on a writer.
// Dependencies: policy-wrapper-core, serde, serde_json
// ============================================================================

//! ## Overview
//! [`JsonLogTelemetry`] serializes each [`WrapEvent`] as a single JSON line,
//! tagged with a per-run sequence number. Write failures are swallowed so a
//! broken log stream never fails a transform.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use policy_wrapper_core::WrapEvent;
use policy_wrapper_core::WrapTelemetry;
use serde::Serialize;

// ============================================================================
// SECTION: Records
// ============================================================================

/// One log line.
#[derive(Serialize)]
struct LogRecord<'a> {
    /// Emitting component.
    source: &'static str,
    /// Position of the event within the run.
    seq: u64,
    /// Event payload, flattened into the record.
    #[serde(flatten)]
    event: &'a WrapEvent,
}

/// Component label written on every record.
const LOG_SOURCE: &str = "policy-wrapper";

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Mutable sink state.
struct LogState<W> {
    /// Destination writer.
    writer: W,
    /// Next sequence number.
    seq: u64,
}

/// Telemetry sink that writes JSON lines.
pub struct JsonLogTelemetry<W: Write + Send> {
    /// Writer and counter behind one lock.
    state: Mutex<LogState<W>>,
}

impl<W: Write + Send> JsonLogTelemetry<W> {
    /// Creates a sink over `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(LogState {
                writer,
                seq: 0,
            }),
        }
    }

    /// Returns the underlying writer, if the lock is not poisoned.
    pub fn into_inner(self) -> Option<W> {
        self.state.into_inner().ok().map(|state| state.writer)
    }
}

impl<W: Write + Send> WrapTelemetry for JsonLogTelemetry<W> {
    fn record(&self, event: &WrapEvent) {
        if let Ok(mut state) = self.state.lock() {
            let record = LogRecord {
                source: LOG_SOURCE,
                seq: state.seq,
                event,
            };
            if let Ok(payload) = serde_json::to_string(&record) {
                let _ = writeln!(state.writer, "{payload}");
                let _ = state.writer.flush();
            }
            state.seq = state.seq.saturating_add(1);
        }
    }
}
