//! Recording adapters that capture interactions to cassettes.

pub mod filesystem;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

pub use filesystem::RecordingFileSystem;

/// Record an interaction with a simple (non-Result) return value.
///
/// Mirror of the replaying adapters: records input/output instead of reading.
pub(crate) fn record_interaction<I, O>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let (Ok(input_json), Ok(output_json)) =
        (serde_json::to_value(input), serde_json::to_value(output))
    else {
        tracing::warn!(port, method, "dropping unserializable interaction");
        return;
    };
    push(recorder, port, method, input_json, output_json);
}

/// Record a `Result<T, E>` interaction using the ok/err JSON convention.
///
/// Convention:
/// - `Ok(v)` is serialized as `{"ok": v}`
/// - `Err(e)` is serialized as `{"err": e.to_string()}`
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let Ok(input_json) = serde_json::to_value(input) else {
        tracing::warn!(port, method, "dropping unserializable interaction");
        return;
    };

    let output_json = match result {
        Ok(v) => match serde_json::to_value(v) {
            Ok(inner) => serde_json::json!({ "ok": inner }),
            Err(e) => serde_json::json!({ "err": format!("unserializable output: {e}") }),
        },
        Err(e) => serde_json::json!({ "err": e.to_string() }),
    };

    push(recorder, port, method, input_json, output_json);
}

fn push(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: serde_json::Value,
    output: serde_json::Value,
) {
    match recorder.lock() {
        Ok(mut guard) => guard.record(port, method, input, output),
        Err(_) => tracing::warn!(port, method, "recorder lock poisoned; interaction lost"),
    }
}
