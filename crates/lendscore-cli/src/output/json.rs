use std::io;

use lendscore_engine::contracts::envelope::failure_from_error;
use lendscore_engine::{EngineError, SuccessEnvelope};
use serde::Serialize;

/// JSON mode prints the whole envelope so callers can branch on `ok`.
pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    serialize_json_pretty(success)
}

pub fn render_error_json(error: &EngineError) -> io::Result<String> {
    serialize_json_pretty(&failure_from_error(error))
}

fn serialize_json_pretty<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
