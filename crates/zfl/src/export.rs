//! JSON export of stage outputs.
//!
//! Every stage output ([`RawDocument`](zfl_parser::RawDocument),
//! [`SemanticModel`](zfl_core::semantic::SemanticModel),
//! [`FlowGraph`](zfl_core::flow::FlowGraph) and
//! [`ViewModel`](crate::layout::ViewModel)) implements [`Serialize`].

use std::io::Write;

use log::debug;
use serde::Serialize;

use crate::error::ZflError;

/// Serialize `value` to a JSON string, indented when `pretty` is set.
///
/// # Errors
///
/// Returns [`ZflError::Serialize`] if serialization fails.
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, ZflError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    debug!(bytes = json.len(), pretty = pretty; "Serialized JSON");
    Ok(json)
}

/// Serialize `value` as JSON into `writer`, followed by a newline.
///
/// # Errors
///
/// Returns [`ZflError::Serialize`] or [`ZflError::Io`] on failure.
pub fn write_json<T, W>(value: &T, mut writer: W, pretty: bool) -> Result<(), ZflError>
where
    T: Serialize + ?Sized,
    W: Write,
{
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
