//! Request body and response envelope of the code operation endpoints.
//!
//! Responses look like `{"statusCode": 200, "body": "{\"completion_string\": \"...\"}"}`;
//! `body` may also arrive as an already-decoded object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FailureCause;
use crate::models::usage::FeatureKind;

#[derive(Debug, Serialize)]
pub struct OperationRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub code_snippet: &'a str,
    pub code_language: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    status_code: Option<u16>,
    body: Option<Value>,
}

/// Payload field carrying the result of each operation.
pub fn payload_field(feature: FeatureKind) -> &'static str {
    match feature {
        FeatureKind::CodeCompletion => "completion_string",
        FeatureKind::RefactorCode => "refactored_code",
        FeatureKind::DocString => "doc_string",
    }
}

/// Pull the operation's result out of a raw response body.
pub fn extract_payload(raw: &[u8], feature: FeatureKind) -> Result<String, FailureCause> {
    let envelope: Envelope = serde_json::from_slice(raw)
        .map_err(|e| FailureCause::Malformed(format!("envelope: {e}")))?;

    if let Some(code) = envelope.status_code
        && !(200..300).contains(&code)
    {
        return Err(FailureCause::Status(code));
    }

    let body = envelope
        .body
        .ok_or_else(|| FailureCause::Malformed("envelope has no body".to_string()))?;
    let payload = match body {
        Value::String(s) => serde_json::from_str::<Value>(&s)
            .map_err(|e| FailureCause::Malformed(format!("body: {e}")))?,
        other => other,
    };

    let field = payload_field(feature);
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FailureCause::Malformed(format!("body has no string field `{field}`")))
}
