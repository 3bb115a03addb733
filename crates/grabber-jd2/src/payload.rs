//! Response payload parsing
//!
//! JD2 wraps results under `data` on some versions and not on others. Only the
//! documented shapes are recognised; anything else yields no job id / no records.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddLinksQuery<'a> {
    #[serde(rename = "assignJobID")]
    pub assign_job_id: bool,
    pub autostart: bool,
    pub links: &'a str,
    pub package_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_folder: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryLinksQuery<'a> {
    #[serde(rename = "jobUUID")]
    pub job_uuid: bool,
    #[serde(rename = "jobUUIDs")]
    pub job_uuids: &'a [&'a str],
    pub status: bool,
    pub max_results: u32,
    pub start_at: u32,
}

#[derive(Debug, Default, Deserialize)]
struct JobIdFields {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "jobID")]
    job_id: Option<Value>,
}

impl JobIdFields {
    fn into_job_id(self) -> Option<String> {
        [self.id, self.job_id].into_iter().flatten().find_map(job_id_text)
    }
}

#[derive(Debug, Deserialize)]
struct SubmitEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(flatten)]
    ids: JobIdFields,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryEnvelope {
    Bare(Vec<Value>),
    Wrapped { data: Vec<Value> },
    Unrecognized(IgnoredAny),
}

fn job_id_text(value: Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Decode a response body, treating anything that is not JSON (or is `null`) as `{}`.
pub(crate) fn decode_body(body: &str, operation: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => Value::Object(Map::new()),
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(operation, error = %err, "Unable to decode JD2 response JSON");
            Value::Object(Map::new())
        }
    }
}

/// `data.id`, `data.jobID`, then top-level `id`, `jobID` when `data` is not an object.
pub(crate) fn extract_job_id(payload: &Value) -> Option<String> {
    if !payload.is_object() {
        return None;
    }

    let envelope = SubmitEnvelope::deserialize(payload).ok()?;
    let ids = match envelope.data {
        Some(data @ Value::Object(_)) => JobIdFields::deserialize(data).ok()?,
        _ => envelope.ids,
    };

    ids.into_job_id()
}

/// Records from `payload.data`, or the payload itself when it is an array.
pub(crate) fn extract_records(payload: Value) -> Vec<Value> {
    match QueryEnvelope::deserialize(payload) {
        Ok(QueryEnvelope::Bare(records)) | Ok(QueryEnvelope::Wrapped { data: records }) => records,
        Ok(QueryEnvelope::Unrecognized(_)) | Err(_) => Vec::new(),
    }
}
