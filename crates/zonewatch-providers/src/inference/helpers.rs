//! Common helpers for inference providers
//!
//! Models asked for JSON do not always return clean JSON. The parser here
//! accepts fenced blocks, JSON embedded in prose, and plain bullet lists.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::value_objects::{CapturedFrame, InferenceOutput};

/// Constructor normalization shared by HTTP providers
pub mod constructor {
    /// Trim a base URL and drop trailing slashes, falling back to `default_url`
    pub fn effective_url(provided_url: Option<&str>, default_url: &str) -> String {
        provided_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(default_url)
            .trim_end_matches('/')
            .to_string()
    }

    /// Model name with fallback
    pub fn effective_model(provided: Option<&str>, default_model: &str) -> String {
        provided
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(default_model)
            .to_string()
    }
}

/// Base64 encoding of the frame bytes
pub fn encode_frame(frame: &CapturedFrame) -> String {
    STANDARD.encode(&frame.data)
}

/// `data:` URL for the frame
pub fn frame_data_url(frame: &CapturedFrame) -> String {
    format!("data:{};base64,{}", frame.mime_type, encode_frame(frame))
}

#[derive(Deserialize)]
struct RawOutput {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    tasks: Vec<serde_json::Value>,
}

/// Parse model text into an [`InferenceOutput`]
pub fn parse_model_output(provider_id: &str, text: &str) -> Result<InferenceOutput> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::provider(provider_id, "empty model response"));
    }

    if let Some(raw) = extract_json_object(text).and_then(|s| serde_json::from_str::<RawOutput>(s).ok()) {
        let tasks = raw
            .tasks
            .into_iter()
            .filter_map(|t| match t {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Object(map) => map
                    .get("task")
                    .or_else(|| map.get("summary"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                _ => None,
            })
            .collect();
        return Ok(InferenceOutput {
            summary: raw.summary.trim().to_string(),
            tasks: normalize_tasks(tasks),
        });
    }

    Ok(parse_plain_text(text))
}

/// Slice between the first `{` and the last `}`
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_plain_text(text: &str) -> InferenceOutput {
    let mut summary = String::new();
    let mut tasks = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("```") {
            continue;
        }
        if let Some(task) = strip_bullet(line) {
            tasks.push(task.to_string());
        } else if summary.is_empty() {
            summary = line.to_string();
        }
    }

    InferenceOutput {
        summary,
        tasks: normalize_tasks(tasks),
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest.trim());
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(rest.trim());
        }
    }
    None
}

/// Trim, drop empties and drop case-insensitive duplicates, keeping order
fn normalize_tasks(tasks: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tasks
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}
