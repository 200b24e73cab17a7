//! Project-state notebook kept in `<root>/.brain.yml`.
//!
//! The notebook records the current step and its definition of done, pending
//! next steps, recently used commands (most recent first) and troubleshooting
//! notes (newest first). It is stored in the same structured-text format as
//! the snapshot. Keys this module does not manage are preserved.

use crate::codec::{decode, encode};
use crate::error::BeaconError;
use crate::runtime::now_utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const BRAIN_FILE: &str = ".brain.yml";
pub const DEFAULT_MAX_RECENT: usize = 10;

/// One invocation's worth of changes.
#[derive(Debug, Clone)]
pub struct BrainUpdate {
    pub step: Option<String>,
    pub definition_of_done: Vec<String>,
    pub next_steps: Vec<String>,
    pub commands: Vec<String>,
    /// `issue|cause|fix1;fix2;...`
    pub trouble: Option<String>,
    pub max_recent: usize,
}

impl Default for BrainUpdate {
    fn default() -> Self {
        Self {
            step: None,
            definition_of_done: Vec::new(),
            next_steps: Vec::new(),
            commands: Vec::new(),
            trouble: None,
            max_recent: DEFAULT_MAX_RECENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TroubleEntry {
    pub date_utc: String,
    pub issue: String,
    pub cause: String,
    pub fix: Vec<String>,
}

impl TroubleEntry {
    /// Parses `issue|cause|fix1;fix2`. Missing parts are empty, blank fixes
    /// are dropped and anything after a third `|` is ignored.
    pub fn parse(text: &str, date_utc: impl Into<String>) -> Self {
        let mut parts = text.split('|').map(str::trim);
        let issue = parts.next().unwrap_or_default().to_string();
        let cause = parts.next().unwrap_or_default().to_string();
        let fix = parts
            .next()
            .map(|fixes| {
                fixes
                    .split(';')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            date_utc: date_utc.into(),
            issue,
            cause,
            fix,
        }
    }
}

/// Returns the value under `key`, replacing a missing or null one with
/// `default`.
fn ensure<'a>(doc: &'a mut Map<String, Value>, key: &str, default: Value) -> &'a mut Value {
    let slot = doc.entry(key).or_insert(Value::Null);
    if slot.is_null() {
        *slot = default;
    }
    slot
}

fn ensure_mapping<'a>(
    doc: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Map<String, Value>, BeaconError> {
    ensure(doc, key, Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| BeaconError::InvalidDocument(format!("`{}` must be a mapping", key)))
}

fn ensure_sequence<'a>(
    doc: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Vec<Value>, BeaconError> {
    ensure(doc, key, Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| BeaconError::InvalidDocument(format!("`{}` must be a sequence", key)))
}

fn push_unique(items: &mut Vec<Value>, item: &str) {
    if !items.iter().any(|v| v.as_str() == Some(item)) {
        items.push(Value::String(item.to_string()));
    }
}

/// Applies `update` to a loaded notebook. `now` stamps troubleshooting
/// entries.
///
/// # Errors
///
/// Returns [`BeaconError::InvalidDocument`] when a managed key holds the
/// wrong kind of node.
pub fn apply(
    doc: &mut Map<String, Value>,
    update: &BrainUpdate,
    now: &str,
) -> Result<(), BeaconError> {
    ensure_mapping(doc, "current_step")?;
    ensure_sequence(doc, "commands_recent")?;
    ensure_sequence(doc, "troubleshooting")?;

    if let Some(step) = update.step.as_deref().filter(|s| !s.is_empty()) {
        ensure_mapping(doc, "current_step")?.insert("name".into(), Value::String(step.into()));
    }
    if !update.definition_of_done.is_empty() {
        let step = ensure_mapping(doc, "current_step")?;
        let done = ensure_sequence(step, "definition_of_done")?;
        for item in &update.definition_of_done {
            push_unique(done, item);
        }
    }
    if !update.next_steps.is_empty() {
        let next = ensure_sequence(doc, "next_steps")?;
        for item in &update.next_steps {
            push_unique(next, item);
        }
    }
    if !update.commands.is_empty() {
        let recent = ensure_sequence(doc, "commands_recent")?;
        for command in update.commands.iter().filter(|c| !c.trim().is_empty()) {
            if let Some(pos) = recent.iter().position(|v| v.as_str() == Some(command.as_str())) {
                recent.remove(pos);
            }
            recent.insert(0, Value::String(command.clone()));
        }
        recent.truncate(update.max_recent);
    }
    if let Some(trouble) = update.trouble.as_deref().filter(|t| !t.is_empty()) {
        let entry = serde_json::to_value(TroubleEntry::parse(trouble, now))?;
        ensure_sequence(doc, "troubleshooting")?.insert(0, entry);
    }
    Ok(())
}

/// Reads the notebook at `path`. A missing, blank or null document is an
/// empty mapping.
pub fn load(path: &Path) -> Result<Map<String, Value>, BeaconError> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let text = fs::read_to_string(path).map_err(|e| BeaconError::io(path, e))?;
    let blank = text
        .lines()
        .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'));
    if blank {
        return Ok(Map::new());
    }
    match decode(&text)? {
        Value::Object(doc) => Ok(doc),
        Value::Null => Ok(Map::new()),
        _ => Err(BeaconError::InvalidDocument(format!(
            "{} must hold a mapping",
            path.display()
        ))),
    }
}

/// Loads, updates and rewrites the notebook at `path`.
pub fn update_file(path: &Path, update: &BrainUpdate) -> Result<(), BeaconError> {
    let mut doc = load(path)?;
    apply(&mut doc, update, &now_utc())?;
    fs::write(path, encode(&Value::Object(doc))).map_err(|e| BeaconError::io(path, e))?;
    tracing::info!("updated {}", path.display());
    Ok(())
}
