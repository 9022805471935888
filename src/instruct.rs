//! Natural-language bulk-edit interpretation.
//!
//! The free-text-to-intent step is an opaque external collaborator behind
//! [`InstructionParser`]; everything around it is deterministic and runs
//! without the model: filter/update keys resolve through the edit-pathway
//! alias table, values run through the same normalizers as CSV import,
//! deletes are refused outright, and a zero-match filter short-circuits
//! before any write.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    fields::CanonicalField,
    header_map::resolve_field,
    normalize::normalize_field_value,
    store::{FieldAssignment, Predicate, RequestStore},
    vocab::Vocabulary,
};

/// Best-effort structured intent returned by the language model.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedInstruction {
    pub action: String,
    #[serde(default)]
    pub filters: BTreeMap<String, JsonValue>,
    #[serde(default)]
    pub updates: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Clone)]
pub struct InstructionContext {
    pub table: String,
    pub total_count: usize,
}

/// The opaque model collaborator. `Ok(None)` means the model could not
/// produce a usable parse; errors are reserved for infrastructure failures
/// (the parser process itself failing to run).
pub trait InstructionParser {
    fn parse(
        &self,
        instruction: &str,
        context: &InstructionContext,
    ) -> Result<Option<ParsedInstruction>>;
}

/// Runs a user-configured external command, feeding the prompt on stdin and
/// reading the model's JSON reply from stdout.
pub struct CommandParser {
    program: String,
    args: Vec<String>,
}

impl CommandParser {
    /// Splits a command line on whitespace; shell quoting is not interpreted.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("Parser command is empty"))?;
        Ok(CommandParser {
            program,
            args: parts.collect(),
        })
    }
}

impl InstructionParser for CommandParser {
    fn parse(
        &self,
        instruction: &str,
        context: &InstructionContext,
    ) -> Result<Option<ParsedInstruction>> {
        let prompt = build_prompt(instruction, context);
        debug!("Invoking parser command '{}'", self.program);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("Spawning parser command '{}'", self.program))?;
        child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("Parser command stdin unavailable"))?
            .write_all(prompt.as_bytes())
            .context("Writing prompt to parser command")?;
        let output = child
            .wait_with_output()
            .context("Waiting for parser command")?;
        if !output.status.success() {
            return Err(anyhow!(
                "Parser command exited with status {}",
                output.status
            ));
        }
        let reply = String::from_utf8_lossy(&output.stdout);
        Ok(decode_reply(&reply))
    }
}

/// Reads a pre-parsed instruction from a JSON file: the offline/test pathway.
pub struct PreparsedFile(pub PathBuf);

impl InstructionParser for PreparsedFile {
    fn parse(
        &self,
        _instruction: &str,
        _context: &InstructionContext,
    ) -> Result<Option<ParsedInstruction>> {
        let text = fs::read_to_string(&self.0)
            .with_context(|| format!("Reading parsed instruction from {:?}", self.0))?;
        serde_json::from_str(&text)
            .map(Some)
            .with_context(|| format!("Parsing instruction JSON in {:?}", self.0))
    }
}

fn build_prompt(instruction: &str, context: &InstructionContext) -> String {
    let fields = CanonicalField::ALL.iter().map(|f| f.name()).join(", ");
    format!(
        "You translate a bulk-edit instruction for the '{}' table ({} record(s)) \
         into JSON: {{\"action\":\"update\"|\"delete\",\"filters\":{{...}},\"updates\":{{...}}}}.\n\
         Field names: {}.\n\
         Reply with the JSON object only.\n\
         Instruction: {}\n",
        context.table, context.total_count, fields, instruction
    )
}

fn decode_reply(reply: &str) -> Option<ParsedInstruction> {
    let json = extract_json(reply)?;
    serde_json::from_str(json).ok()
}

/// Finds the first balanced JSON object in free text, tolerating prose
/// around it.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Result shape reported back to the caller, in the wire format the
/// surrounding product expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_confirmation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl EditOutcome {
    fn failed(error: impl Into<String>, suggestion: impl Into<String>) -> Self {
        EditOutcome {
            success: false,
            action: None,
            affected_count: None,
            description: None,
            filters: None,
            updates: None,
            error: Some(error.into()),
            requires_confirmation: None,
            message: None,
            suggestion: Some(suggestion.into()),
        }
    }

    fn refused_delete() -> Self {
        EditOutcome {
            success: false,
            action: Some("delete".to_string()),
            affected_count: None,
            description: None,
            filters: None,
            updates: None,
            error: None,
            requires_confirmation: Some(true),
            message: Some(
                "Deletes are never applied from free-text instructions; remove records through \
                 the review pathway instead"
                    .to_string(),
            ),
            suggestion: None,
        }
    }

    fn no_match(filters: BTreeMap<String, String>) -> Self {
        EditOutcome {
            success: false,
            action: Some("update".to_string()),
            affected_count: None,
            description: None,
            filters: Some(filters),
            updates: None,
            error: None,
            requires_confirmation: None,
            message: Some("No records match the requested filters".to_string()),
            suggestion: Some("Check the filter values or broaden the instruction".to_string()),
        }
    }

    fn applied(
        affected: usize,
        description: String,
        filters: BTreeMap<String, String>,
        updates: BTreeMap<String, String>,
    ) -> Self {
        EditOutcome {
            success: true,
            action: Some("update".to_string()),
            affected_count: Some(affected),
            description: Some(description),
            filters: Some(filters),
            updates: Some(updates),
            error: None,
            requires_confirmation: None,
            message: None,
            suggestion: None,
        }
    }
}

fn scalar_to_raw(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn render_predicate(predicate: &Predicate) -> (String, String) {
    match predicate {
        Predicate::Eq { field, value } => (field.name().to_string(), value.display()),
        Predicate::In { field, values } => (
            field.name().to_string(),
            values.iter().map(|v| v.display()).join(" | "),
        ),
        Predicate::Lt { field, value } => {
            (field.name().to_string(), format!("< {}", value.display()))
        }
        Predicate::NotNull { field } => (field.name().to_string(), "not null".to_string()),
    }
}

enum ResolveError {
    UnknownField(String),
    UnsupportedValue(String),
}

fn resolve_filters(
    vocab: &Vocabulary,
    raw_filters: &BTreeMap<String, JsonValue>,
) -> Result<Vec<Predicate>, ResolveError> {
    let mut predicates = Vec::new();
    for (key, value) in raw_filters {
        let field = resolve_field(vocab, key).ok_or_else(|| ResolveError::UnknownField(key.clone()))?;
        let predicate = match value {
            JsonValue::Array(items) => {
                let mut values = Vec::new();
                for item in items {
                    let raw = scalar_to_raw(item)
                        .ok_or_else(|| ResolveError::UnsupportedValue(key.clone()))?;
                    values.push(normalize_field_value(vocab, field, &raw));
                }
                Predicate::In { field, values }
            }
            JsonValue::Object(map) => {
                if let Some(bound) = map.get("lt").and_then(scalar_to_raw) {
                    Predicate::Lt {
                        field,
                        value: normalize_field_value(vocab, field, &bound),
                    }
                } else if map.get("notNull").and_then(JsonValue::as_bool) == Some(true) {
                    Predicate::NotNull { field }
                } else {
                    return Err(ResolveError::UnsupportedValue(key.clone()));
                }
            }
            other => {
                let raw =
                    scalar_to_raw(other).ok_or_else(|| ResolveError::UnsupportedValue(key.clone()))?;
                Predicate::Eq {
                    field,
                    value: normalize_field_value(vocab, field, &raw),
                }
            }
        };
        predicates.push(predicate);
    }
    Ok(predicates)
}

fn resolve_updates(
    vocab: &Vocabulary,
    raw_updates: &BTreeMap<String, JsonValue>,
) -> Result<Vec<FieldAssignment>, ResolveError> {
    let mut assignments = Vec::new();
    for (key, value) in raw_updates {
        let field = resolve_field(vocab, key).ok_or_else(|| ResolveError::UnknownField(key.clone()))?;
        let raw = scalar_to_raw(value).ok_or_else(|| ResolveError::UnsupportedValue(key.clone()))?;
        assignments.push(FieldAssignment {
            field,
            value: normalize_field_value(vocab, field, &raw),
        });
    }
    Ok(assignments)
}

/// Parses, validates, and (when safe) applies one bulk-edit instruction.
/// The returned outcome always reports the normalized filters and updates
/// actually applied, never the original free text.
pub fn apply_instruction(
    parser: &dyn InstructionParser,
    store: &mut dyn RequestStore,
    vocab: &Vocabulary,
    instruction: &str,
    context: &InstructionContext,
) -> Result<EditOutcome> {
    let Some(parsed) = parser.parse(instruction, context)? else {
        return Ok(EditOutcome::failed(
            "Could not understand the instruction",
            "Try rephrasing with explicit field names and values",
        ));
    };

    let action = parsed.action.trim().to_lowercase();
    if action == "delete" {
        info!("Refusing delete action parsed from instruction");
        return Ok(EditOutcome::refused_delete());
    }
    if action != "update" {
        return Ok(EditOutcome::failed(
            format!("Unsupported action '{action}'"),
            "Only bulk updates can be applied from instructions",
        ));
    }
    if parsed.updates.is_empty() {
        return Ok(EditOutcome::failed(
            "The instruction did not specify any field updates",
            "Name at least one field and the value it should take",
        ));
    }

    let predicates = match resolve_filters(vocab, &parsed.filters) {
        Ok(predicates) => predicates,
        Err(err) => return Ok(resolve_failure(err, "filter")),
    };
    let assignments = match resolve_updates(vocab, &parsed.updates) {
        Ok(assignments) => assignments,
        Err(err) => return Ok(resolve_failure(err, "update")),
    };

    let filters_audit: BTreeMap<String, String> =
        predicates.iter().map(render_predicate).collect();
    let updates_audit: BTreeMap<String, String> = assignments
        .iter()
        .map(|a| (a.field.name().to_string(), a.value.display()))
        .collect();

    let matched = store.count(&predicates)?;
    if matched == 0 {
        return Ok(EditOutcome::no_match(filters_audit));
    }

    let affected = store.update_where(&predicates, &assignments)?;
    let scope = if filters_audit.is_empty() {
        "across all records".to_string()
    } else {
        format!(
            "where {}",
            filters_audit
                .iter()
                .map(|(name, value)| format!("{name} = {value}"))
                .join(", ")
        )
    };
    let description = format!("Updated {affected} record(s) {scope}");
    info!("{description}");
    Ok(EditOutcome::applied(
        affected,
        description,
        filters_audit,
        updates_audit,
    ))
}

fn resolve_failure(err: ResolveError, role: &str) -> EditOutcome {
    match err {
        ResolveError::UnknownField(key) => EditOutcome::failed(
            format!("Unrecognized {role} field '{key}'"),
            "Use the canonical field names reported by `labdesk export`",
        ),
        ResolveError::UnsupportedValue(key) => EditOutcome::failed(
            format!("Unsupported {role} value for '{key}'"),
            "Use a plain value, a list of values, or {\"lt\": ...}",
        ),
    }
}
