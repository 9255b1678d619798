// File: src/config.rs
// Purpose: Form options (serde, documented defaults) and their compiled form

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::checker::DateMode;
use crate::error::{FormError, Result};
use crate::rule::RuleToken;

/// Options for one validation session
///
/// Field names are camelCase on the wire so the options object used by
/// existing markup can be passed through unchanged:
///
/// ```json
/// {
///   "fields": [
///     { "name": "email", "rule": { "type": "email", "prompt": "Enter a valid email" } },
///     { "name": "terms", "rule": { "type": "checked", "showSuccess": false } }
///   ],
///   "submitOnValid": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    #[serde(default)]
    pub fields: Vec<FieldConfig>,

    /// Submit the form once every field passes (default: true)
    #[serde(default = "default_true")]
    pub submit_on_valid: bool,

    /// Show the summary alert when the form is invalid (default: true)
    #[serde(default = "default_true")]
    pub show_error_message: bool,

    #[serde(default = "default_error_group_class")]
    pub error_group_class: String,

    #[serde(default = "default_success_group_class")]
    pub success_group_class: String,

    #[serde(default = "default_error_message_text")]
    pub error_message_text: String,

    /// How `date` rules combine their heuristics (default: lenient)
    #[serde(default)]
    pub date_mode: DateMode,
}

/// One configured field, before its rule is parsed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub rule: RuleConfig,
}

/// Raw rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    /// Rule type token, e.g. `required` or `minLength:3`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default = "default_true")]
    pub show_success: bool,
}

/// A compiled rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    pub token: RuleToken,
    pub prompt: Option<String>,
    pub show_success: bool,
}

/// A compiled field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub rule: RuleSpec,
}

// Default values
fn default_true() -> bool {
    true
}

fn default_error_group_class() -> String {
    "has-error".to_string()
}

fn default_success_group_class() -> String {
    "has-success".to_string()
}

fn default_error_message_text() -> String {
    "Please check the fields below.".to_string()
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            submit_on_valid: true,
            show_error_message: true,
            error_group_class: default_error_group_class(),
            success_group_class: default_success_group_class(),
            error_message_text: default_error_message_text(),
            date_mode: DateMode::default(),
        }
    }
}

impl RuleConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            prompt: None,
            show_success: true,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn without_success(mut self) -> Self {
        self.show_success = false;
        self
    }

    pub fn compile(&self) -> Result<RuleSpec> {
        Ok(RuleSpec {
            token: RuleToken::parse(&self.kind)?,
            prompt: self.prompt.clone(),
            show_success: self.show_success,
        })
    }
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, rule: RuleConfig) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

impl FormOptions {
    /// Options with default settings and the given fields
    pub fn with_fields(fields: Vec<FieldConfig>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Parse options from a JSON object
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FormError::config(e.to_string()))
    }

    /// Parse options from a JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(FormError::config("options have to be a JSON object"));
        }
        serde_json::from_value(value).map_err(|e| FormError::config(e.to_string()))
    }

    /// Parse options from TOML (`[[fields]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FormError::config(e.to_string()))
    }

    /// Load options from a `.json` or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read form options: {}", path.display()))?;

        let options = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => bail!("Unsupported form options format: {}", path.display()),
        };

        options.with_context(|| format!("Failed to parse form options: {}", path.display()))
    }

    /// Parse every rule and check field names
    ///
    /// Names must be non-empty and unique; the first broken rule aborts.
    pub fn compile(&self) -> Result<Vec<FieldSpec>> {
        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            if field.name.is_empty() {
                return Err(FormError::config("field name must not be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::config(format!(
                    "field `{}` is configured more than once",
                    field.name
                )));
            }
            specs.push(FieldSpec {
                name: field.name.clone(),
                rule: field.rule.compile()?,
            });
        }

        Ok(specs)
    }
}
