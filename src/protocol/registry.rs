//! Runtime registry of vendor commands.
//!
//! Commands are defined as `(name, method, path template)`. Templates use
//! `:name` placeholders; `:sessionId` is filled from the session and every
//! other placeholder from a string (or number) parameter of the same name.
//!
//! ```ignore
//! registry.define(CommandDefinition::new(
//!     "getNetworkConnection",
//!     Method::Get,
//!     "/session/:sessionId/network_connection",
//! ));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use urlencoding::encode;

use crate::error::{Error, Result};
use crate::identifiers::SessionId;

use super::Method;

// ============================================================================
// Constants
// ============================================================================

/// Matches `:name` placeholders in a path template.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("valid placeholder pattern"));

/// Placeholder filled from the session, matched case-insensitively.
const SESSION_PLACEHOLDER: &str = "sessionid";

// ============================================================================
// CommandDefinition
// ============================================================================

/// A named command with its HTTP route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    /// Command name used with [`Command::Custom`](super::Command::Custom).
    pub name: String,
    /// HTTP method.
    pub method: Method,
    /// Absolute path template, e.g. `/session/:sessionId/network_connection`.
    pub path: String,
}

impl CommandDefinition {
    /// Creates a command definition.
    #[inline]
    pub fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
        }
    }
}

// ============================================================================
// ResolvedCommand
// ============================================================================

/// A custom command bound to a session, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommand {
    /// HTTP method.
    pub method: Method,
    /// Absolute path with placeholders filled in.
    pub path: String,
    /// Parameters that did not fill a placeholder.
    pub body: Option<Value>,
}

// ============================================================================
// CommandRegistry
// ============================================================================

/// Name-indexed set of custom command definitions.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: FxHashMap<String, CommandDefinition>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or redefines) a command.
    pub fn define(&mut self, definition: CommandDefinition) {
        self.commands.insert(definition.name.clone(), definition);
    }

    /// Looks up a command by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    /// Returns `true` if a command with this name is defined.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Returns all definitions.
    pub fn definitions(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.values()
    }

    /// Resolves a named command against a session.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownCommand`] if the name was never defined
    /// - [`Error::InvalidArgument`] if a placeholder has no matching parameter
    pub fn resolve(
        &self,
        name: &str,
        session_id: &SessionId,
        params: &Value,
    ) -> Result<ResolvedCommand> {
        let definition = self
            .get(name)
            .ok_or_else(|| Error::unknown_command(name))?;

        let mut remaining = match params {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(Error::invalid_argument(format!(
                    "parameters of {name} must be an object, got {other}"
                )));
            }
        };

        let path = expand_path(&definition.path, session_id, &mut remaining)
            .map_err(|placeholder| {
                Error::invalid_argument(format!("missing parameter :{placeholder} for {name}"))
            })?;

        let body = match definition.method {
            Method::Get | Method::Delete if remaining.is_empty() => None,
            _ => Some(Value::Object(remaining)),
        };

        Ok(ResolvedCommand {
            method: definition.method,
            path,
            body,
        })
    }
}

/// Fills placeholders, consuming the parameters used.
///
/// Returns the first unfillable placeholder name on failure.
fn expand_path(
    template: &str,
    session_id: &SessionId,
    params: &mut Map<String, Value>,
) -> std::result::Result<String, String> {
    let mut missing = None;

    let expanded = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let key = &caps[1];
        if key.eq_ignore_ascii_case(SESSION_PLACEHOLDER) {
            return encode(session_id.as_str()).into_owned();
        }

        match params.remove(key) {
            Some(Value::String(s)) => encode(&s).into_owned(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(key) => Err(key),
        None => Ok(expanded.into_owned()),
    }
}

// ============================================================================
// Tests
// ============================================================================
