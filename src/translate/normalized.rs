use crate::error::GatewayError;
use std::fmt::Write as _;

/// Speaker of one prompt turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    System,
}

impl Role {
    /// Maps a wire role, case-insensitively. Unknown roles are treated as user turns.
    pub fn from_wire(role: &str) -> Self {
        if role.eq_ignore_ascii_case("assistant") || role.eq_ignore_ascii_case("model") {
            Role::Model
        } else if role.eq_ignore_ascii_case("system") {
            Role::System
        } else {
            Role::User
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Model => "Model",
            Role::System => "System",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Shape-independent request. `max_tokens` and `temperature` are validated
/// but otherwise informational.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub model_tag: String,
    pub system_text: String,
    pub turns: Vec<Turn>,
    pub max_tokens: Option<i64>,
    pub temperature: Option<f64>,
}

impl NormalizedRequest {
    /// Flattens the request into the upstream prompt:
    /// `System: <system>\n\n` then `<Role>: <text>\n` per turn, right-trimmed.
    pub fn prompt(&self) -> String {
        let mut out = String::new();
        if !self.system_text.is_empty() {
            let _ = write!(out, "System: {}\n\n", self.system_text);
        }
        for turn in &self.turns {
            let _ = writeln!(out, "{}: {}", turn.role.label(), turn.text);
        }
        out.truncate(out.trim_end().len());
        out
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.turns.is_empty() {
            return Err(GatewayError::invalid("messages array cannot be empty"));
        }
        if self.turns.iter().all(|t| t.text.trim().is_empty()) {
            return Err(GatewayError::invalid("all messages have empty content"));
        }
        if self.max_tokens.is_some_and(|n| n < 0) {
            return Err(GatewayError::invalid("max_tokens must be non-negative"));
        }
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(GatewayError::invalid("temperature must be between 0 and 2"));
        }
        Ok(())
    }

    /// Validates and returns `self`.
    pub fn validated(self) -> Result<Self, GatewayError> {
        self.validate()?;
        Ok(self)
    }
}

/// Crude token estimate: one token per four characters, rounded down.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() / 4) as u64
}
