//! Inline button payloads: `exist:<name>` and `remove:<name>`.

use std::{fmt, sync::OnceLock};

use regex::Regex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Exist,
    Remove,
}

impl Action {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Exist => "exist",
            Self::Remove => "remove",
        }
    }
}

/// Decoded button payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackPayload {
    pub action: Action,
    pub file: String,
}

fn payload_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(exist|remove):([0-9a-f]+\.[a-z0-9]+)$").expect("static regex is valid")
    })
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]+\.[a-z0-9]+$").expect("static regex is valid"))
}

/// Whether `name` has the shape of a generated stored-file name.
pub fn is_stored_name(name: &str) -> bool {
    name_re().is_match(name)
}

impl CallbackPayload {
    pub fn new(action: Action, file: impl Into<String>) -> Self {
        Self {
            action,
            file: file.into(),
        }
    }

    /// Parse and validate. Anything off-pattern is `None`.
    pub fn parse(data: &str) -> Option<Self> {
        let caps = payload_re().captures(data)?;
        let action = match &caps[1] {
            "exist" => Action::Exist,
            "remove" => Action::Remove,
            _ => return None,
        };
        Some(Self::new(action, &caps[2]))
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CallbackPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action.verb(), self.file)
    }
}
