use serde::{Deserialize, Serialize};
use std::fmt;

/// A turn as stored by a conversation memory provider.
///
/// `role` is free-form here; providers use labels such as `human`/`ai`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTurn {
    pub role: String,
    pub content: String,
}

impl MemoryTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Normalized speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Map a provider role label onto a normalized role.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "user" | "human" => Some(Self::User),
            "assistant" | "ai" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized conversation turn fed to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Normalize stored turns and keep the most recent `limit`.
    ///
    /// Turns with an unknown role or blank content are dropped before the
    /// limit is applied.
    pub fn normalize(turns: Vec<MemoryTurn>, limit: usize) -> Vec<ChatTurn> {
        let mut normalized: Vec<ChatTurn> = turns
            .into_iter()
            .filter_map(|turn| {
                let role = Role::from_label(&turn.role)?;
                let content = turn.content.trim();
                if content.is_empty() {
                    return None;
                }
                Some(ChatTurn::new(role, content))
            })
            .collect();

        if normalized.len() > limit {
            normalized.drain(..normalized.len() - limit);
        }
        normalized
    }
}
