//! Assistant kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which chat experience a conversation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantKind {
    /// Contextual chat grounded on a lecture summary.
    Chat,
    /// Homework solver chat, optionally with an image attachment.
    Solver,
}

impl AssistantKind {
    /// Identifier used in storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantKind::Chat => "chat",
            AssistantKind::Solver => "solver",
        }
    }

    /// Human-readable label, used for default conversation titles.
    pub fn label(&self) -> &'static str {
        match self {
            AssistantKind::Chat => "Chat",
            AssistantKind::Solver => "Solver",
        }
    }

    /// Whether the remote endpoint for this kind accepts image attachments.
    pub fn accepts_images(&self) -> bool {
        matches!(self, AssistantKind::Solver)
    }
}

impl fmt::Display for AssistantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(AssistantKind::Chat),
            "solver" => Ok(AssistantKind::Solver),
            other => Err(format!("unknown assistant kind: {}", other)),
        }
    }
}
