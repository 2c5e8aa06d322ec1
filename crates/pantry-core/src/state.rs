//! UI-agnostic session state types
//!
//! Everything here lives for one session only and is shared between the
//! terminal UI and the one-shot CLI commands.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// First message shown when a session starts.
pub const WELCOME_MESSAGE: &str =
    "Hi! What ingredients do you have? (e.g., chicken, rice, garlic, lemon)";

/// Reply shown whenever a recipe request fails, whatever the cause.
pub const OFFLINE_MESSAGE: &str =
    "Sorry, the chef is offline. Please check your connection or try again later.";

/// Reply shown when the input held nothing but commas and whitespace.
pub const EMPTY_INGREDIENTS_MESSAGE: &str =
    "I need at least one ingredient to cook with. Try something like: eggs, spinach, feta";

/// A chat message in the recipe conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(id: u64, role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            timestamp: Local::now(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "Chef",
        }
    }
}

/// Backend availability as last observed by a health check or request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No health check has completed yet
    #[default]
    Checking,
    Online,
    Offline,
}

impl ConnectionState {
    pub fn from_available(available: bool) -> Self {
        if available {
            ConnectionState::Online
        } else {
            ConnectionState::Offline
        }
    }

    /// Sending is only blocked once the backend is known to be down.
    pub fn can_send(&self) -> bool {
        !matches!(self, ConnectionState::Offline)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Checking => "checking",
            ConnectionState::Online => "online",
            ConnectionState::Offline => "offline",
        }
    }
}
