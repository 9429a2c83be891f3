//! Core types: inbound events, text formatting, and the Responder trait.

use crate::error::Result;
use crate::menu::Keyboard;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Inbound command event from the transport layer (`/start`, `/help`, ...).
/// `command` carries no leading slash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEvent {
    pub command: String,
    pub user_id: i64,
    pub username: Option<String>,
}

/// Inbound button-click event: `data` is the opaque callback identifier
/// the clicked button was built with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackEvent {
    pub data: String,
    pub user_id: i64,
    pub username: Option<String>,
}

/// Outbound text formatting. Transports without formatting support fall
/// back to plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFormat {
    Plain,
    Markdown,
    Html,
}

/// The single outbound capability injected into handlers. Implementations
/// map to a transport (e.g. Telegram); tests record calls.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Sends a plain text message to the given user.
    async fn send_text(&self, user_id: i64, text: &str) -> Result<()>;

    /// Sends a text message with an attached interactive keyboard.
    async fn send_menu(&self, user_id: i64, text: &str, keyboard: &Keyboard) -> Result<()>;

    /// Sends a formatted message. Default falls back to plain text.
    async fn send_formatted(&self, user_id: i64, text: &str, _format: TextFormat) -> Result<()> {
        self.send_text(user_id, text).await
    }
}
