//! # menubot-core
//!
//! Core types and state for the menu bot: inbound events, the [`Responder`]
//! send capability, the [`Menu`] model, the [`SessionStore`], the
//! [`SharedContext`], error taxonomy, and tracing initialization.
//! Transport-agnostic; used by menu-registry and bot-runtime.

pub mod context;
pub mod error;
pub mod logger;
pub mod menu;
pub mod session;
pub mod types;

pub use context::SharedContext;
pub use error::{HandlerError, MenubotError, Result};
pub use logger::init_tracing;
pub use menu::{ButtonSpec, Keyboard, Menu, MenuButton};
pub use session::{SessionStore, UserSession};
pub use types::{CallbackEvent, CommandEvent, Responder, TextFormat};
