//! # bot-runtime
//!
//! Runtime assembly for the menu bot: the [`Dispatcher`] (session lookup,
//! registry dispatch, unknown/error reply conversion), the idle-session
//! eviction task, env-based [`RuntimeConfig`], and reply formatting.
//! The chat transport stays outside; it feeds events in and implements
//! [`menubot_core::Responder`].

pub mod config;
pub mod dispatch;
pub mod response;

pub use config::RuntimeConfig;
pub use dispatch::{spawn_idle_eviction, Dispatcher};
