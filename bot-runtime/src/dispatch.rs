//! The dispatch boundary: routes inbound events through the registries,
//! owns the per-event session lookup, and converts every outcome into a
//! user-visible reply.
//!
//! Handler errors stop here: they are logged with the identifier and user
//! id, the user gets a generic failure reply, and the dispatch loop keeps
//! serving other users. "No handler" is never an error; it becomes an
//! unknown-command or unknown-button reply.

use std::sync::Arc;

use menu_registry::{CallbackRegistry, CommandRegistry, Deps, HandlerResponse};
use menubot_core::{CallbackEvent, CommandEvent, Menu, Responder, Result, SessionStore, SharedContext};
use tracing::{debug, error, info};

use crate::response;

pub struct Dispatcher {
    commands: CommandRegistry,
    callbacks: CallbackRegistry,
    sessions: Arc<SessionStore>,
    shared: Arc<SharedContext>,
    main_menu: Arc<Menu>,
    responder: Arc<dyn Responder>,
}

impl Dispatcher {
    /// Registries are built (and mutated) by the caller at startup, before
    /// concurrent dispatch begins; afterwards the dispatcher only reads
    /// them.
    pub fn new(
        commands: CommandRegistry,
        callbacks: CallbackRegistry,
        sessions: Arc<SessionStore>,
        shared: Arc<SharedContext>,
        main_menu: Arc<Menu>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            commands,
            callbacks,
            sessions,
            shared,
            main_menu,
            responder,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn shared(&self) -> &Arc<SharedContext> {
        &self.shared
    }

    pub fn help_text(&self) -> String {
        self.commands.generate_help_text()
    }

    async fn deps_for(&self, user_id: i64, username: Option<&str>) -> Deps {
        let session = self.sessions.get_or_create(user_id, username).await;
        Deps {
            responder: self.responder.clone(),
            menu: self.main_menu.clone(),
            session,
            shared: self.shared.clone(),
        }
    }

    /// Handles one inbound command event. Returns `Err` only for outbound
    /// send failures; handler errors are converted here.
    pub async fn handle_command(&self, event: CommandEvent) -> Result<()> {
        info!(
            user_id = event.user_id,
            command = %event.command,
            "step: inbound command"
        );
        let deps = self.deps_for(event.user_id, event.username.as_deref()).await;

        match self.commands.dispatch(&event, &deps).await {
            Ok(Some(HandlerResponse::Reply(text))) => {
                self.responder.send_text(event.user_id, &text).await
            }
            Ok(Some(HandlerResponse::Done)) => Ok(()),
            Ok(None) => {
                debug!(user_id = event.user_id, command = %event.command, "unknown command");
                let text = format!(
                    "{}\n\n{}",
                    response::unknown_command(&event.command),
                    self.commands.generate_help_text()
                );
                self.responder.send_text(event.user_id, &text).await
            }
            Err(e) => {
                error!(
                    user_id = event.user_id,
                    command = %event.command,
                    error = %e,
                    "command handler failed"
                );
                self.responder
                    .send_text(event.user_id, response::GENERIC_FAILURE)
                    .await
            }
        }
    }

    /// Handles one inbound button-click event. Same error boundary as
    /// [`Dispatcher::handle_command`].
    pub async fn handle_callback(&self, event: CallbackEvent) -> Result<()> {
        info!(
            user_id = event.user_id,
            callback_data = %event.data,
            "step: inbound callback"
        );
        let deps = self.deps_for(event.user_id, event.username.as_deref()).await;

        match self.callbacks.dispatch(&event, &deps).await {
            Ok(Some(HandlerResponse::Reply(text))) => {
                self.responder.send_text(event.user_id, &text).await
            }
            Ok(Some(HandlerResponse::Done)) => Ok(()),
            Ok(None) => {
                debug!(user_id = event.user_id, callback_data = %event.data, "unknown callback");
                self.responder
                    .send_text(event.user_id, response::UNKNOWN_BUTTON)
                    .await
            }
            Err(e) => {
                error!(
                    user_id = event.user_id,
                    callback_data = %event.data,
                    error = %e,
                    "callback handler failed"
                );
                self.responder
                    .send_text(event.user_id, response::GENERIC_FAILURE)
                    .await
            }
        }
    }
}

/// Spawns the periodic idle-session eviction task. Sessions idle for
/// longer than `max_idle` are dropped each time the interval fires.
pub fn spawn_idle_eviction(
    sessions: Arc<SessionStore>,
    every: std::time::Duration,
    max_idle: chrono::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick fires immediately; skip it so a fresh start
        // doesn't scan an empty table.
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = sessions.evict_idle(max_idle).await;
            debug!(removed, "idle eviction pass finished");
        }
    })
}
