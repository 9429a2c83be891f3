//! # menu-registry
//!
//! Two registries route every inbound event to a handler: the
//! [`CommandRegistry`] for textual commands and the [`CallbackRegistry`]
//! for opaque button identifiers (exact match first, then compiled
//! patterns in registration order). Handlers receive the injected
//! dependency set [`Deps`]; "no handler" is a normal `None` outcome,
//! never an error, and handler errors propagate to the dispatch boundary
//! untouched.

use async_trait::async_trait;
use menubot_core::{
    CallbackEvent, CommandEvent, Menu, MenubotError, Responder, Result, SharedContext, UserSession,
};
use regex::Regex;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info};

/// Dependencies injected into every handler invocation: the outbound send
/// capability, the main menu, the acting user's session, and the shared
/// context. Cheap to clone (all `Arc`s).
#[derive(Clone)]
pub struct Deps {
    pub responder: Arc<dyn Responder>,
    pub menu: Arc<Menu>,
    pub session: Arc<UserSession>,
    pub shared: Arc<SharedContext>,
}

/// Result of a single-shot dispatch. `Reply` carries text the dispatch
/// boundary sends back to the user; `Done` means the handler already sent
/// whatever it wanted through the responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    Done,
    Reply(String),
}

/// A unit of business logic bound to one command name.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, event: &CommandEvent, deps: &Deps) -> Result<HandlerResponse>;
}

/// A unit of business logic bound to one callback identifier. `args`
/// holds the capture groups when the handler was registered by pattern,
/// and is empty for static registrations.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    async fn handle(
        &self,
        event: &CallbackEvent,
        args: &[String],
        deps: &Deps,
    ) -> Result<HandlerResponse>;
}

type BoxFuture = Pin<Box<dyn Future<Output = Result<HandlerResponse>> + Send>>;

struct FnCommandHandler {
    f: Box<dyn Fn(CommandEvent, Deps) -> BoxFuture + Send + Sync>,
}

#[async_trait]
impl CommandHandler for FnCommandHandler {
    async fn handle(&self, event: &CommandEvent, deps: &Deps) -> Result<HandlerResponse> {
        (self.f)(event.clone(), deps.clone()).await
    }
}

/// Lifts an async closure into a [`CommandHandler`], so handlers can be
/// registered as plain values without a named type.
pub fn command_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(CommandEvent, Deps) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
{
    Arc::new(FnCommandHandler {
        f: Box::new(move |event, deps| Box::pin(f(event, deps))),
    })
}

struct FnCallbackHandler {
    f: Box<dyn Fn(CallbackEvent, Vec<String>, Deps) -> BoxFuture + Send + Sync>,
}

#[async_trait]
impl CallbackHandler for FnCallbackHandler {
    async fn handle(
        &self,
        event: &CallbackEvent,
        args: &[String],
        deps: &Deps,
    ) -> Result<HandlerResponse> {
        (self.f)(event.clone(), args.to_vec(), deps.clone()).await
    }
}

/// Lifts an async closure into a [`CallbackHandler`].
pub fn callback_fn<F, Fut>(f: F) -> Arc<dyn CallbackHandler>
where
    F: Fn(CallbackEvent, Vec<String>, Deps) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
{
    Arc::new(FnCallbackHandler {
        f: Box::new(move |event, args, deps| Box::pin(f(event, args, deps))),
    })
}

/// One command declared by a [`CommandProvider`].
pub struct CommandSpec {
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            handler,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// Components declare their commands near the logic that implements them
/// and hand the list to [`CommandRegistry::register_provider`] at
/// construction time.
pub trait CommandProvider {
    fn commands(&self) -> Vec<CommandSpec>;
}

/// Components declare their callback handlers as `(identifier, handler)`
/// pairs for [`CallbackRegistry::register_provider`]. Static identifiers
/// only; patterns go through [`CallbackRegistry::register_pattern`].
pub trait CallbackProvider {
    fn callbacks(&self) -> Vec<(String, Arc<dyn CallbackHandler>)>;
}

struct CommandEntry {
    description: String,
    handler: Arc<dyn CommandHandler>,
}

/// Registry of textual commands. Names are case-sensitive, stored without
/// the leading slash; re-registering a name silently overwrites (last
/// write wins).
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or overwrites) a command. No name validation; callers
    /// are trusted startup code. Missing description falls back to
    /// `"Handle /{name} command"`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: Option<&str>,
        handler: Arc<dyn CommandHandler>,
    ) {
        let name = name.into();
        let description = description
            .map(str::to_string)
            .unwrap_or_else(|| format!("Handle /{} command", name));
        if self
            .commands
            .insert(name.clone(), CommandEntry {
                description,
                handler,
            })
            .is_some()
        {
            debug!(command = %name, "command re-registered, previous handler replaced");
        } else {
            info!(command = %name, "registered command");
        }
    }

    /// Registers every command a provider declares, aliases included.
    /// Returns the number of commands (aliases not counted).
    pub fn register_provider(&mut self, provider: &dyn CommandProvider) -> usize {
        let specs = provider.commands();
        let count = specs.len();
        for spec in specs {
            for alias in &spec.aliases {
                self.register(
                    alias.clone(),
                    Some(&format!("Alias for /{}", spec.name)),
                    spec.handler.clone(),
                );
            }
            self.register(spec.name, spec.description.as_deref(), spec.handler);
        }
        info!(count, "registered commands from provider");
        count
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(name).map(|entry| entry.handler.clone())
    }

    /// Resolves and invokes. `Ok(None)` is the normal "unknown command"
    /// outcome; a handler error propagates to the caller.
    pub async fn dispatch(
        &self,
        event: &CommandEvent,
        deps: &Deps,
    ) -> Result<Option<HandlerResponse>> {
        let Some(handler) = self.resolve(&event.command) else {
            debug!(user_id = event.user_id, command = %event.command, "no handler for command");
            return Ok(None);
        };
        info!(
            user_id = event.user_id,
            command = %event.command,
            "step: command handler invoked"
        );
        let response = handler.handle(event, deps).await?;
        Ok(Some(response))
    }

    /// Help text: header plus one `"/{name} - {description}"` line per
    /// command, sorted by name; a fixed sentinel when empty.
    pub fn generate_help_text(&self) -> String {
        if self.commands.is_empty() {
            return "No commands available.".to_string();
        }
        let mut names: Vec<&String> = self.commands.keys().collect();
        names.sort();
        let mut lines = vec!["Available commands:".to_string()];
        for name in names {
            lines.push(format!("/{} - {}", name, self.commands[name].description));
        }
        lines.join("\n")
    }

    /// `(name, description)` pairs sorted by name.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .commands
            .iter()
            .map(|(name, entry)| (name.clone(), entry.description.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Registry of callback identifiers: an exact-match table checked first,
/// then patterns in registration order (first full match wins).
#[derive(Default)]
pub struct CallbackRegistry {
    static_handlers: HashMap<String, Arc<dyn CallbackHandler>>,
    pattern_handlers: Vec<(String, Regex, Arc<dyn CallbackHandler>)>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an exact identifier. O(1) lookup; last
    /// write wins.
    pub fn register(&mut self, data: impl Into<String>, handler: Arc<dyn CallbackHandler>) {
        let data = data.into();
        info!(callback_data = %data, "registered callback");
        self.static_handlers.insert(data, handler);
    }

    /// Compiles `pattern` once and appends it to the ordered pattern list.
    /// The identifier must match the whole pattern at dispatch time, so
    /// the pattern is wrapped in `\A(?:...)\z`; capture group numbering is
    /// unaffected.
    pub fn register_pattern(
        &mut self,
        pattern: &str,
        handler: Arc<dyn CallbackHandler>,
    ) -> Result<()> {
        let regex = Regex::new(&format!(r"\A(?:{})\z", pattern))
            .map_err(|e| MenubotError::Pattern(format!("{}: {}", pattern, e)))?;
        info!(pattern = %pattern, "registered callback pattern");
        self.pattern_handlers
            .push((pattern.to_string(), regex, handler));
        Ok(())
    }

    /// Registers every `(identifier, handler)` pair a provider declares;
    /// returns the count.
    pub fn register_provider(&mut self, provider: &dyn CallbackProvider) -> usize {
        let pairs = provider.callbacks();
        let count = pairs.len();
        for (data, handler) in pairs {
            self.register(data, handler);
        }
        info!(count, "registered callbacks from provider");
        count
    }

    /// Resolves an identifier: static table first, then patterns in
    /// registration order. Returns the handler together with the captured
    /// groups (empty for a static hit); `None` when nothing matches.
    pub fn resolve(&self, data: &str) -> Option<(Arc<dyn CallbackHandler>, Vec<String>)> {
        if let Some(handler) = self.static_handlers.get(data) {
            return Some((handler.clone(), Vec::new()));
        }
        for (pattern, regex, handler) in &self.pattern_handlers {
            if let Some(captures) = regex.captures(data) {
                let args: Vec<String> = captures
                    .iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
                debug!(callback_data = %data, pattern = %pattern, "callback matched pattern");
                return Some((handler.clone(), args));
            }
        }
        None
    }

    /// Resolves and invokes. `Ok(None)` is the normal "unknown button"
    /// outcome; a handler error propagates to the caller.
    pub async fn dispatch(
        &self,
        event: &CallbackEvent,
        deps: &Deps,
    ) -> Result<Option<HandlerResponse>> {
        let Some((handler, args)) = self.resolve(&event.data) else {
            debug!(user_id = event.user_id, callback_data = %event.data, "no handler for callback");
            return Ok(None);
        };
        info!(
            user_id = event.user_id,
            callback_data = %event.data,
            args = args.len(),
            "step: callback handler invoked"
        );
        let response = handler.handle(event, &args, deps).await?;
        Ok(Some(response))
    }

    /// Identifiers in the static table, sorted.
    pub fn static_identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.static_handlers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.static_handlers.len() + self.pattern_handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Unit/integration tests live in tests/registry_test.rs
