//! # Dispatch Registry
//!
//! Three independent tables keyed by [`MessageTypeKey`]:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Mediator                           │
//! │                                                            │
//! │  commands       TypeKey ──► one CommandHandler<C>          │
//! │  queries        TypeKey ──► one QueryHandler<Q, R>         │
//! │  notifications  TypeKey ──► [NotificationHandler<N>, ...]  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers are stored as `Arc<dyn Trait>` behind `dyn Any` and recovered
//! with a downcast at dispatch time. A failed downcast is reported as
//! [`MediatorError::HandlerTypeMismatch`], never a silent miscast.
//!
//! Registration takes `&mut self` and dispatch takes `&self`, so all
//! registration must be finished before the registry is shared for
//! concurrent dispatch.

use crate::error::{MediatorError, MediatorResult};
use crate::handler::{CommandHandler, NotificationHandler, QueryHandler};
use crate::key::{MessageKind, MessageTypeKey};
use crate::notify::{self, NotificationReceipt};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

type ErasedHandler = Box<dyn Any + Send + Sync>;

/// Routes messages to the handlers registered for their declared type.
#[derive(Default)]
pub struct Mediator {
    /// One handler per command type.
    commands: HashMap<MessageTypeKey, ErasedHandler>,

    /// One handler per query type, whatever its result type.
    queries: HashMap<MessageTypeKey, ErasedHandler>,

    /// Handlers per notification type, in registration order.
    notifications: HashMap<MessageTypeKey, Vec<ErasedHandler>>,
}

impl Mediator {
    /// Create a registry with three empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register the handler for command type `C`.
    ///
    /// Replaces any handler already registered for `C`.
    pub fn register_command_handler<C, H>(&mut self, handler: H)
    where
        C: 'static,
        H: CommandHandler<C>,
    {
        let key = MessageTypeKey::of::<C>();
        let handler: Arc<dyn CommandHandler<C>> = Arc::new(handler);
        if self.commands.insert(key, Box::new(handler)).is_some() {
            debug!(message_type = key.name(), "Replaced CommandHandler");
        }
    }

    /// Register the handler for query type `Q` answering with `R`.
    ///
    /// The table is keyed by `Q` alone: a later registration for `Q` replaces
    /// this one even if its result type differs.
    pub fn register_query_handler<Q, R, H>(&mut self, handler: H)
    where
        Q: 'static,
        R: 'static,
        H: QueryHandler<Q, R>,
    {
        let key = MessageTypeKey::of::<Q>();
        let handler: Arc<dyn QueryHandler<Q, R>> = Arc::new(handler);
        if self.queries.insert(key, Box::new(handler)).is_some() {
            debug!(message_type = key.name(), "Replaced QueryHandler");
        }
    }

    /// Append a handler for notification type `N`.
    pub fn register_notification_handler<N, H>(&mut self, handler: H)
    where
        N: 'static,
        H: NotificationHandler<N>,
    {
        let key = MessageTypeKey::of::<N>();
        let handler: Arc<dyn NotificationHandler<N>> = Arc::new(handler);
        self.notifications
            .entry(key)
            .or_default()
            .push(Box::new(handler));
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Run the handler for `C` on the calling thread.
    ///
    /// # Errors
    ///
    /// - [`MediatorError::NoHandlerRegistered`] if nothing is registered for `C`
    /// - [`MediatorError::HandlerTypeMismatch`] if the stored entry is not a
    ///   `CommandHandler<C>`
    /// - [`MediatorError::Handler`] carrying the handler's own error
    pub fn send_command<C: 'static>(&self, command: C) -> MediatorResult<()> {
        let handler = self.resolve_command::<C>()?;
        handler.handle(command).map_err(MediatorError::Handler)
    }

    /// Run the handler for `Q` on the calling thread and return its result.
    ///
    /// # Errors
    ///
    /// As [`Mediator::send_command`]; additionally a handler registered for
    /// `Q` with a result type other than `R` is a
    /// [`MediatorError::HandlerTypeMismatch`].
    pub fn send_query<Q: 'static, R: 'static>(&self, query: Q) -> MediatorResult<R> {
        let handler = self.resolve_query::<Q, R>()?;
        handler.handle(query).map_err(MediatorError::Handler)
    }

    /// Launch every handler for `N` concurrently and return immediately.
    ///
    /// With no handlers registered the notification is dropped and a
    /// diagnostic is logged. Nothing is reported back to the sender.
    pub fn send_notification<N>(&self, notification: N)
    where
        N: Clone + Send + 'static,
    {
        let _ = self.send_notification_tracked(notification);
    }

    /// As [`Mediator::send_notification`], returning a receipt that can be
    /// waited on until every launched handler has finished.
    pub fn send_notification_tracked<N>(&self, notification: N) -> NotificationReceipt
    where
        N: Clone + Send + 'static,
    {
        match self.resolve_notification::<N>() {
            Some(handlers) => notify::fan_out(MessageTypeKey::of::<N>(), handlers, notification),
            None => NotificationReceipt::empty(),
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// True if a handler is registered for command type `C`.
    #[must_use]
    pub fn has_command_handler<C: 'static>(&self) -> bool {
        self.commands.contains_key(&MessageTypeKey::of::<C>())
    }

    /// True if a handler is registered for query type `Q`.
    #[must_use]
    pub fn has_query_handler<Q: 'static>(&self) -> bool {
        self.queries.contains_key(&MessageTypeKey::of::<Q>())
    }

    /// Number of handlers registered for notification type `N`.
    #[must_use]
    pub fn notification_handler_count<N: 'static>(&self) -> usize {
        self.notifications
            .get(&MessageTypeKey::of::<N>())
            .map_or(0, Vec::len)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub(crate) fn resolve_command<C: 'static>(&self) -> MediatorResult<Arc<dyn CommandHandler<C>>> {
        let key = MessageTypeKey::of::<C>();
        let entry = self
            .commands
            .get(&key)
            .ok_or_else(|| MediatorError::no_handler(MessageKind::Command, key))?;

        entry
            .downcast_ref::<Arc<dyn CommandHandler<C>>>()
            .cloned()
            .ok_or_else(|| MediatorError::type_mismatch(MessageKind::Command, key))
    }

    pub(crate) fn resolve_query<Q: 'static, R: 'static>(
        &self,
    ) -> MediatorResult<Arc<dyn QueryHandler<Q, R>>> {
        let key = MessageTypeKey::of::<Q>();
        let entry = self
            .queries
            .get(&key)
            .ok_or_else(|| MediatorError::no_handler(MessageKind::Query, key))?;

        entry
            .downcast_ref::<Arc<dyn QueryHandler<Q, R>>>()
            .cloned()
            .ok_or_else(|| MediatorError::type_mismatch(MessageKind::Query, key))
    }

    /// Handlers for `N` that passed the type check, or `None` if nothing is
    /// registered. Both the absent case and each skipped handler are logged.
    pub(crate) fn resolve_notification<N: 'static>(
        &self,
    ) -> Option<Vec<Arc<dyn NotificationHandler<N>>>> {
        let key = MessageTypeKey::of::<N>();
        let Some(entries) = self.notifications.get(&key) else {
            error!(
                message_type = key.name(),
                "No registered NotificationHandler for notification type, notification will be dropped and ignored"
            );
            return None;
        };

        let handlers = entries
            .iter()
            .filter_map(|entry| {
                let handler = entry
                    .downcast_ref::<Arc<dyn NotificationHandler<N>>>()
                    .cloned();
                if handler.is_none() {
                    error!(
                        message_type = key.name(),
                        "NotificationHandler type mismatch for notification type, notification will be dropped and ignored"
                    );
                }
                handler
            })
            .collect();

        Some(handlers)
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands: Vec<_> = self.commands.keys().map(MessageTypeKey::name).collect();
        let mut queries: Vec<_> = self.queries.keys().map(MessageTypeKey::name).collect();
        let mut notifications: Vec<_> = self
            .notifications
            .iter()
            .map(|(key, handlers)| (key.name(), handlers.len()))
            .collect();
        commands.sort_unstable();
        queries.sort_unstable();
        notifications.sort_unstable();

        f.debug_struct("Mediator")
            .field("commands", &commands)
            .field("queries", &queries)
            .field("notifications", &notifications)
            .finish()
    }
}
