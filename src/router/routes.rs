//! Route table
//!
//! An ordered list of (topic filter, handler) pairs plus one optional
//! default handler, all behind a single reader-writer lock. The session
//! layer mutates it on subscribe and unsubscribe while the dispatcher only
//! ever reads it. The lock is never held while a handler runs.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::router::message::Message;
use crate::router::topic;

/// Callback invoked for every message whose topic matches its route.
///
/// Handlers run on a blocking thread, so they may do synchronous work.
/// A handler that never returns stalls an ordered dispatcher and leaks a
/// task in a concurrent one.
pub trait MessageHandler: Send + Sync + 'static {
    fn handle(&self, message: &Message);
}

impl<F> MessageHandler for F
where
    F: Fn(&Message) + Send + Sync + 'static,
{
    fn handle(&self, message: &Message) {
        self(message)
    }
}

pub type Handler = Arc<dyn MessageHandler>;

#[derive(Clone)]
pub struct Route {
    pub filter: String,
    pub handler: Handler,
}

impl Route {
    pub fn matches(&self, topic: &str) -> bool {
        topic::matches(&self.filter, topic)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Routes {
    routes: Vec<Route>,
    default_handler: Option<Handler>,
}

#[derive(Default)]
pub struct RouteTable {
    inner: RwLock<Routes>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Routes> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Routes> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a route, or swaps the handler of an existing route with the same
    /// filter without moving it.
    pub fn add_route(&self, filter: impl Into<String>, handler: impl MessageHandler) {
        let filter = filter.into();
        let handler: Handler = Arc::new(handler);
        let mut routes = self.write();
        match routes.routes.iter_mut().find(|r| r.filter == filter) {
            Some(route) => route.handler = handler,
            None => routes.routes.push(Route { filter, handler }),
        }
    }

    /// Removes the route for `filter`. Unknown filters are ignored.
    pub fn delete_route(&self, filter: &str) {
        let mut routes = self.write();
        if let Some(pos) = routes.routes.iter().position(|r| r.filter == filter) {
            routes.routes.remove(pos);
        }
    }

    /// Sets the handler used for messages no route matches.
    pub fn set_default_handler(&self, handler: impl MessageHandler) {
        self.write().default_handler = Some(Arc::new(handler));
    }

    /// Handlers for `topic` in route order, or the default handler alone if
    /// no route matched. Empty when the message has nowhere to go.
    pub fn handlers_for(&self, topic: &str) -> Vec<Handler> {
        let routes = self.read();
        let mut handlers: Vec<Handler> = routes
            .routes
            .iter()
            .filter(|r| r.matches(topic))
            .map(|r| Arc::clone(&r.handler))
            .collect();
        if handlers.is_empty() {
            handlers.extend(routes.default_handler.iter().cloned());
        }
        handlers
    }

    /// Registered filters in iteration order.
    pub fn filters(&self) -> Vec<String> {
        self.read().routes.iter().map(|r| r.filter.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().routes.is_empty()
    }

    pub fn has_default_handler(&self) -> bool {
        self.read().default_handler.is_some()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes = self.read();
        f.debug_struct("RouteTable")
            .field("routes", &routes.routes)
            .field("default_handler", &routes.default_handler.is_some())
            .finish()
    }
}
