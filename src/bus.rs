//! # bus
//!
//! [`EventBus`]: synchronous, channel-keyed fan-out of [`MarketEvent`]s.
//!
//! * `publish` calls every listener registered on the event's channel at the
//!   moment of the call, in registration order, exactly once.  Nothing is
//!   buffered or retried; a listener that subscribes later never sees it.
//! * `subscribe` returns a [`Subscription`] handle.  Unsubscribing is
//!   idempotent and dropping the handle unsubscribes as well.
//! * The registry lock is released before listeners run, so a listener may
//!   subscribe, unsubscribe or publish from inside its callback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

use crate::events::{Channel, MarketEvent};

type Listener = Arc<dyn Fn(&MarketEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id:   u64,
    listeners: HashMap<Channel, Vec<(u64, Listener)>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── EventBus ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` on `channel`.
    pub fn subscribe<F>(&self, channel: Channel, listener: F) -> Subscription
    where
        F: Fn(&MarketEvent) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .listeners
            .entry(channel.clone())
            .or_default()
            .push((id, Arc::new(listener)));

        trace!(%channel, id, "listener subscribed");

        Subscription {
            id,
            channel,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers `event` to the listeners of its channel.  Returns how many
    /// listeners were called.
    pub fn publish(&self, event: &MarketEvent) -> usize {
        let channel = event.channel();
        let targets: Vec<Listener> = {
            let registry = lock(&self.registry);
            match registry.listeners.get(&channel) {
                Some(entries) => entries.iter().map(|(_, l)| Arc::clone(l)).collect(),
                None => return 0,
            }
        };

        for listener in &targets {
            listener(event);
        }
        targets.len()
    }

    /// Number of listeners currently registered on `channel`.
    pub fn listener_count(&self, channel: &Channel) -> usize {
        lock(&self.registry)
            .listeners
            .get(channel)
            .map_or(0, Vec::len)
    }
}

// ─── Subscription ─────────────────────────────────────────────────────────────

/// Disposable registration handle returned by [`EventBus::subscribe`].
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id:       u64,
    channel:  Channel,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Removes the listener.  Safe to call any number of times.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(entries) = registry.listeners.get_mut(&self.channel) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                registry.listeners.remove(&self.channel);
            }
        }
    }

    /// Keeps the listener registered for the life of the bus.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .finish()
    }
}
