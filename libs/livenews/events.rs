//! Typed events and the listener registry
//!
//! Listeners are registered per [`EventKind`] and called synchronously, in
//! registration order, on the thread that emits the event (the session task
//! for anything coming off the socket). The registry lock is never held
//! while a listener runs, so listeners may register, unregister or call back
//! into the client. A panicking listener is logged and skipped; it never
//! takes the session task down with it.
//!
//! [`EventBus::subscribe`] hands out a crossbeam receiver that sees every
//! event, for consumers that prefer polling over callbacks.

use crate::article::Article;
use crate::status::ConnectionStatus;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    Error,
    StatusChanged,
    NewsUpdated,
    BreakingNewsUpdated,
    CategoryNewsUpdated,
}

/// An event delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum NewsEvent {
    Connected,
    Disconnected,
    Error(String),
    StatusChanged(ConnectionStatus),
    NewsUpdated(Vec<Article>),
    BreakingNewsUpdated(Vec<Article>),
    CategoryNewsUpdated {
        category: String,
        articles: Vec<Article>,
    },
}

impl NewsEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            NewsEvent::Connected => EventKind::Connected,
            NewsEvent::Disconnected => EventKind::Disconnected,
            NewsEvent::Error(_) => EventKind::Error,
            NewsEvent::StatusChanged(_) => EventKind::StatusChanged,
            NewsEvent::NewsUpdated(_) => EventKind::NewsUpdated,
            NewsEvent::BreakingNewsUpdated(_) => EventKind::BreakingNewsUpdated,
            NewsEvent::CategoryNewsUpdated { .. } => EventKind::CategoryNewsUpdated,
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&NewsEvent) + Send + Sync>;

struct Registration {
    id: ListenerId,
    kind: EventKind,
    listener: Listener,
}

#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Registration>>,
    taps: Mutex<Vec<Sender<NewsEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for events of `kind`
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&NewsEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push(Registration {
            id,
            kind,
            listener: Arc::new(listener),
        });
        id
    }

    /// Remove a listener; false if it was not registered
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);
        listeners.len() != before
    }

    /// A receiver that gets a copy of every event emitted from now on
    ///
    /// Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> Receiver<NewsEvent> {
        let (tx, rx) = unbounded();
        self.taps.lock().push(tx);
        rx
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    pub fn emit(&self, event: NewsEvent) {
        let kind = event.kind();
        let matching: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .filter(|registration| registration.kind == kind)
            .map(|registration| Arc::clone(&registration.listener))
            .collect();

        for listener in matching {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                error!(?kind, "Event listener panicked: {}", panic_message(payload.as_ref()));
            }
        }

        let mut taps = self.taps.lock();
        if !taps.is_empty() {
            taps.retain(|tap| tap.send(event.clone()).is_ok());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listeners_called_in_registration_order() {
        let bus = EventBus::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            bus.on(EventKind::Error, move |event| {
                if let NewsEvent::Error(message) = event {
                    calls.lock().push(format!("{name}:{message}"));
                }
            });
        }

        bus.emit(NewsEvent::Error("boom".to_string()));

        assert_eq!(
            *calls.lock(),
            vec!["first:boom", "second:boom", "third:boom"]
        );
    }

    #[test]
    fn test_listeners_only_receive_their_kind() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        bus.on(EventKind::Connected, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(NewsEvent::Disconnected);
        bus.emit(NewsEvent::Connected);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(EventKind::Connected), 1);
        assert_eq!(bus.listener_count(EventKind::Disconnected), 0);
    }

    #[test]
    fn test_off_removes_listener() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let id = bus.on(EventKind::NewsUpdated, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(NewsEvent::NewsUpdated(Vec::new()));
        assert!(bus.off(id));
        assert!(!bus.off(id));
        bus.emit(NewsEvent::NewsUpdated(Vec::new()));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_register_during_emit() {
        let bus = Arc::new(EventBus::new());
        let inner = Arc::clone(&bus);
        bus.on(EventKind::Connected, move |_| {
            inner.on(EventKind::Connected, |_| {});
        });

        bus.emit(NewsEvent::Connected);

        assert_eq!(bus.listener_count(EventKind::Connected), 2);
    }

    #[test]
    fn test_subscribe_receives_every_event() {
        let bus = EventBus::new();
        let rx = bus.subscribe();

        bus.emit(NewsEvent::Connected);
        bus.emit(NewsEvent::Error("x".to_string()));

        assert_eq!(rx.try_recv().unwrap(), NewsEvent::Connected);
        assert_eq!(rx.try_recv().unwrap(), NewsEvent::Error("x".to_string()));
        assert!(rx.try_recv().is_err());

        drop(rx);
        bus.emit(NewsEvent::Connected);
        assert!(bus.taps.lock().is_empty());
    }

    #[test]
    fn test_panicking_listener_does_not_stop_delivery() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let calls = Arc::new(Mutex::new(0));

        bus.on(EventKind::NewsUpdated, |_| panic!("listener bug"));
        let counter = Arc::clone(&calls);
        bus.on(EventKind::NewsUpdated, move |_| *counter.lock() += 1);

        bus.emit(NewsEvent::NewsUpdated(Vec::new()));
        bus.emit(NewsEvent::NewsUpdated(Vec::new()));

        assert_eq!(*calls.lock(), 2);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn test_panic_message_reads_string_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let literal: Box<dyn Any + Send> = Box::new("literal");
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(literal.as_ref()), "literal");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
