//! Change notifications for notices and documents.
//!
//! Each notice and each document owns its own [`Notifier`], so listeners live
//! exactly as long as the entity they observe.

use super::row::RowId;
use std::collections::BTreeMap;
use std::fmt;

/// Handle returned by [`Notifier::subscribe`].
pub type ListenerId = u64;

/// Change to a single notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeEvent {
    /// A row was appended to the notice.
    RowAdded(RowId),
    /// A row was removed from the notice.
    RowDeleted(RowId),
    /// Parameters were written back to the page node.
    Saved,
    /// The notice is about to be removed from the page.
    Destroyed,
}

/// Structural change to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// A page was loaded and scanned.
    Loaded { notices: usize },
    /// A new notice was inserted.
    Inserted(String),
    /// A notice was destroyed and dropped from the notice list.
    NoticeDestroyed(String),
}

type Listener<E> = Box<dyn FnMut(&E) + Send>;

/// Listener registry for one entity.
pub struct Notifier<E> {
    next_id: ListenerId,
    listeners: BTreeMap<ListenerId, Listener<E>>,
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            listeners: BTreeMap::new(),
        }
    }

    /// Register a listener. Listeners are called in registration order.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn emit(&mut self, event: &E) {
        for listener in self.listeners.values_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_subscribe_emit_unsubscribe() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = Notifier::new();

        let sink = Arc::clone(&seen);
        let id = notifier.subscribe(move |e: &NoticeEvent| sink.lock().unwrap().push(e.clone()));
        assert_eq!(notifier.len(), 1);

        notifier.emit(&NoticeEvent::Saved);
        assert_eq!(*seen.lock().unwrap(), vec![NoticeEvent::Saved]);

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.emit(&NoticeEvent::Destroyed);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_listeners_called_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut notifier: Notifier<DocumentEvent> = Notifier::new();
        for n in 0..3 {
            let order = Arc::clone(&order);
            notifier.subscribe(move |_| order.lock().unwrap().push(n));
        }
        notifier.emit(&DocumentEvent::Loaded { notices: 0 });
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }
}
