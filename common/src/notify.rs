//! Toast notifications. One queue is created by the application and handed
//! to whoever needs to publish or render messages.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// How long a toast stays up before the renderer dismisses it.
pub const AUTO_DISMISS: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastKind {
    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast-success",
            ToastKind::Error => "toast-error",
            ToastKind::Info => "toast-info",
            ToastKind::Warning => "toast-warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&[Toast])>;

#[derive(Default)]
struct Inner {
    toasts: Vec<Toast>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_toast: u64,
    next_listener: u64,
    closed: bool,
}

/// Shared handle to the queue. Clones refer to the same queue.
#[derive(Clone, Default)]
pub struct Notifications {
    inner: Rc<RefCell<Inner>>,
}

impl PartialEq for Notifications {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Notifications")
            .field("toasts", &inner.toasts)
            .field("listeners", &inner.listeners.len())
            .field("closed", &inner.closed)
            .finish()
    }
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a message and returns its id. Ignored after `shutdown`.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) -> Option<u64> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return None;
            }
            inner.next_toast += 1;
            let id = inner.next_toast;
            inner.toasts.push(Toast {
                id,
                message: message.into(),
                kind,
            });
            id
        };
        self.publish();
        Some(id)
    }

    pub fn success(&self, message: impl Into<String>) -> Option<u64> {
        self.show(message, ToastKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Option<u64> {
        self.show(message, ToastKind::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> Option<u64> {
        self.show(message, ToastKind::Info)
    }

    pub fn warning(&self, message: impl Into<String>) -> Option<u64> {
        self.show(message, ToastKind::Warning)
    }

    pub fn dismiss(&self, id: u64) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.toasts.len();
            inner.toasts.retain(|toast| toast.id != id);
            inner.toasts.len() != before
        };
        if removed {
            self.publish();
        }
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().toasts.clear();
        self.publish();
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.borrow().toasts.clone()
    }

    /// Registers a listener and immediately hands it the current queue.
    pub fn subscribe(&self, listener: impl Fn(&[Toast]) + 'static) -> SubscriptionId {
        let listener: Listener = Rc::new(listener);
        let (id, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            inner.next_listener += 1;
            let id = SubscriptionId(inner.next_listener);
            inner.listeners.push((id, listener.clone()));
            (id, inner.toasts.clone())
        };
        listener(&snapshot);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .borrow_mut()
            .listeners
            .retain(|(existing, _)| *existing != id);
    }

    /// Drops every toast and listener. Later publishes are ignored.
    pub fn shutdown(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.closed = true;
        inner.toasts.clear();
        inner.listeners.clear();
        tracing::debug!("notification queue shut down");
    }

    // listeners run without the borrow held so they may call back into the queue
    fn publish(&self) {
        let (listeners, snapshot) = {
            let inner = self.inner.borrow();
            let listeners: Vec<Listener> = inner
                .listeners
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            (listeners, inner.toasts.clone())
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(queue: &Notifications) -> (SubscriptionId, Rc<RefCell<Vec<usize>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = queue.subscribe(move |toasts| sink.borrow_mut().push(toasts.len()));
        (id, seen)
    }

    #[test]
    fn show_and_dismiss_notify_listeners() {
        let queue = Notifications::new();
        let (_, seen) = recorder(&queue);

        let first = queue.success("Bet placed").unwrap();
        queue.error("Insufficient funds");
        assert_eq!(queue.toasts().len(), 2);
        assert_eq!(queue.toasts()[1].kind, ToastKind::Error);

        queue.dismiss(first);
        queue.dismiss(first);
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 1]);
    }

    #[test]
    fn unsubscribed_listeners_stop_hearing() {
        let queue = Notifications::new();
        let (id, seen) = recorder(&queue);
        queue.unsubscribe(id);
        queue.info("Match created");
        assert_eq!(*seen.borrow(), vec![0]);
    }

    #[test]
    fn listeners_may_reenter_the_queue() {
        let queue = Notifications::new();
        let handle = queue.clone();
        queue.subscribe(move |toasts| {
            if let Some(toast) = toasts.iter().find(|toast| toast.kind == ToastKind::Warning) {
                handle.dismiss(toast.id);
            }
        });
        queue.warning("Odds changed");
        assert!(queue.toasts().is_empty());
    }

    #[test]
    fn shutdown_silences_the_queue() {
        let queue = Notifications::new();
        let (_, seen) = recorder(&queue);
        queue.info("first");
        queue.shutdown();
        assert_eq!(queue.info("second"), None);
        assert!(queue.toasts().is_empty());
        assert_eq!(*seen.borrow(), vec![0, 1]);
    }

    #[test]
    fn clones_share_one_queue() {
        let queue = Notifications::new();
        let other = queue.clone();
        other.info("hello");
        assert_eq!(queue.toasts().len(), 1);
        assert_eq!(queue, other);
        assert_ne!(queue, Notifications::new());
    }
}
