//! Single-slot callback registry.
//!
//! One slot per event kind. Registering a handler replaces whatever was in
//! the slot (last registration wins); there is no fan-out. Firing an empty
//! slot does nothing.
//!
//! The handler is cloned out of its slot before it runs, so a handler may
//! re-register any slot (including its own) without deadlocking.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ResourceError;
use crate::protocol::CloseCode;

// ============================================================================
// Handler Types
// ============================================================================

/// Called once the connection is open.
pub type ConnectHandler = Arc<dyn Fn() + Send + Sync>;

/// Called after a ping frame was written.
pub type PingHandler = Arc<dyn Fn() + Send + Sync>;

/// Called after a message was written, with its length in bytes.
pub type SendHandler = Arc<dyn Fn(usize) + Send + Sync>;

/// Called for each inbound message: `(length, content, is_binary)`.
///
/// Binary content is base64 encoded and `length` is the encoded length.
pub type MessageHandler = Arc<dyn Fn(usize, &str, bool) + Send + Sync>;

/// Called when the close sequence completes: `(code, reason)`.
pub type CloseHandler = Arc<dyn Fn(CloseCode, &str) + Send + Sync>;

/// Called for every failure of an asynchronous step.
pub type ErrorHandler = Arc<dyn Fn(ResourceError) + Send + Sync>;

/// A slot holding at most one handler.
type Slot<H> = Mutex<Option<H>>;

// ============================================================================
// CallbackRegistry
// ============================================================================

/// The six handler slots of a resource.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    connect: Slot<ConnectHandler>,
    ping: Slot<PingHandler>,
    send: Slot<SendHandler>,
    message: Slot<MessageHandler>,
    close: Slot<CloseHandler>,
    error: Slot<ErrorHandler>,
}

impl CallbackRegistry {
    pub(crate) fn set_connect(&self, handler: ConnectHandler) {
        *self.connect.lock() = Some(handler);
    }

    pub(crate) fn set_ping(&self, handler: PingHandler) {
        *self.ping.lock() = Some(handler);
    }

    pub(crate) fn set_send(&self, handler: SendHandler) {
        *self.send.lock() = Some(handler);
    }

    pub(crate) fn set_message(&self, handler: MessageHandler) {
        *self.message.lock() = Some(handler);
    }

    pub(crate) fn set_close(&self, handler: CloseHandler) {
        *self.close.lock() = Some(handler);
    }

    pub(crate) fn set_error(&self, handler: ErrorHandler) {
        *self.error.lock() = Some(handler);
    }

    pub(crate) fn connected(&self) {
        if let Some(handler) = current(&self.connect) {
            handler();
        }
    }

    pub(crate) fn pinged(&self) {
        if let Some(handler) = current(&self.ping) {
            handler();
        }
    }

    pub(crate) fn sent(&self, length: usize) {
        if let Some(handler) = current(&self.send) {
            handler(length);
        }
    }

    pub(crate) fn message(&self, length: usize, content: &str, is_binary: bool) {
        if let Some(handler) = current(&self.message) {
            handler(length, content, is_binary);
        }
    }

    pub(crate) fn closed(&self, code: CloseCode, reason: &str) {
        if let Some(handler) = current(&self.close) {
            handler(code, reason);
        }
    }

    pub(crate) fn error(&self, error: ResourceError) {
        if let Some(handler) = current(&self.error) {
            handler(error);
        }
    }
}

/// Clones the handler out of `slot`, releasing the lock before it runs.
#[inline]
fn current<H: Clone>(slot: &Slot<H>) -> Option<H> {
    slot.lock().clone()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::ErrorKind;

    #[test]
    fn test_empty_slots_are_noops() {
        let registry = CallbackRegistry::default();
        registry.connected();
        registry.pinged();
        registry.sent(3);
        registry.message(1, "x", false);
        registry.closed(CloseCode::Normal, "bye");
        registry.error(ResourceError::new(ErrorKind::Send, "boom"));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = CallbackRegistry::default();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&first);
        registry.set_send(Arc::new(move |n: usize| {
            counter.fetch_add(n, Ordering::SeqCst);
        }));
        let counter = Arc::clone(&second);
        registry.set_send(Arc::new(move |n: usize| {
            counter.fetch_add(n, Ordering::SeqCst);
        }));

        registry.sent(12);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_handler_may_reregister_itself() {
        let registry = Arc::new(CallbackRegistry::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let inner_registry = Arc::clone(&registry);
        let inner_calls = Arc::clone(&calls);
        registry.set_ping(Arc::new(move || {
            inner_calls.fetch_add(1, Ordering::SeqCst);
            inner_registry.set_ping(Arc::new(|| {}));
        }));

        registry.pinged();
        registry.pinged();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
