//! Synchronous publish/subscribe plumbing for on-screen displays.

use std::fmt;

/// Capability notified whenever a publisher's value changes.
pub trait Subscriber<T> {
    /// Receives the latest value.
    fn notify(&mut self, value: &T);
}

impl<T, F> Subscriber<T> for F
where
    F: FnMut(&T),
{
    fn notify(&mut self, value: &T) {
        self(value);
    }
}

/// Ordered list of subscribers invoked synchronously after each change.
///
/// Subscribers are notified in registration order.
pub struct Publisher<T> {
    subscribers: Vec<Box<dyn Subscriber<T>>>,
}

impl<T> Publisher<T> {
    /// Creates a publisher without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Appends a subscriber to the notification list.
    pub fn subscribe<S>(&mut self, subscriber: S)
    where
        S: Subscriber<T> + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Notifies every subscriber of the provided value.
    pub fn publish(&mut self, value: &T) {
        for subscriber in &mut self.subscribers {
            subscriber.notify(value);
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Reports whether no subscriber is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
