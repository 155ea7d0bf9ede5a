//! Currency store shared by every command that costs money.

use log::debug;
use zoo_tycoon_core::Money;

use crate::publisher::{Publisher, Subscriber};

/// Single mutable balance with synchronous change notifications.
///
/// The treasury is not transactional: whoever debits it is responsible for
/// crediting the same amount back when the action is reverted.
#[derive(Debug, Default)]
pub struct Treasury {
    balance: Money,
    publisher: Publisher<Money>,
}

impl Treasury {
    /// Creates a treasury holding `balance`.
    #[must_use]
    pub fn new(balance: Money) -> Self {
        Self {
            balance,
            publisher: Publisher::new(),
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> Money {
        self.balance
    }

    /// Debits `amount` when the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    pub fn spend(&mut self, amount: Money) -> bool {
        let Some(remaining) = self.balance.checked_sub(amount) else {
            debug!("declined spending {amount}, balance is {}", self.balance);
            return false;
        };
        self.balance = remaining;
        self.publisher.publish(&self.balance);
        true
    }

    /// Credits `amount` to the balance.
    pub fn add(&mut self, amount: Money) {
        self.balance = self.balance.saturating_add(amount);
        self.publisher.publish(&self.balance);
    }

    /// Registers a subscriber notified with the balance after every change.
    pub fn subscribe<S>(&mut self, subscriber: S)
    where
        S: Subscriber<Money> + 'static,
    {
        self.publisher.subscribe(subscriber);
    }
}
