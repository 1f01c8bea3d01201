use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::Result;
use crate::ledger::{Ledger, Receipt};

/// Cloneable handle that serialises every call into one `Ledger`.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Runs `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    pub fn register(&self, name: &str) -> Result<()> {
        self.with(|l| l.register(name))
    }

    pub fn receive(&self, name: &str, amount: u64, label: Option<&str>) -> Result<Receipt> {
        self.with(|l| l.receive(name, amount, label))
    }

    pub fn send(&self, from: &str, to: &str, amount: u64, label: Option<&str>) -> Result<Receipt> {
        self.with(|l| l.send(from, to, amount, label))
    }

    pub fn set_difficulty(&self, difficulty: usize) -> Result<()> {
        self.with(|l| l.set_difficulty(difficulty))
    }

    pub fn balance_of(&self, name: &str) -> Result<u64> {
        self.with(|l| l.balance_of(name))
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> Ledger {
        self.with(|l| l.clone())
    }
}
