use serde::Serialize;

use crate::transaction::Transaction;

/// A named wallet. Balance only changes through ledger transfers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    pub name: String,
    pub balance: u64,
    pub history: Vec<Transaction>,
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            balance: 0,
            history: Vec::new(),
        }
    }
}
