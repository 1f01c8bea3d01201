#![allow(dead_code)]

use ledger_core::{Ledger, LedgerConfig};

/// Ledger with a low difficulty so tests mine quickly.
pub fn quick_ledger() -> Ledger {
    Ledger::new(LedgerConfig {
        difficulty: 1,
        ..LedgerConfig::default()
    })
    .expect("genesis mines at difficulty 1")
}

pub fn ledger_with_accounts(names: &[&str]) -> Ledger {
    let mut ledger = quick_ledger();
    for name in names {
        ledger.register(name).expect("fresh wallet name");
    }
    ledger
}
