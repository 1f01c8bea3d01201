use chrono::{Local, NaiveDateTime, SubsecRound, Timelike};
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::{
    DEFAULT_LABEL, EXTERNAL_SOURCE, TIMESTAMP_FORMAT, TIMESTAMP_FORMAT_WHOLE_SECONDS,
};

/// A single transfer. Lives in the histories of the accounts involved and in
/// exactly one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub label: String,
}

/// ISO-8601 with microseconds, or without a fraction when it is zero.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    let fmt = if ts.nanosecond() == 0 {
        TIMESTAMP_FORMAT_WHOLE_SECONDS
    } else {
        TIMESTAMP_FORMAT
    };
    ts.format(fmt).to_string()
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

impl Transaction {
    /// Builds a transfer stamped with the current local time, truncated to
    /// the microseconds the canonical form carries.
    pub fn new(sender: &str, receiver: &str, amount: u64, label: Option<&str>) -> Self {
        let now = Local::now().naive_local().trunc_subsecs(6);
        Self::with_timestamp(sender, receiver, amount, label, now)
    }

    pub fn with_timestamp(
        sender: &str,
        receiver: &str,
        amount: u64,
        label: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> Self {
        let label = label
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LABEL)
            .to_string();
        Self {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            timestamp,
            label,
        }
    }

    /// Tokens minted into the ledger from outside.
    pub fn external(receiver: &str, amount: u64, label: Option<&str>) -> Self {
        Self::new(EXTERNAL_SOURCE, receiver, amount, label)
    }

    pub fn is_external(&self) -> bool {
        self.sender == EXTERNAL_SOURCE
    }

    pub fn timestamp_string(&self) -> String {
        format_timestamp(&self.timestamp)
    }

    /// `sender,receiver,amount,timestamp,label`: the Merkle leaf text and the
    /// history export row.
    pub fn canonical_string(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.sender,
            self.receiver,
            self.amount,
            self.timestamp_string(),
            self.label
        )
    }

    pub fn involves(&self, name: &str) -> bool {
        self.sender == name || self.receiver == name
    }
}
