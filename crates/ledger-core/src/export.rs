//! Plain-text exports consumed by the presentation layer.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::block::Block;
use crate::constants::HISTORY_HEADER;
use crate::transaction::Transaction;

/// `Sender,Receiver,Amount,Timestamp,Label` followed by one row per
/// transaction in arrival order.
pub fn history_csv(transactions: &[Transaction]) -> String {
    std::iter::once(HISTORY_HEADER.to_string())
        .chain(transactions.iter().map(Transaction::canonical_string))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Transaction list as JSON indented by four spaces.
pub fn transactions_pretty(transactions: &[Transaction]) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    // Writing plain structs into a Vec cannot fail, and the output is UTF-8.
    transactions
        .serialize(&mut ser)
        .expect("transaction list serializes to JSON");
    String::from_utf8(buf).expect("serde_json emits UTF-8")
}

/// One line per block, blocks separated by a blank line.
pub fn chain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| {
            format!(
                "Block {} - Timestamp: {}, Transactions: {}, Previous Hash: {}, Nonce: {}, Hash: {}",
                b.index,
                b.timestamp,
                transactions_pretty(&b.transactions),
                b.previous_hash,
                b.nonce,
                b.hash
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
