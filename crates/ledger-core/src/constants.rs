pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: usize = 2;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const EXTERNAL_SOURCE: &str = "external_source";
pub const DEFAULT_LABEL: &str = "No label provided";
pub const HISTORY_HEADER: &str = "Sender,Receiver,Amount,Timestamp,Label";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
/// Used instead of `TIMESTAMP_FORMAT` when the fraction is zero.
pub const TIMESTAMP_FORMAT_WHOLE_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
