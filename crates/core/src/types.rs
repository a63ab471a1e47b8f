/// Identity-provider user id. Profile documents are keyed by it.
pub type Uid = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Prices are whole units of the display currency.
pub type Price = u32;
