/// Number of decimal places carried by monetary amounts.
pub const MONEY_SCALE: u32 = 4;

/// Rows per bulk-insert chunk, kept well under SQLite's bind variable limit.
pub const INSERT_CHUNK_SIZE: usize = 250;
