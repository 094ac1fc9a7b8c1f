/// A single result value as the server sent it. Type decoding is left to callers.
pub type Value = serde_json::Value;

/// One result row, values in schema column order.
pub type Row = Vec<Value>;
