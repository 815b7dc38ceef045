//! Database ID type definition.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
/// Alias for the integer type used for transaction row IDs.
pub type TransactionID = DatabaseID;
