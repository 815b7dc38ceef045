//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

use crate::{Error, database_id::TransactionID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction adds money to or removes money from the user's pocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. a grocery shop.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid transaction kind {other:?}").into(),
            )),
        }
    }
}

/// Suggested categories for income transactions, shown in the create form.
pub const INCOME_CATEGORIES: [&str; 7] = [
    "Salary",
    "Freelance",
    "Business",
    "Investment",
    "Bonus",
    "Gift",
    "Other Income",
];

/// Suggested categories for expense transactions, shown in the create form.
pub const EXPENSE_CATEGORIES: [&str; 9] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Education",
    "Travel",
    "Other Expense",
];

/// An income or expense, i.e. an event where money was either earned or spent.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// When the transaction happened.
    pub date: Date,
    /// The amount of money earned or spent. Always strictly positive, the
    /// direction of the money flow is given by `kind`.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction belongs to, e.g. "Salary", "Food & Dining".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, date: Date, kind: TransactionKind) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            kind,
            category: String::new(),
            description: String::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Set the optional text fields and then pass the builder to
/// [create_transaction] to insert the row and get back the stored
/// [Transaction] with its assigned ID.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction. Must be strictly positive.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The category of the transaction, e.g. "Salary", "Food & Dining".
    pub category: String,
    /// A human-readable description of the transaction.
    pub description: String,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(builder.amount));
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (date, amount, kind, category, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, date, amount, kind, category, description",
        )?
        .query_row(
            (
                builder.date,
                builder.amount,
                builder.kind,
                builder.category,
                builder.description,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionID, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, date, amount, kind, category, description FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all transactions, newest first.
///
/// Transactions on the same date are returned in reverse insertion order so
/// the most recently recorded transaction comes first.
///
/// Rows whose columns cannot be converted (e.g. a hand-edited date that is
/// not a valid calendar date) are skipped with a warning rather than failing
/// the whole query, so one bad row cannot take down the dashboard or the
/// transactions page.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, date, amount, kind, category, description FROM \"transaction\"
         ORDER BY date DESC, id DESC",
    )?;

    let mut transactions = Vec::new();
    for row_result in statement.query_map([], map_transaction_row)? {
        match row_result {
            Ok(transaction) => transactions.push(transaction),
            Err(rusqlite::Error::FromSqlConversionFailure(column, _, error)) => {
                tracing::warn!("skipping transaction row with bad column {column}: {error}");
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(transactions)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// The number of rows removed by a delete statement.
pub type RowsAffected = usize;

/// Delete a transaction by its `id`, returning the number of rows removed.
///
/// Deleting an ID that does not exist is not an error, the caller can inspect
/// the row count to tell the two cases apart.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn delete_transaction(
    id: TransactionID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id",
            &[(":id", &id)],
        )
        .map_err(|err| err.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL CHECK(kind IN ('income', 'expense')),
                category TEXT NOT NULL,
                description TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Index used by the dashboard and transactions pages.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let amount = row.get(2)?;
    let kind = row.get(3)?;
    let category = row.get(4)?;
    let description = row.get(5)?;

    Ok(Transaction {
        id,
        date,
        amount,
        kind,
        category,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            Transaction, TransactionKind, count_transactions, create_transaction,
            delete_transaction, get_all_transactions, get_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = 12.3;

        let result = create_transaction(
            Transaction::build(amount, date!(2025 - 10 - 05), TransactionKind::Expense)
                .category("Food & Dining")
                .description("Lunch"),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.kind, TransactionKind::Expense);
                assert_eq!(transaction.category, "Food & Dining");
                assert_eq!(transaction.description, "Lunch");
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_zero_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(0.0, date!(2025 - 10 - 05), TransactionKind::Income),
            &conn,
        );

        assert_eq!(result, Err(Error::NonPositiveAmount(0.0)));
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(-42.0, date!(2025 - 10 - 05), TransactionKind::Expense),
            &conn,
        );

        assert_eq!(result, Err(Error::NonPositiveAmount(-42.0)));
    }

    #[test]
    fn get_succeeds() {
        let conn = get_test_connection();
        let want = create_transaction(
            Transaction::build(55.5, date!(2025 - 10 - 05), TransactionKind::Income)
                .category("Salary"),
            &conn,
        )
        .expect("Could not create transaction");

        let got = get_transaction(want.id, &conn).expect("Could not get transaction");

        assert_eq!(got, want);
    }

    #[test]
    fn get_fails_on_missing_id() {
        let conn = get_test_connection();

        let result = get_transaction(999, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_returns_newest_first() {
        let conn = get_test_connection();
        let older = create_transaction(
            Transaction::build(1.0, date!(2025 - 10 - 01), TransactionKind::Expense),
            &conn,
        )
        .unwrap();
        let newer = create_transaction(
            Transaction::build(2.0, date!(2025 - 10 - 03), TransactionKind::Expense),
            &conn,
        )
        .unwrap();
        let same_day_later = create_transaction(
            Transaction::build(3.0, date!(2025 - 10 - 03), TransactionKind::Income),
            &conn,
        )
        .unwrap();

        let got = get_all_transactions(&conn).expect("Could not get transactions");

        assert_eq!(got, vec![same_day_later, newer, older]);
    }

    #[test]
    fn get_all_skips_rows_with_unreadable_dates() {
        let conn = get_test_connection();
        let good = create_transaction(
            Transaction::build(10.0, date!(2025 - 10 - 02), TransactionKind::Income),
            &conn,
        )
        .unwrap();
        // A hand-edited row that no longer holds a valid calendar date.
        conn.execute(
            "INSERT INTO \"transaction\" (date, amount, kind, category, description)
             VALUES ('not-a-date', 5.0, 'expense', '', '')",
            (),
        )
        .unwrap();

        let got = get_all_transactions(&conn).expect("Could not get transactions");

        assert_eq!(got, vec![good]);
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(i as f64, today, TransactionKind::Income),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn delete_removes_row() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(1.23, date!(2025 - 10 - 26), TransactionKind::Expense),
            &conn,
        )
        .unwrap();

        let rows_affected = delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_row_affects_nothing() {
        let conn = get_test_connection();

        let rows_affected = delete_transaction(999, &conn).unwrap();

        assert_eq!(rows_affected, 0);
    }
}
