//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its builder for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod transactions_page;

pub use core::{
    EXPENSE_CATEGORIES, INCOME_CATEGORIES, Transaction, TransactionKind, create_transaction_table,
    get_all_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub use core::{count_transactions, create_transaction, delete_transaction, get_transaction};
