use crate::categories::CategoryType;
use crate::errors::Result;
use crate::spending::DateRange;
use crate::transactions::transactions_model::{
    LedgerEntry, NewTransaction, Transaction, UpdateTransaction,
};
use async_trait::async_trait;

/// Trait for ledger repository operations
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Load the user's ledger rows of one classification inside an inclusive
    /// date range, optionally restricted to a single category. Rows come
    /// back joined with their category for downstream aggregation.
    fn entries(
        &self,
        user_id: &str,
        kind: CategoryType,
        range: &DateRange,
        category_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>>;

    fn get_transaction(&self, id: &str, user_id: &str) -> Result<Option<Transaction>>;

    async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Owner-only edit.
    async fn update_transaction(
        &self,
        id: &str,
        user_id: &str,
        update: UpdateTransaction,
    ) -> Result<Transaction>;

    /// Owner-only delete.
    async fn delete_transaction(&self, id: &str, user_id: &str) -> Result<usize>;
}
