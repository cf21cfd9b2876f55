use crate::errors::Result;
use crate::insights::insights_model::{Insight, InsightRecord};
use crate::spending::DateRange;
use async_trait::async_trait;

/// Trait for insight repository operations
#[async_trait]
pub trait InsightRepositoryTrait: Send + Sync {
    fn find_insights(&self, user_id: &str, period: Option<&str>) -> Result<Vec<InsightRecord>>;

    /// Replaces the stored set for (user, period) with the given insights.
    /// Read flags of rows whose kind survives the regeneration carry over,
    /// so re-running never grows the table or resets what the user saw.
    async fn replace_insights(
        &self,
        user_id: &str,
        period: &str,
        insights: Vec<Insight>,
    ) -> Result<Vec<InsightRecord>>;

    async fn mark_read(&self, id: &str, user_id: &str) -> Result<usize>;
}

/// Trait for insight service operations
#[async_trait]
pub trait InsightServiceTrait: Send + Sync {
    /// Pure computation: evaluates every heuristic over the range and
    /// returns the ones that fired, in priority order, capped.
    fn generate(&self, user_id: &str, range: &DateRange) -> Result<Vec<Insight>>;

    /// Generates and persists, deduplicated per (user, kind, period).
    async fn generate_and_store(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<InsightRecord>>;

    fn get_insights(&self, user_id: &str, period: Option<&str>) -> Result<Vec<InsightRecord>>;

    async fn mark_read(&self, id: &str, user_id: &str) -> Result<usize>;
}
