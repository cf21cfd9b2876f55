use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use pocketledger_core::budgets::{
    BudgetDraft, BudgetPeriod, BudgetRepository, BudgetService, BudgetServiceTrait, BudgetStatus,
};
use pocketledger_core::categories::{
    CategoryRepository, CategoryService, CategoryServiceTrait, CategoryType,
};
use pocketledger_core::db;
use pocketledger_core::errors::Error;
use pocketledger_core::goals::{
    GoalDraft, GoalPriority, GoalRepository, GoalRepositoryTrait, GoalService, GoalServiceTrait,
};
use pocketledger_core::insights::{InsightRepository, InsightService, InsightServiceTrait};
use pocketledger_core::spending::{DateRange, SpendingService, SpendingServiceTrait};
use pocketledger_core::transactions::{
    NewTransaction, TransactionRepository, TransactionRepositoryTrait,
};

struct Engine {
    _dir: TempDir,
    categories: CategoryService,
    transactions: Arc<TransactionRepository>,
    spending: Arc<SpendingService>,
    budgets: Arc<BudgetService>,
    goal_repository: Arc<GoalRepository>,
    goals: GoalService,
    insights: InsightService,
}

/// Wires the full stack against a throwaway on-disk database, the same way
/// the application composes it.
fn engine() -> Engine {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("ledger.db");
    let pool = db::create_pool(db_path.to_str().expect("utf-8 path")).expect("pool");
    db::run_migrations(&pool).expect("migrations");
    let writer = db::spawn_writer(pool.clone());

    let category_repository = Arc::new(CategoryRepository::new(pool.clone(), writer.clone()));
    let transactions = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let spending = Arc::new(SpendingService::new(transactions.clone()));
    let budget_repository = Arc::new(BudgetRepository::new(pool.clone(), writer.clone()));
    let budgets = Arc::new(BudgetService::new(budget_repository, spending.clone()));
    let goal_repository = Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let insight_repository = Arc::new(InsightRepository::new(pool.clone(), writer.clone()));

    Engine {
        _dir: dir,
        categories: CategoryService::new(category_repository),
        transactions,
        spending: spending.clone(),
        budgets: budgets.clone(),
        goal_repository: goal_repository.clone(),
        goals: GoalService::new(goal_repository),
        insights: InsightService::new(insight_repository, spending, budgets),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 15).unwrap()
}

async fn spend(
    engine: &Engine,
    category_id: &str,
    amount: &str,
    date: &str,
) -> pocketledger_core::transactions::Transaction {
    engine
        .transactions
        .insert_transaction(NewTransaction {
            id: None,
            user_id: "u1".to_string(),
            category_id: category_id.to_string(),
            amount: amount.to_string(),
            date: date.to_string(),
            created_at: None,
            updated_at: None,
        })
        .await
        .expect("insert transaction")
}

#[tokio::test]
async fn quick_saves_accumulate_and_reconcile() {
    let engine = engine();
    let goal = engine
        .goals
        .create_goal(
            "u1",
            GoalDraft {
                name: "Emergency fund".to_string(),
                target_amount: dec!(300),
                current_amount: dec!(0),
                start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                priority: GoalPriority::High,
            },
        )
        .await
        .unwrap();

    let first = engine
        .goals
        .quick_save("u1", &goal.id, dec!(100), today())
        .await
        .unwrap();
    assert!(!first.just_reached);

    let second = engine
        .goals
        .quick_save("u1", &goal.id, dec!(150), today())
        .await
        .unwrap();
    assert_eq!(second.new_amount, dec!(250));
    assert!(!second.goal_reached);

    let third = engine
        .goals
        .quick_save("u1", &goal.id, dec!(100), today())
        .await
        .unwrap();
    assert_eq!(third.new_amount, dec!(350));
    assert!(third.goal_reached);
    assert!(third.just_reached);

    // Balance equals seed plus the audit ledger, and the row count matches.
    let saves = engine.goal_repository.find_quick_saves(&goal.id, "u1").unwrap();
    assert_eq!(saves.len(), 3);
    let audited: rust_decimal::Decimal = saves.iter().map(|s| s.amount_decimal()).sum();
    assert_eq!(audited, dec!(350));

    let stored = engine.goal_repository.get_goal(&goal.id, "u1").unwrap();
    assert_eq!(stored.current_amount_decimal(), dec!(350));

    // Completing is explicit and one-way.
    let done = engine.goals.complete("u1", &goal.id, today()).await.unwrap();
    assert!(done.is_completed);
    let err = engine.goals.complete("u1", &goal.id, today()).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_quick_saves_serialize_through_the_writer() {
    let engine = engine();
    let goal = engine
        .goals
        .create_goal(
            "u1",
            GoalDraft {
                name: "Holiday".to_string(),
                target_amount: dec!(1000),
                current_amount: dec!(0),
                start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
                priority: GoalPriority::Medium,
            },
        )
        .await
        .unwrap();

    // Ten simultaneous saves on the same goal must all land: the writer
    // actor runs each read-add-write-append as one transaction.
    let goals = Arc::new(engine.goals);
    let mut handles = Vec::new();
    for _ in 0..10 {
        let goals = goals.clone();
        let goal_id = goal.id.clone();
        handles.push(tokio::spawn(async move {
            goals.quick_save("u1", &goal_id, dec!(50), today()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = engine.goal_repository.get_goal(&goal.id, "u1").unwrap();
    assert_eq!(stored.current_amount_decimal(), dec!(500));
    assert_eq!(
        engine.goal_repository.find_quick_saves(&goal.id, "u1").unwrap().len(),
        10
    );
}

#[tokio::test]
async fn budget_upsert_and_status_over_real_ledger() {
    let engine = engine();
    let salary = engine
        .categories
        .create_category("u1", "Salary".to_string(), CategoryType::Income, None, None)
        .await
        .unwrap();
    let dining = engine
        .categories
        .create_category("u1", "Dining".to_string(), CategoryType::Expense, None, None)
        .await
        .unwrap();

    spend(&engine, &salary.id, "4000", "2025-05-01").await;
    spend(&engine, &dining.id, "900", "2025-05-05").await;
    spend(&engine, &dining.id, "450", "2025-05-12").await;

    // Creating twice for the same (category, period) updates in place.
    let draft = BudgetDraft {
        category_id: dining.id.clone(),
        amount: dec!(800),
        period: BudgetPeriod::Monthly,
        start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        alert_threshold: None,
    };
    let original = engine.budgets.upsert_budget("u1", draft.clone()).await.unwrap();
    let replaced = engine
        .budgets
        .upsert_budget(
            "u1",
            BudgetDraft {
                amount: dec!(1000),
                ..draft
            },
        )
        .await
        .unwrap();
    assert_eq!(original.id, replaced.id);
    assert_eq!(engine.budgets.get_budgets("u1", None).unwrap().len(), 1);

    let statuses = engine.budgets.get_budget_statuses("u1", today()).unwrap();
    assert_eq!(statuses.len(), 1);
    let status = &statuses[0];
    assert_eq!(status.spent, dec!(1350));
    assert_eq!(status.percent_used, dec!(135));
    assert_eq!(status.percent_display, dec!(100));
    assert_eq!(status.status, BudgetStatus::Exceeded);
    assert!(status.hard_exceeded);

    // Month totals feed the allowance: 4000 - 1350 = 2650 over 17 days is
    // 156/day, so the floor applies; weekly defaults to a quarter of income.
    let allowance = engine.budgets.get_spending_allowance("u1", today()).unwrap();
    assert_eq!(allowance.available_balance, dec!(2650));
    assert_eq!(allowance.daily_budget, dec!(500));
    assert_eq!(allowance.weekly_budget, dec!(1000.00));
}

#[tokio::test]
async fn category_deletion_is_blocked_while_referenced() {
    let engine = engine();
    let dining = engine
        .categories
        .create_category("u1", "Dining".to_string(), CategoryType::Expense, None, None)
        .await
        .unwrap();
    let txn = spend(&engine, &dining.id, "40", "2025-05-03").await;

    let err = engine.categories.delete_category(&dining.id, "u1").await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    engine.transactions.delete_transaction(&txn.id, "u1").await.unwrap();
    assert_eq!(engine.categories.delete_category(&dining.id, "u1").await.unwrap(), 1);
}

#[tokio::test]
async fn sum_is_exact_and_scoped_to_the_user() {
    let engine = engine();
    let coffee = engine
        .categories
        .create_category("u1", "Coffee".to_string(), CategoryType::Expense, None, None)
        .await
        .unwrap();
    for _ in 0..3 {
        spend(&engine, &coffee.id, "0.10", "2025-05-02").await;
    }

    let range = DateRange::month_of(today());
    let total = engine
        .spending
        .sum("u1", CategoryType::Expense, &range, None)
        .unwrap();
    assert_eq!(total, dec!(0.30));

    let other = engine
        .spending
        .sum("someone-else", CategoryType::Expense, &range, None)
        .unwrap();
    assert_eq!(other, dec!(0));
}

#[tokio::test]
async fn insight_regeneration_stays_deduplicated() {
    let engine = engine();
    let dining = engine
        .categories
        .create_category("u1", "Dining".to_string(), CategoryType::Expense, None, None)
        .await
        .unwrap();
    spend(&engine, &dining.id, "120", "2025-05-04").await;
    spend(&engine, &dining.id, "60", "2025-05-09").await;

    let range = DateRange::month_of(today());
    let first = engine.insights.generate_and_store("u1", &range).await.unwrap();
    assert!(!first.is_empty());

    let second = engine.insights.generate_and_store("u1", &range).await.unwrap();
    assert_eq!(first.len(), second.len());

    let stored = engine.insights.get_insights("u1", None).unwrap();
    assert_eq!(stored.len(), first.len(), "same period never grows the table");
}
