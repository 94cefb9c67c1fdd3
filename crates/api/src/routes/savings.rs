//! Savings goal routes: goals, their transaction ledger, and the
//! compound spend-from-savings operation.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use kakebo_core::savings::{SavingsError as DomainError, SavingsTransactionKind};
use kakebo_db::entities::{expenses, savings_goals, savings_transactions};
use kakebo_db::repositories::{
    CreateGoalInput, SavingsError, SavingsRepository, SpendFromSavingsInput,
};

/// Creates the savings routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/savings/goals", post(create_goal))
        .route("/savings/goals", get(list_goals))
        .route("/savings/goals/{goal_id}", get(get_goal))
        .route("/savings/goals/{goal_id}", delete(delete_goal))
        .route("/savings/goals/{goal_id}/archive", post(archive_goal))
        .route(
            "/savings/goals/{goal_id}/transactions",
            post(record_transaction),
        )
        .route(
            "/savings/goals/{goal_id}/transactions",
            get(list_transactions),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a goal.
#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    /// Display name.
    pub name: String,
    /// Target amount; must be strictly positive.
    pub target_amount: Decimal,
    /// Currency code.
    pub currency: Option<String>,
    /// Optional target date.
    pub deadline: Option<NaiveDate>,
}

/// Request body for posting a transaction against a goal.
///
/// `create_expense` turns a withdrawal into the compound
/// spend-from-savings operation: the withdrawal and a linked,
/// savings-funded expense record commit atomically.
#[derive(Debug, Deserialize)]
pub struct RecordTransactionRequest {
    /// Unsigned amount.
    pub amount: Decimal,
    /// Transaction classification.
    #[serde(rename = "type")]
    pub kind: SavingsTransactionKind,
    /// Free-form description.
    pub description: Option<String>,
    /// Also create a linked expense record (withdrawals only).
    #[serde(default)]
    pub create_expense: bool,
    /// Expense date; defaults to today.
    pub expense_date: Option<NaiveDate>,
    /// Expense category, if any.
    pub category_id: Option<Uuid>,
    /// Payment method, if any.
    pub payment_method_id: Option<Uuid>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn goal_json(goal: &savings_goals::Model) -> serde_json::Value {
    json!({
        "id": goal.id,
        "name": goal.name,
        "target_amount": goal.target_amount,
        "current_amount": goal.current_amount,
        "currency": goal.currency,
        "deadline": goal.deadline,
        "status": goal.status,
        "created_at": goal.created_at.to_rfc3339(),
        "updated_at": goal.updated_at.to_rfc3339(),
    })
}

fn transaction_json(transaction: &savings_transactions::Model) -> serde_json::Value {
    json!({
        "id": transaction.id,
        "goal_id": transaction.goal_id,
        "amount": transaction.amount,
        "type": transaction.transaction_type,
        "description": transaction.description,
        "linked_expense_id": transaction.linked_expense_id,
        "created_at": transaction.created_at.to_rfc3339(),
    })
}

fn expense_json(expense: &expenses::Model) -> serde_json::Value {
    json!({
        "id": expense.id,
        "amount": expense.amount,
        "currency": expense.currency,
        "description": expense.description,
        "category_id": expense.category_id,
        "payment_method_id": expense.payment_method_id,
        "expense_date": expense.expense_date,
        "funded_by_savings": expense.funded_by_savings,
    })
}

fn map_savings_error(e: &SavingsError) -> axum::response::Response {
    match e {
        SavingsError::Domain(domain) => {
            let (status, error) = match domain {
                DomainError::InsufficientFunds { .. } => {
                    (StatusCode::BAD_REQUEST, "insufficient_funds")
                }
                DomainError::GoalArchived => (StatusCode::CONFLICT, "goal_archived"),
                _ => (StatusCode::BAD_REQUEST, "validation_error"),
            };
            (
                status,
                Json(json!({ "error": error, "message": domain.to_string() })),
            )
                .into_response()
        }
        SavingsError::GoalNotFound(goal_id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Savings goal not found: {goal_id}")
            })),
        )
            .into_response(),
        SavingsError::Conflict => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "conflict",
                "message": "Concurrent update conflict, please retry"
            })),
        )
            .into_response(),
        SavingsError::Database(db_err) => {
            error!(error = %db_err, "Savings operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/savings/goals` - Create a goal.
async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateGoalRequest>,
) -> impl IntoResponse {
    let repo = SavingsRepository::new((*state.db).clone());
    let input = CreateGoalInput {
        owner_id: auth.owner_id(),
        name: payload.name,
        target_amount: payload.target_amount,
        currency: payload.currency,
        deadline: payload.deadline,
    };

    match repo.create_goal(input).await {
        Ok(goal) => (StatusCode::CREATED, Json(goal_json(&goal))).into_response(),
        Err(e) => map_savings_error(&e),
    }
}

/// GET `/savings/goals` - List the caller's goals.
async fn list_goals(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = SavingsRepository::new((*state.db).clone());

    match repo.list_goals(auth.owner_id()).await {
        Ok(goals) => {
            let goals: Vec<serde_json::Value> = goals.iter().map(goal_json).collect();
            (StatusCode::OK, Json(json!({ "goals": goals }))).into_response()
        }
        Err(e) => map_savings_error(&e),
    }
}

/// GET `/savings/goals/{goal_id}` - Get one goal.
async fn get_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SavingsRepository::new((*state.db).clone());

    match repo.get_goal(auth.owner_id(), goal_id).await {
        Ok(goal) => (StatusCode::OK, Json(goal_json(&goal))).into_response(),
        Err(e) => map_savings_error(&e),
    }
}

/// DELETE `/savings/goals/{goal_id}` - Delete a goal and its ledger.
async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SavingsRepository::new((*state.db).clone());

    match repo.delete_goal(auth.owner_id(), goal_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => map_savings_error(&e),
    }
}

/// POST `/savings/goals/{goal_id}/archive` - Terminally close a goal.
async fn archive_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SavingsRepository::new((*state.db).clone());

    match repo.archive_goal(auth.owner_id(), goal_id).await {
        Ok(goal) => (StatusCode::OK, Json(goal_json(&goal))).into_response(),
        Err(e) => map_savings_error(&e),
    }
}

/// POST `/savings/goals/{goal_id}/transactions` - Deposit, withdraw, or
/// spend from savings.
async fn record_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<RecordTransactionRequest>,
) -> impl IntoResponse {
    let repo = SavingsRepository::new((*state.db).clone());

    if payload.create_expense {
        if payload.kind != SavingsTransactionKind::Withdrawal {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_error",
                    "message": "create_expense is only valid for withdrawal transactions"
                })),
            )
                .into_response();
        }

        let input = SpendFromSavingsInput {
            owner_id: auth.owner_id(),
            goal_id,
            amount: payload.amount,
            description: payload.description,
            category_id: payload.category_id,
            payment_method_id: payload.payment_method_id,
            expense_date: payload
                .expense_date
                .unwrap_or_else(|| Utc::now().date_naive()),
        };

        return match repo.spend_from_savings(input).await {
            Ok(outcome) => {
                info!(
                    goal_id = %outcome.goal.id,
                    expense_id = %outcome.expense.id,
                    "Spend-from-savings committed"
                );
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "goal": goal_json(&outcome.goal),
                        "transaction": transaction_json(&outcome.transaction),
                        "expense": expense_json(&outcome.expense),
                    })),
                )
                    .into_response()
            }
            Err(e) => map_savings_error(&e),
        };
    }

    match repo
        .record_transaction(
            auth.owner_id(),
            goal_id,
            payload.kind,
            payload.amount,
            payload.description,
        )
        .await
    {
        Ok(outcome) => {
            info!(
                goal_id = %outcome.goal.id,
                signed_amount = %outcome.transaction.amount,
                "Savings transaction recorded"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "goal": goal_json(&outcome.goal),
                    "transaction": transaction_json(&outcome.transaction),
                })),
            )
                .into_response()
        }
        Err(e) => map_savings_error(&e),
    }
}

/// GET `/savings/goals/{goal_id}/transactions` - Ledger, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SavingsRepository::new((*state.db).clone());

    match repo.list_transactions(auth.owner_id(), goal_id).await {
        Ok(transactions) => {
            let transactions: Vec<serde_json::Value> =
                transactions.iter().map(transaction_json).collect();
            (
                StatusCode::OK,
                Json(json!({ "transactions": transactions })),
            )
                .into_response()
        }
        Err(e) => map_savings_error(&e),
    }
}
