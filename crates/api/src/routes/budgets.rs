//! Budget routes: the general monthly budget, its adjustment ledger,
//! and the category / payment-method allocations.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use kakebo_core::budget::{BudgetError as DomainError, BudgetOverview, Threshold};
use kakebo_db::entities::{budget_adjustments, category_budgets, monthly_budgets, payment_method_budgets};
use kakebo_db::repositories::budget::threshold_from_columns;
use kakebo_db::repositories::{
    BudgetError, BudgetRepository, ExpenseRepository, SetAmountInput, SpendDimension,
    UpsertSubBudgetInput,
};
use kakebo_shared::{DEFAULT_CURRENCY, Period};

/// Creates the budget routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budget", get(get_budget))
        .route("/budget", post(set_budget))
        .route("/budget/adjust", post(adjust_budget))
        .route("/budget/logs", get(list_budget_logs))
        .route("/budget/category", post(upsert_category_budget))
        .route("/budget/category", get(get_category_budget))
        .route("/budget/category", delete(delete_category_budget))
        .route("/budget/category/total", get(category_total))
        .route("/budget/payment-method", post(upsert_payment_method_budget))
        .route("/budget/payment-method", get(get_payment_method_budget))
        .route("/budget/payment-method", delete(delete_payment_method_budget))
        .route("/budget/payment-method/total", get(payment_method_total))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query for reading the general budget.
#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    /// Budget period.
    pub period: Period,
    /// Materialize a zero-amount row instead of returning 404.
    #[serde(default)]
    pub autocreate: bool,
}

/// Query carrying only a period.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Budget period.
    pub period: Period,
}

/// Query addressing one category allocation.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    /// Category ID.
    pub category_id: Uuid,
    /// Budget period.
    pub period: Period,
}

/// Query addressing one payment-method allocation.
#[derive(Debug, Deserialize)]
pub struct PaymentMethodQuery {
    /// Payment-method ID.
    pub payment_method_id: Uuid,
    /// Budget period.
    pub period: Period,
}

/// Request body for the direct-set path of the general budget.
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    /// Budget period.
    pub period: Period,
    /// Target amount.
    pub amount: Decimal,
    /// Currency code.
    pub currency: Option<String>,
    /// Alert threshold.
    pub alert_threshold: Option<Threshold>,
    /// Ledger reason; a default is supplied when omitted.
    pub reason: Option<String>,
}

/// Request body for a ledger adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustBudgetRequest {
    /// Budget period.
    pub period: Period,
    /// Signed delta to apply.
    pub adjustment: Decimal,
    /// Non-empty reason, stored in the ledger.
    pub reason: String,
    /// Client-supplied retry key; a repeat is rejected with 409.
    pub idempotency_key: Option<String>,
}

/// Request body for creating or updating a category allocation.
#[derive(Debug, Deserialize)]
pub struct UpsertCategoryRequest {
    /// Category ID.
    pub category_id: Uuid,
    /// Budget period.
    pub period: Period,
    /// Allocated amount.
    pub amount: Decimal,
    /// Currency code.
    pub currency: Option<String>,
    /// Alert threshold.
    pub alert_threshold: Option<Threshold>,
}

/// Request body for creating or updating a payment-method allocation.
#[derive(Debug, Deserialize)]
pub struct UpsertPaymentMethodRequest {
    /// Payment-method ID.
    pub payment_method_id: Uuid,
    /// Budget period.
    pub period: Period,
    /// Allocated amount.
    pub amount: Decimal,
    /// Currency code.
    pub currency: Option<String>,
    /// Alert threshold.
    pub alert_threshold: Option<Threshold>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn period_string(year: i32, month: i32) -> String {
    format!("{year:04}-{month:02}")
}

fn budget_json(budget: &monthly_budgets::Model) -> serde_json::Value {
    json!({
        "id": budget.id,
        "period": period_string(budget.year, budget.month),
        "amount": budget.amount,
        "currency": budget.currency,
        "alert_threshold": threshold_from_columns(budget.alert_threshold, budget.alert_threshold_kind),
    })
}

fn category_json(row: &category_budgets::Model) -> serde_json::Value {
    json!({
        "id": row.id,
        "category_id": row.category_id,
        "period": period_string(row.year, row.month),
        "amount": row.amount,
        "currency": row.currency,
        "alert_threshold": threshold_from_columns(row.alert_threshold, row.alert_threshold_kind),
    })
}

fn payment_method_json(row: &payment_method_budgets::Model) -> serde_json::Value {
    json!({
        "id": row.id,
        "payment_method_id": row.payment_method_id,
        "period": period_string(row.year, row.month),
        "amount": row.amount,
        "currency": row.currency,
        "alert_threshold": threshold_from_columns(row.alert_threshold, row.alert_threshold_kind),
    })
}

fn entry_json(entry: &budget_adjustments::Model) -> serde_json::Value {
    json!({
        "id": entry.id,
        "delta": entry.delta_amount,
        "previous_total": entry.previous_total,
        "new_total": entry.new_total,
        "reason": entry.reason,
        "type": entry.adjustment_type,
        "created_at": entry.created_at.to_rfc3339(),
    })
}

/// Read-path spend lookup. Aggregator failure degrades to zero with a
/// warning flag instead of failing the whole read.
async fn spent_or_degraded(
    state: &AppState,
    owner_id: Uuid,
    period: Period,
    dimension: Option<SpendDimension>,
) -> (Decimal, bool) {
    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.spent_total(owner_id, period, dimension).await {
        Ok(total) => (total, false),
        Err(e) => {
            warn!(error = %e, %period, "Expense aggregation unavailable, reporting spent as zero");
            (Decimal::ZERO, true)
        }
    }
}

fn map_budget_error(e: &BudgetError) -> axum::response::Response {
    match e {
        BudgetError::Domain(domain) => {
            let error = match domain {
                DomainError::NoGeneralBudget { .. } => "no_general_budget",
                DomainError::ExceedsGeneralBudget { .. } => "exceeds_general_budget",
                DomainError::OverAllocation { .. } => "over_allocation",
                _ => "validation_error",
            };
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error, "message": domain.to_string() })),
            )
                .into_response()
        }
        BudgetError::DuplicateAdjustment(key) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_adjustment",
                "message": format!("An adjustment with idempotency key {key:?} was already recorded")
            })),
        )
            .into_response(),
        BudgetError::Conflict => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "conflict",
                "message": "Concurrent update conflict, please retry"
            })),
        )
            .into_response(),
        BudgetError::Database(db_err) => {
            error!(error = %db_err, "Budget operation failed");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/budget?period&autocreate` - General budget overview with spend.
async fn get_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<BudgetQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    let budget = if query.autocreate {
        match repo
            .get_or_create_monthly(auth.owner_id(), query.period, DEFAULT_CURRENCY)
            .await
        {
            Ok(budget) => budget,
            Err(e) => return map_budget_error(&e),
        }
    } else {
        match repo.get_monthly(auth.owner_id(), query.period).await {
            Ok(Some(budget)) => budget,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": "not_found",
                        "message": format!("No budget for period {}", query.period)
                    })),
                )
                    .into_response();
            }
            Err(e) => return map_budget_error(&e),
        }
    };

    let threshold = threshold_from_columns(budget.alert_threshold, budget.alert_threshold_kind);
    let (spent, degraded) =
        spent_or_degraded(&state, auth.owner_id(), query.period, None).await;
    let overview = BudgetOverview::new(budget.amount, spent, threshold.as_ref());

    (
        StatusCode::OK,
        Json(json!({
            "budget": budget_json(&budget),
            "spent": overview.spent,
            "remaining": overview.remaining,
            "alert_threshold": overview.alert_threshold,
            "alert_reached": overview.alert_reached,
            "spent_unavailable": degraded,
        })),
    )
        .into_response()
}

/// POST `/budget` - Direct set of the general budget amount.
///
/// Routed through the adjustment ledger internally so the audit log and
/// the live amount never diverge.
async fn set_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SetBudgetRequest>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());
    let input = SetAmountInput {
        owner_id: auth.owner_id(),
        period: payload.period,
        amount: payload.amount,
        currency: payload.currency,
        alert_threshold: payload.alert_threshold,
        reason: payload
            .reason
            .unwrap_or_else(|| "amount set directly".to_string()),
    };

    match repo.set_amount(input, DEFAULT_CURRENCY).await {
        Ok((budget, entry)) => {
            info!(
                budget_id = %budget.id,
                amount = %budget.amount,
                "Budget amount set"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "budget": budget_json(&budget),
                    "entry": entry.map(|e| entry_json(&e)),
                })),
            )
                .into_response()
        }
        Err(e) => map_budget_error(&e),
    }
}

/// POST `/budget/adjust` - Apply a signed delta through the ledger.
async fn adjust_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AdjustBudgetRequest>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo
        .adjust(
            auth.owner_id(),
            payload.period,
            payload.adjustment,
            &payload.reason,
            payload.idempotency_key,
            DEFAULT_CURRENCY,
        )
        .await
    {
        Ok(outcome) => {
            info!(
                budget_id = %outcome.budget.id,
                delta = %outcome.entry.delta_amount,
                new_total = %outcome.budget.amount,
                "Budget adjusted"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "budget": budget_json(&outcome.budget),
                    "entry": entry_json(&outcome.entry),
                })),
            )
                .into_response()
        }
        Err(e) => map_budget_error(&e),
    }
}

/// GET `/budget/logs?period` - Adjustment ledger entries, newest first.
async fn list_budget_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.list_adjustments(auth.owner_id(), query.period).await {
        Ok(entries) => {
            let entries: Vec<serde_json::Value> = entries.iter().map(entry_json).collect();
            (StatusCode::OK, Json(json!({ "entries": entries }))).into_response()
        }
        Err(e) => map_budget_error(&e),
    }
}

/// POST `/budget/category` - Create or update a category allocation.
async fn upsert_category_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpsertCategoryRequest>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());
    let input = UpsertSubBudgetInput {
        owner_id: auth.owner_id(),
        dimension_id: payload.category_id,
        period: payload.period,
        amount: payload.amount,
        currency: payload.currency,
        alert_threshold: payload.alert_threshold,
    };

    match repo.upsert_category_budget(input).await {
        Ok(row) => {
            info!(
                category_id = %row.category_id,
                amount = %row.amount,
                "Category budget upserted"
            );
            (StatusCode::OK, Json(category_json(&row))).into_response()
        }
        Err(e) => map_budget_error(&e),
    }
}

/// GET `/budget/category?category_id&period` - Allocation with spend.
async fn get_category_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    let row = match repo
        .get_category_budget(auth.owner_id(), query.category_id, query.period)
        .await
    {
        Ok(row) => row,
        Err(e) => return map_budget_error(&e),
    };

    let (spent, degraded) = spent_or_degraded(
        &state,
        auth.owner_id(),
        query.period,
        Some(SpendDimension::Category(query.category_id)),
    )
    .await;

    let body = row.map_or_else(
        || json!({ "budget": null, "spent": spent, "spent_unavailable": degraded }),
        |row| {
            let threshold = threshold_from_columns(row.alert_threshold, row.alert_threshold_kind);
            let overview = BudgetOverview::new(row.amount, spent, threshold.as_ref());
            json!({
                "budget": category_json(&row),
                "spent": overview.spent,
                "remaining": overview.remaining,
                "alert_threshold": overview.alert_threshold,
                "alert_reached": overview.alert_reached,
                "spent_unavailable": degraded,
            })
        },
    );
    (StatusCode::OK, Json(body)).into_response()
}

/// DELETE `/budget/category?category_id&period` - Remove an allocation.
async fn delete_category_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo
        .delete_category_budget(auth.owner_id(), query.category_id, query.period)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => map_budget_error(&e),
    }
}

/// GET `/budget/category/total?period` - Allocated total for the period.
async fn category_total(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.category_total(auth.owner_id(), query.period).await {
        Ok(total) => (StatusCode::OK, Json(json!({ "total": total }))).into_response(),
        Err(e) => map_budget_error(&e),
    }
}

/// POST `/budget/payment-method` - Create or update a payment-method allocation.
async fn upsert_payment_method_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpsertPaymentMethodRequest>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());
    let input = UpsertSubBudgetInput {
        owner_id: auth.owner_id(),
        dimension_id: payload.payment_method_id,
        period: payload.period,
        amount: payload.amount,
        currency: payload.currency,
        alert_threshold: payload.alert_threshold,
    };

    match repo.upsert_payment_method_budget(input).await {
        Ok(row) => {
            info!(
                payment_method_id = %row.payment_method_id,
                amount = %row.amount,
                "Payment-method budget upserted"
            );
            (StatusCode::OK, Json(payment_method_json(&row))).into_response()
        }
        Err(e) => map_budget_error(&e),
    }
}

/// GET `/budget/payment-method?payment_method_id&period` - Allocation with spend.
async fn get_payment_method_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PaymentMethodQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    let row = match repo
        .get_payment_method_budget(auth.owner_id(), query.payment_method_id, query.period)
        .await
    {
        Ok(row) => row,
        Err(e) => return map_budget_error(&e),
    };

    let (spent, degraded) = spent_or_degraded(
        &state,
        auth.owner_id(),
        query.period,
        Some(SpendDimension::PaymentMethod(query.payment_method_id)),
    )
    .await;

    let body = row.map_or_else(
        || json!({ "budget": null, "spent": spent, "spent_unavailable": degraded }),
        |row| {
            let threshold = threshold_from_columns(row.alert_threshold, row.alert_threshold_kind);
            let overview = BudgetOverview::new(row.amount, spent, threshold.as_ref());
            json!({
                "budget": payment_method_json(&row),
                "spent": overview.spent,
                "remaining": overview.remaining,
                "alert_threshold": overview.alert_threshold,
                "alert_reached": overview.alert_reached,
                "spent_unavailable": degraded,
            })
        },
    );
    (StatusCode::OK, Json(body)).into_response()
}

/// DELETE `/budget/payment-method?payment_method_id&period` - Remove an allocation.
async fn delete_payment_method_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PaymentMethodQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo
        .delete_payment_method_budget(auth.owner_id(), query.payment_method_id, query.period)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => map_budget_error(&e),
    }
}

/// GET `/budget/payment-method/total?period` - Allocated total for the period.
async fn payment_method_total(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.payment_method_total(auth.owner_id(), query.period).await {
        Ok(total) => (StatusCode::OK, Json(json!({ "total": total }))).into_response(),
        Err(e) => map_budget_error(&e),
    }
}
