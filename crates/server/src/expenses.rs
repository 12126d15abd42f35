//! Expense API endpoints

use api_types::expense::{
    ExpenseCreated, ExpenseDelete, ExpenseList, ExpenseNew, ExpenseView, ExpensesResponse,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;

use crate::{ServerError, server::ServerState};

/// Handle requests for recording a new expense.
///
/// Recording triggers a full balance rebuild for the group.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseCreated>, ServerError> {
    let id = state
        .engine
        .add_expense(
            &payload.group_id,
            payload.amount,
            &payload.description,
            &payload.paid_by,
            &payload.paid_by_name,
            payload.created_at.with_timezone(&Utc),
        )
        .await?;

    Ok(Json(ExpenseCreated { id }))
}

/// Handle requests for listing a group's expenses.
pub async fn list(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseList>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state.engine.expenses(&payload.group_id).await?;

    Ok(Json(ExpensesResponse {
        expenses: expenses
            .into_iter()
            .map(|expense| ExpenseView {
                id: expense.id,
                amount: expense.amount,
                description: expense.description,
                paid_by: expense.paid_by,
                paid_by_name: expense.paid_by_name,
                created_at: expense.created_at.fixed_offset(),
            })
            .collect(),
    }))
}

/// Handle requests for deleting an expense.
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseDelete>,
) -> Result<Json<()>, ServerError> {
    state.engine.delete_expense(&payload.group_id, &id).await?;
    Ok(Json(()))
}
