//! The module contains the `Expense` type representing one recorded outlay.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A single recorded outlay attributed to one paying member.
///
/// Expenses are immutable once recorded; balances are always rebuilt from
/// the full expense set, never patched incrementally. `paid_by` is the
/// payer's stable id. `paid_by_name` is kept alongside it because legacy
/// rows recorded the payer only by display name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub group_id: String,
    pub amount: f64,
    pub description: String,
    pub paid_by: String,
    pub paid_by_name: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        group_id: String,
        amount: f64,
        description: String,
        paid_by: String,
        paid_by_name: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EngineError::InvalidAmount(
                "amount must be a non-negative number".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            group_id,
            amount,
            description,
            paid_by,
            paid_by_name,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    pub description: String,
    pub paid_by: String,
    pub paid_by_name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.clone()),
            group_id: ActiveValue::Set(expense.group_id.clone()),
            amount: ActiveValue::Set(expense.amount),
            description: ActiveValue::Set(expense.description.clone()),
            paid_by: ActiveValue::Set(expense.paid_by.clone()),
            paid_by_name: ActiveValue::Set(expense.paid_by_name.clone()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            amount: model.amount,
            description: model.description,
            paid_by: model.paid_by,
            paid_by_name: model.paid_by_name,
            created_at: model.created_at,
        }
    }
}
