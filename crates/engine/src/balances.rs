//! Derived balance rows, one per member per group.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// A member's net position within a group.
///
/// `net_balance = total_paid - total_owed`. Positive means the group owes
/// the member money, negative means the member owes the group. Rows are
/// overwritten wholesale on every recalculation pass, so they are always a
/// pure function of the current expense set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub group_id: String,
    pub user_id: String,
    pub user_name: String,
    pub total_paid: f64,
    pub total_owed: f64,
    pub net_balance: f64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub user_name: String,
    #[sea_orm(column_type = "Double")]
    pub total_paid: f64,
    #[sea_orm(column_type = "Double")]
    pub total_owed: f64,
    #[sea_orm(column_type = "Double")]
    pub net_balance: f64,
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

impl From<&Balance> for ActiveModel {
    fn from(balance: &Balance) -> Self {
        Self {
            group_id: ActiveValue::Set(balance.group_id.clone()),
            user_id: ActiveValue::Set(balance.user_id.clone()),
            user_name: ActiveValue::Set(balance.user_name.clone()),
            total_paid: ActiveValue::Set(balance.total_paid),
            total_owed: ActiveValue::Set(balance.total_owed),
            net_balance: ActiveValue::Set(balance.net_balance),
        }
    }
}

impl From<Model> for Balance {
    fn from(model: Model) -> Self {
        Self {
            group_id: model.group_id,
            user_id: model.user_id,
            user_name: model.user_name,
            total_paid: model.total_paid,
            total_owed: model.total_owed,
            net_balance: model.net_balance,
        }
    }
}
