//! The module contains the representation of an expense-sharing group.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A group of people sharing expenses.
///
/// A group holds the members, the shared expense ledger and the derived
/// balance rows. The optional `budget` is a spending ceiling used only for
/// statistics; nothing in the engine stops a group from exceeding it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    /// Stable identifier, a UUID generated once and persisted so the group
    /// can be renamed without breaking references.
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub budget: Option<f64>,
}

impl Group {
    pub fn new(name: String, created_by: &str, budget: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_by: created_by.to_string(),
            budget,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub created_by: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub budget: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::members::Entity")]
    Members,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::balances::Entity")]
    Balances,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Group> for ActiveModel {
    fn from(group: &Group) -> Self {
        Self {
            id: ActiveValue::Set(group.id.clone()),
            name: ActiveValue::Set(group.name.clone()),
            created_by: ActiveValue::Set(group.created_by.clone()),
            budget: ActiveValue::Set(group.budget),
        }
    }
}

impl From<Model> for Group {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_by: model.created_by,
            budget: model.budget,
        }
    }
}
