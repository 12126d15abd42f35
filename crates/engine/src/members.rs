//! Group members.
//!
//! The engine keys members by `user_id`, an opaque identifier assigned by
//! whoever authenticates users. `user_name` is the display name shown in
//! clients and is only used as a fallback matching key when an expense row
//! carries no payer id (see `split`).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// A participant in a group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub group_id: String,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub user_name: String,
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

impl From<&Member> for ActiveModel {
    fn from(member: &Member) -> Self {
        Self {
            group_id: ActiveValue::Set(member.group_id.clone()),
            user_id: ActiveValue::Set(member.user_id.clone()),
            user_name: ActiveValue::Set(member.user_name.clone()),
        }
    }
}

impl From<Model> for Member {
    fn from(model: Model) -> Self {
        Self {
            group_id: model.group_id,
            user_id: model.user_id,
            user_name: model.user_name,
        }
    }
}
