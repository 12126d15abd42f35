use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, prelude::*};

pub use balances::Balance;
pub use error::EngineError;
pub use expenses::Expense;
pub use groups::Group;
pub use members::Member;
pub use split::{EPSILON, GroupStatistics, SettlementInstruction};

mod balances;
mod error;
mod expenses;
mod groups;
mod members;
pub mod split;

type ResultEngine<T> = Result<T, EngineError>;

/// Orchestrates the pure split/settlement core against the database.
///
/// All reads load a complete snapshot for one group before computing;
/// balances are a full rebuild from the current expense set, never an
/// incremental patch. Concurrent recalculations for the same group are
/// not sequenced here: the output is idempotent given identical inputs,
/// so a later pass with fresh inputs overwrites any stale rows.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Create a new group. The creator joins as its first member.
    pub async fn new_group(
        &self,
        name: &str,
        budget: Option<f64>,
        user_id: &str,
        user_name: &str,
    ) -> ResultEngine<String> {
        if let Some(budget) = budget
            && (!budget.is_finite() || budget < 0.0)
        {
            return Err(EngineError::InvalidAmount(
                "budget must be a non-negative number".to_string(),
            ));
        }

        let group = Group::new(name.to_string(), user_id, budget);
        let group_id = group.id.clone();
        let group_model: groups::ActiveModel = (&group).into();
        group_model.insert(&self.database).await?;

        let creator = Member {
            group_id: group_id.clone(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        };
        let member_model: members::ActiveModel = (&creator).into();
        member_model.insert(&self.database).await?;

        Ok(group_id)
    }

    /// Add a user to an existing group.
    pub async fn join_group(
        &self,
        group_id: &str,
        user_id: &str,
        user_name: &str,
    ) -> ResultEngine<()> {
        self.group(group_id).await?;

        let existing = members::Entity::find_by_id((group_id.to_string(), user_id.to_string()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(user_id.to_string()));
        }

        let member = Member {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        };
        let member_model: members::ActiveModel = (&member).into();
        member_model.insert(&self.database).await?;
        Ok(())
    }

    /// Return a group by id.
    pub async fn group(&self, group_id: &str) -> ResultEngine<Group> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(&self.database)
            .await?
            .map(Group::from)
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
    }

    /// Return the groups a user belongs to.
    pub async fn groups_for_user(&self, user_id: &str) -> ResultEngine<Vec<Group>> {
        let rows: Vec<(members::Model, Option<groups::Model>)> = members::Entity::find()
            .filter(members::Column::UserId.eq(user_id))
            .find_also_related(groups::Entity)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, group_model)| group_model.map(Group::from))
            .collect())
    }

    /// Return the members of a group.
    pub async fn members(&self, group_id: &str) -> ResultEngine<Vec<Member>> {
        self.group(group_id).await?;

        let models = members::Entity::find()
            .filter(members::Column::GroupId.eq(group_id))
            .order_by_asc(members::Column::UserId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Member::from).collect())
    }

    /// Record an expense and rebuild the group's balances.
    pub async fn add_expense(
        &self,
        group_id: &str,
        amount: f64,
        description: &str,
        paid_by: &str,
        paid_by_name: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<String> {
        self.group(group_id).await?;

        let expense = Expense::new(
            group_id.to_string(),
            amount,
            description.to_string(),
            paid_by.to_string(),
            paid_by_name.to_string(),
            created_at,
        )?;
        let expense_id = expense.id.clone();
        let expense_model: expenses::ActiveModel = (&expense).into();
        expense_model.insert(&self.database).await?;

        self.recalculate_group(group_id).await?;
        Ok(expense_id)
    }

    /// Remove an expense and rebuild the group's balances.
    pub async fn delete_expense(&self, group_id: &str, expense_id: &str) -> ResultEngine<()> {
        let expense_model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        if expense_model.group_id != group_id {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }

        expenses::Entity::delete_by_id(expense_model.id)
            .exec(&self.database)
            .await?;

        self.recalculate_group(group_id).await?;
        Ok(())
    }

    /// Return a group's expenses, most recent first.
    pub async fn expenses(&self, group_id: &str) -> ResultEngine<Vec<Expense>> {
        self.group(group_id).await?;

        let models = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id))
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Expense::from).collect())
    }

    /// Return the stored balance rows for a group.
    pub async fn balances(&self, group_id: &str) -> ResultEngine<Vec<Balance>> {
        self.group(group_id).await?;

        let models = balances::Entity::find()
            .filter(balances::Column::GroupId.eq(group_id))
            .order_by_asc(balances::Column::UserId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Balance::from).collect())
    }

    /// Rebuild and persist every balance row for a group.
    ///
    /// The fan-out is best-effort: a failed row write is logged and the
    /// remaining members are still processed, so one bad row never
    /// aborts the whole pass. The returned balances are the computed
    /// ones regardless of write outcome; the next pass overwrites
    /// whatever was left stale.
    pub async fn recalculate_group(&self, group_id: &str) -> ResultEngine<Vec<Balance>> {
        let members = self.members(group_id).await?;
        let expenses = self.expenses(group_id).await?;

        let fresh = split::recalculate(&members, &expenses);
        for balance in &fresh {
            if let Err(err) = self.upsert_balance(balance).await {
                tracing::warn!(
                    group_id,
                    user_id = %balance.user_id,
                    "failed to persist balance row: {err}"
                );
            }
        }
        Ok(fresh)
    }

    async fn upsert_balance(&self, balance: &Balance) -> ResultEngine<()> {
        let existing = balances::Entity::find_by_id((
            balance.group_id.clone(),
            balance.user_id.clone(),
        ))
        .one(&self.database)
        .await?;

        let model: balances::ActiveModel = balance.into();
        if existing.is_some() {
            model.update(&self.database).await?;
        } else {
            model.insert(&self.database).await?;
        }
        Ok(())
    }

    /// Derive a settlement plan from the latest stored balances.
    pub async fn settlement_plan(
        &self,
        group_id: &str,
    ) -> ResultEngine<Vec<SettlementInstruction>> {
        let balances = self.balances(group_id).await?;
        Ok(split::settle(&balances))
    }

    /// Return aggregate figures for a group.
    pub async fn statistics(&self, group_id: &str) -> ResultEngine<GroupStatistics> {
        let group = self.group(group_id).await?;
        let expenses = self.expenses(group_id).await?;
        let member_count = members::Entity::find()
            .filter(members::Column::GroupId.eq(group_id))
            .count(&self.database)
            .await? as usize;

        Ok(split::statistics(group.budget, &expenses, member_count))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
