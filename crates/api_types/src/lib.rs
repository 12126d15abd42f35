use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub budget: Option<f64>,
        pub user_id: String,
        pub user_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupGet {
        /// Group id (UUID serialized as a string).
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsGet {
        pub user_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Group {
        pub id: String,
        pub name: String,
        pub created_by: String,
        pub budget: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        pub groups: Vec<Group>,
    }
}

pub mod member {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberJoin {
        pub group_id: String,
        pub user_id: String,
        pub user_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberList {
        pub group_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: String,
        pub user_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub group_id: String,
        pub amount: f64,
        pub description: String,
        pub paid_by: String,
        pub paid_by_name: String,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub group_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseDelete {
        pub group_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: String,
        pub amount: f64,
        pub description: String,
        pub paid_by: String,
        pub paid_by_name: String,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceList {
        pub group_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_id: String,
        pub user_name: String,
        pub total_paid: f64,
        pub total_owed: f64,
        pub net_balance: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<BalanceView>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementGet {
        pub group_id: String,
    }

    /// A recommended transfer; applying all of them zeroes the balances.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementInstruction {
        pub from_user: String,
        pub from_user_name: String,
        pub to_user: String,
        pub to_user_name: String,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementResponse {
        pub instructions: Vec<SettlementInstruction>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatsGet {
        pub group_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Statistic {
        pub total_expenses: f64,
        pub member_count: usize,
        pub per_person_share: f64,
        pub budget: Option<f64>,
        pub remaining_budget: Option<f64>,
    }
}
