//! Pure balance and settlement math over a group's shared expense ledger.
//!
//! Everything in this module is a synchronous function over in-memory
//! snapshots: the caller fetches members, expenses and balances, invokes
//! these functions, and persists the output. The functions never touch
//! the database and never mutate their inputs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::{balances::Balance, expenses::Expense, members::Member};

/// Amounts within this distance of zero count as settled.
///
/// One cent of slack absorbs the floating-point residue an equal split
/// leaves behind; anything smaller than a minor currency unit cannot be
/// transferred anyway.
pub const EPSILON: f64 = 0.01;

/// Rounds to 2 decimal places, half away from zero.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Canonical form of a display name for fallback matching: NFKC,
/// trimmed, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().nfkc().collect::<String>().to_lowercase()
}

/// A recommended transfer from one member to another.
///
/// Produced fresh on every solve and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementInstruction {
    pub from_user: String,
    pub from_user_name: String,
    pub to_user: String,
    pub to_user_name: String,
    pub amount: f64,
}

/// Aggregate figures for a group, derived on every group-detail load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub total_expenses: f64,
    pub member_count: usize,
    pub per_person_share: f64,
    pub budget: Option<f64>,
    pub remaining_budget: Option<f64>,
}

/// Rebuilds every member's balance from the full expense set.
///
/// Each member owes an equal share of the total regardless of individual
/// consumption. What a member paid is aggregated twice: by payer id and
/// by normalized payer display name. The id aggregate wins whenever it
/// carries any nonzero amount, even if the name aggregate disagrees; the
/// name path only exists to reconcile legacy rows where the payer was
/// recorded by display name alone.
///
/// An expense whose `paid_by` matches no member id and whose
/// `paid_by_name` matches no member name still raises the total (and so
/// everyone's share) but is claimed by nobody. That is a known
/// reconciliation gap, not an error.
pub fn recalculate(members: &[Member], expenses: &[Expense]) -> Vec<Balance> {
    if members.is_empty() {
        return Vec::new();
    }

    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();
    let per_person = total / members.len() as f64;

    let mut paid_by_id: HashMap<&str, f64> = HashMap::new();
    let mut paid_by_name: HashMap<String, f64> = HashMap::new();
    for expense in expenses {
        *paid_by_id.entry(expense.paid_by.as_str()).or_insert(0.0) += expense.amount;
        *paid_by_name
            .entry(normalize_name(&expense.paid_by_name))
            .or_insert(0.0) += expense.amount;
    }

    members
        .iter()
        .map(|member| {
            let via_id = paid_by_id
                .get(member.user_id.as_str())
                .copied()
                .unwrap_or(0.0);
            let via_name = paid_by_name
                .get(&normalize_name(&member.user_name))
                .copied()
                .unwrap_or(0.0);
            let total_paid = if via_id > 0.0 { via_id } else { via_name };

            Balance {
                group_id: member.group_id.clone(),
                user_id: member.user_id.clone(),
                user_name: member.user_name.clone(),
                total_paid,
                total_owed: per_person,
                net_balance: total_paid - per_person,
            }
        })
        .collect()
}

/// Derives a settlement plan from the current balances.
///
/// Greedy two-cursor matching over the creditor and debtor queues, both
/// sorted descending by absolute balance so the output is deterministic.
/// Each step transfers `min(credit, debt)` and advances whichever side
/// dropped inside [`EPSILON`] (both, on an exact match). This minimizes
/// the transaction count for simple cases; it is not a min-cost-flow
/// solve.
///
/// Emitted amounts are rounded to cents. Residue below [`EPSILON`] left
/// when either queue runs out is dropped without a reconciliation pass.
pub fn settle(balances: &[Balance]) -> Vec<SettlementInstruction> {
    struct Party<'a> {
        who: &'a Balance,
        remaining: f64,
    }

    let mut creditors: Vec<Party<'_>> = balances
        .iter()
        .filter(|balance| balance.net_balance > EPSILON)
        .map(|balance| Party {
            who: balance,
            remaining: balance.net_balance,
        })
        .collect();
    let mut debtors: Vec<Party<'_>> = balances
        .iter()
        .filter(|balance| balance.net_balance < -EPSILON)
        .map(|balance| Party {
            who: balance,
            remaining: -balance.net_balance,
        })
        .collect();

    creditors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));
    debtors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));

    let mut instructions = Vec::new();
    let (mut credit_idx, mut debt_idx) = (0, 0);
    while credit_idx < creditors.len() && debt_idx < debtors.len() {
        let amount = creditors[credit_idx]
            .remaining
            .min(debtors[debt_idx].remaining);

        instructions.push(SettlementInstruction {
            from_user: debtors[debt_idx].who.user_id.clone(),
            from_user_name: debtors[debt_idx].who.user_name.clone(),
            to_user: creditors[credit_idx].who.user_id.clone(),
            to_user_name: creditors[credit_idx].who.user_name.clone(),
            amount: round_to_cents(amount),
        });

        creditors[credit_idx].remaining -= amount;
        debtors[debt_idx].remaining -= amount;
        if creditors[credit_idx].remaining < EPSILON {
            credit_idx += 1;
        }
        if debtors[debt_idx].remaining < EPSILON {
            debt_idx += 1;
        }
    }

    instructions
}

/// Aggregate figures over already-validated inputs; pure arithmetic.
pub fn statistics(
    budget: Option<f64>,
    expenses: &[Expense],
    member_count: usize,
) -> GroupStatistics {
    let total_expenses: f64 = expenses.iter().map(|expense| expense.amount).sum();
    let per_person_share = if member_count > 0 {
        total_expenses / member_count as f64
    } else {
        0.0
    };

    GroupStatistics {
        total_expenses,
        member_count,
        per_person_share,
        budget,
        remaining_budget: budget.map(|budget| budget - total_expenses),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn member(user_id: &str, user_name: &str) -> Member {
        Member {
            group_id: "g1".to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        }
    }

    fn expense(paid_by: &str, paid_by_name: &str, amount: f64) -> Expense {
        Expense {
            id: format!("e-{paid_by}-{amount}"),
            group_id: "g1".to_string(),
            amount,
            description: "test".to_string(),
            paid_by: paid_by.to_string(),
            paid_by_name: paid_by_name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn balance(user_id: &str, net: f64) -> Balance {
        Balance {
            group_id: "g1".to_string(),
            user_id: user_id.to_string(),
            user_name: user_id.to_uppercase(),
            total_paid: 0.0,
            total_owed: 0.0,
            net_balance: net,
        }
    }

    /// Applies instructions to working copies and returns the results.
    fn apply(balances: &[Balance], instructions: &[SettlementInstruction]) -> Vec<f64> {
        balances
            .iter()
            .map(|b| {
                let mut net = b.net_balance;
                for instruction in instructions {
                    if instruction.from_user == b.user_id {
                        net += instruction.amount;
                    }
                    if instruction.to_user == b.user_id {
                        net -= instruction.amount;
                    }
                }
                net
            })
            .collect()
    }

    #[test]
    fn no_members_yields_no_balances() {
        assert!(recalculate(&[], &[expense("u1", "Ann", 10.0)]).is_empty());
    }

    #[test]
    fn no_expenses_yields_zero_balances() {
        let members = [member("u1", "Ann"), member("u2", "Bob")];
        let balances = recalculate(&members, &[]);
        assert_eq!(balances.len(), 2);
        for b in &balances {
            assert_eq!(b.total_paid, 0.0);
            assert_eq!(b.total_owed, 0.0);
            assert_eq!(b.net_balance, 0.0);
        }
    }

    #[test]
    fn equal_split_conserves_money() {
        let members = [
            member("u1", "Ann"),
            member("u2", "Bob"),
            member("u3", "Cleo"),
        ];
        let expenses = [
            expense("u1", "Ann", 90.0),
            expense("u2", "Bob", 30.0),
            expense("u1", "Ann", 12.5),
        ];
        let balances = recalculate(&members, &expenses);

        let net_sum: f64 = balances.iter().map(|b| b.net_balance).sum();
        assert!(net_sum.abs() < EPSILON);

        let owed_sum: f64 = balances.iter().map(|b| b.total_owed).sum();
        assert!((owed_sum - 132.5).abs() < EPSILON);
    }

    #[test]
    fn recalculate_is_idempotent() {
        let members = [member("u1", "Ann"), member("u2", "Bob")];
        let expenses = [expense("u1", "Ann", 80.0), expense("u2", "Bob", 20.0)];
        assert_eq!(
            recalculate(&members, &expenses),
            recalculate(&members, &expenses)
        );
    }

    #[test]
    fn identity_match_wins_over_name_match() {
        // 50 recorded under Bob's id, 80 under his display name but a
        // different payer id. Identity wins whenever it is nonzero.
        let members = [member("u2", "Bob")];
        let expenses = [expense("u2", "Someone Else", 50.0), expense("u9", "Bob", 80.0)];
        let balances = recalculate(&members, &expenses);
        assert_eq!(balances[0].total_paid, 50.0);
    }

    #[test]
    fn name_fallback_covers_legacy_rows() {
        // Legacy rows recorded no payer id; normalized name matching
        // still attributes them.
        let members = [member("u1", "Ann"), member("u2", "Bob")];
        let expenses = [expense("", "  ANN ", 40.0)];
        let balances = recalculate(&members, &expenses);
        assert_eq!(balances[0].total_paid, 40.0);
        assert_eq!(balances[1].total_paid, 0.0);
    }

    #[test]
    fn name_collision_double_counts_under_fallback() {
        // Known limitation: two members sharing a normalized display name
        // both claim the same name aggregate when neither has an id match.
        let members = [member("u1", "Sam"), member("u2", "sam")];
        let expenses = [expense("", "Sam", 30.0)];
        let balances = recalculate(&members, &expenses);
        assert_eq!(balances[0].total_paid, 30.0);
        assert_eq!(balances[1].total_paid, 30.0);
    }

    #[test]
    fn settled_group_produces_no_instructions() {
        let balances = [balance("u1", 0.0), balance("u2", 0.005), balance("u3", -0.005)];
        assert!(settle(&balances).is_empty());
    }

    #[test]
    fn single_pair_settles_with_one_instruction() {
        let balances = [balance("u1", 100.0), balance("u2", -100.0)];
        let instructions = settle(&balances);
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].from_user, "u2");
        assert_eq!(instructions[0].to_user, "u1");
        assert_eq!(instructions[0].amount, 100.0);
    }

    #[test]
    fn three_parties_settle_with_two_instructions() {
        let balances = [
            balance("u1", 60.0),
            balance("u2", 40.0),
            balance("u3", -100.0),
        ];
        let instructions = settle(&balances);
        assert_eq!(instructions.len(), 2);
        // Largest creditor is matched first.
        assert_eq!(instructions[0].to_user, "u1");
        assert_eq!(instructions[0].amount, 60.0);
        assert_eq!(instructions[1].to_user, "u2");
        assert_eq!(instructions[1].amount, 40.0);
        let total: f64 = instructions.iter().map(|t| t.amount).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn exact_match_advances_both_cursors() {
        let balances = [
            balance("u1", 50.0),
            balance("u2", 50.0),
            balance("u3", -50.0),
            balance("u4", -50.0),
        ];
        let instructions = settle(&balances);
        assert_eq!(instructions.len(), 2);
        assert!(instructions.iter().all(|t| t.amount == 50.0));
        // No pair appears twice.
        assert_ne!(instructions[0].from_user, instructions[1].from_user);
        assert_ne!(instructions[0].to_user, instructions[1].to_user);
    }

    #[test]
    fn applying_instructions_zeroes_all_balances() {
        let balances = [
            balance("u1", 70.5),
            balance("u2", 29.5),
            balance("u3", -50.0),
            balance("u4", -50.0),
        ];
        let instructions = settle(&balances);
        for net in apply(&balances, &instructions) {
            assert!(net.abs() <= EPSILON, "residual balance {net}");
        }
    }

    #[test]
    fn rounded_three_way_split_sums_to_the_debt() {
        // A 100.00 bill split three ways leaves 33.33/33.33/33.34; the
        // instruction amounts must add back to exactly 100.00.
        let balances = [
            balance("u1", 33.33),
            balance("u2", 33.33),
            balance("u3", 33.34),
            balance("u4", -100.0),
        ];
        let instructions = settle(&balances);
        assert_eq!(instructions.len(), 3);
        let cents: i64 = instructions
            .iter()
            .map(|t| (t.amount * 100.0).round() as i64)
            .sum();
        assert_eq!(cents, 100_00);
    }

    #[test]
    fn round_to_cents_is_half_away_from_zero() {
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(-0.125), -0.13);
        assert_eq!(round_to_cents(12.344), 12.34);
        assert_eq!(round_to_cents(12.346), 12.35);
    }

    #[test]
    fn normalize_name_trims_and_case_folds() {
        assert_eq!(normalize_name("  Ann "), "ann");
        assert_eq!(normalize_name("BOB"), normalize_name("bob"));
    }

    #[test]
    fn statistics_with_budget() {
        let expenses = [expense("u1", "Ann", 75.0), expense("u2", "Bob", 25.0)];
        let stats = statistics(Some(150.0), &expenses, 4);
        assert_eq!(stats.total_expenses, 100.0);
        assert_eq!(stats.per_person_share, 25.0);
        assert_eq!(stats.budget, Some(150.0));
        assert_eq!(stats.remaining_budget, Some(50.0));
    }

    #[test]
    fn statistics_without_budget_has_no_remaining() {
        let stats = statistics(None, &[expense("u1", "Ann", 10.0)], 2);
        assert_eq!(stats.budget, None);
        assert_eq!(stats.remaining_budget, None);
    }

    #[test]
    fn statistics_over_empty_group_avoids_division() {
        let stats = statistics(None, &[], 0);
        assert_eq!(stats.per_person_share, 0.0);
        assert_eq!(stats.total_expenses, 0.0);
    }
}
