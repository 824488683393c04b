use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::resolve::{resolve_payer, ProfileDirectory};
use crate::schemas::{Expense, Member, Uid};

/// Tolerance below which a balance counts as settled. Half a cent absorbs
/// the division error of the equal-split share; the settlement planner
/// shares the same constant.
pub const EPSILON: f64 = 0.005;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MemberBalance {
    pub uid: Uid,
    pub name: String,
    pub amount_paid: f64,
    pub share: f64,
    pub balance: f64,
}

/// Compute one signed balance per member: what they paid minus their equal
/// share of the project total.
///
/// Payers that resolve to no current member keep their amount in the
/// project total but attribute it to nobody; that data-quality gap is
/// logged, never fatal. Output is sorted by descending balance, members
/// with equal balances staying in membership order.
pub fn compute_balances(
    members: &[Member],
    expenses: &[Expense],
    profiles: &impl ProfileDirectory,
) -> Vec<MemberBalance> {
    if members.is_empty() {
        return Vec::new();
    }

    let mut paid: HashMap<Uid, f64> = HashMap::new();
    let mut total = 0.0;
    for expense in expenses {
        total += expense.amount;
        match resolve_payer(&expense.payer, members, profiles) {
            Some(uid) => {
                *paid.entry(uid).or_insert(0.0) += expense.amount;
            }
            None => {
                tracing::warn!(
                    payer = %expense.payer,
                    amount = expense.amount,
                    "expense payer matches no member; amount kept in total but unattributed"
                );
            }
        }
    }

    let share = total / members.len() as f64;
    let mut balances: Vec<MemberBalance> = members
        .iter()
        .map(|member| {
            let amount_paid = paid.get(&member.uid).copied().unwrap_or(0.0);
            MemberBalance {
                uid: member.uid.clone(),
                name: member.name.clone(),
                amount_paid,
                share,
                balance: amount_paid - share,
            }
        })
        .collect();

    // Stable sort: ties keep membership order.
    balances.sort_by(|a, b| b.balance.total_cmp(&a.balance));
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::Profile;
    use crate::store::ProfileBook;
    use chrono::Utc;

    fn member(uid: &str, name: &str) -> Member {
        Member {
            uid: uid.to_string(),
            name: name.to_string(),
        }
    }

    fn expense(payer: &str, amount: f64) -> Expense {
        Expense {
            title: "expense".to_string(),
            amount,
            payer: payer.to_string(),
            created_at: Utc::now(),
        }
    }

    fn book_for(members: &[Member]) -> ProfileBook {
        let mut book = ProfileBook::default();
        for m in members {
            book.insert(Profile {
                uid: m.uid.clone(),
                name: m.name.clone(),
                email: None,
                avatar_url: None,
            });
        }
        book
    }

    #[test]
    fn two_members_single_payer_split_down_the_middle() {
        let members = [member("u1", "Alice"), member("u2", "Bob")];
        let profiles = book_for(&members);
        let expenses = [expense("u1", 100.0)];

        let balances = compute_balances(&members, &expenses, &profiles);
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].uid, "u1");
        assert_eq!(balances[0].amount_paid, 100.0);
        assert_eq!(balances[0].share, 50.0);
        assert_eq!(balances[0].balance, 50.0);
        assert_eq!(balances[1].uid, "u2");
        assert_eq!(balances[1].amount_paid, 0.0);
        assert_eq!(balances[1].balance, -50.0);
    }

    #[test]
    fn zero_amount_expenses_count_for_attribution_but_not_share() {
        let members = [member("a", "A"), member("b", "B"), member("c", "C")];
        let profiles = book_for(&members);
        let expenses = [expense("a", 90.0), expense("b", 0.0), expense("c", 0.0)];

        let balances = compute_balances(&members, &expenses, &profiles);
        assert_eq!(balances[0].uid, "a");
        assert_eq!(balances[0].balance, 60.0);
        assert_eq!(balances[0].share, 30.0);
        // -30 tie keeps membership order
        assert_eq!(balances[1].uid, "b");
        assert_eq!(balances[1].balance, -30.0);
        assert_eq!(balances[2].uid, "c");
        assert_eq!(balances[2].balance, -30.0);
    }

    #[test]
    fn no_expenses_means_everyone_is_settled() {
        let members = [member("a", "A"), member("b", "B"), member("c", "C")];
        let profiles = book_for(&members);

        let balances = compute_balances(&members, &[], &profiles);
        assert_eq!(balances.len(), 3);
        for entry in &balances {
            assert_eq!(entry.balance, 0.0);
            assert_eq!(entry.amount_paid, 0.0);
            assert_eq!(entry.share, 0.0);
        }
        // all-zero sort keeps membership order
        let uids: Vec<&str> = balances.iter().map(|b| b.uid.as_str()).collect();
        assert_eq!(uids, ["a", "b", "c"]);
    }

    #[test]
    fn unresolvable_payer_stays_in_the_total_without_attribution() {
        let members = [member("u1", "Alice"), member("u2", "Bob")];
        let profiles = book_for(&members);
        let expenses = [expense("u1", 40.0), expense("nobody", 20.0)];

        let balances = compute_balances(&members, &expenses, &profiles);
        // total 60, share 30; the orphaned 20 lifted everyone's share
        assert_eq!(balances[0].uid, "u1");
        assert_eq!(balances[0].amount_paid, 40.0);
        assert_eq!(balances[0].balance, 10.0);
        assert_eq!(balances[1].uid, "u2");
        assert_eq!(balances[1].balance, -30.0);
    }

    #[test]
    fn single_member_is_always_settled() {
        let members = [member("solo", "Solo")];
        let profiles = book_for(&members);
        let expenses = [expense("solo", 12.34), expense("solo", 0.66)];

        let balances = compute_balances(&members, &expenses, &profiles);
        assert_eq!(balances.len(), 1);
        assert!(balances[0].balance.abs() < EPSILON);
    }

    #[test]
    fn empty_member_set_short_circuits() {
        let profiles = ProfileBook::default();
        let balances = compute_balances(&[], &[expense("u1", 10.0)], &profiles);
        assert!(balances.is_empty());
    }

    #[test]
    fn legacy_name_payers_resolve_through_profiles() {
        let members = [member("u1", "Alice"), member("u2", "Bob")];
        let profiles = book_for(&members);
        let expenses = [expense(" ALICE ", 10.0)];

        let balances = compute_balances(&members, &expenses, &profiles);
        assert_eq!(balances[0].uid, "u1");
        assert_eq!(balances[0].amount_paid, 10.0);
    }

    #[test]
    fn balances_sum_to_zero_for_awkward_amounts() {
        let members = [member("a", "A"), member("b", "B"), member("c", "C")];
        let profiles = book_for(&members);
        let expenses = [
            expense("a", 10.10),
            expense("b", 0.33),
            expense("c", 7.77),
            expense("a", 99.99),
        ];

        let balances = compute_balances(&members, &expenses, &profiles);
        let sum: f64 = balances.iter().map(|b| b.balance).sum();
        assert!(sum.abs() < EPSILON, "residual sum {sum}");
        // sorted descending
        for pair in balances.windows(2) {
            assert!(pair[0].balance >= pair[1].balance);
        }
    }

    #[test]
    fn recomputation_is_idempotent() {
        let members = [member("a", "A"), member("b", "B")];
        let profiles = book_for(&members);
        let expenses = [expense("a", 33.33), expense("b", 66.67)];

        let first = compute_balances(&members, &expenses, &profiles);
        let second = compute_balances(&members, &expenses, &profiles);
        assert_eq!(first, second);
    }
}
