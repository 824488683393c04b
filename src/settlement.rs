use serde::{Deserialize, Serialize};

use crate::balance::{MemberBalance, EPSILON};
use crate::error::Error;
use crate::schemas::Uid;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Transfer {
    pub from: Uid,
    pub to: Uid,
    pub amount: f64,
}

struct Party {
    uid: Uid,
    /// Outstanding magnitude in whole cents.
    remaining: i64,
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn to_currency(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Plan the transfers that settle a balance vector.
///
/// Greedy largest-debtor / largest-creditor matching: at most
/// `debtors + creditors - 1` transfers, every amount a positive whole-cent
/// value. Balances beyond EPSILON are quantized to cents up front, the
/// quantization gap pinned on the largest party, so the matching runs in
/// exact integer arithmetic and both sides reach zero together. A balance
/// vector that does not sum to zero within EPSILON is an upstream bug and
/// comes back as `Error::ResidualImbalance`.
pub fn plan_settlement(balances: &[MemberBalance]) -> Result<Vec<Transfer>, Error> {
    let residual: f64 = balances.iter().map(|b| b.balance).sum();
    if residual.abs() > EPSILON {
        return Err(Error::ResidualImbalance { residual });
    }

    let mut debtors: Vec<Party> = Vec::new();
    let mut creditors: Vec<Party> = Vec::new();
    for entry in balances {
        if entry.balance < -EPSILON {
            debtors.push(Party {
                uid: entry.uid.clone(),
                remaining: to_cents(-entry.balance),
            });
        } else if entry.balance > EPSILON {
            creditors.push(Party {
                uid: entry.uid.clone(),
                remaining: to_cents(entry.balance),
            });
        }
    }

    // Cent quantization can leave the sides a few cents apart; the largest
    // party absorbs the gap so the greedy pass terminates at exact zero.
    let debt: i64 = debtors.iter().map(|p| p.remaining).sum();
    let credit: i64 = creditors.iter().map(|p| p.remaining).sum();
    match credit - debt {
        0 => {}
        gap if gap > 0 => absorb_gap(&mut creditors, gap),
        gap => absorb_gap(&mut debtors, -gap),
    }
    debtors.retain(|p| p.remaining > 0);
    creditors.retain(|p| p.remaining > 0);

    let by_magnitude =
        |a: &Party, b: &Party| b.remaining.cmp(&a.remaining).then_with(|| a.uid.cmp(&b.uid));
    debtors.sort_by(by_magnitude);
    creditors.sort_by(by_magnitude);

    let mut transfers = Vec::new();
    let (mut d, mut c) = (0, 0);
    while d < debtors.len() && c < creditors.len() {
        let amount = debtors[d].remaining.min(creditors[c].remaining);
        transfers.push(Transfer {
            from: debtors[d].uid.clone(),
            to: creditors[c].uid.clone(),
            amount: to_currency(amount),
        });
        debtors[d].remaining -= amount;
        creditors[c].remaining -= amount;
        if debtors[d].remaining == 0 {
            d += 1;
        }
        if creditors[c].remaining == 0 {
            c += 1;
        }
    }

    let leftover: i64 = debtors[d..]
        .iter()
        .chain(creditors[c..].iter())
        .map(|p| p.remaining)
        .sum();
    if leftover != 0 {
        return Err(Error::ResidualImbalance {
            residual: to_currency(leftover),
        });
    }
    Ok(transfers)
}

fn absorb_gap(parties: &mut [Party], gap: i64) {
    if let Some(largest) = parties.iter_mut().max_by_key(|p| p.remaining) {
        largest.remaining -= gap;
    }
}
