use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive, Zero};

use super::scoring::round3;
use crate::models::{Allocation, Candidate};

// Hard bounds on the search: at most the 10 best-scored candidates,
// combination sizes 2 and 3. Worst case C(10,2) + C(10,3) = 165 sums
// per payment.
pub(crate) const POOL_LIMIT: usize = 10;
pub(crate) const MAX_COMBINATION: usize = 3;

/// A multi-invoice settlement found by the bounded search.
#[derive(Debug, Clone)]
pub(crate) struct CombinationMatch {
    pub indices: Vec<usize>,    // invoice pool indices to consume
    pub allocations: Vec<Allocation>,
    pub score: f64,
    pub exact: bool,            // summed within tolerance of the payment amount
}

/// Search 2- and 3-invoice combinations whose totals sum to the payment
/// amount within `max(1.0, 1% of amount)`.
///
/// The first in-tolerance combination in generation order (sizes 2 before 3,
/// candidates in score order) wins outright, scored as the mean of its
/// candidate scores. Otherwise the best approximate combination seen is
/// returned, scored `0.7 * mean(candidate scores) + 0.3 * amount closeness`;
/// the caller decides whether that clears its acceptance threshold.
pub(crate) fn find_combination(
    payment_amount: &BigDecimal,
    candidates: &[Candidate],
) -> Option<CombinationMatch> {
    let pool = &candidates[..candidates.len().min(POOL_LIMIT)];
    if pool.len() < 2 {
        return None;
    }

    let tolerance = tolerance_for(payment_amount);
    let mut best: Option<CombinationMatch> = None;

    for size in 2..=MAX_COMBINATION.min(pool.len()) {
        for combo in index_combinations(pool.len(), size) {
            let mut sum = BigDecimal::zero();
            for &i in &combo {
                sum += &pool[i].invoice.total;
            }
            let mean_score =
                combo.iter().map(|&i| pool[i].score).sum::<f64>() / combo.len() as f64;

            if (&sum - payment_amount).abs() <= tolerance {
                return Some(build_match(pool, &combo, round3(mean_score), true));
            }

            let closeness = amount_closeness(&sum, payment_amount);
            let score = mean_score * 0.7 + closeness * 0.3;
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(build_match(pool, &combo, round3(score), false));
            }
        }
    }

    best
}

/// Absolute tolerance on the summed total: `max(1.0, 1% of amount)`.
fn tolerance_for(amount: &BigDecimal) -> BigDecimal {
    let one_percent = amount.to_f64().unwrap_or(0.0) * 0.01;
    BigDecimal::from_f64(one_percent.max(1.0)).unwrap_or_else(|| BigDecimal::from(1))
}

/// Closeness of the summed total to the payment amount; may go negative for
/// wildly-off sums, which only drags the blended score down.
fn amount_closeness(sum: &BigDecimal, payment_amount: &BigDecimal) -> f64 {
    let s = sum.to_f64().unwrap_or(0.0);
    let p = payment_amount.to_f64().unwrap_or(0.0);
    1.0 - (s - p).abs() / p.max(s).max(1.0)
}

fn build_match(pool: &[Candidate], combo: &[usize], score: f64, exact: bool) -> CombinationMatch {
    CombinationMatch {
        indices: combo.iter().map(|&i| pool[i].invoice_idx).collect(),
        allocations: combo
            .iter()
            .map(|&i| Allocation {
                invoice: pool[i].invoice.clone(),
                allocated: pool[i].invoice.total.clone(),
            })
            .collect(),
        score,
        exact,
    }
}

/// Lexicographic k-combinations of `0..n`, emitted in generation order.
/// Explicit iterator rather than short-circuit recursion so the evaluation
/// count stays provably capped.
struct IndexCombinations {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    done: bool,
}

fn index_combinations(n: usize, k: usize) -> IndexCombinations {
    IndexCombinations {
        n,
        k,
        indices: (0..k).collect(),
        done: k == 0 || k > n,
    }
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // advance rightmost index that still has room
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] + 1 <= self.n - (self.k - i) {
                self.indices[i] += 1;
                for j in i + 1..self.k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}
