use log::debug;

use crate::config::*;

/// Raw rank 1 (the best) weighs 3 and raw rank 3 weighs 1. Any other value
/// weighs nothing.
pub fn reversal_weight(rank: f64) -> f64 {
    if rank == 1.0 {
        3.0
    } else if rank == 2.0 {
        2.0
    } else if rank == 3.0 {
        1.0
    } else {
        0.0
    }
}

fn numbers(cells: &[CellValue]) -> impl Iterator<Item = f64> + '_ {
    cells.iter().filter_map(|c| c.as_number())
}

/// Counts the 1, 2 and 3 answers and returns their weighted average.
/// Returns 0 when the column holds none of them.
pub fn rank_reversal_by_count(cells: &[CellValue]) -> f64 {
    let mut counts = [0u64; 3];
    for x in numbers(cells) {
        if x == 1.0 {
            counts[0] += 1;
        } else if x == 2.0 {
            counts[1] += 1;
        } else if x == 3.0 {
            counts[2] += 1;
        }
    }
    let total = counts.iter().sum::<u64>();
    if total == 0 {
        return 0.0;
    }
    let weighted = counts[0] * 3 + counts[1] * 2 + counts[2];
    weighted as f64 / total as f64
}

/// Averages the reversal weight over every answered row.
///
/// Any answer other than 1, 2 or 3 (out-of-domain numbers, and text left
/// over by the coercion) counts in the denominator with a weight of 0, which
/// pulls the mean down. Only missing cells are left out.
pub fn rank_reversal_by_row(cells: &[CellValue]) -> f64 {
    let (sum, count) = cells
        .iter()
        .filter(|c| !c.is_missing())
        .fold((0.0, 0u64), |(s, n), c| {
            (s + c.as_number().map(reversal_weight).unwrap_or(0.0), n + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Returns the percentages of core (1) and differentiator (0) answers among
/// the numeric answers.
pub fn relevance_split(cells: &[CellValue]) -> (f64, f64) {
    let mut core = 0u64;
    let mut differentiator = 0u64;
    let mut total = 0u64;
    for x in numbers(cells) {
        total += 1;
        if x == 1.0 {
            core += 1;
        } else if x == 0.0 {
            differentiator += 1;
        }
    }
    if total == 0 {
        return (0.0, 0.0);
    }
    let pct = |n: u64| 100.0 * n as f64 / total as f64;
    (pct(core), pct(differentiator))
}

impl ScoringPolicy {
    pub fn score(&self, cells: &[CellValue]) -> Score {
        let res = match self {
            ScoringPolicy::RankReversal(RankCounting::ByCount) => {
                Score::Weighted(rank_reversal_by_count(cells))
            }
            ScoringPolicy::RankReversal(RankCounting::ByRow) => {
                Score::Weighted(rank_reversal_by_row(cells))
            }
            ScoringPolicy::RelevanceSplit => {
                let (core, differentiator) = relevance_split(cells);
                Score::Split {
                    core,
                    differentiator,
                }
            }
        };
        debug!("score: {:?} over {} cells: {:?}", self, cells.len(), res);
        res
    }
}
