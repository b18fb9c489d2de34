//! Cell Identity Reconciliation
//!
//! When a notebook is re-read from disk the parser hands out new ids. A
//! reconciler maps the fresh cells back onto the ids they had before, so
//! that callers tracking cells by id keep pointing at the same code.

use std::collections::{HashMap, HashSet};

use super::cell::{Cell, CellId};

/// Strategy for carrying cell ids across a reload
pub trait CellReconciler: Send + Sync {
    /// For each cell in `current`, the id it should inherit from `previous`,
    /// or `None` when it should get a fresh one. Returned ids are distinct.
    fn reconcile(&self, previous: &[Cell], current: &[Cell]) -> Vec<Option<CellId>>;
}

/// Exact code matches first, then most similar remaining cell
#[derive(Debug, Default, Clone, Copy)]
pub struct SimilarityReconciler;

impl CellReconciler for SimilarityReconciler {
    fn reconcile(&self, previous: &[Cell], current: &[Cell]) -> Vec<Option<CellId>> {
        let mut assigned: Vec<Option<CellId>> = vec![None; current.len()];
        let mut used: HashSet<usize> = HashSet::new();

        // Exact matches, in order
        for (i, cell) in current.iter().enumerate() {
            if let Some(j) = previous
                .iter()
                .enumerate()
                .position(|(j, prev)| !used.contains(&j) && prev.code == cell.code)
            {
                used.insert(j);
                assigned[i] = Some(previous[j].id.clone());
            }
        }

        // Best remaining match for everything else
        for (i, cell) in current.iter().enumerate() {
            if assigned[i].is_some() {
                continue;
            }
            let best = previous
                .iter()
                .enumerate()
                .filter(|(j, _)| !used.contains(j))
                .map(|(j, prev)| (j, similarity(&prev.code, &cell.code)))
                .fold(None, |best: Option<(usize, f64)>, (j, score)| match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((j, score)),
                });

            if let Some((j, _)) = best {
                used.insert(j);
                assigned[i] = Some(previous[j].id.clone());
            }
        }

        assigned
    }
}

/// Keep nothing: every reloaded cell gets a fresh id
#[derive(Debug, Default, Clone, Copy)]
pub struct FreshIds;

impl CellReconciler for FreshIds {
    fn reconcile(&self, _previous: &[Cell], current: &[Cell]) -> Vec<Option<CellId>> {
        vec![None; current.len()]
    }
}

/// Dice coefficient over character bigrams, in `[0, 1]`
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_grams = bigrams(a);
    let b_grams = bigrams(b);
    let total: usize = a_grams.values().sum::<usize>() + b_grams.values().sum::<usize>();
    if total == 0 {
        return 0.0;
    }

    let shared: usize = a_grams
        .iter()
        .map(|(gram, count)| (*count).min(b_grams.get(gram).copied().unwrap_or(0)))
        .sum();

    2.0 * shared as f64 / total as f64
}

fn bigrams(s: &str) -> HashMap<(char, char), usize> {
    let chars: Vec<char> = s.chars().collect();
    let mut grams = HashMap::new();
    for pair in chars.windows(2) {
        *grams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    grams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: &str, code: &str) -> Cell {
        Cell {
            code: code.to_string(),
            ..Cell::empty(CellId::new(id))
        }
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("x = 1", "x = 1"), 1.0);
        assert_eq!(similarity("", "abc"), 0.0);
        assert!(similarity("import numpy as np", "import numpy as npy") > 0.8);
        assert!(similarity("abc", "xyz") < 0.01);
    }

    #[test]
    fn test_reordered_cells_keep_ids() {
        let previous = vec![cell("aaaa", "x = 1"), cell("bbbb", "y = 2")];
        let current = vec![cell("n1", "y = 2"), cell("n2", "x = 1")];

        let ids = SimilarityReconciler.reconcile(&previous, &current);
        assert_eq!(ids, vec![Some(CellId::new("bbbb")), Some(CellId::new("aaaa"))]);
    }

    #[test]
    fn test_edited_cell_matches_closest() {
        let previous = vec![
            cell("aaaa", "import pandas as pd"),
            cell("bbbb", "df = pd.read_csv('data.csv')"),
        ];
        let current = vec![
            cell("n1", "df = pd.read_csv('data2.csv')"),
            cell("n2", "import pandas as pd"),
            cell("n3", "print(df)"),
        ];

        let ids = SimilarityReconciler.reconcile(&previous, &current);
        assert_eq!(ids[0], Some(CellId::new("bbbb")));
        assert_eq!(ids[1], Some(CellId::new("aaaa")));
        assert_eq!(ids[2], None);
    }

    #[test]
    fn test_duplicate_code_consumes_ids_once() {
        let previous = vec![cell("aaaa", "pass")];
        let current = vec![cell("n1", "pass"), cell("n2", "pass")];

        let ids = SimilarityReconciler.reconcile(&previous, &current);
        assert_eq!(ids, vec![Some(CellId::new("aaaa")), None]);
    }

    #[test]
    fn test_fresh_ids_strategy() {
        let previous = vec![cell("aaaa", "x")];
        let current = vec![cell("n1", "x")];
        assert_eq!(FreshIds.reconcile(&previous, &current), vec![None]);
    }
}
