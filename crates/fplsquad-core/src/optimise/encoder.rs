// One-hot encoding of a categorical candidate attribute (position, team).

use std::fmt::Display;

use crate::error::{Result, SelectionError};

/// Distinct categories plus an `n × k` 0/1 membership matrix with exactly
/// one 1 per row.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoding<T> {
    pub categories: Vec<T>,
    pub matrix: Vec<Vec<f64>>,
}

impl<T: Ord + Clone + Display> OneHotEncoding<T> {
    /// Encode `values`, taking the categories from the values themselves
    /// (sorted, deduplicated).
    pub fn fit(values: &[T]) -> Self {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].cmp(&values[b]));
        let mut categories: Vec<T> = Vec::new();
        let mut cols = vec![0; values.len()];
        for i in order {
            if categories.last() != Some(&values[i]) {
                categories.push(values[i].clone());
            }
            cols[i] = categories.len() - 1;
        }
        let matrix = cols
            .into_iter()
            .map(|col| one_hot_row(categories.len(), col))
            .collect();
        Self { categories, matrix }
    }

    /// Encode `values` against a fixed category universe. Categories with no
    /// members still get a column, so constraints on them are kept.
    pub fn fit_with(values: &[T], categories: &[T]) -> Result<Self> {
        let matrix = values
            .iter()
            .map(|v| {
                categories
                    .iter()
                    .position(|c| c == v)
                    .map(|col| one_hot_row(categories.len(), col))
                    .ok_or_else(|| {
                        SelectionError::config("encoder", format!("unknown category `{v}`"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            categories: categories.to_vec(),
            matrix,
        })
    }
}

impl<T> OneHotEncoding<T> {
    /// One row per category, one column per candidate.
    pub fn transposed(&self) -> Vec<Vec<f64>> {
        let n = self.matrix.len();
        (0..self.categories.len())
            .map(|col| (0..n).map(|row| self.matrix[row][col]).collect())
            .collect()
    }
}

fn one_hot_row(width: usize, col: usize) -> Vec<f64> {
    let mut row = vec![0.0; width];
    row[col] = 1.0;
    row
}
