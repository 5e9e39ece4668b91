use std::cmp::Ordering;

// ranks up to this one are drawn with white text on dark cells
const TOP_RANKS: usize = 3;

/// Ranks values in descending order: the largest value gets rank 1 and tied
/// values share the lowest rank of their tie group (1, 2, 2, 4). Missing
/// values (`None` or NaN) are left unranked.
pub fn rank_descending(values: &[Option<f64>]) -> Vec<Option<usize>> {
    let mut present: Vec<_> = values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match value {
            Some(value) if !value.is_nan() => Some((index, *value)),
            _ => None,
        })
        .collect();
    present.sort_by(|(_, a), (_, b)| {
        b.partial_cmp(a).unwrap_or(Ordering::Equal)
    });

    let mut ranks = vec![None; values.len()];
    let mut previous: Option<(f64, usize)> = None;
    for (position, (index, value)) in present.into_iter().enumerate() {
        let rank = match previous {
            Some((previous_value, rank)) if previous_value == value => rank,
            _ => position + 1,
        };
        ranks[index] = Some(rank);
        previous = Some((value, rank));
    }
    ranks
}

/// Direction along which a `RankTable` compares values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Each row is ranked on its own, comparing its columns.
    Row,
    /// Each column is ranked on its own, comparing its rows.
    Column,
}

/// A labelled matrix of values together with their ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct RankTable {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
    ranks: Vec<Vec<Option<usize>>>,
}

impl RankTable {
    /// Creates a new table. `values` has one entry per row, each with one
    /// entry per column.
    pub fn new(
        rows: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
        rank_by: RankBy,
    ) -> Self {
        assert_eq!(rows.len(), values.len(), "one value row per label");
        assert!(
            values.iter().all(|row| row.len() == columns.len()),
            "one value per column"
        );

        let mut ranks = vec![vec![None; columns.len()]; rows.len()];
        match rank_by {
            RankBy::Row => {
                for (row, row_values) in values.iter().enumerate() {
                    ranks[row] = rank_descending(row_values);
                }
            }
            RankBy::Column => {
                for column in 0..columns.len() {
                    let column_values: Vec<_> =
                        values.iter().map(|row| row[column]).collect();
                    let column_ranks = rank_descending(&column_values);
                    for (row, rank) in column_ranks.into_iter().enumerate() {
                        ranks[row][column] = rank;
                    }
                }
            }
        }

        Self {
            rows,
            columns,
            values,
            ranks,
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.values[row][column]
    }

    pub fn rank(&self, row: usize, column: usize) -> Option<usize> {
        self.ranks[row][column]
    }

    /// Highest (worst) rank in the table.
    pub fn max_rank(&self) -> Option<usize> {
        self.ranks.iter().flatten().flatten().copied().max()
    }

    /// Rank labels, with "N/A" for missing values.
    pub fn labels(&self) -> Vec<Vec<String>> {
        self.ranks
            .iter()
            .map(|row| row.iter().map(|rank| rank_label(*rank)).collect())
            .collect()
    }

    /// Cell shades in [0, 1] where the best rank is the darkest. Tables
    /// shown side by side should share the same `max_rank`.
    pub fn shades(&self, max_rank: usize) -> Vec<Vec<f64>> {
        self.ranks
            .iter()
            .map(|row| row.iter().map(|rank| shade(*rank, max_rank)).collect())
            .collect()
    }
}

pub fn rank_label(rank: Option<usize>) -> String {
    match rank {
        Some(rank) => rank.to_string(),
        None => String::from("N/A"),
    }
}

/// Maps a rank to a shade: `(max_rank + 1 - rank) / max_rank`.
pub fn shade(rank: Option<usize>, max_rank: usize) -> f64 {
    match rank {
        Some(rank) if max_rank > 0 => {
            (max_rank + 1).saturating_sub(rank) as f64 / max_rank as f64
        }
        _ => 0.0,
    }
}

/// Text color that stays readable on top of the shade of `rank`.
pub fn text_color(rank: Option<usize>) -> &'static str {
    match rank {
        Some(rank) if rank <= TOP_RANKS => "white",
        _ => "black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn ties_share_min_rank() {
        let values = [Some(10.0), Some(30.0), Some(30.0), Some(5.0)];
        assert_eq!(
            rank_descending(&values),
            vec![Some(3), Some(1), Some(1), Some(4)]
        );
    }

    #[test]
    fn missing_values_are_unranked() {
        let values = [None, Some(2.0), Some(f64::NAN), Some(7.0)];
        assert_eq!(
            rank_descending(&values),
            vec![None, Some(2), None, Some(1)]
        );
        assert_eq!(rank_descending(&[None, None]), vec![None, None]);
        assert!(rank_descending(&[]).is_empty());
    }

    #[test]
    fn row_wise_table() {
        let table = RankTable::new(
            labels(&["insert", "delete"]),
            labels(&["LRU_default", "A2Q_default", "CLOCK_default"]),
            vec![
                vec![Some(1.0), Some(3.0), Some(2.0)],
                vec![Some(9.0), None, Some(9.0)],
            ],
            RankBy::Row,
        );
        assert_eq!(table.rank(0, 0), Some(3));
        assert_eq!(table.rank(0, 1), Some(1));
        assert_eq!(table.rank(1, 0), Some(1));
        assert_eq!(table.rank(1, 1), None);
        assert_eq!(table.rank(1, 2), Some(1));
        assert_eq!(table.max_rank(), Some(3));
        assert_eq!(
            table.labels(),
            vec![labels(&["3", "1", "2"]), labels(&["1", "N/A", "1"])]
        );
    }

    #[test]
    fn column_wise_table() {
        let table = RankTable::new(
            labels(&["LRU_default", "A2Q_default"]),
            labels(&["2%", "10%"]),
            vec![vec![Some(5.0), Some(1.0)], vec![Some(4.0), Some(8.0)]],
            RankBy::Column,
        );
        assert_eq!(table.rank(0, 0), Some(1));
        assert_eq!(table.rank(1, 0), Some(2));
        assert_eq!(table.rank(0, 1), Some(2));
        assert_eq!(table.rank(1, 1), Some(1));
        assert_eq!(table.value(1, 1), Some(8.0));
    }

    #[test]
    fn shades() {
        assert_eq!(shade(Some(1), 4), 1.0);
        assert_eq!(shade(Some(4), 4), 0.25);
        assert_eq!(shade(None, 4), 0.0);
        assert_eq!(shade(Some(1), 0), 0.0);
        assert_eq!(text_color(Some(3)), "white");
        assert_eq!(text_color(Some(4)), "black");
        assert_eq!(text_color(None), "black");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use quickcheck_macros::quickcheck;

    // small values make ties likely
    fn to_values(values: Vec<Option<u8>>) -> Vec<Option<f64>> {
        values
            .into_iter()
            .map(|value| value.map(|value| f64::from(value % 8)))
            .collect()
    }

    #[quickcheck]
    fn rank_one_is_the_max(values: Vec<Option<u8>>) -> bool {
        let values = to_values(values);
        let ranks = rank_descending(&values);
        let max = values.iter().flatten().copied().reduce(f64::max);
        values.iter().zip(ranks.iter()).all(|(value, rank)| {
            match rank {
                Some(1) => *value == max,
                _ => true,
            }
        }) && (max.is_none() || ranks.contains(&Some(1)))
    }

    #[quickcheck]
    fn ties_have_identical_ranks(values: Vec<Option<u8>>) -> bool {
        let values = to_values(values);
        let ranks = rank_descending(&values);
        let pairs: Vec<_> = values.iter().zip(ranks.iter()).collect();
        pairs.iter().all(|(a, rank_a)| {
            pairs
                .iter()
                .filter(|(b, _)| a.is_some() && a == b)
                .all(|(_, rank_b)| rank_a == rank_b)
        })
    }

    #[quickcheck]
    fn missing_values_never_ranked(values: Vec<Option<u8>>) -> bool {
        let values = to_values(values);
        let ranks = rank_descending(&values);
        values
            .iter()
            .zip(ranks.iter())
            .all(|(value, rank)| value.is_some() == rank.is_some())
    }

    #[quickcheck]
    fn rank_counts_larger_values(values: Vec<Option<u8>>) -> bool {
        let values = to_values(values);
        let ranks = rank_descending(&values);
        values.iter().zip(ranks.iter()).all(|(value, rank)| {
            match (value, rank) {
                (Some(value), Some(rank)) => {
                    let larger =
                        values.iter().flatten().filter(|v| *v > value).count();
                    *rank == larger + 1
                }
                _ => true,
            }
        })
    }
}
