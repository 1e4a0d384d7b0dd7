//! Ordering records by activation score.

use serde::{Deserialize, Serialize};

use crate::data::Record;

/// Sort direction for activation scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Lowest activation first.
    Ascending,
    /// Highest activation first (dashboard default).
    #[default]
    Descending,
}

/// Return a new view of `records` ordered by activation score.
///
/// The sort is stable: equal scores keep their input order in both
/// directions. The underlying records are not moved.
pub fn sort_by_activation<'a, I>(records: I, direction: SortDirection) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut ordered: Vec<&Record> = records.into_iter().collect();
    match direction {
        SortDirection::Ascending => ordered
            .sort_by(|a, b| a.activation_score().total_cmp(&b.activation_score())),
        SortDirection::Descending => ordered
            .sort_by(|a, b| b.activation_score().total_cmp(&a.activation_score())),
    }
    ordered
}
