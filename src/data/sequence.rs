//! Time-ordered dataset sequences.

use super::dataset::Dataset;

/// Datasets sorted ascending by time value.
///
/// Datasets without a finite time value are dropped on construction. Ordering is
/// stable, so equal time values keep their input order. The sequence is
/// never mutated after construction.
#[derive(Clone, Debug, Default)]
pub struct DatasetSequence {
    datasets: Vec<Dataset>,
}

impl DatasetSequence {
    /// Build a sequence from datasets in any order.
    pub fn from_datasets(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        let mut datasets: Vec<Dataset> = datasets
            .into_iter()
            .filter(|d| d.time_value().is_some())
            .collect();
        datasets.sort_by(|a, b| {
            let (ta, tb) = (a.time_value().unwrap_or_default(), b.time_value().unwrap_or_default());
            ta.total_cmp(&tb)
        });
        Self { datasets }
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Dataset> {
        self.datasets.get(index)
    }

    /// Earliest dataset.
    pub fn first(&self) -> Option<&Dataset> {
        self.datasets.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.iter()
    }

    /// Time values in sequence order.
    pub fn time_values(&self) -> Vec<f64> {
        self.datasets.iter().filter_map(Dataset::time_value).collect()
    }
}
