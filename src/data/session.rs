use super::loader::{ParseOptions, load_csv};
use super::model::Dataset;
use crate::error::{ExploreError, Result};

/// What a successful load reports back to the caller.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub rows: usize,
    pub columns: usize,
    /// First rows of the new dataset.
    pub preview: Dataset,
}

/// The single slot holding the dataset being explored.
///
/// Starts empty, and only [`Session::load`] ever replaces its content. Every
/// other operation borrows it and goes through [`Session::dataset`], which
/// fails closed with [`ExploreError::NoDataset`] while nothing is loaded.
#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Dataset>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current dataset, or `NoDataset` while the session is empty.
    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or(ExploreError::NoDataset)
    }

    /// Parse `payload` and, only if that succeeds, make it the current dataset.
    pub fn load(
        &mut self,
        payload: &[u8],
        options: &ParseOptions,
        preview_rows: usize,
    ) -> Result<LoadReport> {
        let dataset = match load_csv(payload, options) {
            Ok(ds) => ds,
            Err(e) => {
                log::warn!("Load rejected ({options:?}): {e}");
                return Err(e);
            }
        };

        let report = LoadReport {
            rows: dataset.num_rows(),
            columns: dataset.num_columns(),
            preview: dataset.head(preview_rows),
        };
        log::info!(
            "Loaded dataset: {} rows, {} columns {:?}",
            report.rows,
            report.columns,
            dataset.column_names()
        );
        log::debug!("Preview:\n{}", report.preview.pretty());

        self.dataset = Some(dataset);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_fails_closed() {
        let session = Session::new();
        assert!(matches!(session.dataset(), Err(ExploreError::NoDataset)));
    }

    #[test]
    fn load_replaces_dataset_and_previews_five_rows() {
        let mut session = Session::new();
        let csv = "n\n1\n2\n3\n4\n5\n6\n7\n";
        let report = session.load(csv.as_bytes(), &ParseOptions::default(), 5).unwrap();
        assert_eq!(report.rows, 7);
        assert_eq!(report.columns, 1);
        assert_eq!(report.preview.num_rows(), 5);
        assert_eq!(session.dataset().unwrap().num_rows(), 7);

        session.load(b"m\n1\n", &ParseOptions::default(), 5).unwrap();
        assert_eq!(session.dataset().unwrap().column_names(), vec!["m"]);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut session = Session::new();
        session.load(b"a,b\n1,2\n", &ParseOptions::default(), 5).unwrap();

        let err = session
            .load(b"a,b\n1,2\n3,4,5\n", &ParseOptions::default(), 5)
            .unwrap_err();
        assert!(matches!(err, ExploreError::Parse(_)));

        let ds = session.dataset().unwrap();
        assert_eq!(ds.num_rows(), 1);
        assert_eq!(ds.column_names(), vec!["a", "b"]);
    }
}
