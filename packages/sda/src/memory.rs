//! In-memory [`SoilDataAccess`] for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use dirtio_soil_models::{CandidateRow, QueryPoint, SoilKey};

use crate::{SdaError, SoilDataAccess};

/// Serves a fixed response regardless of the query point.
pub struct InMemorySoilDataAccess {
    response: Result<Vec<CandidateRow>, u16>,
    calls: AtomicUsize,
}

impl InMemorySoilDataAccess {
    /// Answers every query with `rows`.
    #[must_use]
    pub const fn with_rows(rows: Vec<CandidateRow>) -> Self {
        Self {
            response: Ok(rows),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers every query with an empty table.
    #[must_use]
    pub const fn empty() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Fails every query as if the service returned HTTP `status`.
    #[must_use]
    pub const fn failing(status: u16) -> Self {
        Self {
            response: Err(status),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of queries served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn respond(&self) -> Result<&[CandidateRow], SdaError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match &self.response {
            Ok(rows) => Ok(rows.as_slice()),
            Err(status) => Err(SdaError::Status {
                status: *status,
                body: String::new(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl SoilDataAccess for InMemorySoilDataAccess {
    async fn map_unit_polygons(
        &self,
        _point: &QueryPoint,
    ) -> Result<Vec<CandidateRow>, SdaError> {
        Ok(self.respond()?.to_vec())
    }

    async fn map_unit_keys(&self, _point: &QueryPoint) -> Result<Vec<SoilKey>, SdaError> {
        let mut keys: Vec<SoilKey> = Vec::new();
        for row in self.respond()? {
            if !keys.contains(&row.unit_key) {
                keys.push(row.unit_key.clone());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dedupes_unit_keys_in_order() {
        let source = InMemorySoilDataAccess::with_rows(vec![
            CandidateRow::new("1", "b", "POLYGON EMPTY"),
            CandidateRow::new("2", "a", "POLYGON EMPTY"),
            CandidateRow::new("3", "b", "POLYGON EMPTY"),
        ]);
        let point = QueryPoint::new(0.0, 0.0).unwrap();
        let keys = source.map_unit_keys(&point).await.unwrap();
        assert_eq!(keys, vec![SoilKey::from("b"), SoilKey::from("a")]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failing_source_reports_status() {
        let source = InMemorySoilDataAccess::failing(503);
        let point = QueryPoint::new(0.0, 0.0).unwrap();
        let err = source.map_unit_polygons(&point).await.unwrap_err();
        assert!(matches!(err, SdaError::Status { status: 503, .. }));
    }
}
