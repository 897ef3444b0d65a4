//! Normalization of SDA JSON response tables.

use dirtio_soil_models::{CandidateRow, SoilKey};
use serde_json::Value;

use crate::SdaError;

/// Returns the rows of the response `Table`.
///
/// SDA omits `Table` entirely when a query matches nothing, so an absent,
/// `null`, or empty table yields no rows.
///
/// # Errors
///
/// Returns [`SdaError::Decode`] if the body is not a JSON object or
/// `Table` is not an array.
pub fn table_rows(body: &Value) -> Result<&[Value], SdaError> {
    let object = body.as_object().ok_or_else(|| SdaError::Decode {
        message: "expected a JSON object".to_string(),
    })?;

    match object.get("Table") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(rows)) => Ok(rows),
        Some(other) => Err(SdaError::Decode {
            message: format!("expected Table to be an array, got {other}"),
        }),
    }
}

/// Reads `[mupolygonkey, mukey, wkt]` rows into [`CandidateRow`]s.
///
/// # Errors
///
/// Returns [`SdaError`] if the table is malformed or any row is not a
/// valid triple.
pub fn candidate_rows(body: &Value) -> Result<Vec<CandidateRow>, SdaError> {
    table_rows(body)?
        .iter()
        .map(|row| CandidateRow::from_table_row(row).map_err(SdaError::from))
        .collect()
}

/// Reads single-column `[mukey]` rows.
///
/// # Errors
///
/// Returns [`SdaError`] if the table is malformed or any row does not
/// start with a string or integer key.
pub fn key_rows(body: &Value) -> Result<Vec<SoilKey>, SdaError> {
    table_rows(body)?
        .iter()
        .map(|row| {
            row.get(0)
                .and_then(SoilKey::from_json)
                .ok_or_else(|| SdaError::Decode {
                    message: format!("expected a map unit key row, got {row}"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_candidate_table() {
        let body = serde_json::json!({
            "Table": [
                ["399359807", "456385", "POLYGON ((0 0, 1 0, 1 1, 0 0))"],
                ["399359808", "456385", "POLYGON ((2 2, 3 2, 3 3, 2 2))"]
            ]
        });
        let rows = candidate_rows(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].polygon_key, SoilKey::from("399359807"));
        assert_eq!(rows[1].unit_key, SoilKey::from("456385"));
    }

    #[test]
    fn missing_table_is_empty() {
        assert!(candidate_rows(&serde_json::json!({})).unwrap().is_empty());
        assert!(candidate_rows(&serde_json::json!({ "Table": null })).unwrap().is_empty());
        assert!(candidate_rows(&serde_json::json!({ "Table": [] })).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_object_body() {
        let err = candidate_rows(&serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, SdaError::Decode { .. }));
    }

    #[test]
    fn rejects_non_array_table() {
        let err = candidate_rows(&serde_json::json!({ "Table": "oops" })).unwrap_err();
        assert!(matches!(err, SdaError::Decode { .. }));
    }

    #[test]
    fn malformed_row_is_row_error() {
        let body = serde_json::json!({ "Table": [["1", "2"]] });
        assert!(matches!(candidate_rows(&body), Err(SdaError::Row(_))));
    }

    #[test]
    fn parses_key_table() {
        let body = serde_json::json!({ "Table": [["533592"], [533_593]] });
        let keys = key_rows(&body).unwrap();
        assert_eq!(keys, vec![SoilKey::from("533592"), SoilKey::Integer(533_593)]);
    }

    #[test]
    fn rejects_empty_key_row() {
        let body = serde_json::json!({ "Table": [[]] });
        assert!(key_rows(&body).is_err());
    }
}
