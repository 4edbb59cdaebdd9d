use geojson::{Feature, FeatureCollection, GeoJson};
use std::fs;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Reads the boundary GeoJSON into a feature collection.
///
/// The geometry payload is opaque to the pipeline; only the postal-code
/// property is ever inspected.
///
/// # Errors
///
/// Returns [`PipelineError::MissingInput`] when the file does not exist,
/// [`PipelineError::Geojson`] when it fails to parse, and
/// [`PipelineError::InvalidBoundaries`] when it parses to something other
/// than a `FeatureCollection`.
pub fn read_boundaries(path: &Path) -> Result<FeatureCollection> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    match contents.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(PipelineError::InvalidBoundaries(path.to_path_buf())),
    }
}

/// Extracts the postal-code key from a boundary feature.
///
/// The property may arrive as a string (possibly whitespace-padded) or a
/// number; both are normalized to a trimmed string so leading zeros survive
/// when the source already stores strings. Returns `None` when the property
/// is absent, empty, or of an unusable type.
pub fn feature_postal_code(feature: &Feature, property: &str) -> Option<String> {
    let value = feature.properties.as_ref()?.get(property)?;
    let code = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_with_property(json: &str) -> Feature {
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: value.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn trims_string_postal_codes() {
        let feature = feature_with_property(r#"{"postalCode": " 10001 "}"#);
        assert_eq!(
            feature_postal_code(&feature, "postalCode").as_deref(),
            Some("10001")
        );
    }

    #[test]
    fn coerces_numeric_postal_codes() {
        let feature = feature_with_property(r#"{"ZIP_CODE": 10002}"#);
        assert_eq!(
            feature_postal_code(&feature, "ZIP_CODE").as_deref(),
            Some("10002")
        );
    }

    #[test]
    fn missing_or_empty_property_yields_none() {
        let feature = feature_with_property(r#"{"postalCode": "  "}"#);
        assert_eq!(feature_postal_code(&feature, "postalCode"), None);

        let feature = feature_with_property(r#"{"other": "x"}"#);
        assert_eq!(feature_postal_code(&feature, "postalCode"), None);
    }
}
