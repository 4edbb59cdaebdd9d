use geojson::FeatureCollection;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::ingest::boundaries::feature_postal_code;

/// Property injected onto every boundary feature.
pub const TOTAL_PROPERTY: &str = "total_permits";

/// Property injected only when the weighted metric is enabled.
pub const WEIGHTED_PROPERTY: &str = "weighted_permits";

/// Result of joining aggregates onto the boundary geometry.
pub struct JoinOutcome {
    pub collection: FeatureCollection,
    /// Features whose postal code had no permits (annotated with 0).
    pub features_without_permits: usize,
    /// Aggregated postal codes with no boundary feature; absent from the
    /// geometry output but still present in the non-spatial artifacts.
    pub zips_without_geometry: usize,
}

/// Left-joins per-zip totals onto the boundary features.
///
/// Geometry is authoritative for the row set: every feature is retained and
/// a missing match fills with zero. The join key is the trimmed string form
/// of the configured property on one side and the aggregate postal code on
/// the other; never numeric, so leading zeros survive. Only the annotation
/// properties are touched; everything else on a feature passes through.
pub fn join_geometry(
    mut collection: FeatureCollection,
    total_by_zip: &BTreeMap<String, u64>,
    weighted_by_zip: Option<&BTreeMap<String, f64>>,
    zip_property: &str,
) -> JoinOutcome {
    let mut features_without_permits = 0;
    let mut seen_zips: BTreeSet<String> = BTreeSet::new();

    for feature in &mut collection.features {
        let code = feature_postal_code(feature, zip_property);

        let total = code
            .as_deref()
            .and_then(|c| total_by_zip.get(c))
            .copied()
            .unwrap_or(0);
        let weighted = weighted_by_zip.map(|weights| {
            code.as_deref()
                .and_then(|c| weights.get(c))
                .copied()
                .unwrap_or(0.0)
        });

        if total == 0 {
            features_without_permits += 1;
        }

        match code {
            Some(code) => {
                seen_zips.insert(code);
            }
            None => debug!("Boundary feature without a usable postal code; total set to 0"),
        }

        let properties = feature.properties.get_or_insert_with(Default::default);
        properties.insert(TOTAL_PROPERTY.to_string(), json!(total));
        if let Some(weighted) = weighted {
            properties.insert(WEIGHTED_PROPERTY.to_string(), json!(weighted));
        }
    }

    let zips_without_geometry = total_by_zip
        .keys()
        .filter(|zip| !seen_zips.contains(*zip))
        .count();

    JoinOutcome {
        collection,
        features_without_permits,
        zips_without_geometry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Feature;

    fn collection(zips: &[serde_json::Value]) -> FeatureCollection {
        let features = zips
            .iter()
            .map(|zip| {
                let mut properties = serde_json::Map::new();
                properties.insert("postalCode".to_string(), zip.clone());
                properties.insert("borough".to_string(), json!("Manhattan"));
                Feature {
                    bbox: None,
                    geometry: None,
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    fn totals(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs
            .iter()
            .map(|(zip, count)| (zip.to_string(), *count))
            .collect()
    }

    #[test]
    fn every_boundary_feature_is_retained() {
        let boundaries = collection(&[json!("10001"), json!("10002"), json!("99999")]);
        let total_by_zip = totals(&[("10001", 2), ("10002", 1)]);

        let outcome = join_geometry(boundaries, &total_by_zip, None, "postalCode");

        assert_eq!(outcome.collection.features.len(), 3);
        assert_eq!(outcome.features_without_permits, 1);

        let attached: Vec<u64> = outcome
            .collection
            .features
            .iter()
            .map(|f| f.properties.as_ref().unwrap()[TOTAL_PROPERTY].as_u64().unwrap())
            .collect();
        assert_eq!(attached, vec![2, 1, 0]);
    }

    #[test]
    fn unmatched_aggregate_zips_are_counted_not_errors() {
        let boundaries = collection(&[json!("10001")]);
        let total_by_zip = totals(&[("10001", 1), ("10003", 4)]);

        let outcome = join_geometry(boundaries, &total_by_zip, None, "postalCode");

        assert_eq!(outcome.zips_without_geometry, 1);
        assert_eq!(outcome.collection.features.len(), 1);
    }

    #[test]
    fn numeric_property_joins_through_string_coercion() {
        let boundaries = collection(&[json!(10001)]);
        let total_by_zip = totals(&[("10001", 5)]);

        let outcome = join_geometry(boundaries, &total_by_zip, None, "postalCode");

        let properties = outcome.collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties[TOTAL_PROPERTY], json!(5));
        // Pre-existing properties pass through untouched
        assert_eq!(properties["borough"], json!("Manhattan"));
    }

    #[test]
    fn weighted_totals_attach_only_when_provided() {
        let boundaries = collection(&[json!("10001"), json!("99999")]);
        let total_by_zip = totals(&[("10001", 2)]);
        let weighted: BTreeMap<String, f64> = [("10001".to_string(), 1.5)].into();

        let outcome = join_geometry(
            collection(&[json!("10001")]),
            &total_by_zip,
            None,
            "postalCode",
        );
        assert!(outcome.collection.features[0]
            .properties
            .as_ref()
            .unwrap()
            .get(WEIGHTED_PROPERTY)
            .is_none());

        let outcome = join_geometry(boundaries, &total_by_zip, Some(&weighted), "postalCode");
        let first = outcome.collection.features[0].properties.as_ref().unwrap();
        let second = outcome.collection.features[1].properties.as_ref().unwrap();
        assert_eq!(first[WEIGHTED_PROPERTY], json!(1.5));
        assert_eq!(second[WEIGHTED_PROPERTY], json!(0.0));
    }

    #[test]
    fn feature_without_postal_property_gets_zero() {
        let mut boundaries = collection(&[json!("10001")]);
        boundaries.features[0]
            .properties
            .as_mut()
            .unwrap()
            .remove("postalCode");

        let outcome = join_geometry(boundaries, &totals(&[("10001", 3)]), None, "postalCode");

        assert_eq!(outcome.collection.features.len(), 1);
        let properties = outcome.collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties[TOTAL_PROPERTY], json!(0));
        // The aggregate zip never matched any feature
        assert_eq!(outcome.zips_without_geometry, 1);
    }
}
