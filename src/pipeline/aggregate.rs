use std::collections::BTreeMap;

use crate::domain::{ExpandedAssignment, TotalByType, WeeklyTypeCount};

/// The three group-by tables, plus the opt-in weighted sums.
///
/// Keys are materialized through `BTreeMap`, so every table comes out sorted
/// by its group-by key: a total, stable order that is identical across runs
/// on the same input regardless of input order.
#[derive(Debug, Default)]
pub struct AggregateTables {
    /// (year, week, postal code, event type) -> assignment count.
    pub weekly: Vec<WeeklyTypeCount>,
    /// postal code -> assignment count; feeds the geometry join.
    pub total_by_zip: BTreeMap<String, u64>,
    /// (postal code, event type) -> assignment count.
    pub total_by_type: Vec<TotalByType>,
    /// postal code -> weight sum. Secondary metric, present only on opt-in;
    /// never a substitute for the unweighted counts above.
    pub weighted_by_zip: Option<BTreeMap<String, f64>>,
}

/// Reduces the expanded assignments into the three aggregate tables.
///
/// Each table is a strict group-by-count; the assignment weight does not
/// participate unless `include_weighted` asks for the secondary sums.
/// An empty input produces three empty tables.
pub fn aggregate(assignments: &[ExpandedAssignment], include_weighted: bool) -> AggregateTables {
    let mut weekly: BTreeMap<(i32, u32, String, String), u64> = BTreeMap::new();
    let mut total_by_zip: BTreeMap<String, u64> = BTreeMap::new();
    let mut total_by_type: BTreeMap<(String, String), u64> = BTreeMap::new();
    let mut weighted_by_zip: Option<BTreeMap<String, f64>> =
        include_weighted.then(BTreeMap::new);

    for assignment in assignments {
        let weekly_key = (
            assignment.year,
            assignment.week,
            assignment.postal_code.clone(),
            assignment.event_type.clone(),
        );
        *weekly.entry(weekly_key).or_insert(0) += 1;

        *total_by_zip
            .entry(assignment.postal_code.clone())
            .or_insert(0) += 1;

        let type_key = (
            assignment.postal_code.clone(),
            assignment.event_type.clone(),
        );
        *total_by_type.entry(type_key).or_insert(0) += 1;

        if let Some(weighted) = weighted_by_zip.as_mut() {
            *weighted
                .entry(assignment.postal_code.clone())
                .or_insert(0.0) += assignment.weight;
        }
    }

    AggregateTables {
        weekly: weekly
            .into_iter()
            .map(
                |((year, week, postal_code, event_type), permit_count)| WeeklyTypeCount {
                    year,
                    week,
                    postal_code,
                    event_type,
                    permit_count,
                },
            )
            .collect(),
        total_by_zip,
        total_by_type: total_by_type
            .into_iter()
            .map(|((postal_code, event_type), type_count)| TotalByType {
                postal_code,
                event_type,
                type_count,
            })
            .collect(),
        weighted_by_zip,
    }
}
