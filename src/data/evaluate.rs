use serde::Serialize;

use super::filter::{ConstraintSet, FilteredSet, filter};
use super::model::{HotelDataset, HotelRecord};
use super::rank::{RankedTable, Rankings};

// ---------------------------------------------------------------------------
// Scatter point sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterKind {
    PriceRating,
    PriceWalk,
    /// Price × rating with walk minutes as the third coordinate.
    PriceRatingWalk,
}

impl ScatterKind {
    pub fn title(self) -> &'static str {
        match self {
            ScatterKind::PriceRating => "Price vs. rating",
            ScatterKind::PriceWalk => "Price vs. walk time",
            ScatterKind::PriceRatingWalk => "Price vs. rating, sized by walk time",
        }
    }

    pub fn axis_labels(self) -> (&'static str, &'static str) {
        match self {
            ScatterKind::PriceRating | ScatterKind::PriceRatingWalk => {
                ("Price per person (yen)", "Rating")
            }
            ScatterKind::PriceWalk => ("Price per person (yen)", "Walk to station (min)"),
        }
    }

    fn coordinates(self, r: &HotelRecord) -> Option<[f64; 3]> {
        let walk = r.station_walk_time.map(f64::from);
        match self {
            ScatterKind::PriceRating => Some([r.price_per_person, r.rating?, 0.0]),
            ScatterKind::PriceWalk => Some([r.price_per_person, walk?, 0.0]),
            ScatterKind::PriceRatingWalk => Some([r.price_per_person, r.rating?, walk?]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Row index into the dataset, for hover labels.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    /// Third coordinate, only set for 3-D sets.
    pub z: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSet {
    pub kind: ScatterKind,
    pub points: Vec<ScatterPoint>,
}

impl ScatterSet {
    fn build(kind: ScatterKind, filtered: &FilteredSet<'_>) -> Self {
        let points = filtered
            .indices
            .iter()
            .filter_map(|&index| {
                let [x, y, z] = kind.coordinates(&filtered.dataset.records[index])?;
                Some(ScatterPoint {
                    index,
                    x,
                    y,
                    z: (kind == ScatterKind::PriceRatingWalk).then_some(z),
                })
            })
            .collect();
        ScatterSet { kind, points }
    }
}

// ---------------------------------------------------------------------------
// Evaluation – one full recomputation pass
// ---------------------------------------------------------------------------

/// Everything presentation needs after a constraint change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub matched: usize,
    pub scatter: Vec<ScatterSet>,
    pub tables: Vec<RankedTable>,
}

/// Filter, plot and rank against a single constraint snapshot.
pub fn evaluate(dataset: &HotelDataset, constraints: &ConstraintSet) -> Evaluation {
    let filtered = filter(dataset, constraints);
    let schema = dataset.schema;

    let mut scatter = Vec::new();
    if schema.has_rating {
        scatter.push(ScatterSet::build(ScatterKind::PriceRating, &filtered));
    }
    if schema.has_walk_time {
        scatter.push(ScatterSet::build(ScatterKind::PriceWalk, &filtered));
    }
    if schema.has_rating && schema.has_walk_time {
        scatter.push(ScatterSet::build(ScatterKind::PriceRatingWalk, &filtered));
    }

    let tables = Rankings::compute(&filtered).tables(&schema);

    log::debug!(
        "Evaluated {} of {} hotels, {} rankings",
        filtered.len(),
        dataset.len(),
        tables.len()
    );

    Evaluation {
        matched: filtered.len(),
        scatter,
        tables,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::CellValue;
    use crate::data::model::tests::hotel;
    use crate::data::rank::RankingKind;

    fn full_dataset() -> HotelDataset {
        HotelDataset::from_records(
            vec![
                hotel("A", Some("X"), 1000.0, Some(4.0), Some(5)),
                hotel("B", Some("X"), 2000.0, Some(4.5), None),
                hotel("C", Some("Y"), 1500.0, Some(3.0), Some(12)),
            ],
            true,
        )
    }

    #[test]
    fn empty_selection_yields_empty_views() {
        let ds = full_dataset();
        let constraints = ConstraintSet {
            selected_regions: BTreeSet::new(),
            ..ConstraintSet::unconstrained(&ds)
        };
        let eval = evaluate(&ds, &constraints);
        assert_eq!(eval.matched, 0);
        assert_eq!(eval.tables.len(), 4);
        assert!(eval.tables.iter().all(|t| t.rows.is_empty()));
        assert!(eval.scatter.iter().all(|s| s.points.is_empty()));
    }

    #[test]
    fn scatter_sets_follow_capabilities() {
        let ds = full_dataset();
        let eval = evaluate(&ds, &ConstraintSet::unconstrained(&ds));
        let kinds: Vec<_> = eval.scatter.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                ScatterKind::PriceRating,
                ScatterKind::PriceWalk,
                ScatterKind::PriceRatingWalk
            ]
        );
        assert_eq!(eval.scatter[0].points.len(), 3);
        // B has no walk time.
        assert_eq!(eval.scatter[1].points.len(), 2);
        let bubble = &eval.scatter[2];
        assert_eq!(bubble.points[1].index, 2);
        assert_eq!(bubble.points[1].z, Some(12.0));
        assert!(eval.scatter[0].points.iter().all(|p| p.z.is_none()));
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let ds = full_dataset();
        let constraints = ConstraintSet {
            price_ceiling: 1800.0,
            ..ConstraintSet::unconstrained(&ds)
        };
        let first = evaluate(&ds, &constraints);
        let _other = evaluate(&ds, &ConstraintSet::unconstrained(&ds));
        assert_eq!(evaluate(&ds, &constraints), first);
        assert_eq!(first.matched, 2);
    }

    #[test]
    fn dataset_without_rating_keeps_price_views() {
        let ds = HotelDataset::from_records(
            vec![
                hotel("A", Some("X"), 3000.0, None, None),
                hotel("B", Some("X"), 1000.0, None, None),
            ],
            false,
        );
        let eval = evaluate(&ds, &ConstraintSet::unconstrained(&ds));
        assert!(eval.scatter.is_empty());
        assert_eq!(eval.tables.len(), 1);
        let cheapest = &eval.tables[0];
        assert_eq!(cheapest.kind, RankingKind::Cheapest);
        assert_eq!(cheapest.rows[0][0], CellValue::String("B".to_string()));
        assert_eq!(cheapest.columns.len(), 4);
    }
}
