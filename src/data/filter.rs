use std::collections::BTreeSet;

use super::model::{HotelDataset, HotelRecord};

pub const PRICE_STEP: f64 = 500.0;
pub const RATING_STEP: f64 = 0.1;

// ---------------------------------------------------------------------------
// ConstraintSet – the user's current filter values
// ---------------------------------------------------------------------------

/// Filter values chosen by the user. Rebuilt on every interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    /// Prefectures to keep. Empty means nothing matches.
    pub selected_regions: BTreeSet<String>,
    /// Inclusive upper bound on `price_per_person`.
    pub price_ceiling: f64,
    /// Inclusive lower bound on `rating`, only offered when the dataset rates.
    pub rating_floor: Option<f64>,
    /// Inclusive upper bound on walk minutes, only offered when any are recorded.
    pub walk_ceiling: Option<u32>,
}

impl ConstraintSet {
    /// Slider defaults: every region selected and every bound wide open.
    pub fn unconstrained(dataset: &HotelDataset) -> Self {
        let bounds = &dataset.bounds;
        ConstraintSet {
            selected_regions: dataset.regions.iter().cloned().collect(),
            price_ceiling: bounds.price.max,
            rating_floor: bounds.rating.filter(|_| dataset.schema.has_rating).map(|s| s.min),
            walk_ceiling: bounds
                .walk_time
                .filter(|_| dataset.schema.has_walk_time)
                .map(|s| s.max),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredSet – rows passing the current constraints
// ---------------------------------------------------------------------------

/// Borrowed view of the records that satisfy a [`ConstraintSet`], in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSet<'a> {
    pub dataset: &'a HotelDataset,
    pub indices: Vec<usize>,
}

impl<'a> FilteredSet<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a HotelRecord> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }
}

/// Return the records that pass all active constraints.
///
/// A record passes when:
/// * its prefecture is non-null and selected
/// * its price is at most `price_ceiling`
/// * its rating is at least `rating_floor` (rating-less records fail a floor);
///   skipped entirely when the dataset has no ratings
/// * its walk time is at most `walk_ceiling`; records without a walk time pass,
///   and the test is skipped when the dataset records no walk times
pub fn filter<'a>(dataset: &'a HotelDataset, constraints: &ConstraintSet) -> FilteredSet<'a> {
    let rating_floor = constraints.rating_floor.filter(|_| dataset.schema.has_rating);
    let walk_ceiling = constraints.walk_ceiling.filter(|_| dataset.schema.has_walk_time);

    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            let Some(pref) = &r.prefecture else {
                return false;
            };
            if !constraints.selected_regions.contains(pref) {
                return false;
            }
            if r.price_per_person > constraints.price_ceiling {
                return false;
            }
            if let Some(floor) = rating_floor {
                match r.rating {
                    Some(rating) if rating >= floor => {}
                    _ => return false,
                }
            }
            if let (Some(ceiling), Some(walk)) = (walk_ceiling, r.station_walk_time) {
                if walk > ceiling {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect();

    FilteredSet { dataset, indices }
}

#[cfg(test)]
pub(crate) mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::tests::hotel;

    fn scenario() -> HotelDataset {
        HotelDataset::from_records(
            vec![
                hotel("A", Some("X"), 1000.0, Some(4.0), None),
                hotel("B", Some("X"), 2000.0, Some(4.5), None),
                hotel("C", Some("Y"), 1500.0, Some(3.0), None),
            ],
            true,
        )
    }

    fn names<'a>(set: &FilteredSet<'a>) -> Vec<&'a str> {
        set.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn region_price_and_rating_conjunction() {
        let ds = scenario();
        let constraints = ConstraintSet {
            selected_regions: BTreeSet::from(["X".to_string()]),
            price_ceiling: 2000.0,
            rating_floor: Some(3.5),
            walk_ceiling: None,
        };
        assert_eq!(names(&filter(&ds, &constraints)), vec!["A", "B"]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let ds = scenario();
        let constraints = ConstraintSet {
            price_ceiling: 1500.0,
            rating_floor: Some(3.0),
            ..ConstraintSet::unconstrained(&ds)
        };
        assert_eq!(names(&filter(&ds, &constraints)), vec!["A", "C"]);
    }

    #[test]
    fn empty_region_selection_matches_nothing() {
        let ds = scenario();
        let constraints = ConstraintSet {
            selected_regions: BTreeSet::new(),
            ..ConstraintSet::unconstrained(&ds)
        };
        assert!(filter(&ds, &constraints).is_empty());
    }

    #[test]
    fn null_prefecture_never_matches() {
        let ds = HotelDataset::from_records(
            vec![
                hotel("a", None, 1000.0, None, None),
                hotel("b", Some("X"), 1000.0, None, None),
            ],
            false,
        );
        let filtered = filter(&ds, &ConstraintSet::unconstrained(&ds));
        assert_eq!(names(&filtered), vec!["b"]);
    }

    #[test]
    fn missing_walk_time_passes_ceiling() {
        let ds = HotelDataset::from_records(
            vec![
                hotel("near", Some("X"), 1000.0, None, Some(3)),
                hotel("far", Some("X"), 1000.0, None, Some(25)),
                hotel("unknown", Some("X"), 1000.0, None, None),
            ],
            false,
        );
        let constraints = ConstraintSet {
            walk_ceiling: Some(10),
            ..ConstraintSet::unconstrained(&ds)
        };
        assert_eq!(names(&filter(&ds, &constraints)), vec!["near", "unknown"]);
    }

    #[test]
    fn unrated_record_fails_rating_floor() {
        let ds = HotelDataset::from_records(
            vec![
                hotel("rated", Some("X"), 1000.0, Some(2.0), None),
                hotel("unrated", Some("X"), 1000.0, None, None),
            ],
            true,
        );
        let filtered = filter(&ds, &ConstraintSet::unconstrained(&ds));
        assert_eq!(names(&filtered), vec!["rated"]);
    }

    #[test]
    fn rating_floor_ignored_without_capability() {
        let ds = HotelDataset::from_records(vec![hotel("a", Some("X"), 1000.0, None, None)], false);
        let constraints = ConstraintSet {
            rating_floor: Some(4.0),
            ..ConstraintSet::unconstrained(&ds)
        };
        assert_eq!(ConstraintSet::unconstrained(&ds).rating_floor, None);
        assert_eq!(filter(&ds, &constraints).len(), 1);
    }

    pub(crate) fn arb_dataset() -> impl Strategy<Value = HotelDataset> {
        let row = (
            prop::option::weighted(0.9, 0usize..4),
            0u32..40,
            prop::option::weighted(0.8, 10u32..=50),
            prop::option::weighted(0.7, 0u32..30),
        );
        (prop::collection::vec(row, 0..40), any::<bool>()).prop_map(|(rows, rated)| {
            let regions = ["Tokyo", "Osaka", "Kyoto", "Hokkaido"];
            let records = rows
                .into_iter()
                .enumerate()
                .map(|(i, (region, price, rating, walk))| {
                    hotel(
                        &format!("h{i}"),
                        region.map(|r| regions[r]),
                        // Steps of 250 yen so ties are common.
                        price as f64 * 250.0,
                        rating.filter(|_| rated).map(|r| r as f64 / 10.0),
                        walk,
                    )
                })
                .collect();
            HotelDataset::from_records(records, rated)
        })
    }

    pub(crate) fn arb_constraints(ds: &HotelDataset) -> impl Strategy<Value = ConstraintSet> {
        let open = ConstraintSet::unconstrained(ds);
        let regions = ds.regions.clone();
        (
            prop::sample::subsequence(regions.clone(), 0..=regions.len()),
            0.0..=open.price_ceiling.max(1.0),
            prop::option::of(1.0f64..5.0),
            prop::option::of(0u32..30),
        )
            .prop_map(move |(selected, price, rating, walk)| ConstraintSet {
                selected_regions: selected.into_iter().collect(),
                price_ceiling: price,
                rating_floor: rating.filter(|_| open.rating_floor.is_some()),
                walk_ceiling: walk.filter(|_| open.walk_ceiling.is_some()),
            })
    }

    proptest! {
        #[test]
        fn unconstrained_keeps_every_selectable_record(ds in arb_dataset()) {
            let filtered = filter(&ds, &ConstraintSet::unconstrained(&ds));
            let expected = ds
                .records
                .iter()
                .filter(|r| r.prefecture.is_some())
                .filter(|r| !ds.schema.has_rating || r.rating.is_some())
                .count();
            prop_assert_eq!(filtered.len(), expected);
        }

        #[test]
        fn filtered_set_is_exactly_the_matching_subset(
            (ds, constraints) in arb_dataset().prop_flat_map(|ds| {
                let c = arb_constraints(&ds);
                (Just(ds), c)
            })
        ) {
            let filtered = filter(&ds, &constraints);
            prop_assert!(filtered.indices.windows(2).all(|w| w[0] < w[1]));
            for (i, r) in ds.records.iter().enumerate() {
                let expected = r.prefecture.as_ref().is_some_and(|p| constraints.selected_regions.contains(p))
                    && r.price_per_person <= constraints.price_ceiling
                    && constraints.rating_floor.map_or(true, |f| r.rating.is_some_and(|x| x >= f))
                    && match (constraints.walk_ceiling, r.station_walk_time) {
                        (Some(c), Some(w)) => w <= c,
                        _ => true,
                    };
                prop_assert_eq!(filtered.indices.contains(&i), expected);
            }
            // Re-applying the same snapshot yields the same set.
            prop_assert_eq!(filter(&ds, &constraints), filtered);
        }
    }
}
