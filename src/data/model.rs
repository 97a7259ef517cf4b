use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell mirroring the dtypes a cleaned hotel CSV
/// ends up with (object / int64 / float64 / NaN).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "-"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` (integers widen, text does not parse).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text form of a non-null cell, used for name / region / city columns.
    pub fn into_text(self) -> Option<String> {
        match self {
            CellValue::String(s) => Some(s),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// HotelRecord – one row of the listing table
// ---------------------------------------------------------------------------

/// A single hotel listing.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelRecord {
    /// Display name, not guaranteed unique.
    pub name: String,
    /// Region; rows without one can never be selected.
    pub prefecture: Option<String>,
    pub city: String,
    /// Non-negative price per person in yen.
    pub price_per_person: f64,
    /// Review score, only meaningful when the table has a rating column.
    pub rating: Option<f64>,
    /// Minutes on foot to the nearest station.
    pub station_walk_time: Option<u32>,
}

impl HotelRecord {
    /// `rating / price_per_person`, undefined for free listings or unrated rows.
    pub fn value_score(&self) -> Option<f64> {
        let rating = self.rating?;
        if self.price_per_person > 0.0 {
            Some(rating / self.price_per_person)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Schema descriptor and bounds
// ---------------------------------------------------------------------------

/// Capability flags for the optional columns, computed once at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DatasetSchema {
    pub has_rating: bool,
    pub has_walk_time: bool,
}

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

/// Slider ranges derived from the full dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatasetBounds {
    /// Widened to whole yen so both ends bracket every price present.
    pub price: Span<f64>,
    pub rating: Option<Span<f64>>,
    pub walk_time: Option<Span<u32>>,
}

impl DatasetBounds {
    fn observe(records: &[HotelRecord]) -> Self {
        let price = span_of(records.iter().map(|r| r.price_per_person))
            .map(|s| Span {
                min: s.min.floor(),
                max: s.max.ceil(),
            })
            .unwrap_or(Span { min: 0.0, max: 0.0 });
        let rating = span_of(records.iter().filter_map(|r| r.rating));
        let walk_time = records
            .iter()
            .filter_map(|r| r.station_walk_time)
            .fold(None, |acc: Option<Span<u32>>, w| {
                Some(match acc {
                    Some(s) => Span {
                        min: s.min.min(w),
                        max: s.max.max(w),
                    },
                    None => Span { min: w, max: w },
                })
            });
        DatasetBounds {
            price,
            rating,
            walk_time,
        }
    }
}

fn span_of(values: impl Iterator<Item = f64>) -> Option<Span<f64>> {
    values.fold(None, |acc, v| {
        Some(match acc {
            Some(Span { min, max }) => Span {
                min: f64::min(min, v),
                max: f64::max(max, v),
            },
            None => Span { min: v, max: v },
        })
    })
}

// ---------------------------------------------------------------------------
// HotelDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Immutable once built; engine calls borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelDataset {
    pub records: Vec<HotelRecord>,
    pub schema: DatasetSchema,
    /// Distinct non-null prefectures in first-appearance order.
    pub regions: Vec<String>,
    pub bounds: DatasetBounds,
}

impl HotelDataset {
    /// Derive schema flags, region list and bounds from loaded records.
    ///
    /// `rating_column` tells whether the source table had a `rating` column at
    /// all; the feature is still disabled when that column holds no values.
    pub fn from_records(records: Vec<HotelRecord>, rating_column: bool) -> Self {
        let bounds = DatasetBounds::observe(&records);
        let schema = DatasetSchema {
            has_rating: rating_column && bounds.rating.is_some(),
            has_walk_time: bounds.walk_time.is_some(),
        };

        let mut seen = BTreeSet::new();
        let regions = records
            .iter()
            .filter_map(|r| r.prefecture.as_ref())
            .filter(|p| seen.insert(p.as_str()))
            .cloned()
            .collect();

        HotelDataset {
            records,
            schema,
            regions,
            bounds,
        }
    }

    /// Number of hotels.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
