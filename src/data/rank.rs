use serde::Serialize;

use super::filter::FilteredSet;
use super::model::{CellValue, DatasetSchema, HotelRecord};

/// Rows shown per ranking.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

// ---------------------------------------------------------------------------
// Generic top-N projection
// ---------------------------------------------------------------------------

/// Stable sort of the records whose `key` is defined, truncated to `limit`.
///
/// Records with no key (or a NaN key) are left out. Ties keep dataset order.
pub fn rank_by<'a, K>(
    filtered: &FilteredSet<'a>,
    key: K,
    direction: Direction,
    limit: usize,
) -> Vec<&'a HotelRecord>
where
    K: Fn(&HotelRecord) -> Option<f64>,
{
    let mut keyed: Vec<(f64, &'a HotelRecord)> = filtered
        .iter()
        .filter_map(|r| key(r).filter(|k| !k.is_nan()).map(|k| (k, r)))
        .collect();
    // `sort_by` is stable.
    keyed.sort_by(|(a, _), (b, _)| match direction {
        Direction::Ascending => a.total_cmp(b),
        Direction::Descending => b.total_cmp(a),
    });
    keyed.into_iter().take(limit).map(|(_, r)| r).collect()
}

/// A record paired with its cost-effectiveness score. Only the best-value
/// ranking produces these; the underlying record is untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredHotel<'a> {
    pub record: &'a HotelRecord,
    pub value_score: f64,
}

/// Best `rating / price_per_person` first. Free listings have no defined
/// score and are excluded, as are unrated records.
pub fn best_value<'a>(filtered: &FilteredSet<'a>, limit: usize) -> Vec<ScoredHotel<'a>> {
    rank_by(filtered, HotelRecord::value_score, Direction::Descending, limit)
        .into_iter()
        .filter_map(|record| {
            record
                .value_score()
                .map(|value_score| ScoredHotel { record, value_score })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ranking kinds and their column projections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKind {
    Cheapest,
    TopRated,
    BestValue,
    ShortestWalk,
}

impl RankingKind {
    pub const ALL: [RankingKind; 4] = [
        RankingKind::Cheapest,
        RankingKind::TopRated,
        RankingKind::BestValue,
        RankingKind::ShortestWalk,
    ];

    pub fn title(self) -> &'static str {
        match self {
            RankingKind::Cheapest => "Lowest price per person",
            RankingKind::TopRated => "Highest rated",
            RankingKind::BestValue => "Best value (rating / price)",
            RankingKind::ShortestWalk => "Shortest walk to station",
        }
    }

    /// Whether the dataset carries the columns this ranking needs.
    pub fn is_available(self, schema: &DatasetSchema) -> bool {
        match self {
            RankingKind::Cheapest => true,
            RankingKind::TopRated | RankingKind::BestValue => schema.has_rating,
            RankingKind::ShortestWalk => schema.has_walk_time,
        }
    }

    /// Fixed column projection for this ranking's table.
    pub fn columns(self, schema: &DatasetSchema) -> Vec<Column> {
        use Column::*;
        match self {
            RankingKind::Cheapest if schema.has_rating => {
                vec![Name, Prefecture, City, PricePerPerson, Rating]
            }
            RankingKind::Cheapest => vec![Name, Prefecture, City, PricePerPerson],
            RankingKind::TopRated => vec![Name, Prefecture, City, Rating, PricePerPerson],
            RankingKind::BestValue => {
                vec![Name, Prefecture, City, Rating, PricePerPerson, ValueScore]
            }
            RankingKind::ShortestWalk => {
                vec![Name, Prefecture, City, StationWalkTime, PricePerPerson]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Name,
    Prefecture,
    City,
    PricePerPerson,
    Rating,
    StationWalkTime,
    ValueScore,
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Prefecture => "prefecture",
            Column::City => "city",
            Column::PricePerPerson => "price_per_person",
            Column::Rating => "rating",
            Column::StationWalkTime => "station_walk_time",
            Column::ValueScore => "value_score",
        }
    }

    fn cell(self, record: &HotelRecord, value_score: Option<f64>) -> CellValue {
        let float = |v: Option<f64>| v.map_or(CellValue::Null, CellValue::Float);
        match self {
            Column::Name => CellValue::String(record.name.clone()),
            Column::Prefecture => record
                .prefecture
                .clone()
                .map_or(CellValue::Null, CellValue::String),
            Column::City => CellValue::String(record.city.clone()),
            Column::PricePerPerson => CellValue::Float(record.price_per_person),
            Column::Rating => float(record.rating),
            Column::StationWalkTime => record
                .station_walk_time
                .map_or(CellValue::Null, |w| CellValue::Integer(w as i64)),
            Column::ValueScore => float(value_score),
        }
    }

    /// Human-readable cell text for table display.
    pub fn format(self, cell: &CellValue) -> String {
        match (self, cell) {
            (Column::PricePerPerson, CellValue::Float(v)) => format!("¥{v:.0}"),
            (Column::Rating, CellValue::Float(v)) => format!("{v:.1}"),
            (Column::ValueScore, CellValue::Float(v)) => format!("{v:.5}"),
            (Column::StationWalkTime, CellValue::Integer(m)) => format!("{m} min"),
            _ => cell.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rankings – the four projections over one filtered set
// ---------------------------------------------------------------------------

/// Top-N views over a filtered set. A ranking is `None` when the dataset lacks
/// the column it sorts by.
#[derive(Debug, Clone, PartialEq)]
pub struct Rankings<'a> {
    pub cheapest: Vec<&'a HotelRecord>,
    pub top_rated: Option<Vec<&'a HotelRecord>>,
    pub best_value: Option<Vec<ScoredHotel<'a>>>,
    pub shortest_walk: Option<Vec<&'a HotelRecord>>,
}

impl<'a> Rankings<'a> {
    pub fn compute(filtered: &FilteredSet<'a>) -> Self {
        let schema = filtered.dataset.schema;
        let price = |r: &HotelRecord| Some(r.price_per_person);

        Rankings {
            cheapest: rank_by(filtered, price, Direction::Ascending, TOP_N),
            top_rated: schema
                .has_rating
                .then(|| rank_by(filtered, |r| r.rating, Direction::Descending, TOP_N)),
            best_value: schema.has_rating.then(|| best_value(filtered, TOP_N)),
            shortest_walk: schema.has_walk_time.then(|| {
                rank_by(
                    filtered,
                    |r| r.station_walk_time.map(f64::from),
                    Direction::Ascending,
                    TOP_N,
                )
            }),
        }
    }

    /// Owned tables for every computed ranking, in display order.
    pub fn tables(&self, schema: &DatasetSchema) -> Vec<RankedTable> {
        let mut tables = vec![RankedTable::build(
            RankingKind::Cheapest,
            schema,
            plain(&self.cheapest),
        )];
        if let Some(top) = &self.top_rated {
            tables.push(RankedTable::build(RankingKind::TopRated, schema, plain(top)));
        }
        if let Some(best) = &self.best_value {
            let rows = best.iter().map(|s| (s.record, Some(s.value_score))).collect();
            tables.push(RankedTable::build(RankingKind::BestValue, schema, rows));
        }
        if let Some(walk) = &self.shortest_walk {
            tables.push(RankedTable::build(
                RankingKind::ShortestWalk,
                schema,
                plain(walk),
            ));
        }
        tables
    }
}

fn plain<'r>(records: &[&'r HotelRecord]) -> Vec<(&'r HotelRecord, Option<f64>)> {
    records.iter().map(|r| (*r, None)).collect()
}

/// A ranking projected onto its fixed columns, ready for display or export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTable {
    pub kind: RankingKind,
    pub title: &'static str,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RankedTable {
    fn build(
        kind: RankingKind,
        schema: &DatasetSchema,
        records: Vec<(&HotelRecord, Option<f64>)>,
    ) -> Self {
        let columns = kind.columns(schema);
        let rows = records
            .into_iter()
            .map(|(record, score)| columns.iter().map(|c| c.cell(record, score)).collect())
            .collect();
        RankedTable {
            kind,
            title: kind.title(),
            columns,
            rows,
        }
    }
}
