use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// (prefecture, cities, typical price per person)
const AREAS: [(&str, &[&str], f64); 5] = [
    ("Tokyo", &["Shinjuku", "Asakusa", "Ginza", "Ueno"], 12000.0),
    ("Osaka", &["Namba", "Umeda", "Tennoji"], 8500.0),
    ("Kyoto", &["Gion", "Arashiyama", "Kyoto Station"], 11000.0),
    ("Hokkaido", &["Sapporo", "Otaru", "Hakodate"], 7000.0),
    ("Okinawa", &["Naha", "Onna"], 9500.0),
];

const KINDS: [&str; 5] = ["Hotel", "Inn", "Ryokan", "Stay", "Resort"];

struct Listing {
    name: String,
    prefecture: Option<&'static str>,
    city: &'static str,
    price_per_person: f64,
    rating: Option<f64>,
    station_walk_time: Option<i64>,
}

fn generate(rng: &mut SmallRng, count: usize) -> Vec<Listing> {
    (0..count)
        .map(|i| {
            let (prefecture, cities, base_price) = AREAS[rng.gen_range(0..AREAS.len())];
            let city = cities[rng.gen_range(0..cities.len())];
            let kind = KINDS[rng.gen_range(0..KINDS.len())];

            // Prices in 100-yen steps; better-rated places cost a bit more.
            let rating: f64 = (rng.gen_range(28..=50) as f64) / 10.0;
            let spread: f64 = rng.gen_range(0.5..1.8);
            let price = (base_price * spread * (0.6 + rating / 10.0) / 100.0).round() * 100.0;

            Listing {
                name: format!("{city} {kind} {:03}", i + 1),
                // A few rows with gaps, like a scraped listing would have.
                prefecture: (rng.gen_ratio(49, 50)).then_some(prefecture),
                city,
                price_per_person: price,
                rating: rng.gen_ratio(9, 10).then_some(rating),
                station_walk_time: rng
                    .gen_ratio(4, 5)
                    .then(|| rng.gen_range(1..=25)),
            }
        })
        .collect()
}

fn write_csv(listings: &[Listing], path: &str) -> Result<()> {
    let mut out = BufWriter::new(File::create(path).context("creating CSV file")?);
    // Spreadsheet tools expect the BOM on UTF-8 CSVs.
    out.write_all("\u{feff}".as_bytes())?;

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "name",
        "prefecture",
        "city",
        "price_per_person",
        "rating",
        "station_walk_time",
    ])?;
    for l in listings {
        writer.write_record([
            l.name.clone(),
            l.prefecture.unwrap_or_default().to_string(),
            l.city.to_string(),
            format!("{:.0}", l.price_per_person),
            l.rating.map(|r| format!("{r:.1}")).unwrap_or_default(),
            l.station_walk_time.map(|w| w.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn to_batch(listings: &[Listing]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("prefecture", DataType::Utf8, true),
        Field::new("city", DataType::Utf8, false),
        Field::new("price_per_person", DataType::Float64, false),
        Field::new("rating", DataType::Float64, true),
        Field::new("station_walk_time", DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from_iter_values(listings.iter().map(|l| l.name.as_str()))),
            Arc::new(StringArray::from_iter(listings.iter().map(|l| l.prefecture))),
            Arc::new(StringArray::from_iter_values(listings.iter().map(|l| l.city))),
            Arc::new(Float64Array::from_iter_values(
                listings.iter().map(|l| l.price_per_person),
            )),
            Arc::new(Float64Array::from_iter(listings.iter().map(|l| l.rating))),
            Arc::new(Int64Array::from_iter(listings.iter().map(|l| l.station_walk_time))),
        ],
    )
    .context("building record batch")?;
    Ok(batch)
}

fn write_parquet(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("parquet writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing parquet file")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(42);
    let listings = generate(&mut rng, 240);

    let csv_path = "sample_hotels.csv";
    let parquet_path = "sample_hotels.parquet";
    write_csv(&listings, csv_path)?;
    let batch = to_batch(&listings)?;
    write_parquet(&batch, parquet_path)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} listings to {csv_path} and {parquet_path}",
        listings.len()
    );
    Ok(())
}
