use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const COUNTRIES: [(&str, f64); 12] = [
    ("PRT", 0.40),
    ("GBR", 0.12),
    ("FRA", 0.10),
    ("ESP", 0.08),
    ("DEU", 0.07),
    ("ITA", 0.04),
    ("IRL", 0.04),
    ("BEL", 0.03),
    ("BRA", 0.03),
    ("NLD", 0.03),
    ("USA", 0.03),
    ("CHE", 0.03),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Booking {
    hotel: &'static str,
    is_canceled: bool,
    year: i64,
    month: &'static str,
    adults: i64,
    children: Option<i64>,
    babies: i64,
    weekend_nights: i64,
    week_nights: i64,
    country: Option<&'static str>,
    adr: f64,
    special_requests: i64,
}

fn pick_country(rng: &mut SimpleRng) -> &'static str {
    let mut u = rng.next_f64();
    for (code, weight) in COUNTRIES {
        if u < weight {
            return code;
        }
        u -= weight;
    }
    COUNTRIES[0].0
}

fn generate_booking(rng: &mut SimpleRng) -> Booking {
    let resort = rng.chance(0.35);
    let adults = match rng.below(100) {
        0..=1 => 0,
        2..=21 => 1,
        22..=91 => 2,
        _ => 3 + rng.below(2) as i64,
    };
    let children = if rng.chance(0.01) {
        None
    } else if adults > 0 && rng.chance(0.08) {
        Some(1 + rng.below(2) as i64)
    } else {
        Some(0)
    };
    let babies = i64::from(adults > 0 && rng.chance(0.01));
    let family = children.unwrap_or(0) > 0 || babies > 0;

    let weekend_nights = rng.below(if resort { 4 } else { 3 }) as i64;
    let week_nights = rng.below(if resort { 7 } else { 4 }) as i64 + i64::from(family);

    let (year, month_idx) = match rng.below(26) {
        k @ 0..=5 => (2015, 6 + k),
        k @ 6..=17 => (2016, k - 6),
        k => (2017, k - 18),
    };

    let base_rate = if resort { 95.0 } else { 105.0 };
    let season = if (5..=7).contains(&month_idx) { 1.35 } else { 1.0 };
    let mut adr = rng.gauss(base_rate * season + 12.0 * (adults as f64 - 2.0).max(0.0), 25.0);
    // A handful of refunds show up as negative rates in the real data.
    if rng.chance(0.001) {
        adr = -rng.gauss(10.0, 3.0).abs();
    }

    Booking {
        hotel: if resort { "Resort Hotel" } else { "City Hotel" },
        is_canceled: rng.chance(if resort { 0.28 } else { 0.42 }),
        year,
        month: MONTHS[month_idx as usize],
        adults,
        children,
        babies,
        weekend_nights,
        week_nights,
        country: if rng.chance(0.004) { None } else { Some(pick_country(rng)) },
        adr: (adr * 100.0).round() / 100.0,
        special_requests: rng.below(if family { 4 } else { 3 }) as i64,
    }
}

const HEADER: [&str; 12] = [
    "hotel",
    "is_canceled",
    "arrival_date_year",
    "arrival_date_month",
    "adults",
    "children",
    "babies",
    "stays_in_weekend_nights",
    "stays_in_week_nights",
    "country",
    "adr",
    "total_of_special_requests",
];

fn write_csv(path: &str, bookings: &[Booking]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADER)?;
    for b in bookings {
        writer.write_record([
            b.hotel.to_string(),
            u8::from(b.is_canceled).to_string(),
            b.year.to_string(),
            b.month.to_string(),
            b.adults.to_string(),
            b.children.map_or_else(|| "NA".to_string(), |c| c.to_string()),
            b.babies.to_string(),
            b.weekend_nights.to_string(),
            b.week_nights.to_string(),
            b.country.unwrap_or("NULL").to_string(),
            b.adr.to_string(),
            b.special_requests.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, bookings: &[Booking]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("hotel", DataType::Utf8, false),
        Field::new("is_canceled", DataType::Boolean, false),
        Field::new("arrival_date_year", DataType::Int64, false),
        Field::new("arrival_date_month", DataType::Utf8, false),
        Field::new("adults", DataType::Int64, false),
        Field::new("children", DataType::Int64, true),
        Field::new("babies", DataType::Int64, false),
        Field::new("stays_in_weekend_nights", DataType::Int64, false),
        Field::new("stays_in_week_nights", DataType::Int64, false),
        Field::new("country", DataType::Utf8, true),
        Field::new("adr", DataType::Float64, false),
        Field::new("total_of_special_requests", DataType::Int64, false),
    ]));

    let ints = |f: fn(&Booking) -> i64| Int64Array::from(bookings.iter().map(f).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(bookings.iter().map(|b| b.hotel).collect::<Vec<_>>())),
            Arc::new(BooleanArray::from(bookings.iter().map(|b| b.is_canceled).collect::<Vec<_>>())),
            Arc::new(ints(|b| b.year)),
            Arc::new(StringArray::from(bookings.iter().map(|b| b.month).collect::<Vec<_>>())),
            Arc::new(ints(|b| b.adults)),
            Arc::new(Int64Array::from(bookings.iter().map(|b| b.children).collect::<Vec<_>>())),
            Arc::new(ints(|b| b.babies)),
            Arc::new(ints(|b| b.weekend_nights)),
            Arc::new(ints(|b| b.week_nights)),
            Arc::new(StringArray::from(bookings.iter().map(|b| b.country).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(bookings.iter().map(|b| b.adr).collect::<Vec<_>>())),
            Arc::new(ints(|b| b.special_requests)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let count: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse().with_context(|| format!("invalid booking count '{arg}'"))?,
        None => 20_000,
    };

    let mut rng = SimpleRng::new(42);
    let bookings: Vec<Booking> = (0..count).map(|_| generate_booking(&mut rng)).collect();

    write_csv("hotel_bookings.csv", &bookings)?;
    write_parquet("hotel_bookings.parquet", &bookings)?;

    println!("Wrote {count} bookings to hotel_bookings.csv and hotel_bookings.parquet");
    Ok(())
}
