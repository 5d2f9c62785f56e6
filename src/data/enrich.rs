use chrono::NaiveDate;

use super::model::{BookingRecord, EnrichedDataset, EnrichedRecord, GroupType};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Month number (1..=12) from an English name, a three-letter abbreviation,
/// or a plain number.
pub fn parse_month(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let lower = s.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| *name == lower || (lower.len() == 3 && name.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

/// First calendar day of the arrival month, or `None` if either component
/// is missing or unparseable.
pub fn arrival_date(year: Option<i32>, month: Option<&str>) -> Option<NaiveDate> {
    let month = parse_month(month?)?;
    NaiveDate::from_ymd_opt(year?, month, 1)
}

/// Derive `total_nights`, `arrival_date` and `group_type`.
///
/// Returns `None` when adults, children or babies is null; those rows are
/// excluded before anything is derived.
pub fn enrich_record(raw: BookingRecord) -> Option<EnrichedRecord> {
    let (adults, children, babies) = (raw.adults?, raw.children?, raw.babies?);
    let arrival_date = arrival_date(raw.arrival_year, raw.arrival_month.as_deref());

    Some(EnrichedRecord {
        hotel: raw.hotel,
        is_canceled: raw.is_canceled,
        adults,
        children,
        babies,
        stays_weekend_nights: raw.stays_weekend_nights,
        stays_week_nights: raw.stays_week_nights,
        country: raw.country,
        adr: raw.adr,
        total_special_requests: raw.total_special_requests,
        total_nights: u64::from(raw.stays_weekend_nights) + u64::from(raw.stays_week_nights),
        arrival_date,
        group_type: GroupType::classify(adults, children, babies),
    })
}

/// Enrich a full raw record set into an immutable dataset snapshot.
pub fn enrich(raw: Vec<BookingRecord>) -> EnrichedDataset {
    let total = raw.len();
    let records: Vec<EnrichedRecord> = raw.into_iter().filter_map(enrich_record).collect();
    let dropped = total - records.len();

    let undated = records.iter().filter(|r| r.arrival_date.is_none()).count();
    if undated > 0 {
        log::warn!("{undated} records have a malformed arrival date and will never pass a date filter");
    }
    if dropped > 0 {
        log::info!("Dropped {dropped} of {total} records with null adults/children/babies");
    }

    EnrichedDataset::from_records(records, dropped)
}
