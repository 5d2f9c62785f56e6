use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilteredSet;
use super::model::{EnrichedRecord, GroupType, Hotel, YearMonth};

// ---------------------------------------------------------------------------
// Table schema
// ---------------------------------------------------------------------------

/// How the rendering layer should draw a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    GroupedBar,
    StackedBar,
    Line,
    Pie,
    Radar,
}

/// Every table the dashboard produces, one per chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    GroupDistribution,
    CountryDistribution,
    HotelPreference,
    StayLength,
    MonthlyStayLength,
    SpecialRequests,
    ReservationRate,
    MonthlyReservations,
    CancellationRate,
    MonthlyCancellations,
    RadarMetrics,
    OperatingCosts,
    Rentability,
}

impl TableKind {
    pub fn title(self) -> &'static str {
        match self {
            TableKind::GroupDistribution => "Booking distribution by group type",
            TableKind::CountryDistribution => "Guests by country (most bookings first)",
            TableKind::HotelPreference => "Hotel preference by group type",
            TableKind::StayLength => "Average stay length by group type",
            TableKind::MonthlyStayLength => "Average stay length by month and group type",
            TableKind::SpecialRequests => "Average special requests by group type",
            TableKind::ReservationRate => "Reservation rate by group type",
            TableKind::MonthlyReservations => "Monthly reservations by group type",
            TableKind::CancellationRate => "Cancellation rate by group type",
            TableKind::MonthlyCancellations => "Cancellations by month and group type",
            TableKind::RadarMetrics => "Key metrics by group type (scaled)",
            TableKind::OperatingCosts => "Operating costs by group type",
            TableKind::Rentability => "Theoretical rentability by group type",
        }
    }

    pub fn chart(self) -> ChartKind {
        match self {
            TableKind::GroupDistribution => ChartKind::Pie,
            TableKind::CountryDistribution | TableKind::OperatingCosts => ChartKind::StackedBar,
            TableKind::HotelPreference => ChartKind::GroupedBar,
            TableKind::MonthlyStayLength
            | TableKind::MonthlyReservations
            | TableKind::MonthlyCancellations => ChartKind::Line,
            TableKind::RadarMetrics => ChartKind::Radar,
            TableKind::StayLength
            | TableKind::SpecialRequests
            | TableKind::ReservationRate
            | TableKind::CancellationRate
            | TableKind::Rentability => ChartKind::Bar,
        }
    }

    pub fn key_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::CountryDistribution => &["country", "group_type"],
            TableKind::HotelPreference => &["group_type", "hotel"],
            TableKind::MonthlyStayLength
            | TableKind::MonthlyReservations
            | TableKind::MonthlyCancellations => &["month", "group_type"],
            _ => &["group_type"],
        }
    }

    pub fn metric_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::GroupDistribution => &["percentage"],
            TableKind::ReservationRate => &["reservation_rate"],
            TableKind::CountryDistribution
            | TableKind::HotelPreference
            | TableKind::MonthlyReservations
            | TableKind::MonthlyCancellations => &["count"],
            TableKind::StayLength | TableKind::MonthlyStayLength => &["total_nights"],
            TableKind::SpecialRequests => &["total_of_special_requests"],
            TableKind::CancellationRate => &["is_canceled"],
            TableKind::RadarMetrics => &[
                "total_nights",
                "adr",
                "is_canceled",
                "total_of_special_requests",
            ],
            TableKind::OperatingCosts => &[
                "total_nights",
                "total_of_special_requests",
                "is_canceled_x10",
            ],
            TableKind::Rentability => &[
                "adr",
                "total_nights",
                "is_canceled",
                "theoretical_rentability",
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

/// One grouping-key value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Key {
    Group(GroupType),
    Country(String),
    Month(YearMonth),
    Hotel(Hotel),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Group(g) => write!(f, "{g}"),
            Key::Country(c) => write!(f, "{c}"),
            Key::Month(m) => write!(f, "{m}"),
            Key::Hotel(h) => write!(f, "{h}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub keys: Vec<Key>,
    pub metrics: Vec<f64>,
}

impl AggregateRow {
    fn new(keys: Vec<Key>, metrics: Vec<f64>) -> Self {
        AggregateRow { keys, metrics }
    }

    /// The group type this row belongs to, if it is keyed by one.
    #[cfg(test)]
    pub fn group(&self) -> Option<GroupType> {
        self.keys.iter().find_map(|k| match k {
            Key::Group(g) => Some(*g),
            _ => None,
        })
    }
}

/// Output of one aggregation: ordered rows plus the column schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    pub kind: TableKind,
    pub title: &'static str,
    pub chart: ChartKind,
    pub key_columns: &'static [&'static str],
    pub metric_columns: &'static [&'static str],
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn new(kind: TableKind, rows: Vec<AggregateRow>) -> Self {
        AggregateTable {
            kind,
            title: kind.title(),
            chart: kind.chart(),
            key_columns: kind.key_columns(),
            metric_columns: kind.metric_columns(),
            rows,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a metric by key tuple and column name.
    pub fn value(&self, keys: &[Key], metric: &str) -> Option<f64> {
        let col = self.metric_columns.iter().position(|m| *m == metric)?;
        self.rows
            .iter()
            .find(|r| r.keys == keys)
            .and_then(|r| r.metrics.get(col).copied())
    }

    /// Distinct values of the first key column, in row order.
    pub fn primary_keys(&self) -> Vec<&Key> {
        let mut seen: Vec<&Key> = Vec::new();
        for row in &self.rows {
            if let Some(k) = row.keys.first() {
                if !seen.contains(&k) {
                    seen.push(k);
                }
            }
        }
        seen
    }
}

// ---------------------------------------------------------------------------
// Per-group summary shared by several tables
// ---------------------------------------------------------------------------

/// Means over one non-empty group of the filtered set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupMetrics {
    pub group: GroupType,
    pub count: usize,
    pub mean_total_nights: f64,
    pub mean_adr: f64,
    /// Fraction of bookings canceled.
    pub cancellation_rate: f64,
    pub mean_special_requests: f64,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    nights: f64,
    adr: f64,
    canceled: f64,
    requests: f64,
}

impl Accumulator {
    fn add(&mut self, r: &EnrichedRecord) {
        self.count += 1;
        self.nights += r.total_nights as f64;
        self.adr += r.adr;
        self.canceled += if r.is_canceled { 1.0 } else { 0.0 };
        self.requests += r.total_special_requests as f64;
    }
}

/// Summaries for every group present in the set, in group order. Groups with
/// no records get no entry, so no mean is ever taken over zero rows.
pub fn group_metrics(set: &FilteredSet<'_>) -> Vec<GroupMetrics> {
    let mut acc: BTreeMap<GroupType, Accumulator> = BTreeMap::new();
    for &r in &set.records {
        acc.entry(r.group_type).or_default().add(r);
    }
    acc.into_iter()
        .map(|(group, a)| {
            let n = a.count as f64;
            GroupMetrics {
                group,
                count: a.count,
                mean_total_nights: a.nights / n,
                mean_adr: a.adr / n,
                cancellation_rate: a.canceled / n,
                mean_special_requests: a.requests / n,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Derived-metric arithmetic
// ---------------------------------------------------------------------------

/// `adr * nights * (1 - cancellation_rate)`. Not floored: a negative ADR
/// yields a negative rentability.
pub fn theoretical_rentability(mean_adr: f64, mean_total_nights: f64, cancellation_rate: f64) -> f64 {
    mean_adr * mean_total_nights * (1.0 - cancellation_rate)
}

/// Divide each value by the maximum. A zero (or non-finite) maximum scales
/// everything to 0.0.
pub fn scale_by_max(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == 0.0 || !max.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v / max).collect()
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

fn count_by<K: Ord>(
    set: &FilteredSet<'_>,
    key: impl Fn(&EnrichedRecord) -> Option<K>,
) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for &r in &set.records {
        if let Some(k) = key(r) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

fn mean_by<K: Ord>(
    set: &FilteredSet<'_>,
    key: impl Fn(&EnrichedRecord) -> Option<K>,
    value: impl Fn(&EnrichedRecord) -> f64,
) -> BTreeMap<K, f64> {
    let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for &r in &set.records {
        if let Some(k) = key(r) {
            let e = sums.entry(k).or_insert((0.0, 0));
            e.0 += value(r);
            e.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

fn month_group(r: &EnrichedRecord) -> Option<(YearMonth, GroupType)> {
    Some((r.arrival_month()?, r.group_type))
}

/// Share of bookings per group type, most frequent first. Sums to 1.0.
fn normalized_counts(kind: TableKind, set: &FilteredSet<'_>) -> AggregateTable {
    let counts = count_by(set, |r| Some(r.group_type));
    let total = set.len() as f64;
    let mut ranked: Vec<(GroupType, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let rows = ranked
        .into_iter()
        .map(|(g, n)| AggregateRow::new(vec![Key::Group(g)], vec![n as f64 / total]))
        .collect();
    AggregateTable::new(kind, rows)
}

pub fn group_distribution(set: &FilteredSet<'_>) -> AggregateTable {
    normalized_counts(TableKind::GroupDistribution, set)
}

/// Same computation as [`group_distribution`], reported under its own name.
pub fn reservation_rate(set: &FilteredSet<'_>) -> AggregateTable {
    normalized_counts(TableKind::ReservationRate, set)
}

/// Bookings per (country, group) restricted to the `max_countries` countries
/// with most bookings. Ties keep alphabetical country order. Records without
/// a country are not counted.
pub fn country_distribution(set: &FilteredSet<'_>) -> AggregateTable {
    let counts = count_by(set, |r| Some((r.country.clone()?, r.group_type)));

    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for ((country, _), n) in &counts {
        *totals.entry(country.as_str()).or_insert(0) += n;
    }
    let mut ranked: Vec<(&str, usize)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(set.max_countries);

    let rows = ranked
        .iter()
        .flat_map(|(country, _)| {
            counts
                .iter()
                .filter(move |((c, _), _)| c == country)
                .map(|((c, g), n)| {
                    AggregateRow::new(vec![Key::Country(c.clone()), Key::Group(*g)], vec![*n as f64])
                })
        })
        .collect();
    AggregateTable::new(TableKind::CountryDistribution, rows)
}

pub fn hotel_preference(set: &FilteredSet<'_>) -> AggregateTable {
    let rows = count_by(set, |r| Some((r.group_type, r.hotel)))
        .into_iter()
        .map(|((g, h), n)| AggregateRow::new(vec![Key::Group(g), Key::Hotel(h)], vec![n as f64]))
        .collect();
    AggregateTable::new(TableKind::HotelPreference, rows)
}

fn per_group(
    kind: TableKind,
    metrics: &[GroupMetrics],
    values: impl Fn(&GroupMetrics) -> Vec<f64>,
) -> AggregateTable {
    let rows = metrics
        .iter()
        .map(|m| AggregateRow::new(vec![Key::Group(m.group)], values(m)))
        .collect();
    AggregateTable::new(kind, rows)
}

pub fn stay_length(set: &FilteredSet<'_>) -> AggregateTable {
    per_group(TableKind::StayLength, &group_metrics(set), |m| {
        vec![m.mean_total_nights]
    })
}

pub fn monthly_stay_length(set: &FilteredSet<'_>) -> AggregateTable {
    let rows = mean_by(set, month_group, |r| r.total_nights as f64)
        .into_iter()
        .map(|((m, g), mean)| AggregateRow::new(vec![Key::Month(m), Key::Group(g)], vec![mean]))
        .collect();
    AggregateTable::new(TableKind::MonthlyStayLength, rows)
}

pub fn special_requests(set: &FilteredSet<'_>) -> AggregateTable {
    per_group(TableKind::SpecialRequests, &group_metrics(set), |m| {
        vec![m.mean_special_requests]
    })
}

pub fn monthly_reservations(set: &FilteredSet<'_>) -> AggregateTable {
    let rows = count_by(set, month_group)
        .into_iter()
        .map(|((m, g), n)| AggregateRow::new(vec![Key::Month(m), Key::Group(g)], vec![n as f64]))
        .collect();
    AggregateTable::new(TableKind::MonthlyReservations, rows)
}

pub fn cancellation_rate(set: &FilteredSet<'_>) -> AggregateTable {
    per_group(TableKind::CancellationRate, &group_metrics(set), |m| {
        vec![m.cancellation_rate]
    })
}

/// Canceled bookings only, counted per (month, group).
pub fn monthly_cancellations(set: &FilteredSet<'_>) -> AggregateTable {
    let rows = count_by(set, |r| if r.is_canceled { month_group(r) } else { None })
        .into_iter()
        .map(|((m, g), n)| AggregateRow::new(vec![Key::Month(m), Key::Group(g)], vec![n as f64]))
        .collect();
    AggregateTable::new(TableKind::MonthlyCancellations, rows)
}

/// Stay length, ADR, cancellation rate and special requests, each divided by
/// its maximum across groups.
pub fn radar_metrics(set: &FilteredSet<'_>) -> AggregateTable {
    let metrics = group_metrics(set);
    let columns: [Vec<f64>; 4] = [
        scale_by_max(&metrics.iter().map(|m| m.mean_total_nights).collect::<Vec<_>>()),
        scale_by_max(&metrics.iter().map(|m| m.mean_adr).collect::<Vec<_>>()),
        scale_by_max(&metrics.iter().map(|m| m.cancellation_rate).collect::<Vec<_>>()),
        scale_by_max(&metrics.iter().map(|m| m.mean_special_requests).collect::<Vec<_>>()),
    ];
    let rows = metrics
        .iter()
        .enumerate()
        .map(|(i, m)| {
            AggregateRow::new(
                vec![Key::Group(m.group)],
                columns.iter().map(|c| c[i]).collect(),
            )
        })
        .collect();
    AggregateTable::new(TableKind::RadarMetrics, rows)
}

/// Stacked cost proxies; the cancellation rate is multiplied by 10 so it is
/// visible next to the other two.
pub fn operating_costs(set: &FilteredSet<'_>) -> AggregateTable {
    per_group(TableKind::OperatingCosts, &group_metrics(set), |m| {
        vec![
            m.mean_total_nights,
            m.mean_special_requests,
            m.cancellation_rate * 10.0,
        ]
    })
}

pub fn rentability(set: &FilteredSet<'_>) -> AggregateTable {
    per_group(TableKind::Rentability, &group_metrics(set), |m| {
        vec![
            m.mean_adr,
            m.mean_total_nights,
            m.cancellation_rate,
            theoretical_rentability(m.mean_adr, m.mean_total_nights, m.cancellation_rate),
        ]
    })
}

// ---------------------------------------------------------------------------
// All tables for one filter pass
// ---------------------------------------------------------------------------

/// Every table for the current filtered set, in dashboard order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTables {
    pub visible_records: usize,
    pub tables: Vec<AggregateTable>,
}

impl DashboardTables {
    pub fn compute(set: &FilteredSet<'_>) -> Self {
        if set.is_empty() {
            log::debug!("No records pass the current filters");
        }
        let tables = vec![
            group_distribution(set),
            country_distribution(set),
            hotel_preference(set),
            stay_length(set),
            monthly_stay_length(set),
            special_requests(set),
            reservation_rate(set),
            monthly_reservations(set),
            cancellation_rate(set),
            monthly_cancellations(set),
            radar_metrics(set),
            operating_costs(set),
            rentability(set),
        ];
        DashboardTables {
            visible_records: set.len(),
            tables,
        }
    }

    #[cfg(test)]
    pub fn get(&self, kind: TableKind) -> Option<&AggregateTable> {
        self.tables.iter().find(|t| t.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const EPS: f64 = 1e-9;

    struct Booking {
        hotel: Hotel,
        adults: u32,
        children: u32,
        canceled: bool,
        nights: u32,
        adr: f64,
        requests: u32,
        country: Option<&'static str>,
        month: u32,
    }

    impl Default for Booking {
        fn default() -> Self {
            Booking {
                hotel: Hotel::City,
                adults: 2,
                children: 0,
                canceled: false,
                nights: 2,
                adr: 100.0,
                requests: 0,
                country: Some("PRT"),
                month: 7,
            }
        }
    }

    impl Booking {
        fn build(self) -> EnrichedRecord {
            EnrichedRecord {
                hotel: self.hotel,
                is_canceled: self.canceled,
                adults: self.adults,
                children: self.children,
                babies: 0,
                stays_weekend_nights: 0,
                stays_week_nights: self.nights,
                country: self.country.map(String::from),
                adr: self.adr,
                total_special_requests: self.requests,
                total_nights: u64::from(self.nights),
                arrival_date: NaiveDate::from_ymd_opt(2016, self.month, 1),
                group_type: GroupType::classify(self.adults, self.children, 0),
            }
        }
    }

    fn set(records: &[EnrichedRecord], max_countries: usize) -> FilteredSet<'_> {
        FilteredSet {
            records: records.iter().collect(),
            max_countries,
        }
    }

    fn g(group: GroupType) -> Vec<Key> {
        vec![Key::Group(group)]
    }

    #[test]
    fn group_distribution_sums_to_one_and_ranks() {
        let records: Vec<EnrichedRecord> = vec![
            Booking::default().build(),
            Booking::default().build(),
            Booking::default().build(),
            Booking { adults: 1, ..Default::default() }.build(),
            Booking { adults: 2, children: 1, ..Default::default() }.build(),
            Booking { adults: 3, ..Default::default() }.build(),
        ];
        let t = group_distribution(&set(&records, 10));
        let total: f64 = t.rows.iter().map(|r| r.metrics[0]).sum();
        assert!((total - 1.0).abs() < EPS);
        assert_eq!(t.rows[0].group(), Some(GroupType::Couple));
        assert!((t.rows[0].metrics[0] - 0.5).abs() < EPS);
        // ties among the singletons follow group order
        let tail: Vec<_> = t.rows[1..].iter().filter_map(|r| r.group()).collect();
        assert_eq!(tail, vec![GroupType::Family, GroupType::Group, GroupType::Single]);

        let rr = reservation_rate(&set(&records, 10));
        assert_eq!(rr.kind, TableKind::ReservationRate);
        assert_eq!(rr.rows, t.rows);
    }

    #[test]
    fn country_distribution_keeps_top_n() {
        let mut records = Vec::new();
        for (country, n) in [("PRT", 5), ("GBR", 3), ("FRA", 3), ("ESP", 1)] {
            for _ in 0..n {
                records.push(Booking { country: Some(country), ..Default::default() }.build());
            }
        }
        records.push(Booking { country: Some("PRT"), adults: 1, ..Default::default() }.build());
        records.push(Booking { country: None, ..Default::default() }.build());

        let t = country_distribution(&set(&records, 2));
        let countries: Vec<String> = t.primary_keys().iter().map(|k| k.to_string()).collect();
        // FRA and GBR tie on 3; alphabetical order wins
        assert_eq!(countries, vec!["PRT", "FRA"]);
        assert_eq!(
            t.value(&[Key::Country("PRT".into()), Key::Group(GroupType::Couple)], "count"),
            Some(5.0)
        );
        assert_eq!(
            t.value(&[Key::Country("PRT".into()), Key::Group(GroupType::Single)], "count"),
            Some(1.0)
        );

        let t = country_distribution(&set(&records, 10));
        assert_eq!(t.primary_keys().len(), 4);
    }

    #[test]
    fn hotel_preference_counts_pairs() {
        let records = vec![
            Booking { hotel: Hotel::Resort, ..Default::default() }.build(),
            Booking { hotel: Hotel::Resort, ..Default::default() }.build(),
            Booking { hotel: Hotel::City, ..Default::default() }.build(),
        ];
        let t = hotel_preference(&set(&records, 10));
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.value(&[Key::Group(GroupType::Couple), Key::Hotel(Hotel::Resort)], "count"),
            Some(2.0)
        );
    }

    #[test]
    fn means_per_group_and_month() {
        let records = vec![
            Booking { nights: 2, requests: 1, month: 7, ..Default::default() }.build(),
            Booking { nights: 4, requests: 3, month: 7, ..Default::default() }.build(),
            Booking { nights: 9, requests: 0, month: 8, ..Default::default() }.build(),
        ];
        let s = set(&records, 10);
        assert_eq!(stay_length(&s).value(&g(GroupType::Couple), "total_nights"), Some(5.0));
        assert_eq!(
            special_requests(&s).value(&g(GroupType::Couple), "total_of_special_requests"),
            Some(4.0 / 3.0)
        );

        let monthly = monthly_stay_length(&s);
        let july = YearMonth { year: 2016, month: 7 };
        let aug = YearMonth { year: 2016, month: 8 };
        assert_eq!(
            monthly.value(&[Key::Month(july), Key::Group(GroupType::Couple)], "total_nights"),
            Some(3.0)
        );
        assert_eq!(monthly.rows[1].keys[0], Key::Month(aug));

        let counts = monthly_reservations(&s);
        assert_eq!(
            counts.value(&[Key::Month(july), Key::Group(GroupType::Couple)], "count"),
            Some(2.0)
        );
    }

    #[test]
    fn cancellations() {
        let records = vec![
            Booking { canceled: true, month: 7, ..Default::default() }.build(),
            Booking { canceled: false, month: 7, ..Default::default() }.build(),
            Booking { canceled: true, month: 8, ..Default::default() }.build(),
            Booking { canceled: false, adults: 1, ..Default::default() }.build(),
        ];
        let s = set(&records, 10);
        let rate = cancellation_rate(&s);
        assert!((rate.value(&g(GroupType::Couple), "is_canceled").unwrap() - 2.0 / 3.0).abs() < EPS);
        assert_eq!(rate.value(&g(GroupType::Single), "is_canceled"), Some(0.0));
        // Absent groups get no row
        assert_eq!(rate.value(&g(GroupType::Family), "is_canceled"), None);

        let monthly = monthly_cancellations(&s);
        assert_eq!(monthly.len(), 2);
        assert!(monthly.rows.iter().all(|r| r.group() == Some(GroupType::Couple)));
        assert!(monthly.rows.iter().all(|r| r.metrics[0] == 1.0));
    }

    #[test]
    fn rentability_from_literals() {
        assert!((theoretical_rentability(100.0, 3.0, 0.2) - 240.0).abs() < EPS);
        assert!(theoretical_rentability(-10.0, 3.0, 0.0) < 0.0);
    }

    #[test]
    fn rentability_table() {
        let records = vec![
            Booking { adr: 100.0, nights: 3, canceled: true, ..Default::default() }.build(),
            Booking { adr: 100.0, nights: 3, ..Default::default() }.build(),
            Booking { adr: 100.0, nights: 3, ..Default::default() }.build(),
            Booking { adr: 100.0, nights: 3, ..Default::default() }.build(),
            Booking { adr: 100.0, nights: 3, ..Default::default() }.build(),
        ];
        let t = rentability(&set(&records, 10));
        let v = t.value(&g(GroupType::Couple), "theoretical_rentability").unwrap();
        assert!((v - 240.0).abs() < EPS);
    }

    #[test]
    fn radar_scaling() {
        let scaled = scale_by_max(&[10.0, 20.0, 5.0]);
        assert_eq!(scaled, vec![0.5, 1.0, 0.25]);
        assert_eq!(scale_by_max(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(scale_by_max(&[]).is_empty());
    }

    #[test]
    fn radar_table_guards_zero_max() {
        // nobody canceled: the cancellation axis has max 0
        let records = vec![
            Booking { nights: 2, ..Default::default() }.build(),
            Booking { nights: 4, adults: 1, ..Default::default() }.build(),
        ];
        let t = radar_metrics(&set(&records, 10));
        assert_eq!(t.value(&g(GroupType::Couple), "total_nights"), Some(0.5));
        assert_eq!(t.value(&g(GroupType::Single), "total_nights"), Some(1.0));
        assert_eq!(t.value(&g(GroupType::Single), "is_canceled"), Some(0.0));
        assert!(t.rows.iter().flat_map(|r| &r.metrics).all(|v| v.is_finite()));
    }

    #[test]
    fn operating_costs_scale_cancellations() {
        let records = vec![
            Booking { canceled: true, requests: 2, ..Default::default() }.build(),
            Booking { canceled: false, requests: 0, ..Default::default() }.build(),
        ];
        let t = operating_costs(&set(&records, 10));
        assert_eq!(t.value(&g(GroupType::Couple), "is_canceled_x10"), Some(5.0));
        assert_eq!(t.value(&g(GroupType::Couple), "total_of_special_requests"), Some(1.0));
    }

    #[test]
    fn empty_set_yields_empty_tables() {
        let records: Vec<EnrichedRecord> = Vec::new();
        let all = DashboardTables::compute(&set(&records, 10));
        assert_eq!(all.tables.len(), 13);
        assert_eq!(all.visible_records, 0);
        assert!(all.tables.iter().all(|t| t.is_empty()));
    }

    #[test]
    fn dashboard_lookup_by_kind() {
        let records = vec![Booking::default().build()];
        let all = DashboardTables::compute(&set(&records, 10));
        let pie = all.get(TableKind::GroupDistribution).unwrap();
        assert_eq!(pie.chart, ChartKind::Pie);
        assert_eq!(pie.value(&g(GroupType::Couple), "percentage"), Some(1.0));
    }
}
