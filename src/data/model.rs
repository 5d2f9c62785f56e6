use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Hotel – the two property categories in the source data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Hotel {
    #[serde(rename = "City Hotel")]
    City,
    #[serde(rename = "Resort Hotel")]
    Resort,
}

impl Hotel {
    pub const ALL: [Hotel; 2] = [Hotel::City, Hotel::Resort];

    /// Parse the `hotel` column. Accepts the source labels
    /// ("City Hotel", "Resort Hotel") as well as the bare words.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "city hotel" | "city" => Some(Hotel::City),
            "resort hotel" | "resort" => Some(Hotel::Resort),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Hotel::City => "City Hotel",
            Hotel::Resort => "Resort Hotel",
        }
    }
}

impl fmt::Display for Hotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// GroupType – party composition category
// ---------------------------------------------------------------------------

/// Party composition derived from adults / children / babies.
///
/// Variant order is alphabetical so that grouping by `GroupType` yields the
/// same row order as a sorted group-by on the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GroupType {
    Couple,
    Family,
    Group,
    Single,
}

impl GroupType {
    pub const ALL: [GroupType; 4] = [
        GroupType::Couple,
        GroupType::Family,
        GroupType::Group,
        GroupType::Single,
    ];

    /// Ordered decision rule, first match wins. The rules overlap, so the
    /// order matters: two adults with a child is a `Family`, never a `Couple`.
    pub fn classify(adults: u32, children: u32, babies: u32) -> Self {
        if adults >= 1 && (children > 0 || babies > 0) {
            GroupType::Family
        } else if adults == 2 && children == 0 && babies == 0 {
            GroupType::Couple
        } else if adults > 2 {
            GroupType::Group
        } else {
            GroupType::Single
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupType::Couple => "Couple",
            GroupType::Family => "Family",
            GroupType::Group => "Group",
            GroupType::Single => "Single",
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// YearMonth – arrival date truncated to month granularity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn succ(self) -> Self {
        if self.month >= 12 {
            YearMonth { year: self.year + 1, month: 1 }
        } else {
            YearMonth { year: self.year, month: self.month + 1 }
        }
    }

    /// Every month from `first` through `last`, inclusive. Empty if reversed.
    pub fn span(first: YearMonth, last: YearMonth) -> Vec<YearMonth> {
        std::iter::successors(Some(first), |m| Some(m.succ()))
            .take_while(|m| *m <= last)
            .collect()
    }
}

/// Rendered as "YYYY-MM".
impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// BookingRecord – one raw reservation row
// ---------------------------------------------------------------------------

/// A single reservation as read from the source, before derivation.
///
/// `adults`, `children` and `babies` are optional because the source contains
/// nulls in them; such rows are dropped before enrichment. The arrival
/// components are kept loosely typed so that a malformed value degrades to a
/// null arrival date instead of failing the load.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub hotel: Hotel,
    pub is_canceled: bool,
    pub arrival_year: Option<i32>,
    pub arrival_month: Option<String>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub babies: Option<u32>,
    pub stays_weekend_nights: u32,
    pub stays_week_nights: u32,
    pub country: Option<String>,
    /// Average daily rate. Negative values occur in the source and are kept.
    pub adr: f64,
    pub total_special_requests: u32,
}

// ---------------------------------------------------------------------------
// EnrichedRecord – raw row plus derived fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub hotel: Hotel,
    pub is_canceled: bool,
    pub adults: u32,
    pub children: u32,
    pub babies: u32,
    pub stays_weekend_nights: u32,
    pub stays_week_nights: u32,
    pub country: Option<String>,
    pub adr: f64,
    pub total_special_requests: u32,

    pub total_nights: u64,
    /// First day of the arrival month; `None` when year or month is malformed.
    pub arrival_date: Option<NaiveDate>,
    pub group_type: GroupType,
}

impl EnrichedRecord {
    pub fn arrival_month(&self) -> Option<YearMonth> {
        self.arrival_date.map(YearMonth::of)
    }
}

// ---------------------------------------------------------------------------
// EnrichedDataset – immutable snapshot shared by every pipeline pass
// ---------------------------------------------------------------------------

/// The full enriched record set plus a few indices used to seed filters.
#[derive(Debug, Clone)]
pub struct EnrichedDataset {
    pub records: Arc<[EnrichedRecord]>,
    /// Hotel types present in the data, sorted.
    pub hotels: Vec<Hotel>,
    /// Earliest and latest concrete arrival dates (None if no record has one).
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    /// Rows discarded because adults / children / babies was null.
    pub dropped_rows: usize,
}

impl EnrichedDataset {
    pub fn from_records(records: Vec<EnrichedRecord>, dropped_rows: usize) -> Self {
        let mut hotels: Vec<Hotel> = records.iter().map(|r| r.hotel).collect();
        hotels.sort();
        hotels.dedup();

        let date_bounds = records
            .iter()
            .filter_map(|r| r.arrival_date)
            .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            });

        EnrichedDataset {
            records: records.into(),
            hotels,
            date_bounds,
            dropped_rows,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_type_decision_table() {
        assert_eq!(GroupType::classify(2, 1, 0), GroupType::Family);
        assert_eq!(GroupType::classify(2, 0, 0), GroupType::Couple);
        assert_eq!(GroupType::classify(3, 0, 0), GroupType::Group);
        assert_eq!(GroupType::classify(1, 0, 0), GroupType::Single);
        assert_eq!(GroupType::classify(1, 1, 0), GroupType::Family);
    }

    #[test]
    fn family_takes_precedence_over_group() {
        assert_eq!(GroupType::classify(4, 0, 1), GroupType::Family);
    }

    #[test]
    fn children_without_adults_is_single() {
        assert_eq!(GroupType::classify(0, 2, 0), GroupType::Single);
        assert_eq!(GroupType::classify(0, 0, 0), GroupType::Single);
    }

    #[test]
    fn month_span_crosses_year_end() {
        let span = YearMonth::span(
            YearMonth { year: 2015, month: 11 },
            YearMonth { year: 2016, month: 2 },
        );
        let labels: Vec<String> = span.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["2015-11", "2015-12", "2016-01", "2016-02"]);
        assert!(YearMonth::span(
            YearMonth { year: 2016, month: 2 },
            YearMonth { year: 2015, month: 11 },
        )
        .is_empty());
    }

    #[test]
    fn year_month_label() {
        let ym = YearMonth::of(NaiveDate::from_ymd_opt(2015, 7, 1).unwrap());
        assert_eq!(ym.to_string(), "2015-07");
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2015-07\"");
    }

    #[test]
    fn hotel_labels_parse() {
        assert_eq!(Hotel::parse("Resort Hotel"), Some(Hotel::Resort));
        assert_eq!(Hotel::parse(" city hotel "), Some(Hotel::City));
        assert_eq!(Hotel::parse("Motel"), None);
    }
}
