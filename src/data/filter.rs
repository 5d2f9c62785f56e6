use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{EnrichedDataset, EnrichedRecord, Hotel};

// ---------------------------------------------------------------------------
// Filter parameters: what the side panel controls
// ---------------------------------------------------------------------------

/// Filter parameters handed over by the UI, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    /// Inclusive arrival-date range.
    pub date_range: (NaiveDate, NaiveDate),
    /// Accepted hotel types. Empty means nothing passes.
    pub hotels: BTreeSet<Hotel>,
    /// Number of countries kept by the country distribution. Not a row filter.
    pub max_countries: usize,
}

impl FilterParams {
    /// Everything selected: full date span, every hotel present.
    pub fn full(dataset: &EnrichedDataset, max_countries: usize) -> Self {
        let date_range = dataset
            .date_bounds
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        FilterParams {
            date_range,
            hotels: dataset.hotels.iter().copied().collect(),
            max_countries,
        }
    }

    /// Whether a single record passes the row filters.
    ///
    /// A record without an arrival date never falls inside a concrete range.
    pub fn accepts(&self, record: &EnrichedRecord) -> bool {
        let (start, end) = self.date_range;
        let in_range = record
            .arrival_date
            .is_some_and(|d| start <= d && d <= end);
        in_range && self.hotels.contains(&record.hotel)
    }
}

// ---------------------------------------------------------------------------
// FilteredSet: a borrowed selection of the immutable snapshot
// ---------------------------------------------------------------------------

/// Records that passed the row filters, in source order.
#[derive(Debug, Clone)]
pub struct FilteredSet<'a> {
    pub records: Vec<&'a EnrichedRecord>,
    pub max_countries: usize,
}

impl<'a> FilteredSet<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Select the records passing `params`. Never mutates the dataset.
pub fn filter<'a>(dataset: &'a EnrichedDataset, params: &FilterParams) -> FilteredSet<'a> {
    FilteredSet {
        records: dataset.records.iter().filter(|r| params.accepts(r)).collect(),
        max_countries: params.max_countries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::GroupType;

    fn record(hotel: Hotel, date: Option<(i32, u32)>) -> EnrichedRecord {
        EnrichedRecord {
            hotel,
            is_canceled: false,
            adults: 2,
            children: 0,
            babies: 0,
            stays_weekend_nights: 1,
            stays_week_nights: 1,
            country: Some("PRT".into()),
            adr: 50.0,
            total_special_requests: 0,
            total_nights: 2,
            arrival_date: date.and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1)),
            group_type: GroupType::Couple,
        }
    }

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn dataset() -> EnrichedDataset {
        EnrichedDataset::from_records(
            vec![
                record(Hotel::City, Some((2015, 7))),
                record(Hotel::Resort, Some((2016, 1))),
                record(Hotel::City, None),
                record(Hotel::Resort, Some((2017, 8))),
            ],
            0,
        )
    }

    #[test]
    fn full_params_keep_every_dated_record() {
        let ds = dataset();
        let params = FilterParams::full(&ds, 10);
        assert_eq!(params.date_range, (ymd(2015, 7), ymd(2017, 8)));
        let set = filter(&ds, &params);
        assert_eq!(set.len(), 3);
        assert!(set.records.iter().all(|r| r.arrival_date.is_some()));
    }

    #[test]
    fn date_range_is_inclusive() {
        let ds = dataset();
        let mut params = FilterParams::full(&ds, 10);
        params.date_range = (ymd(2016, 1), ymd(2017, 8));
        let set = filter(&ds, &params);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn empty_hotel_selection_selects_nothing() {
        let ds = dataset();
        let mut params = FilterParams::full(&ds, 10);
        params.hotels.clear();
        assert!(filter(&ds, &params).is_empty());
    }

    #[test]
    fn hotel_membership() {
        let ds = dataset();
        let mut params = FilterParams::full(&ds, 7);
        params.hotels = [Hotel::Resort].into_iter().collect();
        let set = filter(&ds, &params);
        assert_eq!(set.len(), 2);
        assert!(set.records.iter().all(|r| r.hotel == Hotel::Resort));
        assert_eq!(set.max_countries, 7);
    }

    #[test]
    fn range_outside_data_selects_nothing() {
        let ds = dataset();
        let mut params = FilterParams::full(&ds, 10);
        params.date_range = (ymd(2030, 1), ymd(2031, 1));
        assert!(filter(&ds, &params).is_empty());
    }
}
