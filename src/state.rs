use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::{DashboardConfig, COUNTRY_CAP_RANGE};
use crate::data::aggregate::DashboardTables;
use crate::data::cache::DatasetCache;
use crate::data::filter::{filter, FilterParams};
use crate::data::model::{EnrichedDataset, Hotel};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memoized loader; reopening an unchanged file reuses the snapshot.
    cache: DatasetCache,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<EnrichedDataset>>,

    /// Current filter selections (None until a dataset is loaded).
    pub filters: Option<FilterParams>,

    /// Tables for the current filters (recomputed on every change).
    pub tables: Option<DashboardTables>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            filters: None,
            tables: None,
            status_message: None,
        }
    }

    /// Load (or reuse) the dataset at `path`. Errors end up in
    /// `status_message`.
    pub fn open(&mut self, path: &Path) {
        match self.cache.load(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a dataset, reset filters to "everything" and compute tables.
    pub fn set_dataset(&mut self, dataset: Arc<EnrichedDataset>) {
        if dataset.is_empty() {
            log::warn!("Dataset has no usable bookings");
        }
        self.filters = Some(FilterParams::full(&dataset, self.config.default_country_cap));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// One synchronous pipeline pass over the current snapshot.
    pub fn refresh(&mut self) {
        self.tables = match (&self.dataset, &self.filters) {
            (Some(ds), Some(params)) => Some(DashboardTables::compute(&filter(ds, params))),
            _ => None,
        };
    }

    /// Set the inclusive arrival-date range; a reversed pair is reordered.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        if let Some(f) = &mut self.filters {
            f.date_range = (start.min(end), start.max(end));
            self.refresh();
        }
    }

    pub fn set_hotel(&mut self, hotel: Hotel, selected: bool) {
        if let Some(f) = &mut self.filters {
            if selected {
                f.hotels.insert(hotel);
            } else {
                f.hotels.remove(&hotel);
            }
            self.refresh();
        }
    }

    pub fn set_max_countries(&mut self, n: usize) {
        if let Some(f) = &mut self.filters {
            f.max_countries = n.clamp(*COUNTRY_CAP_RANGE.start(), *COUNTRY_CAP_RANGE.end());
            self.refresh();
        }
    }

    pub fn visible_records(&self) -> usize {
        self.tables.as_ref().map_or(0, |t| t.visible_records)
    }
}
