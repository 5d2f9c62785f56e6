use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::{DataLoadError, Result};
use super::loader::load_file;
use super::model::EnrichedDataset;

/// What makes two loads "the same source": canonical path, size and
/// modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceIdentity {
    pub fn of(path: &Path) -> Result<Self> {
        let canonical = path.canonicalize().map_err(|e| DataLoadError::io(path, e))?;
        let meta = std::fs::metadata(&canonical).map_err(|e| DataLoadError::io(path, e))?;
        Ok(SourceIdentity {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Memoized loader. Holds at most one enriched snapshot and hands out the
/// same `Arc` until the source identity changes.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(SourceIdentity, Arc<EnrichedDataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> Result<Arc<EnrichedDataset>> {
        let identity = SourceIdentity::of(path)?;

        if let Some((cached, dataset)) = &self.entry {
            if *cached == identity {
                log::debug!("Dataset cache hit for {}", identity.path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(load_file(&identity.path)?);
        self.entry = Some((identity, Arc::clone(&dataset)));
        Ok(dataset)
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<&Arc<EnrichedDataset>> {
        self.entry.as_ref().map(|(_, ds)| ds)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "hotel,is_canceled,arrival_date_year,arrival_date_month,adults,children,\
babies,stays_in_weekend_nights,stays_in_week_nights,country,adr,total_of_special_requests";

    fn write_csv(file: &mut std::fs::File, rows: &[&str]) {
        writeln!(file, "{HEADER}").unwrap();
        for r in rows {
            writeln!(file, "{r}").unwrap();
        }
        file.flush().unwrap();
    }

    #[test]
    fn same_source_returns_same_snapshot() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write_csv(file.as_file_mut(), &["City Hotel,0,2016,May,2,0,0,1,1,PRT,90,0"]);

        let mut cache = DatasetCache::new();
        let a = cache.load(file.path()).unwrap();
        let b = cache.load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(cache.current().unwrap(), &a));
    }

    #[test]
    fn changed_source_is_reloaded() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write_csv(file.as_file_mut(), &["City Hotel,0,2016,May,2,0,0,1,1,PRT,90,0"]);

        let mut cache = DatasetCache::new();
        let first = cache.load(file.path()).unwrap();
        assert_eq!(first.len(), 1);

        // Appending changes the length, so identity differs regardless of
        // mtime resolution.
        writeln!(file.as_file_mut(), "Resort Hotel,1,2016,June,1,0,0,0,2,ESP,60,1").unwrap();
        let second = cache.load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn missing_source_is_error_and_keeps_nothing() {
        let mut cache = DatasetCache::new();
        assert!(cache.load(Path::new("/no/such/bookings.csv")).is_err());
        assert!(cache.current().is_none());
    }
}
