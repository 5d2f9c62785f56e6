use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};

use super::aggregate::DashboardTables;

/// Write every aggregate table as pretty-printed JSON for an external
/// renderer.
pub fn write_json(tables: &DashboardTables, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), tables).context("serialising tables")?;
    log::info!("Exported {} tables to {}", tables.tables.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::FilteredSet;
    use crate::data::model::{EnrichedRecord, GroupType, Hotel};

    #[test]
    fn exported_json_names_tables_and_keys() {
        let record = EnrichedRecord {
            hotel: Hotel::Resort,
            is_canceled: false,
            adults: 2,
            children: 1,
            babies: 0,
            stays_weekend_nights: 1,
            stays_week_nights: 2,
            country: Some("PRT".into()),
            adr: 80.0,
            total_special_requests: 1,
            total_nights: 3,
            arrival_date: NaiveDate::from_ymd_opt(2016, 5, 1),
            group_type: GroupType::Family,
        };
        let set = FilteredSet {
            records: vec![&record],
            max_countries: 10,
        };
        let tables = DashboardTables::compute(&set);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        write_json(&tables, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["visible_records"], 1);
        let first = &value["tables"][0];
        assert_eq!(first["kind"], "group_distribution");
        assert_eq!(first["chart"], "pie");
        assert_eq!(first["rows"][0]["keys"][0], "Family");
        assert_eq!(first["rows"][0]["metrics"][0], 1.0);

        let monthly = &value["tables"][4];
        assert_eq!(monthly["kind"], "monthly_stay_length");
        assert_eq!(monthly["rows"][0]["keys"][0], "2016-05");
    }
}
