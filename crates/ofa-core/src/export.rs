//! Flat CSV exports of the master table and its tabular metrics, for
//! consumers that do not read Parquet.

use std::fs;
use std::path::{Path, PathBuf};

use ofa_common::{Error, Result};
use serde::Serialize;
use tracing::info;

use crate::master::MasterTable;
use crate::metrics::{top_geo, weekly_kpis};

pub const ORDERS_MASTER_CSV: &str = "orders_master.csv";
pub const WEEKLY_KPIS_CSV: &str = "weekly_kpis.csv";
pub const GEO_DELIVERED_CSV: &str = "geo_delivered.csv";

/// Write `rows` as a headed CSV file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Error::Io(e),
        other => Error::Storage(format!("{}: {other:?}", path.display())),
    }
}

/// Export the full master table, weekly KPIs and every delivered location.
pub fn export_tables(table: &MasterTable, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;

    let master = out_dir.join(ORDERS_MASTER_CSV);
    write_csv(&master, table.rows())?;

    let weekly = out_dir.join(WEEKLY_KPIS_CSV);
    write_csv(&weekly, &weekly_kpis(table.rows()))?;

    let geo = out_dir.join(GEO_DELIVERED_CSV);
    write_csv(&geo, &top_geo(table.rows(), usize::MAX))?;

    info!(dir = %out_dir.display(), rows = table.len(), "csv exports written");
    Ok(vec![master, weekly, geo])
}
