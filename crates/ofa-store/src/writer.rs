//! Parquet writer for the processed tables.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Array, Float64Array, StringArray, TimestampMillisecondArray, UInt32Array,
    UInt64Array,
};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use ofa_common::{CategoryRevenue, MasterRow, PaymentTypeTotal};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use tracing::{debug, warn};

use crate::schema::{
    category_revenue_schema, orders_master_schema, payment_type_summary_schema,
};
use crate::{Result, StoreError, SCHEMA_VERSION};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn datetime_to_millis(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

fn writer_properties() -> Result<WriterProperties> {
    let schema_version = KeyValue {
        key: "ofa.schema_version".to_string(),
        value: Some(SCHEMA_VERSION.to_string()),
    };
    Ok(WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(3)?))
        .set_key_value_metadata(Some(vec![schema_version]))
        .build())
}

/// A table written beside its target but not yet renamed into place.
///
/// Dropping it without [`StagedTable::commit`] removes the temp file.
#[derive(Debug)]
pub struct StagedTable {
    tmp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedTable {
    /// Rename the temp file over the target.
    pub fn commit(mut self) -> Result<PathBuf> {
        fs::rename(&self.tmp, &self.target).map_err(|e| StoreError::Io {
            path: self.target.clone(),
            source: e,
        })?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagedTable {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.tmp) {
            Ok(()) => debug!(path = %self.tmp.display(), "discarded staged table"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.tmp.display(), error = %e, "failed to remove staged table"),
        }
    }
}

/// Write a single batch to `<path>.tmp`. Nothing at `path` changes until the
/// returned table is committed.
pub fn stage_batch(path: &Path, schema: Arc<Schema>, batch: &RecordBatch) -> Result<StagedTable> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let staged = StagedTable {
        tmp: path.with_extension("parquet.tmp"),
        target: path.to_path_buf(),
        committed: false,
    };
    let file = File::create(&staged.tmp).map_err(|e| StoreError::Io {
        path: staged.tmp.clone(),
        source: e,
    })?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(writer_properties()?))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(staged)
}

/// Write a single batch to `path`, replacing any existing file.
///
/// The file is written beside the target and renamed into place, so readers
/// never observe a half-written table.
pub fn write_batch(path: &Path, schema: Arc<Schema>, batch: &RecordBatch) -> Result<()> {
    stage_batch(path, schema, batch)?.commit()?;
    debug!(path = %path.display(), rows = batch.num_rows(), "parquet table written");
    Ok(())
}

fn opt_timestamps<F>(rows: &[MasterRow], get: F) -> ArrayRef
where
    F: Fn(&MasterRow) -> Option<NaiveDateTime>,
{
    Arc::new(TimestampMillisecondArray::from(
        rows.iter()
            .map(|r| get(r).map(datetime_to_millis))
            .collect::<Vec<_>>(),
    ))
}

fn opt_dates<F>(rows: &[MasterRow], get: F) -> ArrayRef
where
    F: Fn(&MasterRow) -> Option<NaiveDate>,
{
    Arc::new(Date32Array::from(
        rows.iter()
            .map(|r| get(r).map(date_to_days))
            .collect::<Vec<_>>(),
    ))
}

fn opt_strings<'a, F>(rows: &'a [MasterRow], get: F) -> ArrayRef
where
    F: Fn(&'a MasterRow) -> Option<&'a str>,
{
    Arc::new(StringArray::from(rows.iter().map(get).collect::<Vec<_>>()))
}

fn opt_floats<F>(rows: &[MasterRow], get: F) -> ArrayRef
where
    F: Fn(&MasterRow) -> Option<f64>,
{
    Arc::new(Float64Array::from(rows.iter().map(get).collect::<Vec<_>>()))
}

/// Encode `orders_master` rows as a record batch.
pub fn encode_orders_master(rows: &[MasterRow]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.order_id.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
        )),
        opt_strings(rows, |r| r.order_status.as_deref()),
        opt_timestamps(rows, |r| r.order_purchase_timestamp),
        opt_timestamps(rows, |r| r.order_approved_at),
        opt_timestamps(rows, |r| r.order_delivered_carrier_date),
        opt_timestamps(rows, |r| r.order_delivered_customer_date),
        opt_timestamps(rows, |r| r.order_estimated_delivery_date),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.status_stage.as_str())
                .collect::<Vec<_>>(),
        )),
        opt_dates(rows, |r| r.order_purchase_date),
        opt_dates(rows, |r| r.order_purchase_week),
        opt_dates(rows, |r| r.order_purchase_month),
        opt_floats(rows, |r| r.sla_days),
        opt_strings(rows, |r| r.customer_unique_id.as_ref().map(|id| id.as_str())),
        opt_strings(rows, |r| r.customer_city.as_deref()),
        opt_strings(rows, |r| r.customer_state.as_deref()),
        opt_floats(rows, |r| r.total_paid),
        Arc::new(UInt32Array::from(
            rows.iter().map(|r| r.items).collect::<Vec<_>>(),
        )),
        opt_floats(rows, |r| r.revenue),
        opt_dates(rows, |r| r.cohort_month),
    ];
    Ok(RecordBatch::try_new(orders_master_schema(), columns)?)
}

/// Encode `payment_type_summary` rows as a record batch.
pub fn encode_payment_type_summary(rows: &[PaymentTypeTotal]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.payment_type.as_str())
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.total).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(rows.iter().map(|r| r.n).collect::<Vec<_>>())),
    ];
    Ok(RecordBatch::try_new(payment_type_summary_schema(), columns)?)
}

/// Encode `category_revenue` rows as a record batch.
pub fn encode_category_revenue(rows: &[CategoryRevenue]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.product_category_name.as_str())
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.revenue).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.items).collect::<Vec<_>>(),
        )),
    ];
    Ok(RecordBatch::try_new(category_revenue_schema(), columns)?)
}
