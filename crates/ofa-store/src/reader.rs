//! Parquet reader for the processed tables.

use std::fs::File;
use std::path::Path;

use arrow::array::{
    Array, Date32Array, Float64Array, StringArray, TimestampMillisecondArray, UInt32Array,
    UInt64Array,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ofa_common::{
    CategoryRevenue, CustomerId, CustomerUniqueId, MasterRow, OrderId, PaymentTypeTotal, Stage,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::schema::TableName;
use crate::{Result, StoreError};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

/// Read every record batch of a Parquet file.
pub fn read_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}

/// Typed column lookup bound to one table, for error context.
struct Columns<'a> {
    table: TableName,
    batch: &'a RecordBatch,
}

impl<'a> Columns<'a> {
    fn new(table: TableName, batch: &'a RecordBatch) -> Self {
        Self { table, batch }
    }

    fn get<T: Array + 'static>(&self, name: &str) -> Result<&'a T> {
        let idx = self
            .batch
            .schema()
            .index_of(name)
            .map_err(|_| StoreError::MissingColumn {
                table: self.table,
                column: name.to_string(),
            })?;
        let column = self.batch.column(idx);
        column
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| StoreError::ColumnType {
                table: self.table,
                column: name.to_string(),
                actual: column.data_type().to_string(),
            })
    }

    fn required_str(&self, col: &StringArray, name: &str, row: usize) -> Result<String> {
        if col.is_null(row) {
            return Err(StoreError::UnexpectedNull {
                table: self.table,
                column: name.to_string(),
                row,
            });
        }
        Ok(col.value(row).to_string())
    }
}

fn opt_str(col: &StringArray, row: usize) -> Option<String> {
    (!col.is_null(row)).then(|| col.value(row).to_string())
}

fn opt_f64(col: &Float64Array, row: usize) -> Option<f64> {
    (!col.is_null(row)).then(|| col.value(row))
}

fn opt_ts(col: &TimestampMillisecondArray, row: usize) -> Option<NaiveDateTime> {
    if col.is_null(row) {
        None
    } else {
        millis_to_datetime(col.value(row))
    }
}

fn opt_date(col: &Date32Array, row: usize) -> Option<NaiveDate> {
    if col.is_null(row) {
        None
    } else {
        days_to_date(col.value(row))
    }
}

/// Decode `orders_master` batches into rows.
pub fn decode_orders_master(batches: &[RecordBatch]) -> Result<Vec<MasterRow>> {
    let table = TableName::OrdersMaster;
    let mut out = Vec::new();
    for batch in batches {
        let cols = Columns::new(table, batch);
        let order_id = cols.get::<StringArray>("order_id")?;
        let customer_id = cols.get::<StringArray>("customer_id")?;
        let order_status = cols.get::<StringArray>("order_status")?;
        let purchased = cols.get::<TimestampMillisecondArray>("order_purchase_timestamp")?;
        let approved = cols.get::<TimestampMillisecondArray>("order_approved_at")?;
        let carrier = cols.get::<TimestampMillisecondArray>("order_delivered_carrier_date")?;
        let delivered = cols.get::<TimestampMillisecondArray>("order_delivered_customer_date")?;
        let estimated = cols.get::<TimestampMillisecondArray>("order_estimated_delivery_date")?;
        let stage = cols.get::<StringArray>("status_stage")?;
        let purchase_date = cols.get::<Date32Array>("order_purchase_date")?;
        let purchase_week = cols.get::<Date32Array>("order_purchase_week")?;
        let purchase_month = cols.get::<Date32Array>("order_purchase_month")?;
        let sla_days = cols.get::<Float64Array>("sla_days")?;
        let unique_id = cols.get::<StringArray>("customer_unique_id")?;
        let city = cols.get::<StringArray>("customer_city")?;
        let state = cols.get::<StringArray>("customer_state")?;
        let total_paid = cols.get::<Float64Array>("total_paid")?;
        let items = cols.get::<UInt32Array>("items")?;
        let revenue = cols.get::<Float64Array>("revenue")?;
        let cohort = cols.get::<Date32Array>("cohort_month")?;

        for row in 0..batch.num_rows() {
            let stage_name = cols.required_str(stage, "status_stage", row)?;
            let status_stage =
                stage_name
                    .parse::<Stage>()
                    .map_err(|e| StoreError::InvalidValue {
                        table,
                        message: e.to_string(),
                    })?;
            out.push(MasterRow {
                order_id: OrderId(cols.required_str(order_id, "order_id", row)?),
                customer_id: CustomerId(cols.required_str(customer_id, "customer_id", row)?),
                order_status: opt_str(order_status, row),
                order_purchase_timestamp: opt_ts(purchased, row),
                order_approved_at: opt_ts(approved, row),
                order_delivered_carrier_date: opt_ts(carrier, row),
                order_delivered_customer_date: opt_ts(delivered, row),
                order_estimated_delivery_date: opt_ts(estimated, row),
                status_stage,
                order_purchase_date: opt_date(purchase_date, row),
                order_purchase_week: opt_date(purchase_week, row),
                order_purchase_month: opt_date(purchase_month, row),
                sla_days: opt_f64(sla_days, row),
                customer_unique_id: opt_str(unique_id, row).map(CustomerUniqueId),
                customer_city: opt_str(city, row),
                customer_state: opt_str(state, row),
                total_paid: opt_f64(total_paid, row),
                items: (!items.is_null(row)).then(|| items.value(row)),
                revenue: opt_f64(revenue, row),
                cohort_month: opt_date(cohort, row),
            });
        }
    }
    Ok(out)
}

/// Decode `payment_type_summary` batches into rows.
pub fn decode_payment_type_summary(batches: &[RecordBatch]) -> Result<Vec<PaymentTypeTotal>> {
    let table = TableName::PaymentTypeSummary;
    let mut out = Vec::new();
    for batch in batches {
        let cols = Columns::new(table, batch);
        let payment_type = cols.get::<StringArray>("payment_type")?;
        let total = cols.get::<Float64Array>("total")?;
        let n = cols.get::<UInt64Array>("n")?;
        for row in 0..batch.num_rows() {
            out.push(PaymentTypeTotal {
                payment_type: cols.required_str(payment_type, "payment_type", row)?,
                total: total.value(row),
                n: n.value(row),
            });
        }
    }
    Ok(out)
}

/// Decode `category_revenue` batches into rows.
pub fn decode_category_revenue(batches: &[RecordBatch]) -> Result<Vec<CategoryRevenue>> {
    let table = TableName::CategoryRevenue;
    let mut out = Vec::new();
    for batch in batches {
        let cols = Columns::new(table, batch);
        let category = cols.get::<StringArray>("product_category_name")?;
        let revenue = cols.get::<Float64Array>("revenue")?;
        let items = cols.get::<UInt64Array>("items")?;
        for row in 0..batch.num_rows() {
            out.push(CategoryRevenue {
                product_category_name: cols.required_str(
                    category,
                    "product_category_name",
                    row,
                )?,
                revenue: revenue.value(row),
                items: items.value(row),
            });
        }
    }
    Ok(out)
}
