//! Processed directory layout and table-level read/write.

use std::path::{Path, PathBuf};

use ofa_common::{CategoryRevenue, MasterRow, PaymentTypeTotal};
use tracing::{debug, info};

use crate::reader::{
    decode_category_revenue, decode_orders_master, decode_payment_type_summary, read_batches,
};
use crate::schema::TableName;
use crate::writer::{
    encode_category_revenue, encode_orders_master, encode_payment_type_summary, stage_batch,
    write_batch,
};
use crate::Result;

/// Handle on the processed directory. Holds only a path; every call goes to
/// disk, so a store is cheap to clone and share across readers.
#[derive(Debug, Clone)]
pub struct ProcessedStore {
    dir: PathBuf,
}

impl ProcessedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a table's Parquet file.
    pub fn path(&self, table: TableName) -> PathBuf {
        self.dir.join(table.file_name())
    }

    pub fn exists(&self, table: TableName) -> bool {
        self.path(table).is_file()
    }

    pub fn write_orders_master(&self, rows: &[MasterRow]) -> Result<PathBuf> {
        let path = self.path(TableName::OrdersMaster);
        write_batch(&path, TableName::OrdersMaster.schema(), &encode_orders_master(rows)?)?;
        info!(path = %path.display(), rows = rows.len(), "wrote orders_master");
        Ok(path)
    }

    pub fn write_payment_type_summary(&self, rows: &[PaymentTypeTotal]) -> Result<PathBuf> {
        let path = self.path(TableName::PaymentTypeSummary);
        write_batch(
            &path,
            TableName::PaymentTypeSummary.schema(),
            &encode_payment_type_summary(rows)?,
        )?;
        info!(path = %path.display(), rows = rows.len(), "wrote payment_type_summary");
        Ok(path)
    }

    pub fn write_category_revenue(&self, rows: &[CategoryRevenue]) -> Result<PathBuf> {
        let path = self.path(TableName::CategoryRevenue);
        write_batch(
            &path,
            TableName::CategoryRevenue.schema(),
            &encode_category_revenue(rows)?,
        )?;
        info!(path = %path.display(), rows = rows.len(), "wrote category_revenue");
        Ok(path)
    }

    /// Replace all three tables together.
    ///
    /// Every table is staged before any is renamed into place, so a failed
    /// encode or write leaves the previous tables untouched and no temp
    /// files behind.
    pub fn write_all(
        &self,
        master: &[MasterRow],
        payments: &[PaymentTypeTotal],
        categories: &[CategoryRevenue],
    ) -> Result<Vec<PathBuf>> {
        let staged = [
            stage_batch(
                &self.path(TableName::OrdersMaster),
                TableName::OrdersMaster.schema(),
                &encode_orders_master(master)?,
            )?,
            stage_batch(
                &self.path(TableName::PaymentTypeSummary),
                TableName::PaymentTypeSummary.schema(),
                &encode_payment_type_summary(payments)?,
            )?,
            stage_batch(
                &self.path(TableName::CategoryRevenue),
                TableName::CategoryRevenue.schema(),
                &encode_category_revenue(categories)?,
            )?,
        ];
        let paths = staged
            .into_iter()
            .map(|table| table.commit())
            .collect::<Result<Vec<_>>>()?;
        info!(
            dir = %self.dir.display(),
            orders_master = master.len(),
            payment_type_summary = payments.len(),
            category_revenue = categories.len(),
            "wrote processed tables"
        );
        Ok(paths)
    }

    /// Read the master table. A missing file is an error: nothing downstream
    /// can run without it.
    pub fn read_orders_master(&self) -> Result<Vec<MasterRow>> {
        let path = self.path(TableName::OrdersMaster);
        let rows = decode_orders_master(&read_batches(&path)?)?;
        debug!(path = %path.display(), rows = rows.len(), "read orders_master");
        Ok(rows)
    }

    /// Read the payment-type summary, or `None` if it was never written.
    pub fn read_payment_type_summary(&self) -> Result<Option<Vec<PaymentTypeTotal>>> {
        if !self.exists(TableName::PaymentTypeSummary) {
            debug!("payment_type_summary not present");
            return Ok(None);
        }
        let batches = read_batches(&self.path(TableName::PaymentTypeSummary))?;
        Ok(Some(decode_payment_type_summary(&batches)?))
    }

    /// Read the category revenue table, or `None` if it was never written.
    pub fn read_category_revenue(&self) -> Result<Option<Vec<CategoryRevenue>>> {
        if !self.exists(TableName::CategoryRevenue) {
            debug!("category_revenue not present");
            return Ok(None);
        }
        let batches = read_batches(&self.path(TableName::CategoryRevenue))?;
        Ok(Some(decode_category_revenue(&batches)?))
    }
}
