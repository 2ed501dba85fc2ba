//! Arrow schemas for the processed tables.
//!
//! Timestamps are stored as millisecond timestamps without a zone (the raw
//! exports carry naive local times); calendar keys are `Date32`.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use std::fmt;
use std::sync::Arc;

/// Processed table identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    OrdersMaster,
    PaymentTypeSummary,
    CategoryRevenue,
}

impl TableName {
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::OrdersMaster => "orders_master",
            TableName::PaymentTypeSummary => "payment_type_summary",
            TableName::CategoryRevenue => "category_revenue",
        }
    }

    /// File name inside the processed directory.
    pub fn file_name(self) -> String {
        format!("{}.parquet", self.as_str())
    }

    pub fn schema(self) -> Arc<Schema> {
        match self {
            TableName::OrdersMaster => orders_master_schema(),
            TableName::PaymentTypeSummary => payment_type_summary_schema(),
            TableName::CategoryRevenue => category_revenue_schema(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn timestamp() -> DataType {
    DataType::Timestamp(TimeUnit::Millisecond, None)
}

/// Schema for `orders_master`.
pub fn orders_master_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Utf8, false),
        Field::new("customer_id", DataType::Utf8, false),
        Field::new("order_status", DataType::Utf8, true),
        Field::new("order_purchase_timestamp", timestamp(), true),
        Field::new("order_approved_at", timestamp(), true),
        Field::new("order_delivered_carrier_date", timestamp(), true),
        Field::new("order_delivered_customer_date", timestamp(), true),
        Field::new("order_estimated_delivery_date", timestamp(), true),
        Field::new("status_stage", DataType::Utf8, false),
        Field::new("order_purchase_date", DataType::Date32, true),
        Field::new("order_purchase_week", DataType::Date32, true),
        Field::new("order_purchase_month", DataType::Date32, true),
        Field::new("sla_days", DataType::Float64, true),
        Field::new("customer_unique_id", DataType::Utf8, true),
        Field::new("customer_city", DataType::Utf8, true),
        Field::new("customer_state", DataType::Utf8, true),
        Field::new("total_paid", DataType::Float64, true),
        Field::new("items", DataType::UInt32, true),
        Field::new("revenue", DataType::Float64, true),
        Field::new("cohort_month", DataType::Date32, true),
    ]))
}

/// Schema for `payment_type_summary`.
pub fn payment_type_summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("payment_type", DataType::Utf8, false),
        Field::new("total", DataType::Float64, false),
        Field::new("n", DataType::UInt64, false),
    ]))
}

/// Schema for `category_revenue`.
pub fn category_revenue_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("product_category_name", DataType::Utf8, false),
        Field::new("revenue", DataType::Float64, false),
        Field::new("items", DataType::UInt64, false),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_table_names() {
        assert_eq!(TableName::OrdersMaster.file_name(), "orders_master.parquet");
        assert_eq!(
            TableName::PaymentTypeSummary.file_name(),
            "payment_type_summary.parquet"
        );
    }

    #[test]
    fn aggregate_schemas_have_documented_columns() {
        let names: Vec<_> = payment_type_summary_schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, ["payment_type", "total", "n"]);

        let names: Vec<_> = category_revenue_schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, ["product_category_name", "revenue", "items"]);
    }

    #[test]
    fn master_keys_are_required() {
        let schema = orders_master_schema();
        assert!(!schema.field_with_name("order_id").unwrap().is_nullable());
        assert!(!schema.field_with_name("status_stage").unwrap().is_nullable());
        assert!(schema.field_with_name("sla_days").unwrap().is_nullable());
        assert_eq!(schema.fields().len(), 20);
    }
}
