//! Raw CSV fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ofa_config::Config;

pub const ORDERS_HEADER: &str = "order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date";
pub const CUSTOMERS_HEADER: &str = "customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state";
pub const PAYMENTS_HEADER: &str = "order_id,payment_sequential,payment_type,payment_installments,payment_value";
pub const ITEMS_HEADER: &str = "order_id,order_item_id,product_id,seller_id,shipping_limit_date,price,freight_value";
pub const PRODUCTS_HEADER: &str = "product_id,product_category_name,product_weight_g";

/// A small marketplace: four orders across two repeat customers and one
/// one-off, with a pending order, an uncategorised product and a split
/// payment.
pub fn write_sample_raw(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    write(
        dir,
        "olist_orders_dataset.csv",
        ORDERS_HEADER,
        &[
            "o1,c1,delivered,2017-10-02 10:56:33,2017-10-02 11:07:15,2017-10-04 19:55:00,2017-10-10 21:25:13,2017-10-18 00:00:00",
            "o2,c2,delivered,2017-11-18 19:28:06,2017-11-18 19:45:59,2017-11-22 13:39:59,2017-12-02 00:28:42,2017-12-15 00:00:00",
            "o3,c3,shipped,2017-11-20 08:00:00,2017-11-20 09:00:00,2017-11-22 10:00:00,,2017-12-05 00:00:00",
            "o4,c4,created,2017-12-01 12:00:00,,,,",
        ],
    );
    write(
        dir,
        "olist_customers_dataset.csv",
        CUSTOMERS_HEADER,
        &[
            "c1,u1,01409,sao paulo,SP",
            "c2,u1,01409,sao paulo,SP",
            "c3,u2,20000,rio de janeiro,RJ",
        ],
    );
    write(
        dir,
        "olist_order_payments_dataset.csv",
        PAYMENTS_HEADER,
        &[
            "o1,1,credit_card,1,30.00",
            "o1,2,voucher,1,20.00",
            "o2,1,boleto,1,99.90",
            "o3,1,credit_card,3,45.00",
        ],
    );
    write(
        dir,
        "olist_order_items_dataset.csv",
        ITEMS_HEADER,
        &[
            "o1,1,p1,s1,2017-10-06 11:07:15,40.00,10.00",
            "o2,1,p2,s1,2017-11-23 19:45:59,89.90,10.00",
            "o3,1,p9,s2,2017-11-24 09:00:00,40.00,5.00",
        ],
    );
    write(
        dir,
        "olist_products_dataset.csv",
        PRODUCTS_HEADER,
        &["p1,perfumaria,225", "p2,cama_mesa_banho,1000"],
    );
}

pub fn write(dir: &Path, name: &str, header: &str, rows: &[&str]) -> PathBuf {
    let mut body = String::from(header);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

pub fn config_for(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.raw_dir = root.join("raw");
    config.paths.processed_dir = root.join("processed");
    config
}
