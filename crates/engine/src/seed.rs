//! Demo data generation for the warehouse.

use chrono::{Duration, Utc};
use datalens_core::constants::TS_FORMAT;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::EngineError;
use crate::warehouse::Warehouse;

const CUSTOMERS: &[&str] = &[
    "Acme LLC",
    "Globex",
    "Initech",
    "Umbrella Corp",
    "Stark Industries",
    "Wayne Enterprises",
    "Hooli",
    "Pied Piper",
];

const ORDER_STATUSES: &[&str] = &["PAID", "PAID", "PAID", "PENDING", "REFUNDED", "CANCELLED"];

const LOCATIONS: &[&str] = &["DXB-01", "DXB-02", "AUH-01", "SHJ-01", "RUH-01"];

const DEVICE_STATUSES: &[&str] = &["ONLINE", "ONLINE", "ONLINE", "OFFLINE", "DEGRADED"];

/// Row counts written by [`seed_demo`].
#[derive(Debug, Clone, Copy)]
pub struct SeedReport {
    pub orders: usize,
    pub metrics: usize,
}

/// Populate the warehouse with randomized demo rows spread over the last
/// `days` days.
///
/// # Errors
/// Returns an error if any insert fails.
pub fn seed_demo(
    warehouse: &Warehouse,
    days: u32,
    orders: usize,
    devices: usize,
) -> Result<SeedReport, EngineError> {
    let mut rng = rand::thread_rng();
    let now = Utc::now().naive_utc();
    let window_secs = i64::from(days.max(1)) * 24 * 3600;

    for i in 0..orders {
        let ts = now - Duration::seconds(rng.gen_range(0..window_secs));
        let customer = CUSTOMERS.choose(&mut rng).copied().unwrap_or("Acme LLC");
        let status = ORDER_STATUSES.choose(&mut rng).copied().unwrap_or("PAID");
        // a few rows with unknown amount, so NULL handling stays honest
        let amount =
            if rng.gen_ratio(1, 25) { None } else { Some(rng.gen_range(10.0..5000.0)) };
        warehouse.insert_order(
            1000 + i64::try_from(i).unwrap_or(0),
            customer,
            amount.map(|a: f64| (a * 100.0).round() / 100.0),
            "USD",
            &ts.format(TS_FORMAT).to_string(),
            status,
        )?;
    }

    for i in 0..devices {
        let ts = now - Duration::seconds(rng.gen_range(0..window_secs));
        let location = LOCATIONS.choose(&mut rng).copied().unwrap_or("DXB-01");
        let status = DEVICE_STATUSES.choose(&mut rng).copied().unwrap_or("ONLINE");
        let uptime: f64 = rng.gen_range(0.0..10080.0);
        warehouse.insert_metric(
            &format!("dev-{}", 1000 + i),
            status,
            (uptime * 10.0).round() / 10.0,
            location,
            &ts.format(TS_FORMAT).to_string(),
        )?;
    }

    tracing::info!(orders, devices, days, "seeded demo warehouse");
    Ok(SeedReport { orders, metrics: devices })
}
