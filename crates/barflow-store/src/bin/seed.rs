//! # Legacy Seed Data Generator
//!
//! Populates a legacy key-value directory with sample bar data, so the
//! one-time migration can be exercised locally.
//!
//! ## Usage
//! ```bash
//! # Seed ./legacy with every namespace
//! cargo run -p barflow-store --bin seed
//!
//! # Seed a custom directory
//! cargo run -p barflow-store --bin seed -- --dir ./data/legacy
//!
//! # Leave some namespaces out
//! cargo run -p barflow-store --bin seed -- --only inventory,staff
//!
//! # Plant a corrupt sales file to watch the migration skip it
//! cargo run -p barflow-store --bin seed -- --corrupt sales
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use barflow_core::Namespace;
use barflow_store::{FileLegacyStore, LegacyStore};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

/// Sample drinks with (name, category, unit price, stock).
const INVENTORY: &[(&str, &str, f64, u32)] = &[
    ("House Lager", "beer", 4.50, 48),
    ("Hazy IPA", "beer", 6.00, 24),
    ("Stout", "beer", 5.50, 18),
    ("Gin & Tonic", "cocktails", 8.00, 30),
    ("Negroni", "cocktails", 9.50, 20),
    ("Espresso Martini", "cocktails", 10.00, 15),
    ("Rioja Crianza", "wine", 7.00, 12),
    ("Sparkling Water", "soft", 2.50, 60),
    ("Cola", "soft", 3.00, 72),
    ("Salted Peanuts", "snacks", 2.00, 40),
];

const STAFF: &[(&str, &str)] = &[
    ("Ana", "bartender"),
    ("Ben", "bartender"),
    ("Carla", "waiter"),
    ("Dev", "manager"),
];

fn main() {
    let args: Vec<String> = env::args().collect();

    let dir = arg_value(&args, "--dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./legacy"));
    let only: Option<Vec<Namespace>> = arg_value(&args, "--only").map(|list| {
        list.split(',')
            .filter_map(|key| match key.trim().parse() {
                Ok(ns) => Some(ns),
                Err(e) => {
                    eprintln!("Skipping {e}");
                    None
                }
            })
            .collect()
    });
    let corrupt = arg_value(&args, "--corrupt");

    println!("Seeding legacy store at {}", dir.display());

    let store = FileLegacyStore::new(&dir);
    let mut written = 0;

    for ns in Namespace::ALL {
        if let Some(ref only) = only {
            if !only.contains(&ns) {
                continue;
            }
        }

        if let Err(e) = store.save(ns.key(), &sample_value(ns)) {
            eprintln!("Failed to write {}: {}", ns, e);
            std::process::exit(1);
        }
        written += 1;
    }

    if let Some(key) = corrupt {
        let path = dir.join(format!("{key}.json"));
        if let Err(e) = fs::write(&path, "{\"truncated\": ") {
            eprintln!("Failed to corrupt {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("Corrupted {}", path.display());
    }

    println!("Wrote {} namespaces", written);
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

/// Builds a realistic document for one namespace.
fn sample_value(ns: Namespace) -> Value {
    let now = Utc::now();

    match ns {
        Namespace::Inventory => Value::Array(
            INVENTORY
                .iter()
                .enumerate()
                .map(|(i, (name, category, price, stock))| {
                    json!({
                        "id": i + 1,
                        "name": name,
                        "category": category,
                        "price": price,
                        "stock": stock,
                    })
                })
                .collect(),
        ),
        Namespace::Sales => json!([
            {"id": 1, "itemId": 1, "quantity": 2, "total": 9.00, "date": (now - Duration::hours(3)).to_rfc3339()},
            {"id": 2, "itemId": 5, "quantity": 1, "total": 9.50, "date": (now - Duration::hours(1)).to_rfc3339()},
        ]),
        Namespace::Staff => Value::Array(
            STAFF
                .iter()
                .enumerate()
                .map(|(i, (name, role))| json!({"id": i + 1, "name": name, "role": role}))
                .collect(),
        ),
        Namespace::Categories => json!(["beer", "cocktails", "wine", "soft", "snacks"]),
        Namespace::Settings => json!({"barName": "The Copper Tap", "currency": "EUR", "lowStockThreshold": 10}),
        Namespace::CashBalance => json!(350.0),
        Namespace::CashTransactions => json!([
            {"id": 1, "type": "float", "amount": 200.0, "date": (now - Duration::hours(6)).to_rfc3339()},
            {"id": 2, "type": "sale", "amount": 18.50, "date": (now - Duration::hours(1)).to_rfc3339()},
        ]),
        Namespace::Tables => json!([
            {"id": 1, "name": "Bar", "seats": 8, "status": "occupied"},
            {"id": 2, "name": "Window", "seats": 4, "status": "free"},
            {"id": 3, "name": "Terrace", "seats": 6, "status": "reserved"},
        ]),
        Namespace::InventoryHistory => json!([
            {"itemId": 2, "change": -2, "reason": "sale", "date": (now - Duration::hours(2)).to_rfc3339()},
        ]),
        Namespace::AppInitialized => json!(true),
    }
}
