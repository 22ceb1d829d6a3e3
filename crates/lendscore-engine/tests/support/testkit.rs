#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::{Builder, TempDir};

pub fn temp_home(prefix: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = Builder::new().prefix(prefix).tempdir()?;
    let home = dir.path().join("lendscore-home");
    fs::create_dir_all(&home)?;
    Ok((dir, home))
}

pub fn transaction(description: &str, amount: f64, date: &str) -> Value {
    json!({
        "description": description,
        "amount": amount,
        "date": date,
    })
}

pub fn with_field(mut row: Value, field: &str, value: Value) -> Value {
    if let Some(object) = row.as_object_mut() {
        object.insert(field.to_string(), value);
    }
    row
}

pub fn with_balance(row: Value, balance: f64) -> Value {
    with_field(row, "running_balance", json!(balance))
}

pub fn rows_json(rows: &[Value]) -> String {
    Value::Array(rows.to_vec()).to_string()
}

pub fn write_file(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    Ok(path)
}

const MONTH_ENDS: [&str; 3] = ["2025-01-28", "2025-02-28", "2025-03-28"];
const MONTH_STARTS: [&str; 3] = ["2025-01-02", "2025-02-03", "2025-03-03"];
const MID_MONTHS: [&str; 3] = ["2025-01-15", "2025-02-14", "2025-03-14"];

/// Three months of a salaried applicant: salary, rent, groceries, energy, a card repayment
/// and a monthly savings sweep. Balances stay positive throughout.
pub fn salaried_applicant() -> Vec<Value> {
    let mut rows = Vec::new();
    let mut balance = 1400.0;
    for month in 0..3 {
        balance -= 800.0;
        rows.push(with_balance(
            transaction("RENT OAK LETTINGS", 800.0, MONTH_STARTS[month]),
            balance,
        ));
        balance -= 90.0;
        rows.push(with_balance(
            transaction("BRITISH GAS DD", 90.0, MONTH_STARTS[month]),
            balance,
        ));
        balance -= 150.0;
        rows.push(with_balance(
            transaction("TESCO STORES 2231", 150.0, MID_MONTHS[month]),
            balance,
        ));
        balance -= 120.0;
        rows.push(with_balance(
            transaction("VANQUIS CARD PAYMENT", 120.0, MID_MONTHS[month]),
            balance,
        ));
        balance -= 50.0;
        rows.push(with_balance(
            transaction("MONEYBOX SAVINGS", 50.0, MID_MONTHS[month]),
            balance,
        ));
        balance += 2500.0;
        rows.push(with_balance(
            transaction("ACME CORP SALARY", -2500.0, MONTH_ENDS[month]),
            balance,
        ));
        balance -= 150.0;
        rows.push(with_balance(
            transaction("TESCO STORES 2231", 150.0, MONTH_ENDS[month]),
            balance,
        ));
    }
    rows
}

/// The salaried applicant plus heavy betting, well above the gambling ceiling.
pub fn gambling_applicant() -> Vec<Value> {
    let mut rows = salaried_applicant();
    for date in ["2025-01-20", "2025-02-10", "2025-02-24", "2025-03-20"] {
        rows.push(transaction("BET365", 400.0, date));
    }
    rows
}
