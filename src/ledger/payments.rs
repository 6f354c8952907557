use std::path::Path;

use bigdecimal::{BigDecimal, Zero};
use serde_json::Value;

use super::{field, header_indices, parse_decimal_or};
use crate::error::Result;
use crate::models::{PaymentInput, PaymentRecord};

// Accepted header spellings, in fallback order.
const AMOUNT_HEADERS: &[&str] = &["amount", "amt"];
const DATE_HEADERS: &[&str] = &["date"];
const REFERENCE_HEADERS: &[&str] = &["reference", "details"];

/// Resolve the payment source. Precedence: explicit inline list, else
/// payments file, else empty.
pub fn read_payments(
    inline: Option<&[PaymentInput]>,
    file: Option<&Path>,
) -> Result<Vec<PaymentRecord>> {
    if let Some(inline) = inline {
        return Ok(inline.iter().map(normalize_inline).collect());
    }
    match file {
        Some(path) => read_payments_csv(path),
        None => Ok(Vec::new()),
    }
}

/// Load payments from a CSV file. Missing file yields an empty list, same
/// as the ledger loader.
pub fn read_payments_csv(path: &Path) -> Result<Vec<PaymentRecord>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let amount_cols = header_indices(&headers, AMOUNT_HEADERS);
    let date_cols = header_indices(&headers, DATE_HEADERS);
    let reference_cols = header_indices(&headers, REFERENCE_HEADERS);

    let mut payments = Vec::new();
    for record in reader.records() {
        let record = record?;
        let date = field(&record, &date_cols);
        payments.push(PaymentRecord {
            amount: parse_decimal_or(field(&record, &amount_cols), BigDecimal::zero()),
            date: (!date.is_empty()).then(|| date.to_string()),
            reference: field(&record, &reference_cols).to_string(),
        });
    }

    Ok(payments)
}

fn normalize_inline(input: &PaymentInput) -> PaymentRecord {
    let amount = input
        .amount
        .as_ref()
        .or(input.amt.as_ref())
        .map(coerce_amount)
        .unwrap_or_else(BigDecimal::zero);

    PaymentRecord {
        amount,
        date: input.date.clone().filter(|d| !d.trim().is_empty()),
        reference: input
            .reference
            .clone()
            .or_else(|| input.details.clone())
            .unwrap_or_default(),
    }
}

/// Inline amounts arrive as JSON numbers or strings; anything malformed
/// degrades to zero.
fn coerce_amount(value: &Value) -> BigDecimal {
    match value {
        Value::Number(n) => parse_decimal_or(&n.to_string(), BigDecimal::zero()),
        Value::String(s) => parse_decimal_or(s, BigDecimal::zero()),
        _ => BigDecimal::zero(),
    }
}
