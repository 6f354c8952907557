pub mod export;
pub mod invoices;
pub mod payments;

pub use export::export_proposals_csv;
pub use invoices::read_ledger;
pub use payments::{read_payments, read_payments_csv};

use bigdecimal::BigDecimal;
use csv::StringRecord;

/// Positions of every header matching one of the accepted spellings, in
/// fallback order.
pub(crate) fn header_indices(headers: &StringRecord, names: &[&str]) -> Vec<usize> {
    names
        .iter()
        .filter_map(|name| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        })
        .collect()
}

/// First non-empty value among the given columns, trimmed.
pub(crate) fn field<'a>(record: &'a StringRecord, indices: &[usize]) -> &'a str {
    indices
        .iter()
        .map(|&i| record.get(i).unwrap_or("").trim())
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

/// Parse a decimal field, degrading to the given default on empty or
/// malformed input.
pub(crate) fn parse_decimal_or(raw: &str, default: BigDecimal) -> BigDecimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default;
    }
    trimmed.parse::<BigDecimal>().unwrap_or(default)
}
