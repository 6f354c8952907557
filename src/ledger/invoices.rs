use std::path::Path;

use bigdecimal::{BigDecimal, One, Zero};

use super::{field, header_indices, parse_decimal_or};
use crate::error::Result;
use crate::models::InvoiceRecord;

// Accepted header spellings, in fallback order.
const INVOICE_NO_HEADERS: &[&str] = &["invoice_no", "inv_no"];
const DATE_HEADERS: &[&str] = &["invoice_date", "date"];
const DETAILS_HEADERS: &[&str] = &["details", "item_name"];
const QTY_HEADERS: &[&str] = &["qty"];
const UNIT_PRICE_HEADERS: &[&str] = &["unit_price", "invoice_value"];

/// Load the invoice ledger from a CSV file.
///
/// A path that does not exist yields an empty ledger — downstream matching
/// must tolerate zero invoices. A file that exists but cannot be read or
/// parsed propagates as a genuine failure.
///
/// Quantity defaults to 1 when absent or unparseable, unit price to 0;
/// `total = round(qty * unit_price, 2)`.
pub fn read_ledger(path: &Path) -> Result<Vec<InvoiceRecord>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let invoice_no_cols = header_indices(&headers, INVOICE_NO_HEADERS);
    let date_cols = header_indices(&headers, DATE_HEADERS);
    let details_cols = header_indices(&headers, DETAILS_HEADERS);
    let qty_cols = header_indices(&headers, QTY_HEADERS);
    let unit_price_cols = header_indices(&headers, UNIT_PRICE_HEADERS);

    let mut invoices = Vec::new();
    for record in reader.records() {
        let record = record?;

        let qty = parse_decimal_or(field(&record, &qty_cols), BigDecimal::one());
        let unit = parse_decimal_or(field(&record, &unit_price_cols), BigDecimal::zero());
        let total = (qty * unit).round(2);

        let invoice_no = field(&record, &invoice_no_cols);
        let date = field(&record, &date_cols);

        invoices.push(InvoiceRecord {
            invoice_no: (!invoice_no.is_empty()).then(|| invoice_no.to_string()),
            date: (!date.is_empty()).then(|| date.to_string()),
            details: field(&record, &details_cols).to_string(),
            total,
        });
    }

    Ok(invoices)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bigdecimal::BigDecimal;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn missing_file_yields_empty_ledger() {
        let invoices = read_ledger(Path::new("/nonexistent/ledger.csv")).unwrap();
        assert!(invoices.is_empty());
    }

    #[test]
    fn reads_standard_headers() {
        let file = write_csv(
            "invoice_no,invoice_date,details,qty,unit_price\n\
             1004,2025-01-01,Consulting services,1,20000\n\
             1006,2025-01-05,Development work,2,3500\n",
        );
        let invoices = read_ledger(file.path()).unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].invoice_no.as_deref(), Some("1004"));
        assert_eq!(invoices[0].date.as_deref(), Some("2025-01-01"));
        assert_eq!(invoices[0].details, "Consulting services");
        assert_eq!(invoices[0].total, BigDecimal::from(20000));
        assert_eq!(invoices[1].total, BigDecimal::from(7000));
    }

    #[test]
    fn reads_alternate_headers() {
        let file = write_csv(
            "inv_no,date,item_name,qty,invoice_value\n\
             INV-1,2025-02-01,Stationery,3,100\n",
        );
        let invoices = read_ledger(file.path()).unwrap();
        assert_eq!(invoices[0].invoice_no.as_deref(), Some("INV-1"));
        assert_eq!(invoices[0].date.as_deref(), Some("2025-02-01"));
        assert_eq!(invoices[0].details, "Stationery");
        assert_eq!(invoices[0].total, BigDecimal::from(300));
    }

    #[test]
    fn defaults_for_missing_or_malformed_numerics() {
        // no qty column: defaults to 1; malformed unit price: defaults to 0
        let file = write_csv(
            "invoice_no,details,unit_price\n\
             A,First,1500\n\
             B,Second,not-a-number\n",
        );
        let invoices = read_ledger(file.path()).unwrap();
        assert_eq!(invoices[0].total, BigDecimal::from(1500));
        assert_eq!(invoices[1].total, BigDecimal::from(0));
    }

    #[test]
    fn blank_invoice_no_becomes_none() {
        let file = write_csv(
            "invoice_no,details,qty,unit_price\n\
             ,Unnumbered line,1,50\n",
        );
        let invoices = read_ledger(file.path()).unwrap();
        assert!(invoices[0].invoice_no.is_none());
        assert!(invoices[0].date.is_none());
    }
}
