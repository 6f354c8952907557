use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// One normalized ledger line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_no: Option<String>,
    pub date: Option<String>,   // free-form, never parsed
    pub details: String,
    pub total: BigDecimal,      // round(qty * unit_price, 2)
}
