use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// One bank transaction line. Each payment yields exactly one proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub amount: BigDecimal,
    pub date: Option<String>,
    pub reference: String,
}

/// Inline payment as posted by clients, loosely typed: `amount` may arrive
/// as a JSON number or a string, and `reference` falls back to `details`.
/// Normalized into `PaymentRecord` by the payments loader.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentInput {
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub amt: Option<serde_json::Value>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}
