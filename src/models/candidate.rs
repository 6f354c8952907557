use serde::Serialize;

use super::InvoiceRecord;

/// Per-factor breakdown behind a candidate's combined score.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReasons {
    pub invoice_no_match: f64,  // 1.0 when the invoice number appears in the reference
    pub amount_score: f64,
    pub details_score: f64,
}

/// Scored pairing of one payment with one invoice. Lives only while a single
/// payment is evaluated; serialized only inside a `candidates` proposal.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    #[serde(skip)]
    pub invoice_idx: usize,     // position in the run's invoice pool
    pub invoice: InvoiceRecord,
    pub score: f64,
    pub reasons: MatchReasons,
}
