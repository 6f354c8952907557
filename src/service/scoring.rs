use bigdecimal::{BigDecimal, ToPrimitive};

use crate::models::{Candidate, InvoiceRecord, MatchReasons, PaymentRecord};

// Combined-score weights (tuneable).
pub const WEIGHT_INVOICE_NO: f64 = 0.45;
pub const WEIGHT_AMOUNT: f64 = 0.40;
pub const WEIGHT_DETAILS: f64 = 0.15;

/// Round a score to 3 decimals for reporting.
pub(crate) fn round3(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Amount closeness normalized to [0, 1], symmetric in its arguments:
/// `max(0, 1 - |inv - pay| / max(inv, pay, 1.0))`. Zero when both amounts
/// are non-positive.
pub fn amount_score(invoice_total: &BigDecimal, payment_amount: &BigDecimal) -> f64 {
    let inv = invoice_total.to_f64().unwrap_or(0.0);
    let pay = payment_amount.to_f64().unwrap_or(0.0);
    if inv <= 0.0 && pay <= 0.0 {
        return 0.0;
    }
    let diff = (inv - pay).abs();
    let denom = inv.max(pay).max(1.0);
    (1.0 - diff / denom).max(0.0)
}

/// Token-order-independent similarity between the payment reference and the
/// invoice details: lowercase, sort whitespace tokens, then normalized
/// Levenshtein. Zero when either side is empty.
pub fn details_score(reference: &str, details: &str) -> f64 {
    if reference.trim().is_empty() || details.trim().is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&sort_tokens(reference), &sort_tokens(details))
}

fn sort_tokens(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Score one eligible invoice against one payment.
pub fn make_candidate(
    payment: &PaymentRecord,
    invoice_idx: usize,
    invoice: &InvoiceRecord,
) -> Candidate {
    let invoice_no_match = match invoice.invoice_no.as_deref() {
        Some(no) if !no.is_empty() && payment.reference.contains(no) => 1.0,
        _ => 0.0,
    };
    let amount = amount_score(&invoice.total, &payment.amount);
    let details = details_score(&payment.reference, &invoice.details);

    let combined =
        invoice_no_match * WEIGHT_INVOICE_NO + amount * WEIGHT_AMOUNT + details * WEIGHT_DETAILS;

    Candidate {
        invoice_idx,
        invoice: invoice.clone(),
        score: round3(combined),
        reasons: MatchReasons {
            invoice_no_match,
            amount_score: round3(amount),
            details_score: round3(details),
        },
    }
}
