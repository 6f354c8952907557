use bigdecimal::BigDecimal;
use serde::Serialize;

use super::{Candidate, InvoiceRecord, MatchReasons, PaymentRecord};

/// One invoice's share of a combined settlement.
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub invoice: InvoiceRecord,
    pub allocated: BigDecimal,
}

/// The per-payment output unit.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "match_type", rename_all = "lowercase")]
pub enum Proposal {
    /// One payment settles one invoice.
    Single {
        payment: PaymentRecord,
        invoice: InvoiceRecord,
        score: f64,
        reasons: MatchReasons,
    },
    /// One payment settles several invoices whose totals sum to the payment
    /// amount within tolerance.
    Combined {
        payment: PaymentRecord,
        allocations: Vec<Allocation>,
        score: f64,
    },
    /// No automatic tier cleared its threshold; ranked shortlist for human
    /// adjudication. Consumes no invoices.
    Candidates {
        payment: PaymentRecord,
        candidates: Vec<Candidate>,
    },
}

impl Proposal {
    pub fn payment(&self) -> &PaymentRecord {
        match self {
            Proposal::Single { payment, .. }
            | Proposal::Combined { payment, .. }
            | Proposal::Candidates { payment, .. } => payment,
        }
    }

    pub fn is_candidates(&self) -> bool {
        matches!(self, Proposal::Candidates { .. })
    }
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MatchOutcome {
    /// Empty payments input: nothing to reconcile, the loaded ledger is
    /// echoed back.
    LedgerOnly {
        status: &'static str,
        invoices_count: usize,
        invoices: Vec<InvoiceRecord>,
    },
    /// Normal run: one proposal per payment, in payment input order, plus
    /// the payments that ended up as candidate lists.
    Reconciled {
        status: &'static str,
        proposals: Vec<Proposal>,
        unmatched_payments: Vec<PaymentRecord>,
    },
}
