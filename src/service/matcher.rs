use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use super::combination;
use super::scoring;
use crate::error::Result;
use crate::ledger;
use crate::models::{
    Candidate, InvoiceRecord, MatchOutcome, PaymentInput, PaymentRecord, Proposal,
};

// Acceptance thresholds for the per-payment tiers.
const AUTO_ACCEPT_SCORE: f64 = 0.78;
const SUBSTRING_ACCEPT_SCORE: f64 = 0.50;
const COMBINATION_ACCEPT_SCORE: f64 = 0.65;
// Shortlist size for human adjudication.
const CANDIDATE_LIST_LIMIT: usize = 5;

/// Working set for one reconciliation run: the loaded ledger plus the
/// invoice indices already consumed by accepted proposals. Each run owns an
/// independent pool; nothing is shared across requests.
#[derive(Debug)]
pub struct InvoicePool {
    invoices: Vec<InvoiceRecord>,
    consumed: IndexSet<usize>,  // ordered, deduplicated
}

impl InvoicePool {
    pub fn new(invoices: Vec<InvoiceRecord>) -> Self {
        Self {
            invoices,
            consumed: IndexSet::new(),
        }
    }

    /// Invoices still eligible for allocation, in ledger order.
    fn available(&self) -> impl Iterator<Item = (usize, &InvoiceRecord)> {
        self.invoices
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.consumed.contains(idx))
    }

    fn consume(&mut self, idx: usize) {
        self.consumed.insert(idx);
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed.len()
    }
}

/// Payment-to-invoice reconciliation engine.
///
/// A run is a pure function of (invoices, payments): payments are evaluated
/// strictly in input order against a shared consumption pool, and each
/// payment yields exactly one proposal.
pub struct ReconService {
    default_ledger: PathBuf,
}

impl ReconService {
    pub fn new(default_ledger: PathBuf) -> Self {
        Self { default_ledger }
    }

    /// Entry point used by the HTTP handler: resolve the sources, load both
    /// datasets, run one matching pass.
    pub fn reconcile(
        &self,
        ledger_path: Option<&Path>,
        payments: Option<&[PaymentInput]>,
        payments_file: Option<&Path>,
    ) -> Result<MatchOutcome> {
        let ledger_path = ledger_path.unwrap_or(&self.default_ledger);
        let invoices = ledger::read_ledger(ledger_path)?;
        let payment_rows = ledger::read_payments(payments, payments_file)?;

        tracing::info!(
            "reconciliation run: {} invoices, {} payments",
            invoices.len(),
            payment_rows.len()
        );

        Ok(self.match_payments(invoices, payment_rows))
    }

    /// One reconciliation run over pre-loaded records.
    pub fn match_payments(
        &self,
        invoices: Vec<InvoiceRecord>,
        payments: Vec<PaymentRecord>,
    ) -> MatchOutcome {
        // nothing to reconcile: echo the ledger back
        if payments.is_empty() {
            return MatchOutcome::LedgerOnly {
                status: "success",
                invoices_count: invoices.len(),
                invoices,
            };
        }

        let mut pool = InvoicePool::new(invoices);
        let mut proposals = Vec::with_capacity(payments.len());

        for payment in payments {
            proposals.push(self.propose(payment, &mut pool));
        }

        let unmatched_payments: Vec<PaymentRecord> = proposals
            .iter()
            .filter(|p| p.is_candidates())
            .map(|p| p.payment().clone())
            .collect();

        tracing::info!(
            "run complete: {} proposals, {} unmatched, {} invoices consumed",
            proposals.len(),
            unmatched_payments.len(),
            pool.consumed_count()
        );

        MatchOutcome::Reconciled {
            status: "success",
            proposals,
            unmatched_payments,
        }
    }

    /// Evaluate one payment against the eligible pool.
    fn propose(&self, payment: PaymentRecord, pool: &mut InvoicePool) -> Proposal {
        // 1. score every eligible invoice; stable sort keeps ledger order on ties
        let mut candidates: Vec<Candidate> = pool
            .available()
            .map(|(idx, invoice)| scoring::make_candidate(&payment, idx, invoice))
            .collect();
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        // 2. auto-accept a high-confidence top candidate
        if candidates
            .first()
            .map_or(false, |top| top.score >= AUTO_ACCEPT_SCORE)
        {
            let top = candidates.remove(0);
            pool.consume(top.invoice_idx);
            tracing::debug!(score = top.score, "auto-accepted single match");
            return Proposal::Single {
                payment,
                invoice: top.invoice,
                score: top.score,
                reasons: top.reasons,
            };
        }

        // 3. substring fallback: the best-scored candidate whose invoice
        //    number appears verbatim in the payment reference
        let substring_hit = candidates.iter().position(|c| {
            c.invoice
                .invoice_no
                .as_deref()
                .map_or(false, |no| !no.is_empty() && payment.reference.contains(no))
        });
        if let Some(pos) = substring_hit {
            if candidates[pos].score >= SUBSTRING_ACCEPT_SCORE {
                let hit = candidates.remove(pos);
                pool.consume(hit.invoice_idx);
                tracing::debug!(score = hit.score, "accepted invoice-number substring match");
                return Proposal::Single {
                    payment,
                    invoice: hit.invoice,
                    score: hit.score,
                    reasons: hit.reasons,
                };
            }
        }

        // 4. bounded combination search; exact-tolerance hits win outright,
        //    approximate ones must clear the threshold
        if let Some(combo) = combination::find_combination(&payment.amount, &candidates) {
            if combo.exact || combo.score >= COMBINATION_ACCEPT_SCORE {
                for &idx in &combo.indices {
                    pool.consume(idx);
                }
                tracing::debug!(
                    score = combo.score,
                    invoices = combo.indices.len(),
                    "accepted combined match"
                );
                return Proposal::Combined {
                    payment,
                    allocations: combo.allocations,
                    score: combo.score,
                };
            }
        }

        // 5. ranked shortlist for human adjudication; consumes nothing
        candidates.truncate(CANDIDATE_LIST_LIMIT);
        Proposal::Candidates {
            payment,
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;

    fn service() -> ReconService {
        ReconService::new(PathBuf::from("ledger.csv"))
    }

    fn invoice(invoice_no: Option<&str>, details: &str, total: i64) -> InvoiceRecord {
        InvoiceRecord {
            invoice_no: invoice_no.map(str::to_string),
            date: None,
            details: details.to_string(),
            total: BigDecimal::from(total),
        }
    }

    fn payment(amount: i64, reference: &str) -> PaymentRecord {
        PaymentRecord {
            amount: BigDecimal::from(amount),
            date: None,
            reference: reference.to_string(),
        }
    }

    fn reconciled(outcome: MatchOutcome) -> (Vec<Proposal>, Vec<PaymentRecord>) {
        match outcome {
            MatchOutcome::Reconciled {
                proposals,
                unmatched_payments,
                ..
            } => (proposals, unmatched_payments),
            MatchOutcome::LedgerOnly { .. } => panic!("expected a reconciled outcome"),
        }
    }

    #[test]
    fn high_confidence_references_auto_accept() {
        let invoices = vec![
            invoice(Some("1004"), "Consulting services", 20000),
            invoice(Some("1006"), "Development work", 7000),
        ];
        let payments = vec![
            payment(20000, "Invoice #1004 bank transfer"),
            payment(7000, "Payment for invoice 1006"),
        ];

        let (proposals, unmatched) = reconciled(service().match_payments(invoices, payments));
        assert_eq!(proposals.len(), 2);
        assert!(unmatched.is_empty());

        for (proposal, expected_no) in proposals.iter().zip(["1004", "1006"]) {
            match proposal {
                Proposal::Single { invoice, score, .. } => {
                    assert_eq!(invoice.invoice_no.as_deref(), Some(expected_no));
                    assert!(*score >= 0.78, "score was {score}");
                }
                other => panic!("expected a single match, got {other:?}"),
            }
        }
    }

    #[test]
    fn fuzzy_reference_yields_single_or_shortlist() {
        let invoices = vec![invoice(Some("INV-900"), "Annual subscription premium", 1500)];
        let payments = vec![payment(1500, "Annual subscrptn premium by bank")];

        let (proposals, _) = reconciled(service().match_payments(invoices, payments));
        match &proposals[0] {
            Proposal::Single { score, .. } => assert!(*score >= 0.5, "score was {score}"),
            Proposal::Candidates { candidates, .. } => {
                assert!(candidates
                    .iter()
                    .any(|c| c.invoice.invoice_no.as_deref() == Some("INV-900")));
            }
            other => panic!("unexpected proposal {other:?}"),
        }
    }

    #[test]
    fn exact_pair_sum_becomes_combined_match() {
        let invoices = vec![
            invoice(Some("A-1"), "First tranche", 3000),
            invoice(Some("A-2"), "Second tranche", 4500),
        ];
        let payments = vec![payment(7500, "settlement of outstanding balance")];

        let (proposals, unmatched) = reconciled(service().match_payments(invoices, payments));
        assert!(unmatched.is_empty());
        match &proposals[0] {
            Proposal::Combined { allocations, score, .. } => {
                assert_eq!(allocations.len(), 2);
                let mut numbers: Vec<_> = allocations
                    .iter()
                    .map(|a| a.invoice.invoice_no.clone().unwrap())
                    .collect();
                numbers.sort();
                assert_eq!(numbers, ["A-1", "A-2"]);
                assert!((0.0..=1.0).contains(score));
            }
            other => panic!("expected a combined match, got {other:?}"),
        }
    }

    #[test]
    fn combined_match_consumes_its_invoices() {
        let invoices = vec![
            invoice(Some("A-1"), "First tranche", 3000),
            invoice(Some("A-2"), "Second tranche", 4500),
        ];
        let payments = vec![
            payment(7500, "settlement of outstanding balance"),
            // same amount again: constituents are gone, so no combination exists
            payment(7500, "duplicate settlement attempt"),
        ];

        let (proposals, unmatched) = reconciled(service().match_payments(invoices, payments));
        assert!(matches!(proposals[0], Proposal::Combined { .. }));
        assert!(matches!(proposals[1], Proposal::Candidates { .. }));
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].reference, "duplicate settlement attempt");
    }

    #[test]
    fn hopeless_payment_falls_back_to_shortlist() {
        let invoices: Vec<InvoiceRecord> = (0..8)
            .map(|i| invoice(Some(&format!("B-{i}")), "Bulk goods", 90000 + i * 1000))
            .collect();
        let payments = vec![payment(42, "petty cash, unrelated")];

        let (proposals, unmatched) = reconciled(service().match_payments(invoices, payments));
        match &proposals[0] {
            Proposal::Candidates { candidates, .. } => {
                assert!(candidates.len() <= 5);
                assert!(!candidates.is_empty());
                for c in candidates {
                    assert!((0.0..=1.0).contains(&c.score));
                }
            }
            other => panic!("expected a shortlist, got {other:?}"),
        }
        assert_eq!(unmatched.len(), 1);
    }

    #[test]
    fn empty_payments_echo_the_ledger() {
        let invoices = vec![invoice(Some("1004"), "Consulting services", 20000)];
        match service().match_payments(invoices, Vec::new()) {
            MatchOutcome::LedgerOnly {
                status,
                invoices_count,
                invoices,
            } => {
                assert_eq!(status, "success");
                assert_eq!(invoices_count, 1);
                assert_eq!(invoices.len(), 1);
            }
            MatchOutcome::Reconciled { .. } => panic!("expected the ledger-only outcome"),
        }
    }

    #[test]
    fn no_invoices_still_produces_one_proposal_per_payment() {
        let payments = vec![payment(100, "anything")];
        let (proposals, unmatched) = reconciled(service().match_payments(Vec::new(), payments));
        match &proposals[0] {
            Proposal::Candidates { candidates, .. } => assert!(candidates.is_empty()),
            other => panic!("expected an empty shortlist, got {other:?}"),
        }
        assert_eq!(unmatched.len(), 1);
    }

    #[test]
    fn an_invoice_is_never_allocated_twice() {
        let invoices = vec![
            invoice(Some("1004"), "Consulting services", 20000),
            invoice(Some("1006"), "Development work", 7000),
        ];
        let payments = vec![
            payment(20000, "Invoice #1004 bank transfer"),
            // references the already-consumed 1004 but matches amounts with 1006
            payment(7000, "Invoice #1004 follow-up"),
        ];

        let (proposals, _) = reconciled(service().match_payments(invoices, payments));
        let mut allocated: Vec<String> = Vec::new();
        for proposal in &proposals {
            match proposal {
                Proposal::Single { invoice, .. } => {
                    allocated.push(invoice.invoice_no.clone().unwrap())
                }
                Proposal::Combined { allocations, .. } => {
                    for a in allocations {
                        allocated.push(a.invoice.invoice_no.clone().unwrap());
                    }
                }
                Proposal::Candidates { .. } => {}
            }
        }
        let mut deduped = allocated.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(allocated.len(), deduped.len(), "invoice allocated twice");
    }

    #[test]
    fn substring_fallback_accepts_mid_confidence_match() {
        // amount off enough to stay below auto-accept, but the invoice
        // number sits in the reference and the score clears 0.5
        let invoices = vec![invoice(Some("1004"), "Consulting services", 26000)];
        let payments = vec![payment(13000, "part payment invoice 1004")];

        let (proposals, _) = reconciled(service().match_payments(invoices, payments));
        match &proposals[0] {
            Proposal::Single { invoice, score, .. } => {
                assert_eq!(invoice.invoice_no.as_deref(), Some("1004"));
                assert!(*score < 0.78, "score was {score}");
                assert!(*score >= 0.5, "score was {score}");
            }
            other => panic!("expected a substring single match, got {other:?}"),
        }
    }

    #[test]
    fn runs_are_deterministic() {
        let invoices = vec![
            invoice(Some("A-1"), "First tranche", 3000),
            invoice(Some("A-2"), "Second tranche", 4500),
            invoice(Some("1006"), "Development work", 7000),
        ];
        let payments = vec![
            payment(7000, "Payment for invoice 1006"),
            payment(7500, "settlement of outstanding balance"),
            payment(42, "petty cash"),
        ];

        let first = service().match_payments(invoices.clone(), payments.clone());
        let second = service().match_payments(invoices, payments);
        let a = serde_json::to_value(&first).unwrap();
        let b = serde_json::to_value(&second).unwrap();
        assert_eq!(a, b);
    }
}
