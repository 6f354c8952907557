use std::fs::File;
use std::path::Path;

use chrono::Utc;
use csv::Writer;

use crate::error::Result;
use crate::models::Proposal;

/// Write an Option<String> field as a CSV value.
fn option_to_csv(val: &Option<String>) -> String {
    val.clone().unwrap_or_default()
}

/// Export accepted proposals to a flat CSV file, one row per allocation.
/// `candidates` proposals are unresolved and are not exported.
pub fn export_proposals_csv(proposals: &[Proposal], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);
    let exported_at = Utc::now().to_rfc3339();

    writer.write_record([
        "reference",
        "payment_amount",
        "payment_date",
        "match_type",
        "invoice_no",
        "allocated",
        "score",
        "exported_at",
    ])?;

    for proposal in proposals {
        match proposal {
            Proposal::Single {
                payment,
                invoice,
                score,
                ..
            } => {
                writer.write_record(&[
                    payment.reference.clone(),
                    payment.amount.to_string(),
                    option_to_csv(&payment.date),
                    "single".to_string(),
                    option_to_csv(&invoice.invoice_no),
                    invoice.total.to_string(),
                    score.to_string(),
                    exported_at.clone(),
                ])?;
            }
            Proposal::Combined {
                payment,
                allocations,
                score,
            } => {
                for allocation in allocations {
                    writer.write_record(&[
                        payment.reference.clone(),
                        payment.amount.to_string(),
                        option_to_csv(&payment.date),
                        "combined".to_string(),
                        option_to_csv(&allocation.invoice.invoice_no),
                        allocation.allocated.to_string(),
                        score.to_string(),
                        exported_at.clone(),
                    ])?;
                }
            }
            Proposal::Candidates { .. } => {}
        }
    }

    writer.flush()?;
    Ok(())
}
