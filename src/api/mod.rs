pub mod handlers;

pub use handlers::{health_check, match_payments, summarize_discrepancies};
