pub mod candidate;
pub mod invoice;
pub mod payment;
pub mod proposal;

pub use candidate::{Candidate, MatchReasons};
pub use invoice::InvoiceRecord;
pub use payment::{PaymentInput, PaymentRecord};
pub use proposal::{Allocation, MatchOutcome, Proposal};
