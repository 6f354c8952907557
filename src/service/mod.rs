pub mod combination;
pub mod matcher;
pub mod scoring;

pub use matcher::{InvoicePool, ReconService};
