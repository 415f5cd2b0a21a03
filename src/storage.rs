
mod report;
mod trimmer;

pub use report::{DocumentReport, EscapingReference, Report};
pub use trimmer::{Mode, TrimError, Trimmer, run};
