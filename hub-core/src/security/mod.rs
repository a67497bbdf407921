//! Query-time predicate, result re-check, and redaction

mod filter;
mod predicate;
mod redact;

pub use filter::SecurityFilter;
pub use predicate::Predicate;
pub use redact::{Redactable, redact};
