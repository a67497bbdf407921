//! Audit logging for compliance
//!
//! Every access-relevant decision, denials included, is written to an
//! [`AuditSink`].

mod jsonl;
mod memory;
mod types;

pub use jsonl::JsonlAuditSink;
pub use memory::MemoryAuditSink;
pub use types::{
    ActionOutcome, ActorId, AuditAction, AuditEvent, AuditFilter, AuditSink, ResourceRef,
};
