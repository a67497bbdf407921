//! hub-core: access control and review escalation for the inter-agency
//! knowledge hub
//!
//! This crate provides the layer between callers and the agency document
//! store:
//!
//! - **Entitlements** - [`PermissionResolver`] turns directory groups into
//!   [`UserEntitlements`]; [`PermissionCache`] keeps them for a short TTL
//! - **Security trimming** - [`SecurityFilter`] builds the backend predicate
//!   and re-checks and redacts everything that comes back
//! - **Search** - [`SearchOrchestrator`] for searches and document reads
//! - **Cross-references** - [`CrossReferenceResolver`] classifies related
//!   documents across agencies
//! - **Review** - [`ReviewGate`] withholds sensitive queries until a reviewer
//!   decides
//! - **Audit** - every decision, denials included, goes to an [`AuditSink`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hub_core::{HubConfig, HubResult, Identity, KnowledgeHub, MemorySearchBackend, SearchRequest};
//!
//! async fn example() -> HubResult<()> {
//!     let backend = Arc::new(MemorySearchBackend::new());
//!     let hub = KnowledgeHub::builder(HubConfig::default(), backend).build()?;
//!
//!     let alice = Identity::new("alice", "alice@example.gov").with_group("DMV_Staff");
//!     let outcome = hub.search(&alice, &SearchRequest::new("permit renewal")).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! caller ─► KnowledgeHub ─► PermissionCache ─► PermissionResolver
//!                 │
//!                 ├─► SearchOrchestrator ─► SecurityFilter ─► SearchBackend
//!                 │          │                    (predicate in, re-check out)
//!                 │          └─► ReviewGate ─► ReviewStore
//!                 │
//!                 └─► CrossReferenceResolver ─► SearchOrchestrator
//!
//!   every component ─► AuditSink
//! ```

pub mod agency;
pub mod audit;
pub mod backend;
pub mod clock;
pub mod config;
pub mod crossref;
pub mod document;
pub mod entitlements;
pub mod error;
pub mod hub;
pub mod review;
pub mod search;
pub mod security;

// Re-export key types for convenience
pub use agency::{Agency, ClassificationLevel};
pub use audit::{
    ActionOutcome, ActorId, AuditAction, AuditEvent, AuditFilter, AuditSink, JsonlAuditSink,
    MemoryAuditSink, ResourceRef,
};
pub use backend::{BackendQuery, MemorySearchBackend, SearchBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuditConfig, CacheConfig, CrossRefConfig, HubConfig, ReviewConfig, SearchConfig};
pub use crossref::{
    CrossReference, CrossReferenceOutcome, CrossReferenceQuery, CrossReferenceResolver,
    CrossReferenceResponse, RelationshipType,
};
pub use document::{AccessLabel, DocumentFields, IndexedDocument, Labeled, SearchResult};
pub use entitlements::{Identity, PermissionCache, PermissionResolver, UserEntitlements};
pub use error::{HubError, HubResult};
pub use hub::{HubBuilder, KnowledgeHub};
pub use review::{
    MemoryReviewStore, PendingReviewNotice, ReviewDecision, ReviewFlag, ReviewGate, ReviewStats,
    ReviewStatus, ReviewStore, ReviewView, SubmitterStatus,
};
pub use search::{SearchOrchestrator, SearchOutcome, SearchRequest, SearchResponse};
pub use security::{Predicate, SecurityFilter, redact};
