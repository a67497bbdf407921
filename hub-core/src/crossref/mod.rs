//! Cross-agency document relationships

mod resolver;
mod types;

pub use resolver::CrossReferenceResolver;
pub use types::{
    CrossReference, CrossReferenceOutcome, CrossReferenceQuery, CrossReferenceResponse,
    RelationshipType,
};
