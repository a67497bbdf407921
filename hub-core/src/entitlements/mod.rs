//! Entitlement resolution and caching

mod cache;
mod identity;
mod resolver;
mod types;

pub use cache::PermissionCache;
pub use identity::Identity;
pub use resolver::{Grant, PermissionResolver, tokenize};
pub use types::UserEntitlements;
