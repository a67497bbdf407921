//! Request middleware

mod identity;

pub use identity::{
    EMAIL_HEADER, GROUPS_HEADER, IdentityHeaders, NAME_HEADER, USER_HEADER, extract_identity,
    identity_middleware,
};
