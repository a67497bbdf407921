//! Field-level redaction

use tracing::trace;

use crate::agency::ClassificationLevel;
use crate::document::{DocumentFields, IndexedDocument, SearchResult};
use crate::entitlements::UserEntitlements;

/// Items carrying tiered fields
pub trait Redactable {
    fn fields_mut(&mut self) -> &mut DocumentFields;
}

impl Redactable for IndexedDocument {
    fn fields_mut(&mut self) -> &mut DocumentFields {
        &mut self.fields
    }
}

impl Redactable for SearchResult {
    fn fields_mut(&mut self) -> &mut DocumentFields {
        &mut self.fields
    }
}

/// Strip fields above the user's ceiling; admins are never redacted
///
/// Applying this twice yields the same item as applying it once.
pub fn redact<T: Redactable>(mut item: T, entitlements: &UserEntitlements) -> T {
    if entitlements.is_admin {
        return item;
    }

    let ceiling = entitlements.max_classification;
    let fields = item.fields_mut();

    if ceiling < ClassificationLevel::Internal {
        strip(fields, Tier::Internal);
    }
    if ceiling < ClassificationLevel::Restricted {
        strip(fields, Tier::Restricted);
    }
    item
}

#[derive(Debug, Clone, Copy)]
enum Tier {
    Internal,
    Restricted,
}

fn strip(fields: &mut DocumentFields, tier: Tier) {
    let keys = match tier {
        Tier::Internal => std::mem::take(&mut fields.internal),
        Tier::Restricted => std::mem::take(&mut fields.restricted),
    };
    for key in &keys {
        fields.values.remove(key);
    }
    if !keys.is_empty() {
        trace!(?tier, removed = keys.len(), "Redacted fields");
    }
}
