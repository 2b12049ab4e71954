//! Structural ordering of a component batch.
//!
//! Rules, applied to a deduplicated batch:
//! - `solr-lucene` runs before `crawler`, since the crawler indexes into it.
//! - host-wide components (`complus`) run after every deployment component.
//!
//! Anything else keeps its input order.

use crate::types::{ComponentName, ComponentScope};

/// Prerequisite pairs: the first must precede the second in a batch.
const PREREQUISITES: &[(ComponentName, ComponentName)] =
    &[(ComponentName::SolrLucene, ComponentName::Crawler)];

/// Order a batch of components. Duplicates keep their first position.
pub fn order_components(batch: &[ComponentName]) -> Vec<ComponentName> {
    let mut unique: Vec<ComponentName> = Vec::with_capacity(batch.len());
    for name in batch {
        if !unique.contains(name) {
            unique.push(*name);
        }
    }

    let (mut ordered, host_wide): (Vec<_>, Vec<_>) = unique
        .into_iter()
        .partition(|n| n.scope() == ComponentScope::Deployment);

    for (before, after) in PREREQUISITES {
        let (Some(b), Some(a)) = (
            ordered.iter().position(|n| n == before),
            ordered.iter().position(|n| n == after),
        ) else {
            continue;
        };
        if b > a {
            let moved = ordered.remove(b);
            ordered.insert(a, moved);
        }
    }

    ordered.extend(host_wide);
    ordered
}

/// The prerequisite `name` needs within a batch, if any.
pub fn prerequisite_of(name: ComponentName) -> Option<ComponentName> {
    PREREQUISITES
        .iter()
        .find(|(_, after)| *after == name)
        .map(|(before, _)| *before)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
