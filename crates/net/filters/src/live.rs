//! The live filter set consulted by the connection layer.

use auto_impl::auto_impl;
use parking_lot::RwLock;

use crate::mask::{FilterAction, FilterMask};

/// Live filter-enforcement structure.
///
/// The connection layer consults an implementation of this on every dial and
/// inbound attempt. This crate only keeps it in step with the persisted
/// filter list; match semantics belong to the implementor.
#[auto_impl(&, Box, Arc)]
pub trait AddressFilters: Send + Sync {
    fn add_mask(&self, mask: FilterMask, action: FilterAction);
    fn remove_mask(&self, mask: &FilterMask);
    fn list_masks(&self, action: FilterAction) -> Vec<FilterMask>;
}

/// In-memory filter set with set semantics, in insertion order.
#[derive(Default)]
pub struct MemoryFilters {
    masks: RwLock<Vec<(FilterMask, FilterAction)>>,
}

impl MemoryFilters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AddressFilters for MemoryFilters {
    fn add_mask(&self, mask: FilterMask, action: FilterAction) {
        let mut masks = self.masks.write();
        if !masks.iter().any(|(m, a)| *m == mask && *a == action) {
            masks.push((mask, action));
        }
    }

    fn remove_mask(&self, mask: &FilterMask) {
        self.masks.write().retain(|(m, _)| m != mask);
    }

    fn list_masks(&self, action: FilterAction) -> Vec<FilterMask> {
        self.masks
            .read()
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(m, _)| *m)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(text: &str) -> FilterMask {
        text.parse().unwrap()
    }

    #[test]
    fn test_add_is_idempotent() {
        let filters = MemoryFilters::new();
        filters.add_mask(mask("/ip4/10.0.0.0/ipcidr/8"), FilterAction::Deny);
        filters.add_mask(mask("/ip4/10.0.0.0/ipcidr/8"), FilterAction::Deny);

        assert_eq!(filters.list_masks(FilterAction::Deny).len(), 1);
    }

    #[test]
    fn test_remove_by_value() {
        let filters = MemoryFilters::new();
        filters.add_mask(mask("/ip4/10.0.0.0/ipcidr/8"), FilterAction::Deny);
        filters.add_mask(mask("/ip4/192.168.0.0/ipcidr/16"), FilterAction::Deny);

        filters.remove_mask(&mask("/ip4/10.0.0.0/ipcidr/8"));
        assert_eq!(
            filters.list_masks(FilterAction::Deny),
            vec![mask("/ip4/192.168.0.0/ipcidr/16")]
        );

        // Removing an absent mask is a no-op.
        filters.remove_mask(&mask("/ip4/10.0.0.0/ipcidr/8"));
        assert_eq!(filters.list_masks(FilterAction::Deny).len(), 1);
    }
}
