//! Lock-step maintenance of the live deny-list and the persisted filter
//! list.

use std::collections::HashSet;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigStore, ConfigStoreError};
use crate::live::AddressFilters;
use crate::mask::{FilterAction, FilterMask, FilterMaskError};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterMaskError),
    #[error("filter persistence failed: {0}")]
    Persistence(#[from] ConfigStoreError),
}

/// Sole mutation path for the (live, persisted) filter pair.
///
/// Every operation takes the pair from one consistent state to another, or
/// fails leaving it untouched. The persisted list is written before the live
/// structure is touched, so a failed write never strands a live-only mask.
/// Operations on one store serialize through an internal lock; callers never
/// observe the two sides disagreeing.
///
/// Both collaborators are passed in explicitly so tests can supply in-memory
/// doubles for either side.
pub struct FilterStore<F, C> {
    filters: F,
    config: C,
    op_lock: Mutex<()>,
}

impl<F: AddressFilters, C: ConfigStore> FilterStore<F, C> {
    pub fn new(filters: F, config: C) -> Self {
        Self {
            filters,
            config,
            op_lock: Mutex::new(()),
        }
    }

    /// Current deny masks, as enforced by the live structure.
    pub fn list(&self) -> Vec<FilterMask> {
        self.filters.list_masks(FilterAction::Deny)
    }

    /// Parse and add filters, returning the canonical text of every mask
    /// that was genuinely new.
    ///
    /// One unparsable entry fails the whole call with nothing committed.
    /// Duplicates against the persisted list or within the batch are skipped
    /// silently. The persisted list is rewritten new-first so fresh filters
    /// surface at the top; previous entries keep their relative order.
    pub fn add(&self, masks: &[impl AsRef<str>]) -> Result<Vec<String>, FilterError> {
        let _guard = self.op_lock.lock();

        let parsed = parse_masks(masks)?;
        let mut config = self.config.read()?;
        let mut seen: HashSet<String> = config.addr_filters.iter().cloned().collect();

        let mut added = Vec::new();
        let mut added_masks = Vec::new();
        for mask in parsed {
            let text = mask.to_string();
            if seen.insert(text.clone()) {
                added.push(text);
                added_masks.push(mask);
            }
        }

        if added.is_empty() {
            return Ok(added);
        }

        let mut merged = added.clone();
        merged.extend(config.addr_filters);
        config.addr_filters = merged;
        self.config.write(&config)?;

        for mask in added_masks {
            self.filters.add_mask(mask, FilterAction::Deny);
        }

        debug!(count = added.len(), "added address filters");
        Ok(added)
    }

    /// Parse and remove filters, returning the subset actually present, in
    /// persisted order.
    ///
    /// The literal first argument `"all"` or `"*"` clears everything instead
    /// (see [`FilterStore::remove_all`]). Arguments naming absent filters
    /// are ignored; one unparsable entry fails the whole call with nothing
    /// committed.
    pub fn remove(&self, masks: &[impl AsRef<str>]) -> Result<Vec<String>, FilterError> {
        if matches!(masks.first().map(AsRef::as_ref), Some("all" | "*")) {
            return self.remove_all();
        }

        let _guard = self.op_lock.lock();

        let parsed = parse_masks(masks)?;
        let targets: HashSet<String> = parsed.iter().map(|m| m.to_string()).collect();

        let mut config = self.config.read()?;
        let mut removed = Vec::new();
        config.addr_filters.retain(|entry| {
            if targets.contains(entry) {
                removed.push(entry.clone());
                false
            } else {
                true
            }
        });

        if removed.is_empty() {
            return Ok(removed);
        }

        self.config.write(&config)?;

        for mask in &parsed {
            self.filters.remove_mask(mask);
        }

        debug!(count = removed.len(), "removed address filters");
        Ok(removed)
    }

    /// Drop every deny filter from both sides, returning the previous
    /// persisted list in order.
    pub fn remove_all(&self) -> Result<Vec<String>, FilterError> {
        let _guard = self.op_lock.lock();

        let mut config = self.config.read()?;
        let removed = std::mem::take(&mut config.addr_filters);
        self.config.write(&config)?;

        for mask in self.filters.list_masks(FilterAction::Deny) {
            self.filters.remove_mask(&mask);
        }

        debug!(count = removed.len(), "cleared address filters");
        Ok(removed)
    }
}

fn parse_masks(masks: &[impl AsRef<str>]) -> Result<Vec<FilterMask>, FilterMaskError> {
    masks.iter().map(|mask| mask.as_ref().parse()).collect()
}
