//! Network-level address deny-list. A [`FilterStore`] is the sole mutation
//! path for the pair of a live filter-enforcement structure and the filter
//! list persisted in node configuration, keeping the two in lock-step.

pub mod config;
pub mod live;
pub mod mask;
pub mod store;

pub use config::{
    ConfigStore, ConfigStoreError, JsonFileConfigStore, MemoryConfigStore, SwarmConfig,
};
pub use live::{AddressFilters, MemoryFilters};
pub use mask::{FilterAction, FilterMask, FilterMaskError};
pub use store::{FilterError, FilterStore};
