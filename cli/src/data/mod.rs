pub mod accumulator;
pub mod display;
pub mod ledger;
pub mod sessions;
pub mod store;
pub mod tabs;
pub mod usage_store;

pub use accumulator::UsageAccumulator;
pub use ledger::UsageLedger;
pub use store::{KeyValueStore, StoreError};
pub use tabs::TabDirectory;
pub use usage_store::UsageStore;
