//! Client preference storage and server synchronization

pub mod ports;
pub mod store;
pub mod sync;
pub mod validation;

pub use ports::*;
pub use store::LocalPreferenceStore;
pub use sync::PreferenceSyncCoordinator;
pub use validation::validate_preferences;
