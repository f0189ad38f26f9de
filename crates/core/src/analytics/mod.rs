//! Analytics cache, invalidation rules and refresh coordination

pub mod cache;
pub mod coordinator;
mod in_flight;
pub mod invalidation;
pub mod ports;

pub use cache::DomainAnalyticsCache;
pub use coordinator::AnalyticsRefreshCoordinator;
pub use invalidation::{action_domain, dependent_domains, target_domains};
pub use ports::AnalyticsPort;
