//! Multi-source business data resolution.
//!
//! Reads walk a fixed chain (remote directory, user content store, static
//! fixtures) and return the first success. Writes go to the user content
//! store only.

pub mod bootstrap;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod resolver;

pub use bootstrap::{build_resolver, BootstrapError, ResolverBundle};
pub use error::{ProviderError, ProviderFailure, ResolveError};
pub use metrics::{CacheWriteStats, ProviderStats, ResolverMetrics, ResolverStats};
pub use provider::{BusinessProvider, BusinessStore};
pub use providers::{PgBusinessStore, RemoteDirectoryProvider, StaticFixtureProvider};
pub use resolver::{BusinessResolver, ResolverConfig};
