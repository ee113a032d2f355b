mod fixtures;
mod pg_store;
mod remote;

pub use fixtures::StaticFixtureProvider;
pub use pg_store::PgBusinessStore;
pub use remote::RemoteDirectoryProvider;
