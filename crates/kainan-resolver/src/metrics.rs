//! Counters for provider outcomes and the fire-and-forget cache path.

use std::sync::atomic::{AtomicU64, Ordering};

use kainan_core::ProviderKind;
use serde::Serialize;

#[derive(Debug, Default)]
struct ProviderCounters {
    served: AtomicU64,
    failed: AtomicU64,
}

impl ProviderCounters {
    fn snapshot(&self) -> ProviderStats {
        ProviderStats {
            served: self.served.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Shared between the resolver and its spawned cache-write tasks.
#[derive(Debug, Default)]
pub struct ResolverMetrics {
    remote_directory: ProviderCounters,
    user_content: ProviderCounters,
    static_fixture: ProviderCounters,
    all_sources_exhausted: AtomicU64,
    cache_writes_attempted: AtomicU64,
    cache_writes_succeeded: AtomicU64,
    cache_writes_skipped: AtomicU64,
    cache_writes_failed: AtomicU64,
}

impl ResolverMetrics {
    fn counters(&self, kind: ProviderKind) -> &ProviderCounters {
        match kind {
            ProviderKind::RemoteDirectory => &self.remote_directory,
            ProviderKind::UserContent => &self.user_content,
            ProviderKind::StaticFixture => &self.static_fixture,
        }
    }

    pub fn record_served(&self, kind: ProviderKind) {
        self.counters(kind).served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self, kind: ProviderKind) {
        self.counters(kind).failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exhausted(&self) {
        self.all_sources_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_attempt(&self) {
        self.cache_writes_attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// `written == false` means the store declined (owner-claimed record).
    pub fn record_cache_success(&self, written: bool) {
        if written {
            self.cache_writes_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_writes_skipped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_failure(&self) {
        self.cache_writes_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> ResolverStats {
        ResolverStats {
            remote_directory: self.remote_directory.snapshot(),
            user_content: self.user_content.snapshot(),
            static_fixture: self.static_fixture.snapshot(),
            all_sources_exhausted: self.all_sources_exhausted.load(Ordering::Relaxed),
            cache_writes: CacheWriteStats {
                attempted: self.cache_writes_attempted.load(Ordering::Relaxed),
                succeeded: self.cache_writes_succeeded.load(Ordering::Relaxed),
                skipped: self.cache_writes_skipped.load(Ordering::Relaxed),
                failed: self.cache_writes_failed.load(Ordering::Relaxed),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStats {
    pub served: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheWriteStats {
    pub attempted: u64,
    pub succeeded: u64,
    /// Declined because the record is owner-claimed.
    pub skipped: u64,
    pub failed: u64,
}

impl CacheWriteStats {
    /// Every attempted write has reported an outcome.
    #[must_use]
    pub fn settled(&self) -> bool {
        self.succeeded + self.skipped + self.failed == self.attempted
    }
}

/// Point-in-time copy of [`ResolverMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub remote_directory: ProviderStats,
    pub user_content: ProviderStats,
    pub static_fixture: ProviderStats,
    pub all_sources_exhausted: u64,
    pub cache_writes: CacheWriteStats,
}

impl ResolverStats {
    #[must_use]
    pub fn provider(&self, kind: ProviderKind) -> ProviderStats {
        match kind {
            ProviderKind::RemoteDirectory => self.remote_directory,
            ProviderKind::UserContent => self.user_content,
            ProviderKind::StaticFixture => self.static_fixture,
        }
    }
}
