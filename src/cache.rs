//! Single-flight lookup cache
//!
//! Memoizes resolutions per normalized merchant name. Each key is either
//! settled (value fixed) or in flight (one shared resolution that every
//! concurrent caller for the key awaits).
//!
//! The resolution itself runs on a spawned task that settles the entry when
//! it finishes, so a caller dropping its request cancels nothing; whoever is
//! still waiting gets the result and later lookups hit the settled value.
//! The map lock is only held to read or swap an entry, never across registry
//! I/O, so a slow key does not hold up lookups of any other key.
//!
//! An in-flight entry is only ever removed or replaced by its own task, so
//! eviction cannot start a second resolution for a key still being resolved.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::resolver::Resolver;
use crate::types::ResolvedIdentity;

/// A resolution every waiter for one key shares
///
/// `None` means the resolution task died before producing a result.
type PendingLookup = Shared<BoxFuture<'static, Option<Option<ResolvedIdentity>>>>;

enum CacheEntry {
    InFlight(PendingLookup),
    Settled(Option<ResolvedIdentity>),
}

type Entries = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Cache key for a merchant name (trimmed, case-folded)
pub fn cache_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Process-wide memo of merchant resolutions
///
/// Construct once at startup and share through an `Arc`.
pub struct LookupCache {
    resolver: Arc<Resolver>,
    entries: Entries,
}

impl LookupCache {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve `name`, calling the resolver at most once per key
    ///
    /// Settled keys return without I/O. A key already being resolved is
    /// awaited rather than resolved again.
    pub async fn resolve(&self, name: &str) -> Option<ResolvedIdentity> {
        let key = cache_key(name);

        let pending = {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(CacheEntry::Settled(value)) => return value.clone(),
                Some(CacheEntry::InFlight(pending)) => Some(pending.clone()),
                None => None,
            }
        };

        let pending = match pending {
            Some(pending) => pending,
            None => {
                let mut entries = self.entries.write().await;
                // Another caller may have started or finished this key meanwhile
                match entries.get(&key) {
                    Some(CacheEntry::Settled(value)) => return value.clone(),
                    Some(CacheEntry::InFlight(pending)) => pending.clone(),
                    None => {
                        tracing::debug!(key = %key, "Cache miss; starting resolution");
                        let pending = self.spawn_resolution(key.clone(), name.trim().to_string());
                        entries.insert(key.clone(), CacheEntry::InFlight(pending.clone()));
                        pending
                    }
                }
            }
        };

        match pending.await {
            Some(value) => value,
            None => {
                // The task panicked; drop the dead entry so the key can be retried
                let mut entries = self.entries.write().await;
                if matches!(entries.get(&key), Some(CacheEntry::InFlight(_))) {
                    entries.remove(&key);
                }
                None
            }
        }
    }

    /// Spawn the resolution for `key`; the task settles the entry itself
    ///
    /// Must be called with the entries write lock held so the task cannot
    /// settle before the in-flight entry is inserted.
    fn spawn_resolution(&self, key: String, name: String) -> PendingLookup {
        let resolver = Arc::clone(&self.resolver);
        let entries = Arc::clone(&self.entries);

        let task = tokio::spawn(async move {
            let outcome = resolver.try_resolve(&name).await;
            let mut entries = entries.write().await;
            // Only this task's in-flight entry may be replaced
            let owned = matches!(entries.get(&key), Some(CacheEntry::InFlight(_)));
            match outcome {
                Ok(value) => {
                    if owned {
                        entries.insert(key, CacheEntry::Settled(value.clone()));
                    }
                    value
                }
                Err(e) => {
                    // Registry unreachable: answer "no match" but let the next lookup retry
                    tracing::warn!(name = %name, error = %e, "Registry search failed; not caching");
                    if owned {
                        entries.remove(&key);
                    }
                    None
                }
            }
        });

        task.map(|joined| match joined {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, "Resolution task failed");
                None
            }
        })
        .boxed()
        .shared()
    }

    /// Drop one settled name
    ///
    /// A name still being resolved is left alone and `false` returned; its
    /// waiters and any new callers keep sharing the running resolution.
    pub async fn evict(&self, name: &str) -> bool {
        let key = cache_key(name);
        let mut entries = self.entries.write().await;
        match entries.get(&key) {
            Some(CacheEntry::Settled(_)) => entries.remove(&key).is_some(),
            _ => false,
        }
    }

    /// Drop every settled name
    ///
    /// In-flight resolutions are kept and settle their keys when done.
    pub async fn clear(&self) {
        self.entries
            .write()
            .await
            .retain(|_, entry| matches!(entry, CacheEntry::InFlight(_)));
    }

    /// Number of keys, settled or in flight
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
