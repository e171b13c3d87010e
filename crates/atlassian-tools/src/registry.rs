//! Lazy, process-lifetime backend client singletons.
//!
//! The registry is the only way tool handlers obtain a client. The first
//! call for a backend resolves its configuration and constructs the client;
//! every later call returns the same `Arc`. The slot mutex is held across
//! construction, so concurrent first calls cannot race to build two clients.
//! A failed construction leaves the slot empty; the next call resolves again
//! (matching the lazy-singleton behavior of config-at-first-use).

use crate::config::BackendConfig;
use crate::confluence::ConfluenceClient;
use crate::error::Result;
use crate::jira::JiraClient;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Transport-level request timeout used when the binary does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

enum ConfigSource {
    /// Resolve `CONFLUENCE_*` / `JIRA_*` from the process environment.
    Env,
    /// Fixed configs, used by tests.
    Fixed {
        confluence: BackendConfig,
        jira: BackendConfig,
    },
}

pub struct ClientRegistry {
    source: ConfigSource,
    timeout: Duration,
    confluence: LazySlot<ConfluenceClient>,
    jira: LazySlot<JiraClient>,
}

impl ClientRegistry {
    #[must_use]
    pub fn from_env(timeout: Duration) -> Self {
        Self {
            source: ConfigSource::Env,
            timeout,
            confluence: LazySlot::new(),
            jira: LazySlot::new(),
        }
    }

    /// Registry with pre-resolved configs; construction stays lazy.
    #[must_use]
    pub fn with_configs(confluence: BackendConfig, jira: BackendConfig, timeout: Duration) -> Self {
        Self {
            source: ConfigSource::Fixed { confluence, jira },
            timeout,
            confluence: LazySlot::new(),
            jira: LazySlot::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Config` if connection parameters are missing or the
    /// HTTP client cannot be built.
    pub fn confluence(&self) -> Result<Arc<ConfluenceClient>> {
        self.confluence.get_or_try_init(|| {
            let config = match &self.source {
                ConfigSource::Env => BackendConfig::from_env("CONFLUENCE")?,
                ConfigSource::Fixed { confluence, .. } => confluence.clone(),
            };
            debug!("constructing Confluence client");
            ConfluenceClient::new(config, self.timeout)
        })
    }

    /// # Errors
    ///
    /// Returns `Error::Config` if connection parameters are missing or the
    /// HTTP client cannot be built.
    pub fn jira(&self) -> Result<Arc<JiraClient>> {
        self.jira.get_or_try_init(|| {
            let config = match &self.source {
                ConfigSource::Env => BackendConfig::from_env("JIRA")?,
                ConfigSource::Fixed { jira, .. } => jira.clone(),
            };
            debug!("constructing Jira client");
            JiraClient::new(config, self.timeout)
        })
    }
}

/// Single-initialization slot. The lock is held for the whole construction,
/// which is cheap here (no I/O happens in client constructors).
struct LazySlot<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> LazySlot<T> {
    const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn get_or_try_init(&self, init: impl FnOnce() -> Result<T>) -> Result<Arc<T>> {
        let mut slot = self.slot.lock();
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing));
        }
        let built = Arc::new(init()?);
        *slot = Some(Arc::clone(&built));
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientRegistry, LazySlot};
    use crate::config::BackendConfig;
    use crate::error::Error;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_registry() -> ClientRegistry {
        let confluence =
            BackendConfig::new("http://127.0.0.1:1", "bot", "t0ken").expect("config");
        let jira = BackendConfig::new("http://127.0.0.1:1", "bot", "t0ken").expect("config");
        ClientRegistry::with_configs(confluence, jira, Duration::from_secs(1))
    }

    #[test]
    fn lazy_slot_initializes_exactly_once() {
        let calls = AtomicUsize::new(0);
        let slot: LazySlot<u32> = LazySlot::new();

        let first = slot
            .get_or_try_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .expect("init");
        let second = slot
            .get_or_try_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(8)
            })
            .expect("cached");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*second, 7);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn lazy_slot_retries_after_failed_init() {
        let slot: LazySlot<u32> = LazySlot::new();
        let err = slot
            .get_or_try_init(|| Err(Error::Config("missing".to_string())))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let value = slot.get_or_try_init(|| Ok(3)).expect("second attempt");
        assert_eq!(*value, 3);
    }

    #[test]
    fn concurrent_first_calls_construct_one_client() {
        let calls = Arc::new(AtomicUsize::new(0));
        let slot = Arc::new(LazySlot::<u32>::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    slot.get_or_try_init(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(42)
                    })
                    .expect("init")
                })
            })
            .collect();

        let values: Vec<Arc<u32>> = handles
            .into_iter()
            .map(|h| h.join().expect("thread join"))
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for v in &values {
            assert!(Arc::ptr_eq(v, &values[0]));
        }
    }

    #[test]
    fn registry_returns_the_same_client_instance() {
        let registry = test_registry();
        let a = registry.confluence().expect("client");
        let b = registry.confluence().expect("client");
        assert!(Arc::ptr_eq(&a, &b));

        let j1 = registry.jira().expect("client");
        let j2 = registry.jira().expect("client");
        assert!(Arc::ptr_eq(&j1, &j2));
    }
}
