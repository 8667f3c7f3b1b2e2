use secrecy::{ExposeSecret, Secret};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Persistent side of the token store.
///
/// Implementations must be fail-soft: cache I/O problems are logged and
/// swallowed, never surfaced to callers. The store works correctly with a
/// cache that silently loses data; the in-memory field is authoritative
/// for the lifetime of the session.
pub trait TokenCache: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str);
    fn clear(&self);
}

/// File-backed cache holding exactly one credential string.
pub struct FileTokenCache {
    path: PathBuf,
}

impl FileTokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenCache for FileTokenCache {
    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read token cache");
                None
            }
        }
    }

    fn store(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!(path = %self.path.display(), error = %e, "failed to create token cache directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(&self.path, token) {
            warn!(path = %self.path.display(), error = %e, "failed to write token cache");
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to clear token cache");
            }
        }
    }
}

/// Cache for environments without a persistent store; every operation is a
/// no-op.
pub struct NoopTokenCache;

impl TokenCache for NoopTokenCache {
    fn load(&self) -> Option<String> {
        None
    }

    fn store(&self, _token: &str) {}

    fn clear(&self) {}
}

/// Session credential holder.
///
/// Reads check the in-memory field first and fall back to the persistent
/// cache, re-hydrating memory on a hit; this covers a freshly constructed
/// client reusing a previously authenticated session. Writes and clears hit
/// both sides. One store per client instance; sessions never share ambient
/// state.
pub struct TokenStore {
    current: Mutex<Option<Secret<String>>>,
    cache: Arc<dyn TokenCache>,
}

impl TokenStore {
    pub fn new(cache: Arc<dyn TokenCache>) -> Self {
        Self {
            current: Mutex::new(None),
            cache,
        }
    }

    /// Select the cache from the environment's capability: a configured
    /// path gets the file cache, absence degrades to the no-op cache.
    pub fn from_cache_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::new(Arc::new(FileTokenCache::new(path))),
            None => Self::new(Arc::new(NoopTokenCache)),
        }
    }

    /// Current access token, if any.
    pub fn get(&self) -> Option<String> {
        let mut current = self.lock_current();

        if let Some(token) = current.as_ref() {
            return Some(token.expose_secret().clone());
        }

        let cached = self.cache.load()?;
        *current = Some(Secret::new(cached.clone()));
        Some(cached)
    }

    pub fn set(&self, token: &str) {
        *self.lock_current() = Some(Secret::new(token.to_string()));
        self.cache.store(token);
    }

    pub fn clear(&self) {
        *self.lock_current() = None;
        self.cache.clear();
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<Secret<String>>> {
        // The lock exists for `&self` interior mutability; a poisoned lock
        // means a panic mid-assignment, and the stored Option is still valid.
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// Never expose the held secret through Debug output
impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_token = self
            .current
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false);
        f.debug_struct("TokenStore")
            .field("token", &if has_token { "[REDACTED]" } else { "[NONE]" })
            .finish_non_exhaustive()
    }
}
