// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Backend registry: string keys mapped to backend factories.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::PoisonError;
use std::sync::RwLock;

use crate::backend::Backend;
use crate::backend::STDERR_KEY;
use crate::backend::STDOUT_KEY;
use crate::backend::Stderr;
use crate::backend::Stdout;

/// Produces backend instances for a registry key.
///
/// A factory may return `None` when its backend is currently unavailable; the key is then skipped
/// as if it were not registered.
pub trait BackendFactory: Send + Sync + 'static {
    /// Produce a backend instance.
    fn create(&self) -> Option<Arc<dyn Backend>>;
}

impl<F> BackendFactory for F
where
    F: Fn() -> Option<Arc<dyn Backend>> + Send + Sync + 'static,
{
    fn create(&self) -> Option<Arc<dyn Backend>> {
        self()
    }
}

/// Notified whenever a factory is registered, including when it replaces an existing one.
pub trait RegistryListener: Send + Sync + 'static {
    /// A factory was registered under `key`.
    fn backend_registered(&self, key: &str);
}

impl<F> RegistryListener for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn backend_registered(&self, key: &str) {
        self(key)
    }
}

/// A mapping from registry keys to backend factories.
///
/// Keys are unique; registering under an existing key replaces its factory. Reads vastly
/// outnumber writes, so both tables sit behind reader/writer locks.
///
/// # Examples
///
/// ```
/// use logcascade::Registry;
/// use logcascade::backend::Stdout;
///
/// let registry = Registry::new();
/// registry.add_listener(|key: &str| println!("backend {key} is available"));
/// registry.register("console", Stdout::default());
///
/// assert!(registry.get("console").is_some());
/// assert!(registry.get("remote").is_none());
/// ```
#[derive(Default)]
pub struct Registry {
    factories: RwLock<HashMap<String, Arc<dyn BackendFactory>>>,
    listeners: RwLock<Vec<Arc<dyn RegistryListener>>>,
}

static GLOBAL_REGISTRY: LazyLock<Arc<Registry>> =
    LazyLock::new(|| Arc::new(Registry::with_builtins()));

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in [`Stdout`] and [`Stderr`] backends registered under
    /// [`STDOUT_KEY`] and [`STDERR_KEY`].
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(STDOUT_KEY, Stdout::default());
        registry.register(STDERR_KEY, Stderr::default());
        registry
    }

    /// The process-wide registry, created with [`Registry::with_builtins`] on first use.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Retrieve the factory registered under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<dyn BackendFactory>> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        factories.get(key).cloned()
    }

    /// Register `factory` under `key`, replacing any previous factory, and notify listeners.
    pub fn put(&self, key: impl Into<String>, factory: impl BackendFactory) {
        let key = key.into();
        {
            let mut factories = self
                .factories
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            factories.insert(key.clone(), Arc::new(factory));
        }
        self.notify(&key);
    }

    /// Register a shared backend instance under `key`.
    ///
    /// Every resolution of `key` yields the same instance, so enablement flags set through the
    /// composite logger persist across calls.
    pub fn register(&self, key: impl Into<String>, backend: impl Backend) {
        self.register_shared(key, Arc::new(backend));
    }

    /// Register an already shared backend instance under `key`.
    pub fn register_shared(&self, key: impl Into<String>, backend: Arc<dyn Backend>) {
        self.put(key, move || Some(Arc::clone(&backend)));
    }

    /// Remove the factory registered under `key`.
    pub fn remove(&self, key: &str) -> Option<Arc<dyn BackendFactory>> {
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        factories.remove(key)
    }

    /// The registered keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        factories.keys().cloned().collect()
    }

    /// Add a listener notified on every subsequent registration.
    pub fn add_listener(&self, listener: impl RegistryListener) {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.push(Arc::new(listener));
    }

    /// Resolve `keys` to backend instances, in order.
    ///
    /// Unknown keys and factories yielding `None` are skipped.
    pub fn resolve(&self, keys: &[String]) -> Vec<Arc<dyn Backend>> {
        // factories run outside the lock, they may consult the registry themselves
        let factories = {
            let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
            keys.iter()
                .filter_map(|key| factories.get(key).cloned())
                .collect::<Vec<_>>()
        };
        factories
            .iter()
            .filter_map(|factory| factory.create())
            .collect()
    }

    fn notify(&self, key: &str) {
        let listeners = {
            let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            listeners.clone()
        };
        for listener in listeners {
            listener.backend_registered(key);
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.keys();
        keys.sort();
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Registry")
            .field("keys", &keys)
            .field("listeners", &listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Error;
    use crate::Level;
    use crate::LoggingContext;
    use crate::record::Record;

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Named(&'static str);

    impl Backend for Named {
        fn log(&self, _: &Record, _: &LoggingContext) -> Result<(), Error> {
            Ok(())
        }

        fn enabled(&self, _: Level, _: Option<&str>) -> Result<bool, Error> {
            Ok(true)
        }
    }

    fn names(backends: &[Arc<dyn Backend>]) -> Vec<String> {
        backends.iter().map(|b| format!("{b:?}")).collect()
    }

    #[test]
    fn last_registration_wins_and_notifies() {
        let registry = Registry::new();
        let seen = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&seen);
        registry.add_listener(move |key: &str| sink.lock().unwrap().push(key.to_string()));

        registry.register("console", Named("first"));
        registry.register("console", Named("second"));

        let backends = registry.resolve(&["console".to_string()]);
        assert_eq!(names(&backends), vec![r#"Named("second")"#]);
        assert_eq!(*seen.lock().unwrap(), vec!["console", "console"]);
    }

    #[test]
    fn resolve_skips_unknown_and_unavailable() {
        let registry = Registry::new();
        registry.register("a", Named("a"));
        registry.put("offline", || None::<Arc<dyn Backend>>);
        registry.register("b", Named("b"));

        let keys = ["a", "missing", "offline", "b", "a"].map(String::from);
        let backends = registry.resolve(&keys);
        assert_eq!(
            names(&backends),
            vec![r#"Named("a")"#, r#"Named("b")"#, r#"Named("a")"#]
        );
    }

    #[test]
    fn shared_instances_are_reused() {
        let registry = Registry::new();
        registry.register("a", Named("a"));
        let first = registry.resolve(&["a".to_string()]);
        let second = registry.resolve(&["a".to_string()]);
        assert!(Arc::ptr_eq(&first[0], &second[0]));
    }

    #[test]
    fn builtins_are_registered() {
        let mut keys = Registry::with_builtins().keys();
        keys.sort();
        assert_eq!(keys, vec![STDERR_KEY, STDOUT_KEY]);
    }

    #[test]
    fn remove_forgets_key() {
        let registry = Registry::new();
        registry.register("a", Named("a"));
        assert!(registry.remove("a").is_some());
        assert!(registry.get("a").is_none());
        assert!(registry.resolve(&["a".to_string()]).is_empty());
    }
}
