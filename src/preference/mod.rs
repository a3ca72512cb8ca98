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

//! Preference resolution: which backends a call site prefers, and which it falls back to.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::CallSite;
use crate::Error;
use crate::backend::STDERR_KEY;
use crate::backend::STDOUT_KEY;

mod env;

pub use self::env::DEFAULT_FALLBACK_ENV;
pub use self::env::DEFAULT_PREFERRED_ENV;
pub use self::env::PREFERENCES_ENABLED_ENV;

/// An ordered pair of backend key lists: preferred keys first, fallback keys second.
///
/// Both lists are non-empty. Keys may appear in both; order is dispatch priority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceSpec {
    preferred: Vec<String>,
    fallback: Vec<String>,
}

impl PreferenceSpec {
    /// Create a preference spec.
    ///
    /// # Errors
    ///
    /// Return an error if either list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use logcascade::PreferenceSpec;
    ///
    /// let spec = PreferenceSpec::new(["remote"], ["stdout"]).unwrap();
    /// assert_eq!(spec.preferred(), ["remote"]);
    ///
    /// assert!(PreferenceSpec::new(["remote"], Vec::<String>::new()).is_err());
    /// ```
    pub fn new<P, F>(preferred: P, fallback: F) -> Result<Self, Error>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let preferred = preferred.into_iter().map(Into::into).collect::<Vec<_>>();
        let fallback = fallback.into_iter().map(Into::into).collect::<Vec<_>>();
        if preferred.is_empty() {
            return Err(Error::new("preferred backend keys must not be empty"));
        }
        if fallback.is_empty() {
            return Err(Error::new("fallback backend keys must not be empty"));
        }
        Ok(Self {
            preferred,
            fallback,
        })
    }

    /// The preferred backend keys, tried first.
    pub fn preferred(&self) -> &[String] {
        &self.preferred
    }

    /// The fallback backend keys, tried only when a preferred backend fails.
    pub fn fallback(&self) -> &[String] {
        &self.fallback
    }
}

impl Default for PreferenceSpec {
    /// Prefer [`STDOUT_KEY`], fall back to [`STDERR_KEY`].
    fn default() -> Self {
        Self {
            preferred: vec![STDOUT_KEY.to_string()],
            fallback: vec![STDERR_KEY.to_string()],
        }
    }
}

#[derive(Debug, Default)]
struct ModuleBindings {
    module: Option<Arc<PreferenceSpec>>,
    functions: HashMap<String, Arc<PreferenceSpec>>,
}

impl ModuleBindings {
    fn is_empty(&self) -> bool {
        self.module.is_none() && self.functions.is_empty()
    }
}

/// Maps call sites to [`PreferenceSpec`]s.
///
/// Preferences are bound to a whole module or to one function in a module. Resolution walks the
/// frames innermost first; at each frame a function binding wins over a module binding, and the
/// first frame with any binding decides the whole spec. Without any binding, the defaults apply.
///
/// # Examples
///
/// ```
/// use logcascade::CallSite;
/// use logcascade::PreferenceSpec;
/// use logcascade::Preferences;
///
/// let prefs = Preferences::new();
/// prefs.bind_module("app::billing", PreferenceSpec::new(["remote"], ["stdout"]).unwrap());
///
/// let frames = [CallSite::new("app::billing", "charge")];
/// assert_eq!(prefs.preferred_for(&frames), ["remote"]);
///
/// let frames = [CallSite::new("app::shipping", "ship")];
/// assert_eq!(prefs.preferred_for(&frames), ["stdout"]);
/// ```
#[derive(Debug)]
pub struct Preferences {
    bindings: RwLock<HashMap<String, ModuleBindings>>,
    defaults: RwLock<Arc<PreferenceSpec>>,
    bindings_enabled: AtomicBool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_PREFERENCES: LazyLock<Arc<Preferences>> = LazyLock::new(|| {
    let prefs = Preferences::new();
    if let Err(err) = prefs.load_env() {
        eprintln!("ignoring malformed logging preferences in environment: {err}");
    }
    Arc::new(prefs)
});

impl Preferences {
    /// Create preferences with no bindings and the built-in defaults.
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            defaults: RwLock::new(Arc::new(PreferenceSpec::default())),
            bindings_enabled: AtomicBool::new(true),
        }
    }

    /// Create preferences configured from the environment.
    ///
    /// See [`DEFAULT_PREFERRED_ENV`], [`DEFAULT_FALLBACK_ENV`] and [`PREFERENCES_ENABLED_ENV`].
    ///
    /// # Errors
    ///
    /// Return an error if a variable holds a malformed value.
    pub fn from_env() -> Result<Self, Error> {
        let prefs = Self::new();
        prefs.load_env()?;
        Ok(prefs)
    }

    /// The process-wide preferences, configured from the environment on first use.
    ///
    /// Malformed environment values are reported to stderr and ignored.
    pub fn global() -> Arc<Preferences> {
        Arc::clone(&GLOBAL_PREFERENCES)
    }

    /// Bind every function of `module` to `spec`, replacing any previous module binding.
    pub fn bind_module(&self, module: impl Into<String>, spec: PreferenceSpec) {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        bindings.entry(module.into()).or_default().module = Some(Arc::new(spec));
    }

    /// Bind `function` of `module` to `spec`, replacing any previous function binding.
    ///
    /// `function` is named the way [`call_site!`](crate::call_site) captures it: bare for free
    /// functions, `Type::method` for methods.
    pub fn bind_function(
        &self,
        module: impl Into<String>,
        function: impl Into<String>,
        spec: PreferenceSpec,
    ) {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        bindings
            .entry(module.into())
            .or_default()
            .functions
            .insert(function.into(), Arc::new(spec));
    }

    /// Bind the function of `site` to `spec`.
    pub fn bind_site(&self, site: CallSite, spec: PreferenceSpec) {
        self.bind_function(site.module(), site.function(), spec);
    }

    /// Remove the module binding of `module`, keeping its function bindings.
    pub fn unbind_module(&self, module: &str) -> Option<PreferenceSpec> {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        let entry = bindings.get_mut(module)?;
        let removed = entry.module.take();
        if entry.is_empty() {
            bindings.remove(module);
        }
        removed.map(Arc::unwrap_or_clone)
    }

    /// Remove the binding of `function` in `module`.
    pub fn unbind_function(&self, module: &str, function: &str) -> Option<PreferenceSpec> {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        let entry = bindings.get_mut(module)?;
        let removed = entry.functions.remove(function);
        if entry.is_empty() {
            bindings.remove(module);
        }
        removed.map(Arc::unwrap_or_clone)
    }

    /// Remove every binding.
    pub fn clear_bindings(&self) {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        bindings.clear();
    }

    /// Replace the defaults used when no binding matches.
    pub fn set_defaults(&self, spec: PreferenceSpec) {
        let mut defaults = self.defaults.write().unwrap_or_else(PoisonError::into_inner);
        *defaults = Arc::new(spec);
    }

    /// The defaults used when no binding matches.
    pub fn defaults(&self) -> Arc<PreferenceSpec> {
        let defaults = self.defaults.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&defaults)
    }

    /// Enable or disable bindings. While disabled, every resolution yields the defaults.
    pub fn set_bindings_enabled(&self, enabled: bool) {
        self.bindings_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Whether bindings are consulted.
    pub fn bindings_enabled(&self) -> bool {
        self.bindings_enabled.load(Ordering::Relaxed)
    }

    /// Resolve the spec for `frames`, ordered innermost first.
    ///
    /// Never fails: without a matching binding, the defaults are returned.
    pub fn resolve(&self, frames: &[CallSite]) -> Arc<PreferenceSpec> {
        self.find(frames).unwrap_or_else(|| self.defaults())
    }

    /// The preferred keys for `frames`.
    pub fn preferred_for(&self, frames: &[CallSite]) -> Vec<String> {
        self.resolve(frames).preferred().to_vec()
    }

    /// The fallback keys for `frames`.
    pub fn fallback_for(&self, frames: &[CallSite]) -> Vec<String> {
        self.resolve(frames).fallback().to_vec()
    }

    fn find(&self, frames: &[CallSite]) -> Option<Arc<PreferenceSpec>> {
        if !self.bindings_enabled() {
            return None;
        }

        let bindings = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        if bindings.is_empty() {
            return None;
        }

        frames.iter().find_map(|frame| {
            let module = bindings.get(frame.module())?;
            module
                .functions
                .get(frame.function())
                .or(module.module.as_ref())
                .cloned()
        })
    }
}
