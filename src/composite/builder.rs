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

use std::sync::Arc;

use crate::CompositeLogger;
use crate::Error;
use crate::Preferences;
use crate::Registry;
use crate::bridge;
use crate::composite::already_installed;
use crate::composite::is_logger_set;
use crate::composite::set_logger;

/// Create a new [`Builder`] over the global registry and preferences.
///
/// # Examples
///
/// ```
/// let logger = logcascade::builder().build();
/// logger.info("hello world!");
/// ```
pub fn builder() -> Builder {
    Builder {
        registry: None,
        preferences: None,
    }
}

/// A builder for configuring a [`CompositeLogger`] and setting up the global logger.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logcascade::PreferenceSpec;
/// use logcascade::Preferences;
/// use logcascade::Registry;
///
/// let preferences = Preferences::new();
/// preferences.set_defaults(PreferenceSpec::new(["stderr"], ["stdout"]).unwrap());
///
/// let logger = logcascade::builder()
///     .registry(Arc::new(Registry::with_builtins()))
///     .preferences(Arc::new(preferences))
///     .build();
/// ```
#[must_use = "call `apply` to set the global logger or `build` to construct a logger instance"]
#[derive(Debug)]
pub struct Builder {
    registry: Option<Arc<Registry>>,
    preferences: Option<Arc<Preferences>>,
}

impl Builder {
    /// Resolve backends from `registry`.
    ///
    /// Default to [`Registry::global`].
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Resolve call sites with `preferences`.
    ///
    /// Default to [`Preferences::global`].
    pub fn preferences(mut self, preferences: Arc<Preferences>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Build the [`CompositeLogger`].
    pub fn build(self) -> CompositeLogger {
        let registry = self.registry.unwrap_or_else(Registry::global);
        let preferences = self.preferences.unwrap_or_else(Preferences::global);
        CompositeLogger::new(registry, preferences)
    }

    /// Set up the global logger, and route the `log` crate's records through it.
    ///
    /// This should be called early in the execution of a Rust program. A log call made through
    /// [`logger`](crate::logger) before initialization installs a default logger, after which
    /// this call fails.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set, or if the `log` crate already has
    /// a logger. Nothing is installed in either case.
    ///
    /// # Examples
    ///
    /// ```
    /// if let Err(err) = logcascade::builder().try_apply() {
    ///     eprintln!("failed to set logger: {err}");
    /// }
    /// ```
    pub fn try_apply(self) -> Result<&'static CompositeLogger, Error> {
        if is_logger_set() {
            return Err(already_installed());
        }
        bridge::try_setup_log_crate().map_err(|err| {
            Error::new("failed to route the log crate through the composite logger")
                .with_source(err)
        })?;
        set_logger(self.build())
    }

    /// Set up the global logger, and route the `log` crate's records through it.
    ///
    /// # Panics
    ///
    /// Panic if the global logger has already been set, or if the `log` crate already has a
    /// logger.
    ///
    /// # Examples
    ///
    /// ```
    /// logcascade::builder().apply();
    /// log::info!("routed through the composite logger");
    /// ```
    pub fn apply(self) -> &'static CompositeLogger {
        self.try_apply()
            .expect("Builder::apply must be called before the global logger initialized")
    }
}
