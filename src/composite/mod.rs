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

//! The composite logger: one logging surface over many backends.

use std::error::Error as StdError;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::panic::Location;
use std::sync::Arc;
use std::sync::OnceLock;

use crate::Error;
use crate::Level;
use crate::LoggingContext;
use crate::PreferenceSpec;
use crate::Preferences;
use crate::Registry;
use crate::record::Metadata;
use crate::record::Record;
use crate::site;

mod builder;

pub use self::builder::Builder;
pub use self::builder::builder;

static GLOBAL_LOGGER: OnceLock<CompositeLogger> = OnceLock::new();

/// The process-wide composite logger.
///
/// Return the logger installed with [`Builder::apply`]. When none was installed, a logger over
/// [`Registry::global`] and [`Preferences::global`] is installed on first use.
pub fn logger() -> &'static CompositeLogger {
    GLOBAL_LOGGER.get_or_init(|| CompositeLogger::new(Registry::global(), Preferences::global()))
}

pub(crate) fn is_logger_set() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub(crate) fn set_logger(logger: CompositeLogger) -> Result<&'static CompositeLogger, Error> {
    match GLOBAL_LOGGER.set(logger) {
        Ok(()) => Ok(self::logger()),
        Err(_) => Err(already_installed()),
    }
}

pub(crate) fn already_installed() -> Error {
    Error::new("the global composite logger is already installed")
}

/// A logger that forwards each call to the backends preferred at its call site.
///
/// For every call, the frames of the call (the captured call site, then the active
/// [scopes](crate::scope)) are resolved to a [`PreferenceSpec`] by the [`Preferences`], and the
/// spec's keys are resolved to backends by the [`Registry`]. Backends are never cached, so
/// registrations and bindings take effect on the next call.
///
/// * Log calls go to every preferred backend in order. If any of them fails, by returning an
///   error or by panicking, every fallback backend is called as well.
/// * Enablement checks AND the answers of every preferred backend. A failure brings the fallback
///   backends into the same conjunction. When every backend fails, the answer is `true`.
/// * Enablement writes only reach the preferred backends.
///
/// No call ever fails or panics because of a backend.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logcascade::Registry;
/// use logcascade::backend::Testing;
///
/// let registry = Registry::new();
/// registry.register("stdout", Testing::default());
///
/// let logger = logcascade::builder().registry(Arc::new(registry)).build();
/// logger.info("service started");
/// assert!(logger.is_info_enabled());
/// ```
#[derive(Debug)]
pub struct CompositeLogger {
    registry: Arc<Registry>,
    preferences: Arc<Preferences>,
    context: LoggingContext,
}

impl Default for CompositeLogger {
    fn default() -> Self {
        Self::new(Registry::global(), Preferences::global())
    }
}

impl CompositeLogger {
    /// Create a composite logger over `registry` and `preferences`, with a fresh context.
    pub fn new(registry: Arc<Registry>, preferences: Arc<Preferences>) -> Self {
        Self {
            registry,
            preferences,
            context: LoggingContext::new(),
        }
    }

    /// The registry backends are resolved from.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The preferences call sites are resolved with.
    pub fn preferences(&self) -> &Arc<Preferences> {
        &self.preferences
    }

    /// The context handed to every backend call.
    pub fn context(&self) -> &LoggingContext {
        &self.context
    }

    /// Dispatch a record to the backends preferred at its call site.
    pub fn log(&self, record: &Record) {
        let frames = site::frames(record.site());
        let spec = self.preferences.resolve(&frames);

        let derived;
        let record = match site::default_category(&frames) {
            Some(target) if record.category().is_none() && record.target().is_empty() => {
                derived = record.to_builder().target(target).build();
                &derived
            }
            _ => record,
        };

        let mut failed = false;
        for backend in self.registry.resolve(spec.preferred()) {
            failed |= guarded(|| backend.log(record, &self.context)).is_err();
        }
        if failed {
            for backend in self.registry.resolve(spec.fallback()) {
                let _ = guarded(|| backend.log(record, &self.context));
            }
        }
    }

    /// Whether records matching `metadata` are enabled.
    pub fn enabled(&self, metadata: &Metadata) -> bool {
        let spec = self.resolve(metadata);
        let (level, category) = (metadata.level(), metadata.category());

        // all backends are asked; a failure must not hide a later backend's answer
        let mut enabled = true;
        let mut failed = false;
        for backend in self.registry.resolve(spec.preferred()) {
            match guarded(|| backend.enabled(level, category)) {
                Ok(answer) => enabled &= answer,
                Err(_) => failed = true,
            }
        }
        if failed {
            for backend in self.registry.resolve(spec.fallback()) {
                if let Ok(answer) = guarded(|| backend.enabled(level, category)) {
                    enabled &= answer;
                }
            }
        }
        enabled
    }

    /// Enable or disable records matching `metadata` on the preferred backends.
    pub fn set_enabled(&self, metadata: &Metadata, enabled: bool) {
        let spec = self.resolve(metadata);
        let (level, category) = (metadata.level(), metadata.category());
        for backend in self.registry.resolve(spec.preferred()) {
            let _ = guarded(|| backend.set_enabled(level, category, enabled));
        }
    }

    /// Flush every backend in the registry.
    pub fn flush(&self) {
        let keys = self.registry.keys();
        for backend in self.registry.resolve(&keys) {
            let _ = guarded(|| backend.flush());
        }
    }

    fn resolve(&self, metadata: &Metadata) -> Arc<PreferenceSpec> {
        let frames = site::frames(metadata.site());
        self.preferences.resolve(&frames)
    }

    #[track_caller]
    fn emit(
        &self,
        level: Level,
        category: Option<&str>,
        msg: &str,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        let location = Location::caller();
        let record = Record::builder()
            .level(level)
            .category(category)
            .payload(msg)
            .error(error)
            .file(Some(location.file()))
            .line(Some(location.line()))
            .build();
        self.log(&record);
    }

    fn level_enabled(&self, level: Level, category: Option<&str>) -> bool {
        let metadata = Metadata::new(level);
        match category {
            Some(category) => self.enabled(&metadata.with_category(category)),
            None => self.enabled(&metadata),
        }
    }

    fn set_level_enabled(&self, level: Level, category: Option<&str>, enabled: bool) {
        let metadata = Metadata::new(level);
        match category {
            Some(category) => self.set_enabled(&metadata.with_category(category), enabled),
            None => self.set_enabled(&metadata, enabled),
        }
    }
}

fn guarded<T>(f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Error::from_panic(payload)))
}

macro_rules! level_methods {
    ($(
        $level:expr, $name:literal =>
        $log:ident, $log_in:ident, $log_with:ident, $log_in_with:ident,
        $is_enabled:ident, $is_enabled_in:ident, $set_enabled:ident, $set_enabled_in:ident;
    )+) => {
        impl CompositeLogger {
            $(
                #[doc = concat!("Log `msg` at the `", $name, "` level.")]
                #[track_caller]
                pub fn $log(&self, msg: &str) {
                    self.emit($level, None, msg, None);
                }

                #[doc = concat!("Log `msg` at the `", $name, "` level in `category`.")]
                #[track_caller]
                pub fn $log_in(&self, category: &str, msg: &str) {
                    self.emit($level, Some(category), msg, None);
                }

                #[doc = concat!("Log `msg` and its cause `err` at the `", $name, "` level.")]
                #[track_caller]
                pub fn $log_with(&self, msg: &str, err: &(dyn StdError + 'static)) {
                    self.emit($level, None, msg, Some(err));
                }

                #[doc = concat!(
                    "Log `msg` and its cause `err` at the `", $name, "` level in `category`."
                )]
                #[track_caller]
                pub fn $log_in_with(&self, category: &str, msg: &str, err: &(dyn StdError + 'static)) {
                    self.emit($level, Some(category), msg, Some(err));
                }

                #[doc = concat!("Whether the `", $name, "` level is enabled.")]
                pub fn $is_enabled(&self) -> bool {
                    self.level_enabled($level, None)
                }

                #[doc = concat!("Whether the `", $name, "` level is enabled for `category`.")]
                pub fn $is_enabled_in(&self, category: &str) -> bool {
                    self.level_enabled($level, Some(category))
                }

                #[doc = concat!("Enable or disable the `", $name, "` level on the preferred backends.")]
                pub fn $set_enabled(&self, enabled: bool) {
                    self.set_level_enabled($level, None, enabled);
                }

                #[doc = concat!(
                    "Enable or disable the `", $name, "` level for `category` on the preferred backends."
                )]
                pub fn $set_enabled_in(&self, category: &str, enabled: bool) {
                    self.set_level_enabled($level, Some(category), enabled);
                }
            )+
        }
    };
}

level_methods! {
    Level::Error, "error" =>
        error, error_in, error_with, error_in_with,
        is_error_enabled, is_error_enabled_in, set_error_enabled, set_error_enabled_in;
    Level::Warn, "warn" =>
        warn, warn_in, warn_with, warn_in_with,
        is_warn_enabled, is_warn_enabled_in, set_warn_enabled, set_warn_enabled_in;
    Level::Info, "info" =>
        info, info_in, info_with, info_in_with,
        is_info_enabled, is_info_enabled_in, set_info_enabled, set_info_enabled_in;
    Level::Debug, "debug" =>
        debug, debug_in, debug_with, debug_in_with,
        is_debug_enabled, is_debug_enabled_in, set_debug_enabled, set_debug_enabled_in;
    Level::Trace, "trace" =>
        trace, trace_in, trace_with, trace_in_with,
        is_trace_enabled, is_trace_enabled_in, set_trace_enabled, set_trace_enabled_in;
}
