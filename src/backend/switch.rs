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

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::Level;

/// Per-level and per-category enablement flags of a backend.
///
/// A categorized check is answered, in order, by:
///
/// 1. an explicit override set with [`set_enabled`](LevelSwitch::set_enabled) for that category,
/// 2. the `env_logger`-style directives the switch was created from, if any,
/// 3. the level-wide flag.
///
/// Uncategorized checks only consult the level-wide flag.
///
/// # Examples
///
/// ```
/// use logcascade::Level;
/// use logcascade::backend::LevelSwitch;
///
/// let switch = LevelSwitch::from_directives("warn,billing=debug");
/// assert!(!switch.enabled(Level::Info, None));
/// assert!(switch.enabled(Level::Debug, Some("billing")));
///
/// switch.set_enabled(Level::Debug, Some("billing"), false);
/// assert!(!switch.enabled(Level::Debug, Some("billing")));
/// ```
#[derive(Debug)]
pub struct LevelSwitch {
    levels: [AtomicBool; 5],
    categories: RwLock<HashMap<String, [Option<bool>; 5]>>,
    directives: Option<env_filter::Filter>,
}

impl Default for LevelSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelSwitch {
    /// Create a switch with `error`, `warn` and `info` enabled.
    pub fn new() -> Self {
        Self::up_to(Level::Info)
    }

    /// Create a switch with every level up to and including `max` enabled.
    pub fn up_to(max: Level) -> Self {
        Self {
            levels: Level::ALL.map(|level| AtomicBool::new(level <= max)),
            categories: RwLock::new(HashMap::new()),
            directives: None,
        }
    }

    /// Create a switch from `env_logger`-style directives, such as `"info,billing=trace"`.
    ///
    /// The unnamed directive sets the level-wide flags; named directives match categories by
    /// prefix. Malformed directives are reported to stderr and ignored.
    pub fn from_directives(directives: &str) -> Self {
        let filter = env_filter::Builder::new().parse(directives).build();
        let levels = Level::ALL.map(|level| AtomicBool::new(directive_enabled(&filter, level, "")));
        Self {
            levels,
            categories: RwLock::new(HashMap::new()),
            directives: Some(filter),
        }
    }

    /// Create a switch from the directives in the environment variable `name`, or from
    /// `default` if the variable is not set.
    ///
    /// # Examples
    ///
    /// ```
    /// use logcascade::Level;
    /// use logcascade::backend::LevelSwitch;
    ///
    /// let switch = LevelSwitch::from_env_or("MY_APP_STDOUT_LOG", "debug");
    /// # if std::env::var("MY_APP_STDOUT_LOG").is_err() {
    /// assert!(switch.enabled(Level::Debug, None));
    /// # }
    /// ```
    pub fn from_env_or<'a, 'b, E, V>(name: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'b, str>>,
    {
        let name = name.into();
        match std::env::var(&*name) {
            Ok(directives) => Self::from_directives(&directives),
            Err(_) => Self::from_directives(&default.into()),
        }
    }

    /// Whether `level` is enabled, optionally for `category`.
    pub fn enabled(&self, level: Level, category: Option<&str>) -> bool {
        if let Some(category) = category {
            let categories = self.categories.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(flag) = categories.get(category).and_then(|flags| flags[level.index()]) {
                return flag;
            }
            if let Some(filter) = &self.directives {
                return directive_enabled(filter, level, category);
            }
        }

        self.levels[level.index()].load(Ordering::Relaxed)
    }

    /// Enable or disable `level`, for `category` only if given.
    pub fn set_enabled(&self, level: Level, category: Option<&str>, enabled: bool) {
        match category {
            Some(category) => {
                let mut categories = self
                    .categories
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                categories.entry(category.to_string()).or_default()[level.index()] = Some(enabled);
            }
            None => self.levels[level.index()].store(enabled, Ordering::Relaxed),
        }
    }
}

fn directive_enabled(filter: &env_filter::Filter, level: Level, target: &str) -> bool {
    let metadata = log::Metadata::builder()
        .level(level.into())
        .target(target)
        .build();
    filter.enabled(&metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_info_and_above() {
        let switch = LevelSwitch::new();
        assert!(switch.enabled(Level::Error, None));
        assert!(switch.enabled(Level::Info, None));
        assert!(!switch.enabled(Level::Debug, None));
        assert!(!switch.enabled(Level::Trace, Some("any")));
    }

    #[test]
    fn category_override_beats_level_flag() {
        let switch = LevelSwitch::new();
        switch.set_enabled(Level::Trace, Some("db"), true);
        switch.set_enabled(Level::Info, Some("noisy"), false);

        assert!(switch.enabled(Level::Trace, Some("db")));
        assert!(!switch.enabled(Level::Trace, None));
        assert!(!switch.enabled(Level::Info, Some("noisy")));
        assert!(switch.enabled(Level::Info, Some("quiet")));
    }

    #[test]
    fn level_flag_applies_to_uncategorized_checks() {
        let switch = LevelSwitch::up_to(Level::Error);
        assert!(!switch.enabled(Level::Warn, None));
        switch.set_enabled(Level::Warn, None, true);
        assert!(switch.enabled(Level::Warn, None));
        assert!(switch.enabled(Level::Warn, Some("any")));
    }

    #[test]
    fn directives_decide_categories() {
        let switch = LevelSwitch::from_directives("warn,billing=trace");
        assert!(switch.enabled(Level::Warn, None));
        assert!(!switch.enabled(Level::Info, None));
        assert!(switch.enabled(Level::Trace, Some("billing")));
        assert!(switch.enabled(Level::Trace, Some("billing::invoices")));
        assert!(!switch.enabled(Level::Info, Some("shipping")));
    }
}
