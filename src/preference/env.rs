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

use crate::Error;
use crate::PreferenceSpec;
use crate::Preferences;

/// Comma-separated backend keys preferred when no binding matches.
pub const DEFAULT_PREFERRED_ENV: &str = "DEFAULT_PREFERRED_LOGGING";

/// Comma-separated backend keys fallen back to when no binding matches.
pub const DEFAULT_FALLBACK_ENV: &str = "DEFAULT_FALLBACK_LOGGING";

/// Whether module and function bindings are consulted at all: `true` or `false`.
pub const PREFERENCES_ENABLED_ENV: &str = "LOGGING_PREFERENCES_ENABLED";

impl Preferences {
    pub(super) fn load_env(&self) -> Result<(), Error> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(&self, var: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        // blank lists leave the current defaults in place
        let preferred = var(DEFAULT_PREFERRED_ENV)
            .map(|v| parse_keys(&v))
            .filter(|keys| !keys.is_empty());
        let fallback = var(DEFAULT_FALLBACK_ENV)
            .map(|v| parse_keys(&v))
            .filter(|keys| !keys.is_empty());
        if preferred.is_some() || fallback.is_some() {
            let defaults = self.defaults();
            let preferred = preferred.unwrap_or_else(|| defaults.preferred().to_vec());
            let fallback = fallback.unwrap_or_else(|| defaults.fallback().to_vec());
            self.set_defaults(PreferenceSpec::new(preferred, fallback)?);
        }

        if let Some(value) = var(PREFERENCES_ENABLED_ENV) {
            let enabled = parse_bool(&value).ok_or_else(|| {
                Error::new("malformed boolean")
                    .with_context("variable", PREFERENCES_ENABLED_ENV)
                    .with_context("value", value.clone())
            })?;
            self.set_bindings_enabled(enabled);
        }

        Ok(())
    }
}

fn parse_keys(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
