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

//! Log record and metadata.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::time::SystemTime;

use crate::CallSite;
use crate::Level;

/// The payload of a log call.
#[derive(Clone)]
pub struct Record<'a> {
    // the observed time
    now: SystemTime,

    // the metadata
    level: Level,
    category: Option<&'a str>,
    target: &'a str,
    site: Option<CallSite>,
    file: Option<&'a str>,
    line: Option<u32>,

    // the payload
    payload: Cow<'a, str>,
    error: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Record<'a> {
    /// The observed time.
    pub fn time(&self) -> SystemTime {
        self.now
    }

    /// The verbosity level of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The category explicitly given by the caller.
    pub fn category(&self) -> Option<&'a str> {
        self.category
    }

    /// The category if given, otherwise the module the call was made from.
    ///
    /// May be empty when neither is known.
    pub fn target(&self) -> &'a str {
        self.category.unwrap_or(self.target)
    }

    /// The call site of the log call, if it was captured.
    pub fn site(&self) -> Option<CallSite> {
        self.site
    }

    /// The source file containing the log call.
    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// The line containing the log call.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The error attached to the message.
    pub fn error(&self) -> Option<&'a (dyn StdError + 'static)> {
        self.error
    }

    /// The metadata of this record, as used for enablement checks.
    pub fn metadata(&self) -> Metadata<'a> {
        Metadata {
            level: self.level,
            category: self.category,
            site: self.site,
        }
    }

    /// Create a builder initialized with the current record's values.
    pub fn to_builder(&self) -> RecordBuilder<'a> {
        RecordBuilder {
            record: self.clone(),
        }
    }

    /// Returns a new builder.
    pub fn builder() -> RecordBuilder<'a> {
        RecordBuilder::default()
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("now", &self.now)
            .field("level", &self.level)
            .field("category", &self.category)
            .field("target", &self.target)
            .field("site", &self.site)
            .field("file", &self.file)
            .field("line", &self.line)
            .field("payload", &self.payload)
            .field("error", &self.error.map(|err| err.to_string()))
            .finish()
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    record: Record<'a>,
}

impl Default for RecordBuilder<'_> {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                now: SystemTime::now(),
                level: Level::Info,
                category: None,
                target: "",
                site: None,
                file: None,
                line: None,
                payload: Cow::Borrowed(""),
                error: None,
            },
        }
    }
}

impl<'a> RecordBuilder<'a> {
    /// Set [`payload`](Record::payload).
    pub fn payload(mut self, payload: impl Into<Cow<'a, str>>) -> Self {
        self.record.payload = payload.into();
        self
    }

    /// Set [`payload`](Record::payload) from format arguments, without allocating when they
    /// hold a plain string literal.
    pub fn args(mut self, args: fmt::Arguments<'_>) -> Self {
        self.record.payload = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`category`](Record::category).
    pub fn category(mut self, category: Option<&'a str>) -> Self {
        self.record.category = category;
        self
    }

    /// Set the fallback for [`target`](Record::target) used when no category is given.
    pub fn target(mut self, target: &'a str) -> Self {
        self.record.target = target;
        self
    }

    /// Set [`site`](Record::site). Also sets the target to the site's module.
    pub fn site(mut self, site: Option<CallSite>) -> Self {
        if let Some(site) = site {
            self.record.target = site.module();
        }
        self.record.site = site;
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: Option<&'a str>) -> Self {
        self.record.file = file;
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: Option<u32>) -> Self {
        self.record.line = line;
        self
    }

    /// Set [`error`](Record::error).
    pub fn error(mut self, error: Option<&'a (dyn StdError + 'static)>) -> Self {
        self.record.error = error;
        self
    }

    /// Set [`time`](Record::time).
    pub fn time(mut self, now: SystemTime) -> Self {
        self.record.now = now;
        self
    }

    /// Invoke the builder and return a `Record`
    pub fn build(self) -> Record<'a> {
        self.record
    }
}

/// Metadata about a log call, the input of enablement checks.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct Metadata<'a> {
    level: Level,
    category: Option<&'a str>,
    site: Option<CallSite>,
}

impl<'a> Metadata<'a> {
    /// Create metadata for the given level with no category or call site.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            category: None,
            site: None,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: &'a str) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the call site.
    pub fn with_site(mut self, site: CallSite) -> Self {
        self.site = Some(site);
        self
    }

    /// Get the level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Get the category.
    pub fn category(&self) -> Option<&'a str> {
        self.category
    }

    /// Get the call site.
    pub fn site(&self) -> Option<CallSite> {
        self.site
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn target_prefers_category() {
        let site = CallSite::new("app::db", "query");
        let record = Record::builder().site(Some(site)).build();
        assert_eq!(record.target(), "app::db");
        assert_eq!(record.category(), None);

        let record = record.to_builder().category(Some("sql")).build();
        assert_eq!(record.target(), "sql");
        assert_eq!(record.metadata().category(), Some("sql"));
        assert_eq!(record.metadata().site(), Some(site));
    }

    #[test]
    fn args_borrow_literals() {
        let record = Record::builder().args(format_args!("static")).build();
        assert!(matches!(record.payload, Cow::Borrowed("static")));

        let n = 3;
        let record = Record::builder().args(format_args!("n = {n}")).build();
        assert_eq!(record.payload(), "n = 3");
    }

    #[test]
    fn error_is_attached() {
        let err = io::Error::other("disk full");
        let record = Record::builder()
            .level(Level::Error)
            .payload("write failed")
            .error(Some(&err))
            .build();
        assert_eq!(record.error().map(|e| e.to_string()).as_deref(), Some("disk full"));
    }
}
