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

use jiff::tz::TimeZone;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::Error;
use crate::LoggingContext;
use crate::layout::Layout;
use crate::layout::format_time;
use crate::record::Record;

/// A JSON layout for formatting log records.
///
/// Output format:
///
/// ```json
/// {"timestamp":"2024-08-11T22:44:57.172051+08:00","level":"ERROR","target":"billing","category":"billing","message":"charge failed","error":"card declined","context":{"request_id":"42"}}
/// {"timestamp":"2024-08-11T22:44:57.172187+08:00","level":"INFO","target":"app::http","file":"src/http.rs","line":52,"message":"request done"}
/// ```
///
/// # Examples
///
/// ```
/// use logcascade::layout::JsonLayout;
///
/// let json_layout = JsonLayout::default();
/// ```
#[derive(Default, Debug, Clone)]
pub struct JsonLayout {
    tz: Option<TimeZone>,
}

impl JsonLayout {
    /// Set the timezone of timestamps. Defaults to the system timezone.
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use logcascade::layout::JsonLayout;
    ///
    /// let json_layout = JsonLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct RecordLine<'a> {
    timestamp: String,
    level: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    context: Map<String, Value>,
}

impl Layout for JsonLayout {
    fn format(&self, record: &Record, ctx: &LoggingContext) -> Result<Vec<u8>, Error> {
        let context = ctx
            .entries()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();

        let record_line = RecordLine {
            timestamp: format_time(record, self.tz.as_ref())?,
            level: record.level().as_str(),
            target: record.target(),
            category: record.category(),
            file: record.file(),
            line: record.line(),
            message: record.payload(),
            error: record.error().map(|err| err.to_string()),
            context,
        };

        serde_json::to_vec(&record_line)
            .map_err(|err| Error::new("failed to serialize record").with_source(err))
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;
    use std::time::SystemTime;

    use super::*;
    use crate::Level;

    #[test]
    fn serializes_error_and_context() {
        let layout = JsonLayout::default().timezone(TimeZone::UTC);
        let ctx = LoggingContext::new();
        ctx.insert("request_id", "42");

        let err = io::Error::other("card declined");
        let record = Record::builder()
            .time(SystemTime::UNIX_EPOCH + Duration::from_secs(1_723_387_497))
            .level(Level::Error)
            .category(Some("billing"))
            .payload("charge failed")
            .error(Some(&err))
            .build();

        let line = String::from_utf8(layout.format(&record, &ctx).unwrap()).unwrap();
        insta::assert_snapshot!(line, @r#"{"timestamp":"2024-08-11T14:44:57.000000+00:00","level":"ERROR","target":"billing","category":"billing","message":"charge failed","error":"card declined","context":{"request_id":"42"}}"#);
    }
}
