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

use std::fmt::Write;

#[cfg(feature = "colored")]
use colored::Color;
#[cfg(feature = "colored")]
use colored::ColoredString;
#[cfg(feature = "colored")]
use colored::Colorize;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Level;
use crate::LoggingContext;
use crate::layout::Layout;
use crate::layout::format_time;
use crate::record::Record;

/// A layout that formats log record as text.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR billing: charge failed error=card declined request_id=42
/// 2024-08-11T22:44:57.172219+08:00  WARN billing: retrying
/// 2024-08-11T22:44:57.172276+08:00  INFO app::http: served.rs:52 request done
/// ```
///
/// The target is the record's category, or the module of the call site when no category was
/// given. Entries of the logging context are appended as `key=value` pairs.
///
/// With the `colored` feature, log levels are colored unless [`no_color`](TextLayout::no_color)
/// is set.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use logcascade::layout::TextLayout;
///
/// let layout = TextLayout::default().timezone(TimeZone::UTC).no_color();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    #[cfg(feature = "colored")]
    colors: LevelColor,
    #[cfg_attr(not(feature = "colored"), allow(dead_code))]
    no_color: bool,
    tz: Option<TimeZone>,
}

/// Customize the color of each log level.
#[cfg(feature = "colored")]
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color for error level logs.
    pub error: Color,
    /// Color for warn level logs.
    pub warn: Color,
    /// Color for info level logs.
    pub info: Color,
    /// Color for debug level logs.
    pub debug: Color,
    /// Color for trace level logs.
    pub trace: Color,
}

#[cfg(feature = "colored")]
impl Default for LevelColor {
    fn default() -> Self {
        Self {
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Blue,
            trace: Color::Magenta,
        }
    }
}

#[cfg(feature = "colored")]
impl LevelColor {
    fn colorize(&self, level: Level) -> ColoredString {
        let color = match level {
            Level::Error => self.error,
            Level::Warn => self.warn,
            Level::Info => self.info,
            Level::Debug => self.debug,
            Level::Trace => self.trace,
        };
        ColoredString::from(level.as_str()).color(color)
    }
}

impl TextLayout {
    /// Customize the color of each log level.
    #[cfg(feature = "colored")]
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Disable colored output.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Set the timezone of timestamps. Defaults to the system timezone.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    fn write_level(&self, text: &mut String, level: Level) {
        #[cfg(feature = "colored")]
        if !self.no_color {
            let level = self.colors.colorize(level);
            let _ = write!(text, "{level:>5}");
            return;
        }

        let _ = write!(text, "{level:>5}");
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &Record, ctx: &LoggingContext) -> Result<Vec<u8>, Error> {
        let mut text = format_time(record, self.tz.as_ref())?;
        text.push(' ');
        self.write_level(&mut text, record.level());

        let target = record.target();
        if !target.is_empty() {
            write!(&mut text, " {target}:").map_err(Error::from_fmt_error)?;
        }

        if let Some(file) = record.file() {
            let file = std::path::Path::new(file)
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default();
            let line = record.line().unwrap_or_default();
            write!(&mut text, " {file}:{line}").map_err(Error::from_fmt_error)?;
        }

        write!(&mut text, " {}", record.payload()).map_err(Error::from_fmt_error)?;

        if let Some(err) = record.error() {
            write!(&mut text, " error={err}").map_err(Error::from_fmt_error)?;
        }

        for (key, value) in ctx.entries() {
            write!(&mut text, " {key}={value}").map_err(Error::from_fmt_error)?;
        }

        Ok(text.into_bytes())
    }
}
