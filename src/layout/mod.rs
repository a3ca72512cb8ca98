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

//! Layouts for formatting log records.

use std::fmt;

use jiff::Zoned;
use jiff::tz::TimeZone;

use crate::Error;
use crate::LoggingContext;
use crate::record::Record;

#[cfg(feature = "layout-json")]
mod json;
mod text;

#[cfg(feature = "layout-json")]
pub use self::json::JsonLayout;
#[cfg(feature = "colored")]
pub use self::text::LevelColor;
pub use self::text::TextLayout;

/// A layout for formatting log records.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Format a log record, together with the entries of the logging context.
    fn format(&self, record: &Record, ctx: &LoggingContext) -> Result<Vec<u8>, Error>;
}

impl<T: Layout> From<T> for Box<dyn Layout> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

fn zoned_time(record: &Record, tz: Option<&TimeZone>) -> Result<Zoned, Error> {
    let timestamp = jiff::Timestamp::try_from(record.time())
        .map_err(|err| Error::new("failed to convert record time").with_source(err))?;
    let tz = match tz {
        Some(tz) => tz.clone(),
        None => TimeZone::system(),
    };
    Ok(timestamp.to_zoned(tz))
}

fn format_time(record: &Record, tz: Option<&TimeZone>) -> Result<String, Error> {
    let time = zoned_time(record, tz)?;
    Ok(time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z").to_string())
}
