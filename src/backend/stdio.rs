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

use std::io::Write;

use crate::Error;
use crate::Level;
use crate::LoggingContext;
use crate::backend::Backend;
use crate::backend::LevelSwitch;
use crate::layout::Layout;
use crate::layout::TextLayout;
use crate::record::Record;

fn write_line<W: Write>(
    mut writer: W,
    layout: &dyn Layout,
    record: &Record,
    ctx: &LoggingContext,
) -> Result<(), Error> {
    let mut bytes = layout.format(record, ctx)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).map_err(Error::from_io_error)
}

/// A backend that prints log records to stdout.
///
/// By default, `error`, `warn` and `info` are enabled.
///
/// # Examples
///
/// ```
/// use logcascade::Level;
/// use logcascade::backend::LevelSwitch;
/// use logcascade::backend::Stdout;
///
/// let stdout = Stdout::default().with_switch(LevelSwitch::up_to(Level::Debug));
/// ```
#[derive(Debug)]
pub struct Stdout {
    layout: Box<dyn Layout>,
    switch: LevelSwitch,
}

impl Default for Stdout {
    fn default() -> Self {
        Self {
            layout: Box::new(TextLayout::default()),
            switch: LevelSwitch::new(),
        }
    }
}

impl Stdout {
    /// Set the layout. Default to [`TextLayout`].
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the enablement switch.
    pub fn with_switch(mut self, switch: LevelSwitch) -> Self {
        self.switch = switch;
        self
    }
}

impl Backend for Stdout {
    fn log(&self, record: &Record, ctx: &LoggingContext) -> Result<(), Error> {
        if !self.switch.enabled(record.level(), record.category()) {
            return Ok(());
        }
        write_line(std::io::stdout().lock(), self.layout.as_ref(), record, ctx)
    }

    fn enabled(&self, level: Level, category: Option<&str>) -> Result<bool, Error> {
        Ok(self.switch.enabled(level, category))
    }

    fn set_enabled(&self, level: Level, category: Option<&str>, enabled: bool) -> Result<(), Error> {
        self.switch.set_enabled(level, category, enabled);
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::from_io_error)
    }
}

/// A backend that prints log records to stderr.
///
/// By default, only `error` is enabled: stderr is the default fallback, and a failing preferred
/// backend should not flood it with informational records.
#[derive(Debug)]
pub struct Stderr {
    layout: Box<dyn Layout>,
    switch: LevelSwitch,
}

impl Default for Stderr {
    fn default() -> Self {
        Self {
            layout: Box::new(TextLayout::default()),
            switch: LevelSwitch::up_to(Level::Error),
        }
    }
}

impl Stderr {
    /// Set the layout. Default to [`TextLayout`].
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the enablement switch.
    pub fn with_switch(mut self, switch: LevelSwitch) -> Self {
        self.switch = switch;
        self
    }
}

impl Backend for Stderr {
    fn log(&self, record: &Record, ctx: &LoggingContext) -> Result<(), Error> {
        if !self.switch.enabled(record.level(), record.category()) {
            return Ok(());
        }
        write_line(std::io::stderr().lock(), self.layout.as_ref(), record, ctx)
    }

    fn enabled(&self, level: Level, category: Option<&str>) -> Result<bool, Error> {
        Ok(self.switch.enabled(level, category))
    }

    fn set_enabled(&self, level: Level, category: Option<&str>, enabled: bool) -> Result<(), Error> {
        self.switch.set_enabled(level, category, enabled);
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stderr().flush().map_err(Error::from_io_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_defaults_to_errors_only() {
        let stderr = Stderr::default();
        assert!(stderr.enabled(Level::Error, None).unwrap());
        assert!(!stderr.enabled(Level::Warn, None).unwrap());

        stderr.set_enabled(Level::Warn, None, true).unwrap();
        assert!(stderr.enabled(Level::Warn, None).unwrap());
    }

    #[test]
    fn disabled_records_are_dropped_without_error() {
        let stdout = Stdout::default();
        let ctx = LoggingContext::new();
        let record = Record::builder()
            .level(Level::Trace)
            .payload("dropped")
            .build();
        assert!(stdout.log(&record, &ctx).is_ok());
    }
}
