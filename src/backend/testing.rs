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
use crate::Level;
use crate::LoggingContext;
use crate::backend::Backend;
use crate::backend::LevelSwitch;
use crate::layout::Layout;
use crate::layout::TextLayout;
use crate::record::Record;

/// A backend that writes log records that can be captured by a test harness (like `cargo test`),
/// and thus the outputs are suppressed unless `--nocapture` or `--show-output` is specified.
///
/// Every level is enabled by default.
///
/// # Examples
///
/// ```
/// use logcascade::Registry;
/// use logcascade::backend::Testing;
///
/// let registry = Registry::new();
/// registry.register("testing", Testing::default());
/// ```
#[derive(Debug)]
pub struct Testing {
    layout: Box<dyn Layout>,
    switch: LevelSwitch,
}

impl Default for Testing {
    fn default() -> Self {
        Self {
            layout: Box::new(TextLayout::default()),
            switch: LevelSwitch::up_to(Level::Trace),
        }
    }
}

impl Testing {
    /// Set the layout for the [`Testing`] backend.
    ///
    /// Default to [`TextLayout`].
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }
}

impl Backend for Testing {
    fn log(&self, record: &Record, ctx: &LoggingContext) -> Result<(), Error> {
        if !self.switch.enabled(record.level(), record.category()) {
            return Ok(());
        }
        let bytes = self.layout.format(record, ctx)?;
        eprintln!("{}", String::from_utf8_lossy(&bytes));
        Ok(())
    }

    fn enabled(&self, level: Level, category: Option<&str>) -> Result<bool, Error> {
        Ok(self.switch.enabled(level, category))
    }

    fn set_enabled(&self, level: Level, category: Option<&str>, enabled: bool) -> Result<(), Error> {
        self.switch.set_enabled(level, category, enabled);
        Ok(())
    }
}
