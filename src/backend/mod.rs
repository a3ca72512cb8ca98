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

//! Backends that receive log calls from the composite logger.

use std::fmt;

use crate::Error;
use crate::Level;
use crate::LoggingContext;
use crate::record::Record;

mod stdio;
mod switch;
mod testing;

pub use self::stdio::Stderr;
pub use self::stdio::Stdout;
pub use self::switch::LevelSwitch;
pub use self::testing::Testing;

/// Registry key of the built-in [`Stdout`] backend, the default preferred backend.
pub const STDOUT_KEY: &str = "stdout";

/// Registry key of the built-in [`Stderr`] backend, the default fallback backend.
pub const STDERR_KEY: &str = "stderr";

/// A concrete logging sink.
///
/// A backend signals a failed call by returning `Err`. The composite logger treats a panic the
/// same way. Either one makes it try the fallback backends for that call.
pub trait Backend: fmt::Debug + Send + Sync + 'static {
    /// Write a log record.
    ///
    /// Backends are expected to drop records whose level and category they have disabled. The
    /// logging context may be read or written, for example to report the status of a remote
    /// sink back to the application.
    fn log(&self, record: &Record, ctx: &LoggingContext) -> Result<(), Error>;

    /// Whether records at `level`, optionally for `category`, would be written.
    fn enabled(&self, level: Level, category: Option<&str>) -> Result<bool, Error>;

    /// Enable or disable `level`, optionally only for `category`.
    ///
    /// Default to a no-op: backends decide whether the flag is honored.
    fn set_enabled(&self, level: Level, category: Option<&str>, enabled: bool) -> Result<(), Error> {
        let _ = (level, category, enabled);
        Ok(())
    }

    /// Flush any buffered records.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}
