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

use crate::CallSite;
use crate::CompositeLogger;
use crate::record::Metadata;
use crate::record::Record;

/// Set up the log crate global logger.
///
/// This function calls [`log::set_logger`] with a forwarder to the global composite logger, so all
/// logs from the log crate are forwarded to [`logger`](crate::logger). The global logger is looked
/// up per record, so this function may run before [`Builder::apply`](crate::Builder::apply). The log crate's target becomes the
/// record's category, and its module path becomes the call site preferences are resolved with.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// if logcascade::bridge::try_setup_log_crate().is_ok() {
///     log::info!("hello from the log crate");
/// }
/// ```
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    log::set_logger(&GlobalLogger)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// logcascade::bridge::setup_log_crate();
/// ```
pub fn setup_log_crate() {
    try_setup_log_crate().expect(
        "logcascade::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}

#[derive(Debug)]
struct GlobalLogger;

impl log::Log for GlobalLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        log::Log::enabled(crate::logger(), metadata)
    }

    fn log(&self, record: &log::Record) {
        log::Log::log(crate::logger(), record)
    }

    fn flush(&self) {
        log::Log::flush(crate::logger())
    }
}

impl log::Log for CompositeLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        // no module path here, only the active scopes and the defaults decide
        let metadata = Metadata::new(metadata.level().into()).with_category(metadata.target());
        CompositeLogger::enabled(self, &metadata)
    }

    fn log(&self, record: &log::Record) {
        let site = record
            .module_path_static()
            .map(|module| CallSite::new(module, ""));

        let record = Record::builder()
            .args(*record.args())
            .level(record.level().into())
            .category(Some(record.target()))
            .site(site)
            .file(record.file())
            .line(record.line())
            .build();

        CompositeLogger::log(self, &record);
    }

    fn flush(&self) {
        CompositeLogger::flush(self);
    }
}
