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

//! Logging macros that capture their call site.

use std::error::Error as StdError;
use std::fmt;

use crate::CallSite;
use crate::CompositeLogger;
use crate::Level;
use crate::record::Record;

#[doc(hidden)]
#[allow(clippy::too_many_arguments)]
pub fn __private_log(
    logger: &CompositeLogger,
    level: Level,
    category: Option<&str>,
    error: Option<&(dyn StdError + 'static)>,
    site: CallSite,
    file: &'static str,
    line: u32,
    args: fmt::Arguments,
) {
    let record = Record::builder()
        .args(args)
        .level(level)
        .category(category)
        .error(error)
        .site(Some(site))
        .file(Some(file))
        .line(Some(line))
        .build();
    logger.log(&record);
}

/// Log a message at the given level, capturing the call site.
///
/// The call site (module and enclosing function) is the innermost frame preferences are resolved
/// with. Without a `logger:`, the [global logger](crate::logger) is used.
///
/// # Examples
///
/// ```
/// use std::io;
///
/// use logcascade::Level;
///
/// let err = io::Error::other("connection reset");
/// logcascade::log!(Level::Warn, "retrying in {}s", 5);
/// logcascade::log!(Level::Error, category: "billing", "charge failed");
/// logcascade::log!(Level::Error, error: &err, "upload failed");
/// logcascade::log!(logger: logcascade::logger(), Level::Info, category: "billing", error: &err, "charge {} failed", 42);
/// ```
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, $lvl:expr, category: $cat:expr, error: $err:expr, $($arg:tt)+) => {
        $crate::__private_log_impl!($logger, $lvl, Some($cat), Some($err), $($arg)+)
    };
    (logger: $logger:expr, $lvl:expr, category: $cat:expr, $($arg:tt)+) => {
        $crate::__private_log_impl!($logger, $lvl, Some($cat), None, $($arg)+)
    };
    (logger: $logger:expr, $lvl:expr, error: $err:expr, $($arg:tt)+) => {
        $crate::__private_log_impl!($logger, $lvl, None, Some($err), $($arg)+)
    };
    (logger: $logger:expr, $lvl:expr, $($arg:tt)+) => {
        $crate::__private_log_impl!($logger, $lvl, None, None, $($arg)+)
    };
    ($lvl:expr, $($arg:tt)+) => {
        $crate::log!(logger: $crate::logger(), $lvl, $($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __private_log_impl {
    ($logger:expr, $lvl:expr, $cat:expr, $err:expr, $($arg:tt)+) => {{
        let category: ::std::option::Option<&str> = $cat;
        let error: ::std::option::Option<&(dyn ::std::error::Error + 'static)> = $err;
        $crate::__private_log(
            $logger,
            $lvl,
            category,
            error,
            $crate::call_site!(),
            ::std::file!(),
            ::std::line!(),
            ::std::format_args!($($arg)+),
        )
    }};
}

/// Log a message at the error level.
///
/// ```
/// logcascade::error!("disk full");
/// logcascade::error!(category: "storage", "disk {} full", "/dev/sda1");
/// ```
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Error, $($arg)+)
    };
}

/// Log a message at the warn level.
#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Warn, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Warn, $($arg)+)
    };
}

/// Log a message at the info level.
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Info, $($arg)+)
    };
}

/// Log a message at the debug level.
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Debug, $($arg)+)
    };
}

/// Log a message at the trace level.
#[macro_export]
macro_rules! trace {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Trace, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Trace, $($arg)+)
    };
}
