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

//! Logcascade is a pluggable logging facade that routes each log call to the backends preferred at
//! its call site, and falls back to other backends when a preferred one fails.
//!
//! # Overview
//!
//! Backends are registered under string keys in a [`Registry`]. [`Preferences`] bind modules and
//! functions to a [`PreferenceSpec`]: the keys to try first, and the keys to fall back to. The
//! [`CompositeLogger`] resolves both on every call, so registrations and bindings apply at once.
//! Records from the `log` crate are routed through the same logger.
//!
//! # Examples
//!
//! Simple setup with the built-in `stdout` and `stderr` backends:
//!
//! ```
//! logcascade::builder().apply();
//!
//! logcascade::info!("This is an info message.");
//! log::info!("This one comes through the log crate.");
//! ```
//!
//! Prefer a custom backend in one module, falling back to stderr when it fails:
//!
//! ```
//! use std::sync::Arc;
//!
//! use logcascade::PreferenceSpec;
//! use logcascade::Preferences;
//! use logcascade::Registry;
//! use logcascade::backend::Testing;
//!
//! let registry = Registry::with_builtins();
//! registry.register("remote", Testing::default());
//!
//! let preferences = Preferences::new();
//! preferences.bind_module(
//!     module_path!(),
//!     PreferenceSpec::new(["remote"], ["stderr"]).unwrap(),
//! );
//!
//! let logger = logcascade::builder()
//!     .registry(Arc::new(registry))
//!     .preferences(Arc::new(preferences))
//!     .build();
//!
//! logcascade::warn!(logger: &logger, category: "billing", "invoice {} overdue", 42);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod bridge;
pub mod layout;
pub mod preference;
pub mod record;
pub mod site;

mod composite;
mod context;
mod error;
mod level;
mod macros;
mod registry;

pub use self::backend::Backend;
pub use self::composite::Builder;
pub use self::composite::CompositeLogger;
pub use self::composite::builder;
pub use self::composite::logger;
pub use self::context::LoggingContext;
pub use self::error::Error;
pub use self::layout::Layout;
pub use self::level::Level;
#[doc(hidden)]
pub use self::macros::__private_log;
pub use self::preference::PreferenceSpec;
pub use self::preference::Preferences;
pub use self::record::Metadata;
pub use self::record::Record;
pub use self::registry::BackendFactory;
pub use self::registry::Registry;
pub use self::registry::RegistryListener;
pub use self::site::CallSite;

// module path of this crate, frames under it are never reported as a user category
pub(crate) const CRATE_MODULE: &str = module_path!();
