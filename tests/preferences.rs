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

mod common;

use std::sync::Arc;

use common::Journal;
use common::Probe;
use common::entries;
use common::journal;
use logcascade::Backend;
use logcascade::CallSite;
use logcascade::CompositeLogger;
use logcascade::Error;
use logcascade::Level;
use logcascade::LoggingContext;
use logcascade::PreferenceSpec;
use logcascade::Preferences;
use logcascade::Record;
use logcascade::Registry;

/// Journals `"<name> <target>: <payload>"` for every record.
#[derive(Debug)]
struct Capture {
    name: &'static str,
    journal: Journal,
}

impl Backend for Capture {
    fn log(&self, record: &Record, _: &LoggingContext) -> Result<(), Error> {
        let line = format!("{} {}: {}", self.name, record.target(), record.payload());
        self.journal.lock().unwrap().push(line);
        Ok(())
    }

    fn enabled(&self, _: Level, _: Option<&str>) -> Result<bool, Error> {
        Ok(true)
    }
}

fn spec(preferred: &str, fallback: &str) -> PreferenceSpec {
    PreferenceSpec::new([preferred], [fallback]).unwrap()
}

fn setup(journal: &Journal) -> (CompositeLogger, Arc<Preferences>) {
    let registry = Registry::new();
    for name in ["stdout", "stderr", "remote", "journald"] {
        registry.register(
            name,
            Capture {
                name,
                journal: Arc::clone(journal),
            },
        );
    }
    let preferences = Arc::new(Preferences::new());
    let logger = logcascade::builder()
        .registry(Arc::new(registry))
        .preferences(Arc::clone(&preferences))
        .build();
    (logger, preferences)
}

fn charge(logger: &CompositeLogger) {
    logcascade::error!(logger: logger, "card {} declined", 4242);
}

fn refund(logger: &CompositeLogger) {
    logcascade::info!(logger: logger, category: "refunds", "refund issued");
}

struct Billing;

impl Billing {
    fn run(&self, logger: &CompositeLogger) {
        logcascade::warn!(logger: logger, "invoice batch started");
    }
}

struct Shipping;

impl Shipping {
    fn run(&self, logger: &CompositeLogger) {
        logcascade::warn!(logger: logger, "label batch started");
    }
}

fn run(logger: &CompositeLogger) {
    logcascade::warn!(logger: logger, "nightly run started");
}

#[test]
fn function_binding_wins_over_module_binding() {
    let journal = journal();
    let (logger, preferences) = setup(&journal);
    preferences.bind_module(module_path!(), spec("journald", "stderr"));
    preferences.bind_function(module_path!(), "charge", spec("remote", "stderr"));

    charge(&logger);
    refund(&logger);

    assert_eq!(
        entries(&journal),
        vec![
            "remote preferences: card 4242 declined",
            "journald refunds: refund issued",
        ]
    );
}

#[test]
fn method_binding_does_not_leak_to_same_named_methods() {
    let journal = journal();
    let (logger, preferences) = setup(&journal);
    preferences.bind_function(module_path!(), "Billing::run", spec("remote", "stderr"));

    Billing.run(&logger);
    Shipping.run(&logger);
    run(&logger);

    preferences.bind_function(module_path!(), "run", spec("journald", "stderr"));
    Billing.run(&logger);
    run(&logger);

    assert_eq!(
        entries(&journal),
        vec![
            "remote preferences: invoice batch started",
            "stdout preferences: label batch started",
            "stdout preferences: nightly run started",
            "remote preferences: invoice batch started",
            "journald preferences: nightly run started",
        ]
    );
}

#[test]
fn defaults_apply_without_bindings() {
    let journal = journal();
    let (logger, preferences) = setup(&journal);
    preferences.bind_module("elsewhere", spec("remote", "stderr"));

    charge(&logger);

    assert_eq!(entries(&journal), vec!["stdout preferences: card 4242 declined"]);
    let defaults = preferences.defaults();
    assert_eq!(defaults.preferred(), ["stdout"]);
    assert_eq!(defaults.fallback(), ["stderr"]);
}

#[test]
fn disabled_bindings_resolve_to_defaults() {
    let journal = journal();
    let (logger, preferences) = setup(&journal);
    preferences.bind_function(module_path!(), "charge", spec("remote", "stderr"));
    preferences.set_bindings_enabled(false);

    charge(&logger);

    assert_eq!(entries(&journal), vec!["stdout preferences: card 4242 declined"]);
}

#[test]
fn scopes_bind_nested_calls() {
    fn checkout(logger: &CompositeLogger) {
        logcascade::scope!();
        persist(logger);
    }

    fn persist(logger: &CompositeLogger) {
        logger.info("order persisted");
    }

    let journal = journal();
    let (logger, preferences) = setup(&journal);
    preferences.bind_function(module_path!(), "checkout", spec("remote", "stderr"));

    checkout(&logger);
    persist(&logger);

    assert_eq!(
        entries(&journal),
        vec![
            "remote preferences: order persisted",
            "stdout : order persisted",
        ]
    );
}

#[test]
fn innermost_binding_wins() {
    let journal = journal();
    let (logger, preferences) = setup(&journal);
    preferences.bind_function("app::http", "serve", spec("journald", "stderr"));
    preferences.bind_module("app::db", spec("remote", "stderr"));

    let _serve = logcascade::site::enter(CallSite::new("app::http", "serve"));
    let _query = logcascade::site::enter(CallSite::new("app::db", "query"));
    logger.warn("slow query");

    assert_eq!(entries(&journal), vec!["remote app::db: slow query"]);
}

#[test]
fn rebinding_takes_effect_on_next_call() {
    let journal = journal();
    let (logger, preferences) = setup(&journal);

    preferences.bind_function(module_path!(), "charge", spec("remote", "stderr"));
    charge(&logger);
    preferences.unbind_function(module_path!(), "charge");
    charge(&logger);

    assert_eq!(
        entries(&journal),
        vec![
            "remote preferences: card 4242 declined",
            "stdout preferences: card 4242 declined",
        ]
    );
}

#[test]
fn enablement_follows_bindings() {
    let journal = journal();
    let registry = Registry::new();
    registry.register("stdout", Probe::new("stdout", &journal));
    registry.register("remote", Probe::new("remote", &journal).answer(false));

    let preferences = Arc::new(Preferences::new());
    preferences.bind_module("app::billing", spec("remote", "stdout"));
    let logger = logcascade::builder()
        .registry(Arc::new(registry))
        .preferences(preferences)
        .build();

    assert!(logger.is_info_enabled());
    {
        let _billing = logcascade::site::enter(CallSite::new("app::billing", "charge"));
        assert!(!logger.is_info_enabled());
    }

    assert_eq!(
        entries(&journal),
        vec!["stdout.enabled", "remote.enabled"]
    );
}
