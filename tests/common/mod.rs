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

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use logcascade::Backend;
use logcascade::CompositeLogger;
use logcascade::Error;
use logcascade::Level;
use logcascade::LoggingContext;
use logcascade::PreferenceSpec;
use logcascade::Preferences;
use logcascade::Record;
use logcascade::Registry;

/// How a probe reacts to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// A shared, ordered journal of every call made on any probe.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// A backend that journals every call as `"<name>.<op>"` and behaves as configured.
#[derive(Debug)]
pub struct Probe {
    name: &'static str,
    journal: Journal,
    behavior: Behavior,
    enabled: bool,
}

impl Probe {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: Arc::clone(journal),
            behavior: Behavior::Succeed,
            enabled: true,
        }
    }

    pub fn behave(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn answer(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn call(&self, op: &str) -> Result<(), Error> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}.{op}", self.name));
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(Error::new("probe failure").with_context("probe", self.name)),
            Behavior::Panic => panic!("{} exploded", self.name),
        }
    }
}

impl Backend for Probe {
    fn log(&self, record: &Record, ctx: &LoggingContext) -> Result<(), Error> {
        self.call("log")?;
        ctx.insert(format!("{}.last", self.name), record.payload());
        Ok(())
    }

    fn enabled(&self, _: Level, _: Option<&str>) -> Result<bool, Error> {
        self.call("enabled")?;
        Ok(self.enabled)
    }

    fn set_enabled(&self, _: Level, _: Option<&str>, _: bool) -> Result<(), Error> {
        self.call("set_enabled")
    }

    fn flush(&self) -> Result<(), Error> {
        self.call("flush")
    }
}

pub fn journal() -> Journal {
    Arc::new(Mutex::new(vec![]))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// A logger whose defaults prefer `preferred` and fall back to `fallback`.
pub fn logger(registry: Registry, preferred: &[&str], fallback: &[&str]) -> CompositeLogger {
    let preferences = Preferences::new();
    preferences.set_defaults(
        PreferenceSpec::new(preferred.iter().copied(), fallback.iter().copied()).unwrap(),
    );
    logcascade::builder()
        .registry(Arc::new(registry))
        .preferences(Arc::new(preferences))
        .build()
}
