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

//! A remote backend that goes down, with stderr taking over its records.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use logcascade::Backend;
use logcascade::Error;
use logcascade::Level;
use logcascade::LoggingContext;
use logcascade::PreferenceSpec;
use logcascade::Record;
use logcascade::Registry;
use logcascade::backend::LevelSwitch;
use logcascade::backend::Stderr;
use logcascade::layout::TextLayout;

#[derive(Debug, Default)]
struct Remote {
    down: AtomicBool,
}

impl Backend for Remote {
    fn log(&self, record: &Record, ctx: &LoggingContext) -> Result<(), Error> {
        if self.down.load(Ordering::Relaxed) {
            ctx.insert("remote.status", "503");
            return Err(Error::new("remote sink unavailable").with_context("status", 503));
        }
        ctx.insert("remote.status", "200");
        println!("[remote] {} {}", record.level(), record.payload());
        Ok(())
    }

    fn enabled(&self, level: Level, _: Option<&str>) -> Result<bool, Error> {
        Ok(level <= Level::Info)
    }
}

fn main() {
    let registry = Registry::global();
    let remote = Arc::new(Remote::default());
    registry.register_shared("remote", Arc::clone(&remote) as Arc<dyn Backend>);
    registry.register(
        "stderr",
        Stderr::default()
            .with_layout(TextLayout::default().no_color())
            .with_switch(LevelSwitch::up_to(Level::Trace)),
    );

    let logger = logcascade::builder().apply();
    logcascade::Preferences::global()
        .set_defaults(PreferenceSpec::new(["remote"], ["stderr"]).unwrap());

    logcascade::info!("order {} accepted", 1001);
    remote.down.store(true, Ordering::Relaxed);
    logcascade::error!(category: "billing", "order {} could not be charged", 1002);

    println!(
        "last remote status: {}",
        logger.context().get("remote.status").unwrap_or_default()
    );
}
