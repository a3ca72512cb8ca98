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

//! Route one module's records to a dedicated backend, and one function's to another.

use logcascade::PreferenceSpec;
use logcascade::Preferences;
use logcascade::Registry;
use logcascade::backend::Stdout;
use logcascade::layout::TextLayout;

mod billing {
    pub fn charge(amount: u64) {
        logcascade::info!("charging {amount}");
        if amount > 1000 {
            audit(amount);
        }
    }

    fn audit(amount: u64) {
        logcascade::scope!();
        logcascade::warn!(category: "audit", "large charge of {amount}");
        super::shared::persist();
    }
}

mod shared {
    pub fn persist() {
        // no call site: resolved with the caller's scopes
        logcascade::logger().info("persisted");
    }
}

fn main() {
    let registry = Registry::global();
    registry.register("billing", Stdout::default().with_layout(TextLayout::default().no_color()));
    registry.register("audit", Stdout::default().with_layout(TextLayout::default().no_color()));

    let preferences = Preferences::global();
    preferences.bind_module(
        "scoped_preferences::billing",
        PreferenceSpec::new(["billing"], ["stderr"]).unwrap(),
    );
    preferences.bind_function(
        "scoped_preferences::billing",
        "audit",
        PreferenceSpec::new(["audit", "billing"], ["stderr"]).unwrap(),
    );

    logcascade::builder().apply();

    billing::charge(20);
    billing::charge(5000);
    shared::persist();
}
