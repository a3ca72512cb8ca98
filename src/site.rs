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

//! Call sites and the per-thread scope stack.
//!
//! Preferences are bound to modules and functions. Rust has no runtime call-stack introspection,
//! so the "stack" consulted on every log call is assembled from two explicit sources:
//!
//! 1. the call site captured by a logging macro ([`call_site!`](crate::call_site)), and
//! 2. the scopes entered on the current thread with [`scope!`](crate::scope) or [`enter`].
//!
//! Frames are always presented innermost first.
//!
//! ```
//! use logcascade::site;
//!
//! fn handle_request() {
//!     logcascade::scope!();
//!     let frames = site::frames(None);
//!     assert_eq!(frames[0].function(), "handle_request");
//! }
//!
//! handle_request();
//! assert!(site::frames(None).is_empty());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

/// A code location that preferences can be bound to: a module path plus a function name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSite {
    module: &'static str,
    function: &'static str,
}

impl CallSite {
    /// Create a call site. Use an empty `function` when only the module is known.
    pub const fn new(module: &'static str, function: &'static str) -> Self {
        Self { module, function }
    }

    /// The module path, as produced by `module_path!()`.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// The function name, without its module path.
    pub fn function(&self) -> &'static str {
        self.function
    }

    // frames from this crate itself never name a user category
    pub(crate) fn is_facade(&self) -> bool {
        let root = crate::CRATE_MODULE;
        self.module == root
            || self
                .module
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.function.is_empty() {
            f.write_str(self.module)
        } else {
            write!(f, "{}::{}", self.module, self.function)
        }
    }
}

#[doc(hidden)]
pub fn __function_name(type_name: &'static str) -> &'static str {
    // `type_name` looks like `krate::module::Type::method::{{closure}}::__f`
    let mut path = type_name.strip_suffix("::__f").unwrap_or(type_name);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }

    let (owner, function) = split_last(path);
    let Some(owner_type) = self_type(split_last(owner).1) else {
        return function;
    };

    let qualified = format!("{owner_type}::{function}");
    match path.strip_suffix(qualified.as_str()) {
        Some(rest) if rest.is_empty() || rest.ends_with("::") => &path[rest.len()..],
        // generic or trait impls; computed once per call site
        _ => Box::leak(qualified.into_boxed_str()),
    }
}

// split at the last `::` outside of angle brackets
fn split_last(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    let mut depth = 0usize;
    let mut i = bytes.len();
    while i > 1 {
        i -= 1;
        match bytes[i] {
            b'>' if bytes[i - 1] != b'-' => depth += 1,
            b'<' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes[i - 1] == b':' => {
                return (&path[..i - 1], &path[i + 1..]);
            }
            _ => {}
        }
    }
    ("", path)
}

// the impl type owning a method, if `segment` names a type rather than a module or function
fn self_type(segment: &str) -> Option<&str> {
    let name = match segment.strip_prefix('<') {
        // `<krate::Type<T> as krate::Trait>`
        Some(qualified) => {
            let self_ty = qualified.split(" as ").next().unwrap_or(qualified);
            split_last(self_ty.trim_end_matches('>')).1
        }
        None => segment,
    };
    let name = name.split('<').next().unwrap_or(name);
    name.starts_with(|c: char| c.is_ascii_uppercase()).then_some(name)
}

/// Capture the [`CallSite`] of the enclosing function.
///
/// Free functions are named bare. Methods are qualified by their impl type, so `run` in
/// `impl Billing` and `run` in `impl Shipping` are distinct call sites: `Billing::run` and
/// `Shipping::run`. A function nested inside another function keeps its own name.
///
/// ```
/// fn connect() -> logcascade::CallSite {
///     logcascade::call_site!()
/// }
///
/// struct Pool;
///
/// impl Pool {
///     fn acquire(&self) -> logcascade::CallSite {
///         logcascade::call_site!()
///     }
/// }
///
/// let site = connect();
/// assert_eq!(site.function(), "connect");
/// assert_eq!(site.module(), module_path!());
/// assert_eq!(Pool.acquire().function(), "Pool::acquire");
/// ```
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __f() {}
        static __SITE: ::std::sync::OnceLock<$crate::CallSite> = ::std::sync::OnceLock::new();
        *__SITE.get_or_init(|| {
            $crate::CallSite::new(
                ::std::module_path!(),
                $crate::site::__function_name(::std::any::type_name_of_val(&__f)),
            )
        })
    }};
}

/// Push the enclosing function onto the current thread's scope stack until the end of the
/// enclosing block.
///
/// Any log call made while the scope is active, however deeply nested, resolves its preferences
/// with this frame on the stack.
#[macro_export]
macro_rules! scope {
    () => {
        let __logcascade_scope = $crate::site::enter($crate::call_site!());
    };
}

thread_local! {
    static SCOPES: RefCell<Vec<CallSite>> = const { RefCell::new(Vec::new()) };
}

/// Push `site` onto the current thread's scope stack.
///
/// The frame is popped when the returned guard drops. Guards must drop in reverse order of
/// creation, which lexical scoping guarantees.
pub fn enter(site: CallSite) -> ScopeGuard {
    SCOPES.with(|scopes| scopes.borrow_mut().push(site));
    ScopeGuard {
        depth: depth(),
        _not_send: PhantomData,
    }
}

/// A guard that pops its frame from the scope stack when dropped.
#[must_use = "the scope is exited as soon as the guard drops"]
#[derive(Debug)]
pub struct ScopeGuard {
    depth: usize,
    // the frame lives in a thread local
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let _ = SCOPES.try_with(|scopes| {
            scopes.borrow_mut().truncate(self.depth - 1);
        });
    }
}

fn depth() -> usize {
    SCOPES.with(|scopes| scopes.borrow().len())
}

/// The frames visible from the current thread, innermost first.
///
/// `innermost` is the call site of the log call itself, if known.
pub fn frames(innermost: Option<CallSite>) -> Vec<CallSite> {
    SCOPES.with(|scopes| {
        let scopes = scopes.borrow();
        let mut frames = Vec::with_capacity(scopes.len() + 1);
        frames.extend(innermost);
        frames.extend(scopes.iter().rev().copied());
        frames
    })
}

/// The module of the first frame that does not belong to the facade itself.
pub(crate) fn default_category(frames: &[CallSite]) -> Option<&'static str> {
    frames
        .iter()
        .find(|frame| !frame.is_facade())
        .map(|frame| frame.module())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_name_strips_closures() {
        assert_eq!(__function_name("app::db::connect::__f"), "connect");
        assert_eq!(
            __function_name("app::db::connect::{{closure}}::{{closure}}::__f"),
            "connect"
        );
        assert_eq!(__function_name("main::__f"), "main");
        assert_eq!(__function_name("app::serve::accept::__f"), "accept");
    }

    #[test]
    fn function_name_keeps_impl_type() {
        assert_eq!(__function_name("app::billing::Billing::run::__f"), "Billing::run");
        assert_eq!(
            __function_name("app::billing::Billing::run::{{closure}}::__f"),
            "Billing::run"
        );
        assert_eq!(
            __function_name("<app::billing::Billing as app::jobs::Job>::run::__f"),
            "Billing::run"
        );
        assert_eq!(
            __function_name("app::queue::Queue<app::jobs::Task>::push::__f"),
            "Queue::push"
        );
        assert_eq!(__function_name("<u32 as app::jobs::Job>::run::__f"), "run");
    }

    #[test]
    fn methods_of_different_types_are_distinct_sites() {
        struct Billing;
        struct Shipping;

        impl Billing {
            fn run(&self) -> CallSite {
                crate::call_site!()
            }
        }

        impl Shipping {
            fn run(&self) -> CallSite {
                crate::call_site!()
            }
        }

        assert_eq!(Billing.run().function(), "Billing::run");
        assert_eq!(Shipping.run().function(), "Shipping::run");
        assert_eq!(Billing.run().module(), "logcascade::site::tests");
    }

    #[test]
    fn call_site_captures_function() {
        let site = crate::call_site!();
        assert_eq!(site.function(), "call_site_captures_function");
        assert_eq!(site.module(), "logcascade::site::tests");
        assert_eq!(
            site.to_string(),
            "logcascade::site::tests::call_site_captures_function"
        );
    }

    #[test]
    fn scopes_nest_innermost_first() {
        let outer = CallSite::new("app::http", "serve");
        let inner = CallSite::new("app::db", "query");

        let _outer = enter(outer);
        {
            let _inner = enter(inner);
            let log_site = CallSite::new("app::db::pool", "acquire");
            assert_eq!(frames(Some(log_site)), vec![log_site, inner, outer]);
        }
        assert_eq!(frames(None), vec![outer]);
    }

    #[test]
    fn scope_macro_lives_until_block_end() {
        fn nested() -> Vec<CallSite> {
            crate::scope!();
            frames(None)
        }

        let frames_inside = nested();
        assert_eq!(frames_inside.len(), 1);
        assert_eq!(frames_inside[0].function(), "nested");
        assert!(frames(None).is_empty());
    }

    #[test]
    fn default_category_skips_facade_frames() {
        let facade = CallSite::new("logcascade::composite", "log");
        let lookalike = CallSite::new("logcascade_ext::db", "query");
        let app = CallSite::new("app::db", "query");

        assert_eq!(default_category(&[facade, app]), Some("app::db"));
        assert_eq!(default_category(&[lookalike]), Some("logcascade_ext::db"));
        assert_eq!(default_category(&[facade]), None);
        assert!(CallSite::new("logcascade", "").is_facade());
    }
}
