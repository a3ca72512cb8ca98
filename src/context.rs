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

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::Weak;
use std::thread;
use std::thread::ThreadId;

type Entries = BTreeMap<String, String>;

// the maps of every thread that wrote into one context
#[derive(Default)]
struct Slots {
    threads: Mutex<HashMap<ThreadId, Entries>>,
}

impl Slots {
    fn lock(&self) -> MutexGuard<'_, HashMap<ThreadId, Entries>> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// contexts the current thread has written into
struct Written {
    thread: ThreadId,
    contexts: RefCell<Vec<Weak<Slots>>>,
}

impl Written {
    fn record(&self, slots: &Arc<Slots>) {
        let mut contexts = self.contexts.borrow_mut();
        contexts.retain(|ctx| ctx.strong_count() > 0);
        if !contexts.iter().any(|ctx| ctx.as_ptr() == Arc::as_ptr(slots)) {
            contexts.push(Arc::downgrade(slots));
        }
    }
}

impl Drop for Written {
    // an exiting thread releases its maps from the contexts that outlive it
    fn drop(&mut self) {
        for ctx in self.contexts.get_mut().drain(..) {
            if let Some(slots) = ctx.upgrade() {
                slots.lock().remove(&self.thread);
            }
        }
    }
}

thread_local! {
    static WRITTEN: Written = Written {
        thread: thread::current().id(),
        contexts: RefCell::new(Vec::new()),
    };
}

/// A key-value store shared by every call made through one composite logger.
///
/// Entries are confined to the thread that wrote them: two threads using the same context never
/// observe each other's values. A thread's entries are released when the thread exits or the
/// context drops, whichever comes first. Applications that reuse worker threads across unrelated
/// requests should [`clear`](LoggingContext::clear) the context at request boundaries.
///
/// Backends receive the context on every call and may write into it, which is how they report
/// operational status back to the application.
///
/// ## Example
///
/// ```
/// use logcascade::LoggingContext;
///
/// let ctx = LoggingContext::new();
/// ctx.put("request_id", Some("42"));
/// assert_eq!(ctx.get("request_id").as_deref(), Some("42"));
///
/// ctx.put("request_id", None::<&str>);
/// assert_eq!(ctx.get("request_id"), None);
/// ```
#[derive(Default)]
pub struct LoggingContext {
    slots: Arc<Slots>,
}

impl LoggingContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the value stored under `key` on the current thread.
    pub fn get(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .get(&thread::current().id())
            .and_then(|map| map.get(key))
            .cloned()
    }

    /// Store `value` under `key`, or remove `key` when `value` is `None`.
    pub fn put<K, V>(&self, key: K, value: Option<V>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        match value {
            Some(value) => self.insert(key, value),
            None => {
                self.remove(&key.into());
            }
        }
    }

    /// Store `value` under `key`, overwriting any previous value.
    pub fn insert<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let first = {
            let mut threads = self.slots.lock();
            let map = threads.entry(thread::current().id()).or_default();
            let first = map.is_empty();
            map.insert(key.into(), value.into());
            first
        };
        if first {
            let _ = WRITTEN.try_with(|written| written.record(&self.slots));
        }
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        let mut threads = self.slots.lock();
        let thread = thread::current().id();
        let map = threads.get_mut(&thread)?;
        let removed = map.remove(key);
        if map.is_empty() {
            threads.remove(&thread);
        }
        removed
    }

    /// Remove every entry stored by the current thread.
    pub fn clear(&self) {
        self.slots.lock().remove(&thread::current().id());
    }

    /// Whether the current thread has stored no entries.
    pub fn is_empty(&self) -> bool {
        !self.slots.lock().contains_key(&thread::current().id())
    }

    /// A snapshot of the current thread's entries, ordered by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.slots
            .lock()
            .get(&thread::current().id())
            .map(|map| {
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl fmt::Debug for LoggingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingContext")
            .field("entries", &self.entries())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn put_none_removes() {
        let ctx = LoggingContext::new();
        ctx.put("k", Some("v"));
        assert_eq!(ctx.get("k").as_deref(), Some("v"));

        ctx.put("k", None::<String>);
        assert_eq!(ctx.get("k"), None);
        assert!(ctx.is_empty());
    }

    #[test]
    fn put_overwrites() {
        let ctx = LoggingContext::new();
        ctx.insert("k", "v1");
        ctx.insert("k", "v2");
        assert_eq!(ctx.get("k").as_deref(), Some("v2"));
        assert_eq!(ctx.entries(), vec![("k".to_string(), "v2".to_string())]);
    }

    #[test]
    fn instances_do_not_share_entries() {
        let a = LoggingContext::new();
        let b = LoggingContext::new();
        a.insert("k", "a");
        assert_eq!(b.get("k"), None);
    }

    #[test]
    fn entries_are_thread_confined() {
        let ctx = Arc::new(LoggingContext::new());
        ctx.insert("owner", "main");

        let other = Arc::clone(&ctx);
        let seen = thread::spawn(move || {
            let before = other.get("owner");
            other.insert("owner", "worker");
            (before, other.get("owner"))
        })
        .join()
        .unwrap();

        assert_eq!(seen, (None, Some("worker".to_string())));
        assert_eq!(ctx.get("owner").as_deref(), Some("main"));
    }

    #[test]
    fn thread_exit_releases_its_entries() {
        let ctx = Arc::new(LoggingContext::new());
        ctx.insert("owner", "main");

        let other = Arc::clone(&ctx);
        thread::spawn(move || other.insert("owner", "worker"))
            .join()
            .unwrap();

        assert_eq!(ctx.slots.lock().len(), 1);
    }

    #[test]
    fn drop_on_another_thread_releases_every_thread() {
        let (written_tx, written_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let worker = thread::spawn(move || {
            let contexts = (0..100)
                .map(|i| {
                    let ctx = LoggingContext::new();
                    ctx.insert("request", i.to_string());
                    ctx
                })
                .collect::<Vec<_>>();
            written_tx.send(contexts).unwrap();
            // stay alive until the contexts are gone
            done_rx.recv().unwrap();
            WRITTEN.with(|written| {
                written.record(&Arc::default());
                written.contexts.borrow().len()
            })
        });

        let contexts = written_rx.recv().unwrap();
        let slots = contexts
            .iter()
            .map(|ctx| Arc::downgrade(&ctx.slots))
            .collect::<Vec<_>>();
        drop(contexts);

        assert!(slots.iter().all(|slots| slots.upgrade().is_none()));
        done_tx.send(()).unwrap();
        assert_eq!(worker.join().unwrap(), 1);
    }
}
