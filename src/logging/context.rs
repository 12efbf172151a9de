//! Thread-local mapped diagnostic context
//!
//! Every thread owns one field map. Loggers merge it into each event they
//! build. [`ContextGuard`] overlays fields and puts the previous values back
//! when dropped, so restoration also happens while unwinding from a panic.

use std::cell::RefCell;
use std::marker::PhantomData;

use serde_json::Value;

use super::event::Fields;

thread_local! {
    static CONTEXT: RefCell<Fields> = RefCell::new(Fields::new());
}

/// Static accessors for the current thread's context map
pub struct Mdc;

impl Mdc {
    pub fn put(key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let (key, value) = (key.into(), value.into());
        CONTEXT.with(|ctx| ctx.borrow_mut().insert(key, value))
    }

    pub fn get(key: &str) -> Option<Value> {
        CONTEXT.with(|ctx| ctx.borrow().get(key).cloned())
    }

    pub fn remove(key: &str) -> Option<Value> {
        CONTEXT.with(|ctx| ctx.borrow_mut().remove(key))
    }

    pub fn contains(key: &str) -> bool {
        CONTEXT.with(|ctx| ctx.borrow().contains_key(key))
    }

    pub fn clear() {
        CONTEXT.with(|ctx| ctx.borrow_mut().clear());
    }

    /// Copy of the current thread's context.
    pub fn snapshot() -> Fields {
        CONTEXT.with(|ctx| ctx.borrow().clone())
    }
}

/// Restores overlaid context fields on drop. Not `Send`: it must be dropped
/// on the thread whose context it modified.
#[must_use = "the overlay is removed as soon as the guard is dropped"]
pub struct ContextGuard {
    previous: Vec<(String, Option<Value>)>,
    _thread_bound: PhantomData<*const ()>,
}

impl ContextGuard {
    pub fn overlay<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let previous = fields
            .into_iter()
            .map(|(key, value)| {
                let key = key.into();
                let old = Mdc::put(key.clone(), value);
                (key, old)
            })
            .collect();

        Self {
            previous,
            _thread_bound: PhantomData,
        }
    }

    pub fn single(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::overlay([(key.into(), value.into())])
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        // reverse order so a key overlaid twice ends at its original value
        for (key, old) in self.previous.drain(..).rev() {
            match old {
                Some(value) => {
                    Mdc::put(key, value);
                }
                None => {
                    Mdc::remove(&key);
                }
            }
        }
    }
}

/// Runs `f` with `key` set in the context, then restores the prior state.
pub fn with_field<R>(key: impl Into<String>, value: impl Into<Value>, f: impl FnOnce() -> R) -> R {
    let _guard = ContextGuard::single(key, value);
    f()
}

/// Runs `f` with all `fields` set in the context, then restores the prior state.
pub fn with_fields<I, K, V, R>(fields: I, f: impl FnOnce() -> R) -> R
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let _guard = ContextGuard::overlay(fields);
    f()
}
