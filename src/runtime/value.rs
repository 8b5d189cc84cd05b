//! Captured argument values

use std::cell::RefCell;
use std::any;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Rendering of an absent value
pub const NULL_LITERAL: &str = "null";

/// Hash of an absent value
pub const NULL_HASH: u64 = 0;

/// Debug rendering of an argument and the hash of that rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedValue {
    text: String,
    hash: u64,
    reactive: bool,
}

impl CapturedValue {
    pub fn capture<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self::from_text(format!("{:?}", value), false)
    }

    /// Capture the current value held by a reactive wrapper
    pub fn capture_reactive<R>(value: &R) -> Self
    where
        R: Reactive + ?Sized,
        R::Value: fmt::Debug,
    {
        value.with_current(Self::capture::<R::Value>).into_reactive()
    }

    /// Stand-in for a value without a `Debug` rendering: its type name.
    /// Two such values of the same type compare equal.
    pub fn opaque<T: ?Sized>() -> Self {
        Self::from_text(any::type_name::<T>().to_string(), false)
    }

    /// Flag a value read out of a reactive wrapper
    pub fn into_reactive(mut self) -> Self {
        self.reactive = true;
        self
    }

    fn from_text(text: String, reactive: bool) -> Self {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            text,
            reactive,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn is_reactive(&self) -> bool {
        self.reactive
    }

    /// Equality used for diffing; the reactive flag does not matter
    pub fn same_value(&self, other: &CapturedValue) -> bool {
        self.hash == other.hash && self.text == other.text
    }
}

impl fmt::Display for CapturedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn render(value: Option<&CapturedValue>) -> &str {
    value.map(CapturedValue::text).unwrap_or(NULL_LITERAL)
}

pub fn hash(value: Option<&CapturedValue>) -> u64 {
    value.map(CapturedValue::hash).unwrap_or(NULL_HASH)
}

pub fn same(a: Option<&CapturedValue>, b: Option<&CapturedValue>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_value(b),
        (None, None) => true,
        _ => false,
    }
}

/// Argument wrapper whose capture is picked by method resolution.
///
/// `(&&Capture(&value)).capture_value()` resolves to [`CaptureDebug`] when the
/// value implements `Debug` and to [`CaptureOpaque`] otherwise; both traits
/// must be in scope.
pub struct Capture<'a, T: ?Sized>(pub &'a T);

pub trait CaptureDebug {
    fn capture_value(&self) -> CapturedValue;
}

impl<T: fmt::Debug + ?Sized> CaptureDebug for &Capture<'_, T> {
    fn capture_value(&self) -> CapturedValue {
        CapturedValue::capture(self.0)
    }
}

pub trait CaptureOpaque {
    fn capture_value(&self) -> CapturedValue;
}

impl<T: ?Sized> CaptureOpaque for Capture<'_, T> {
    fn capture_value(&self) -> CapturedValue {
        CapturedValue::opaque::<T>()
    }
}

/// A container whose current value is read at capture time
pub trait Reactive {
    type Value: ?Sized;

    fn with_current<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> R;
}

impl<T: Reactive + ?Sized> Reactive for &T {
    type Value = T::Value;

    fn with_current<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> R {
        (**self).with_current(f)
    }
}

/// Shared mutable state; clones observe the same value
pub struct State<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> State<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.cell.borrow_mut());
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.cell.borrow())
    }
}

impl<T: Clone> State<T> {
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("State").field(&*self.cell.borrow()).finish()
    }
}

impl<T> Reactive for State<T> {
    type Value = T;

    fn with_current<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> R {
        self.with(f)
    }
}
