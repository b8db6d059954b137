//! Element: the tagged value stored by every container, plus the stock
//! hash/equality strategies callers plug into them.

use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;
use std::rc::Rc;

/// Hash strategy supplied to a `HashTable` at creation time.
///
/// Must agree with the table's `EqFn`: `eq(a, b)` implies
/// `hash(a) == hash(b)`. The containers do not check this.
pub type HashFn = fn(&Element) -> u64;

/// Equality strategy supplied to a `HashTable` or `LinkedList`.
pub type EqFn = fn(&Element, &Element) -> bool;

/// Shared, type-erased reference to a caller-owned record.
///
/// Two `Opaque` values are equal only when they point at the same
/// allocation.
#[derive(Clone)]
pub struct Opaque(Rc<dyn Any>);

impl Opaque {
    pub fn new<T: Any>(value: T) -> Self {
        Opaque(Rc::new(value))
    }

    pub fn from_rc(rc: Rc<dyn Any>) -> Self {
        Opaque(rc)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:#x})", self.addr())
    }
}

/// A value stored in a container. Exactly one payload is active.
///
/// `Str` and `Ref` payloads are shared; cloning an `Element` never copies
/// the data behind them.
#[derive(Clone, Debug)]
pub enum Element {
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Ref(Opaque),
}

impl Element {
    pub fn int(v: i64) -> Self {
        Element::Int(v)
    }

    pub fn float(v: f64) -> Self {
        Element::Float(v)
    }

    pub fn str(s: &str) -> Self {
        Element::Str(Rc::from(s))
    }

    pub fn opaque<T: Any>(value: T) -> Self {
        Element::Ref(Opaque::new(value))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Element::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Element::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Element::Ref(o) => Some(o),
            _ => None,
        }
    }
}

// Floats compare by bit pattern so that `Eq` and `Hash` stay lawful.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::Int(a), Element::Int(b)) => a == b,
            (Element::Float(a), Element::Float(b)) => a.to_bits() == b.to_bits(),
            (Element::Str(a), Element::Str(b)) => a == b,
            (Element::Ref(a), Element::Ref(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Element::Int(v) => v.hash(state),
            Element::Float(v) => v.to_bits().hash(state),
            Element::Str(s) => s.hash(state),
            Element::Ref(o) => o.addr().hash(state),
        }
    }
}

impl From<i64> for Element {
    fn from(v: i64) -> Self {
        Element::Int(v)
    }
}

impl From<f64> for Element {
    fn from(v: f64) -> Self {
        Element::Float(v)
    }
}

impl From<&str> for Element {
    fn from(s: &str) -> Self {
        Element::str(s)
    }
}

impl From<String> for Element {
    fn from(s: String) -> Self {
        Element::Str(Rc::from(s))
    }
}

impl From<Opaque> for Element {
    fn from(o: Opaque) -> Self {
        Element::Ref(o)
    }
}

/// Generic hash over the whole `Element`, consistent with `element_eq`.
pub fn element_hash(e: &Element) -> u64 {
    // DefaultHasher::new() uses fixed keys, so hashes are stable per process.
    let mut h = DefaultHasher::new();
    e.hash(&mut h);
    h.finish()
}

/// Generic structural equality (`Element: Eq`).
pub fn element_eq(a: &Element, b: &Element) -> bool {
    a == b
}

/// Integer keys hash to themselves.
pub fn int_hash(e: &Element) -> u64 {
    match e {
        Element::Int(v) => *v as u64,
        other => element_hash(other),
    }
}

pub fn int_eq(a: &Element, b: &Element) -> bool {
    matches!((a, b), (Element::Int(x), Element::Int(y)) if x == y)
}

/// Wrapping sum of the string's bytes. Cheap and collision-heavy, which
/// makes it handy for exercising long chains.
pub fn string_sum_hash(e: &Element) -> u64 {
    match e {
        Element::Str(s) => s
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_add(u64::from(b))),
        other => element_hash(other),
    }
}

/// Content comparison of string payloads.
pub fn string_eq(a: &Element, b: &Element) -> bool {
    matches!((a, b), (Element::Str(x), Element::Str(y)) if x == y)
}
