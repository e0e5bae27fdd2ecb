//! Module for the JSON value tree
//!
//! [`Value`] is the single recursive type representing any JSON value. An entire
//! parsed document is just a `Value` (conventionally, but not necessarily, an
//! object or array at the root), and every child of an object or array is owned
//! by its parent.
//!
//! # Accessor families
//!
//! There are three ways to read a `Value` as a specific type, depending on how
//! the caller wants to handle the value having the wrong kind:
//!
//! - *Strict* accessors ([`expect_bool`](Value::expect_bool), ...) panic on a
//!   kind mismatch. Use them only when the kind has already been established.
//! - *Defaulting* accessors ([`bool_or`](Value::bool_or), ...) silently return
//!   a caller-supplied fallback on any mismatch or failed lookup.
//! - *Result-code* accessors ([`get_bool`](Value::get_bool),
//!   [`try_key`](Value::try_key), ...) return a `Result` with an
//!   [`AccessError`] describing the failure.
//!
//! Lookups combine with accessors, so reading a typed child out of a document
//! of uncertain shape never requires explicit kind checks:
//!
//! ```
//! # use domson::value::Value;
//! # let doc = Value::default();
//! // Yields 0.0 if `doc` is not an object, "retries" is absent,
//! // or the child is not a number
//! let retries = doc.f64_at_key("retries", 0.0);
//! assert_eq!(0.0, retries);
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

/// Internal storage for JSON objects
///
/// The map is ordered by key (exact byte comparison), so iteration yields
/// members in key order, not insertion order. Keys are unique; inserting an
/// existing key replaces its value.
pub type Object = BTreeMap<String, Value>;

/// Internal storage for JSON arrays, preserving document order
pub type Array = Vec<Value>;

/// Kind of a JSON value
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum Kind {
    /// JSON `null`
    Null,
    /// JSON boolean value, `true` or `false`
    Bool,
    /// JSON number value; numbers are always stored as `f64`
    Number,
    /// JSON string value
    String,
    /// JSON object: `{ ... }`
    Object,
    /// JSON array: `[ ... ]`
    Array,
}

/// Reason a lookup or conversion failed
///
/// Returned by the result-code accessor family. Success is expressed as
/// `Result::Ok`, so there is no `Ok` variant here.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
pub enum AccessError {
    /// The value exists but has the wrong kind for the requested access
    #[error("value has the wrong kind")]
    WrongType,
    /// A key lookup was attempted on a value that is not an object
    #[error("value is not an object")]
    NotObject,
    /// An index lookup was attempted on a value that is not an array
    #[error("value is not an array")]
    NotArray,
    /// The object does not contain the requested key
    #[error("key not found in object")]
    BadKey,
    /// The array index is out of bounds
    #[error("array index is out of bounds")]
    BadIndex,
}

/// A JSON value; a "node" in the DOM
///
/// Exactly one kind is active at a time. Assigning a value of a different kind
/// drops the old payload and installs the new one; there is no observable
/// partially-constructed state. An object or array value exclusively owns its
/// children: [`Clone`] deep-copies the whole subtree, and moving a `Value`
/// (or [`take`](Value::take)-ing it) transfers ownership of the subtree.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// JSON `null`; also the default state of a fresh `Value`
    #[default]
    Null,
    /// JSON boolean value
    Bool(bool),
    /// JSON number value; all JSON numbers, integral or not, are stored as `f64`
    Number(f64),
    /// JSON string value
    String(String),
    /// JSON object
    Object(Object),
    /// JSON array
    Array(Array),
}

// Read-only fallback singletons, shared for the process lifetime. Handing out
// `&'static` references makes mutation through them a compile error.
static NULL: Value = Value::Null;
static EMPTY_OBJECT: Object = Object::new();
static EMPTY_ARRAY: Array = Array::new();

impl Value {
    /// Returns the kind of value this is
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Object(_) => Kind::Object,
            Value::Array(_) => Kind::Array,
        }
    }

    /// Returns true if this value is `null`
    pub fn is_null(&self) -> bool {
        self.kind() == Kind::Null
    }

    /// Returns true if this value is a boolean
    pub fn is_bool(&self) -> bool {
        self.kind() == Kind::Bool
    }

    /// Returns true if this value is a number
    pub fn is_number(&self) -> bool {
        self.kind() == Kind::Number
    }

    /// Returns true if this value is a string
    pub fn is_string(&self) -> bool {
        self.kind() == Kind::String
    }

    /// Returns true if this value is an object
    pub fn is_object(&self) -> bool {
        self.kind() == Kind::Object
    }

    /// Returns true if this value is an array
    pub fn is_array(&self) -> bool {
        self.kind() == Kind::Array
    }

    #[track_caller]
    fn kind_mismatch(&self, expected: Kind) -> ! {
        panic!(
            "incorrect value usage: expected {expected} value, but kind is {}",
            self.kind()
        )
    }

    //
    // Strict accessors. These require the exact kind and exist for callers
    // which have already established it; on mismatch they panic.
    //

    /// Returns the boolean payload, panicking if this is not a boolean
    ///
    /// Note that this requires the exact boolean kind; no conversions are
    /// attempted (see [`convert_bool`](Value::convert_bool) for those).
    #[track_caller]
    pub fn expect_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            _ => self.kind_mismatch(Kind::Bool),
        }
    }

    /// Returns the number payload, panicking if this is not a number
    #[track_caller]
    pub fn expect_f64(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            _ => self.kind_mismatch(Kind::Number),
        }
    }

    /// Returns the string payload, panicking if this is not a string
    #[track_caller]
    pub fn expect_str(&self) -> &str {
        match self {
            Value::String(s) => s,
            _ => self.kind_mismatch(Kind::String),
        }
    }

    /// Returns the object payload, panicking if this is not an object
    #[track_caller]
    pub fn expect_object(&self) -> &Object {
        match self {
            Value::Object(map) => map,
            _ => self.kind_mismatch(Kind::Object),
        }
    }

    /// Returns the object payload mutably, panicking if this is not an object
    #[track_caller]
    pub fn expect_object_mut(&mut self) -> &mut Object {
        match self {
            Value::Object(map) => map,
            _ => self.kind_mismatch(Kind::Object),
        }
    }

    /// Returns the array payload, panicking if this is not an array
    #[track_caller]
    pub fn expect_array(&self) -> &Array {
        match self {
            Value::Array(items) => items,
            _ => self.kind_mismatch(Kind::Array),
        }
    }

    /// Returns the array payload mutably, panicking if this is not an array
    #[track_caller]
    pub fn expect_array_mut(&mut self) -> &mut Array {
        match self {
            Value::Array(items) => items,
            _ => self.kind_mismatch(Kind::Array),
        }
    }

    //
    // Option accessors
    //

    /// Returns the boolean payload, or `None` if this is not a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number payload, or `None` if this is not a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number payload truncated toward zero, or `None` if this is
    /// not a number
    ///
    /// Out-of-range magnitudes saturate at `i64::MIN` / `i64::MAX`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n as i64),
            _ => None,
        }
    }

    /// Returns the string payload, or `None` if this is not a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object payload, or `None` if this is not an object
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the object payload mutably, or `None` if this is not an object
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the array payload, or `None` if this is not an array
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the array payload mutably, or `None` if this is not an array
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    //
    // Defaulting accessors
    //

    /// Returns the boolean payload, or the default if this is not a boolean
    pub fn bool_or(&self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }

    /// Returns the number payload, or the default if this is not a number
    pub fn f64_or(&self, default: f64) -> f64 {
        self.as_f64().unwrap_or(default)
    }

    /// Returns the number payload truncated toward zero, or the default if
    /// this is not a number
    pub fn i64_or(&self, default: i64) -> i64 {
        self.as_i64().unwrap_or(default)
    }

    /// Returns the string payload, or the default if this is not a string
    pub fn str_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.as_str().unwrap_or(default)
    }

    /// Returns the object payload, or a reference to a shared immutable empty
    /// object if this is not an object
    pub fn as_object_or_empty(&self) -> &Object {
        self.as_object().unwrap_or(&EMPTY_OBJECT)
    }

    /// Returns the array payload, or a reference to a shared immutable empty
    /// array if this is not an array
    pub fn as_array_or_empty(&self) -> &Array {
        self.as_array().unwrap_or(&EMPTY_ARRAY)
    }

    //
    // Result-code accessors
    //

    /// Returns the boolean payload, or [`AccessError::WrongType`]
    pub fn get_bool(&self) -> Result<bool, AccessError> {
        self.as_bool().ok_or(AccessError::WrongType)
    }

    /// Returns the number payload, or [`AccessError::WrongType`]
    pub fn get_f64(&self) -> Result<f64, AccessError> {
        self.as_f64().ok_or(AccessError::WrongType)
    }

    /// Returns the number payload truncated toward zero, or
    /// [`AccessError::WrongType`]
    pub fn get_i64(&self) -> Result<i64, AccessError> {
        self.as_i64().ok_or(AccessError::WrongType)
    }

    /// Returns the string payload, or [`AccessError::WrongType`]
    pub fn get_str(&self) -> Result<&str, AccessError> {
        self.as_str().ok_or(AccessError::WrongType)
    }

    /// Returns the object payload, or [`AccessError::WrongType`]
    pub fn get_object(&self) -> Result<&Object, AccessError> {
        self.as_object().ok_or(AccessError::WrongType)
    }

    /// Returns the array payload, or [`AccessError::WrongType`]
    pub fn get_array(&self) -> Result<&Array, AccessError> {
        self.as_array().ok_or(AccessError::WrongType)
    }

    //
    // Object access. All functions check the kind and report a sensible
    // failure when called on a non-object; none of them panic. Lookup never
    // creates a key; to add or replace one, use `set_key` (or mutate the
    // map from `as_object_mut` directly).
    //

    /// Returns true if this is an object and the key is present
    pub fn has_key(&self, key: &str) -> bool {
        self.get_key(key).is_some()
    }

    /// Returns the value at the key, or a reference to a shared immutable
    /// `null` value if this is not an object or the key is absent
    ///
    /// This is the most tolerant lookup and chains well:
    ///
    /// ```
    /// # use domson::value::Value;
    /// # let doc = Value::default();
    /// let port = doc.at_key("server").at_key("port").f64_or(80.0);
    /// assert_eq!(80.0, port);
    /// ```
    pub fn at_key(&self, key: &str) -> &Value {
        self.get_key(key).unwrap_or(&NULL)
    }

    duplicate::duplicate! {
        [
            method          self_param    ret                  as_object_method   map_get;
            [get_key]       [&self]       [Option<&Value>]     [as_object]        [get];
            [get_key_mut]   [&mut self]   [Option<&mut Value>] [as_object_mut]    [get_mut];
        ]
        /// Returns the value at the key, or `None` if this is not an object
        /// or the key is absent
        pub fn method(self_param, key: &str) -> ret {
            self.as_object_method().and_then(|map| map.map_get(key))
        }
    }

    /// Returns the value at the key, distinguishing the failure cases
    ///
    /// # Errors
    /// [`AccessError::NotObject`] if this is not an object,
    /// [`AccessError::BadKey`] if the key is absent.
    pub fn try_key(&self, key: &str) -> Result<&Value, AccessError> {
        let map = self.as_object().ok_or(AccessError::NotObject)?;
        map.get(key).ok_or(AccessError::BadKey)
    }

    /// Returns the value at the key only if it has the requested kind
    ///
    /// This is the kind-filtered lookup primitive the typed `*_at_key`
    /// accessors are built on.
    pub fn key_of_kind(&self, key: &str, kind: Kind) -> Option<&Value> {
        self.get_key(key).filter(|v| v.kind() == kind)
    }

    /// Sets the value at the key, inserting the key if it is absent and
    /// replacing its value if it is present
    ///
    /// Accepts anything a [`Value`] can be converted from.
    ///
    /// # Errors
    /// [`AccessError::NotObject`] if this is not an object; the receiver is
    /// left unchanged in that case.
    pub fn set_key(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), AccessError> {
        let map = self.as_object_mut().ok_or(AccessError::NotObject)?;
        map.insert(key.into(), value.into());
        Ok(())
    }

    /// Removes the key and drops its value
    ///
    /// # Errors
    /// [`AccessError::NotObject`] if this is not an object,
    /// [`AccessError::BadKey`] if the key is absent.
    pub fn remove_key(&mut self, key: &str) -> Result<(), AccessError> {
        self.take_key(key).map(|_| ())
    }

    /// Removes the key and hands its value to the caller, avoiding a copy
    ///
    /// # Errors
    /// [`AccessError::NotObject`] if this is not an object,
    /// [`AccessError::BadKey`] if the key is absent. The receiver is left
    /// unchanged on failure.
    pub fn take_key(&mut self, key: &str) -> Result<Value, AccessError> {
        let map = self.as_object_mut().ok_or(AccessError::NotObject)?;
        map.remove(key).ok_or(AccessError::BadKey)
    }

    /// Returns the number of members, or 0 if this is not an object
    pub fn object_len(&self) -> usize {
        self.as_object_or_empty().len()
    }

    //
    // Typed object lookups: lookup and kind check in one call, falling back
    // to the default on any failure. The result-code flavor is composition:
    // `v.try_key("k")?.get_bool()`.
    //

    /// Returns the boolean at the key, or the default on any failure
    pub fn bool_at_key(&self, key: &str, default: bool) -> bool {
        self.at_key(key).bool_or(default)
    }

    /// Returns the number at the key, or the default on any failure
    pub fn f64_at_key(&self, key: &str, default: f64) -> f64 {
        self.at_key(key).f64_or(default)
    }

    /// Returns the number at the key truncated toward zero, or the default on
    /// any failure
    pub fn i64_at_key(&self, key: &str, default: i64) -> i64 {
        self.at_key(key).i64_or(default)
    }

    /// Returns the string at the key, or the default on any failure
    pub fn str_at_key<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.at_key(key).str_or(default)
    }

    /// Returns the object at the key, or a shared empty object on any failure
    pub fn object_at_key_or_empty(&self, key: &str) -> &Object {
        self.at_key(key).as_object_or_empty()
    }

    /// Returns the array at the key, or a shared empty array on any failure
    pub fn array_at_key_or_empty(&self, key: &str) -> &Array {
        self.at_key(key).as_array_or_empty()
    }

    //
    // Array access
    //

    /// Returns the value at the index, or a reference to a shared immutable
    /// `null` value if this is not an array or the index is out of bounds
    pub fn at_index(&self, index: usize) -> &Value {
        self.get_index(index).unwrap_or(&NULL)
    }

    duplicate::duplicate! {
        [
            method            self_param    ret                  as_array_method  slice_get;
            [get_index]       [&self]       [Option<&Value>]     [as_array]       [get];
            [get_index_mut]   [&mut self]   [Option<&mut Value>] [as_array_mut]   [get_mut];
        ]
        /// Returns the value at the index, or `None` if this is not an array
        /// or the index is out of bounds
        pub fn method(self_param, index: usize) -> ret {
            self.as_array_method().and_then(|items| items.slice_get(index))
        }
    }

    /// Returns the value at the index, distinguishing the failure cases
    ///
    /// # Errors
    /// [`AccessError::NotArray`] if this is not an array,
    /// [`AccessError::BadIndex`] if the index is out of bounds.
    pub fn try_index(&self, index: usize) -> Result<&Value, AccessError> {
        let items = self.as_array().ok_or(AccessError::NotArray)?;
        items.get(index).ok_or(AccessError::BadIndex)
    }

    /// Returns the value at the index only if it has the requested kind
    pub fn index_of_kind(&self, index: usize, kind: Kind) -> Option<&Value> {
        self.get_index(index).filter(|v| v.kind() == kind)
    }

    /// Appends a value to the end of the array and returns a reference to the
    /// newly created slot
    ///
    /// Accepts anything a [`Value`] can be converted from.
    ///
    /// # Errors
    /// [`AccessError::NotArray`] if this is not an array; the receiver is left
    /// unchanged in that case.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<&mut Value, AccessError> {
        let items = self.as_array_mut().ok_or(AccessError::NotArray)?;
        items.push(value.into());
        // The append cannot leave the array empty
        Ok(items.last_mut().expect("array is non-empty after push"))
    }

    /// Returns the number of elements, or 0 if this is not an array
    pub fn array_len(&self) -> usize {
        self.as_array_or_empty().len()
    }

    /// Iterates the elements of the requested kind, skipping all others
    ///
    /// Yields nothing if this is not an array. The iterator borrows the
    /// array, so structural mutation during iteration is rejected at compile
    /// time; call the method again to restart.
    ///
    /// ```
    /// # use domson::value::{Kind, Value};
    /// let v = Value::from(vec![
    ///     Value::from(1.0), Value::from("skipped"), Value::from(2.0),
    /// ]);
    /// let numbers: Vec<f64> = v
    ///     .elements_of_kind(Kind::Number)
    ///     .map(Value::expect_f64)
    ///     .collect();
    /// assert_eq!(vec![1.0, 2.0], numbers);
    /// ```
    pub fn elements_of_kind(&self, kind: Kind) -> impl Iterator<Item = &Value> + '_ {
        self.as_array_or_empty()
            .iter()
            .filter(move |v| v.kind() == kind)
    }

    //
    // Typed array lookups
    //

    /// Returns the boolean at the index, or the default on any failure
    pub fn bool_at_index(&self, index: usize, default: bool) -> bool {
        self.at_index(index).bool_or(default)
    }

    /// Returns the number at the index, or the default on any failure
    pub fn f64_at_index(&self, index: usize, default: f64) -> f64 {
        self.at_index(index).f64_or(default)
    }

    /// Returns the number at the index truncated toward zero, or the default
    /// on any failure
    pub fn i64_at_index(&self, index: usize, default: i64) -> i64 {
        self.at_index(index).i64_or(default)
    }

    /// Returns the string at the index, or the default on any failure
    pub fn str_at_index<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
        self.at_index(index).str_or(default)
    }

    /// Returns the object at the index, or a shared empty object on any failure
    pub fn object_at_index_or_empty(&self, index: usize) -> &Object {
        self.at_index(index).as_object_or_empty()
    }

    /// Returns the array at the index, or a shared empty array on any failure
    pub fn array_at_index_or_empty(&self, index: usize) -> &Array {
        self.at_index(index).as_array_or_empty()
    }

    //
    // Kind switching
    //

    /// Makes this value `null`, dropping any previous payload
    pub fn set_null(&mut self) {
        *self = Value::Null;
    }

    /// Makes this value an empty object
    ///
    /// If it already is an object, its members are cleared in place.
    pub fn set_empty_object(&mut self) {
        match self {
            Value::Object(map) => map.clear(),
            _ => *self = Value::Object(Object::new()),
        }
    }

    /// Makes this value an empty array
    ///
    /// If it already is an array, its elements are cleared in place.
    pub fn set_empty_array(&mut self) {
        match self {
            Value::Array(items) => items.clear(),
            _ => *self = Value::Array(Array::new()),
        }
    }

    /// Stores a 64-bit integer as its decimal string representation
    ///
    /// JSON numbers are `f64`, which cannot represent every `u64` exactly;
    /// values which must round-trip exactly have to travel as strings.
    pub fn set_u64_as_string(&mut self, x: u64) {
        *self = Value::String(x.to_string());
    }

    /// Moves the value out, leaving `null` behind
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }
}

/// Creates a [`Value::Bool`]
impl From<bool> for Value {
    fn from(x: bool) -> Self {
        Value::Bool(x)
    }
}

/// Creates a [`Value::Number`]
impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

/// Creates a [`Value::Number`]; JSON numbers are always `f64`
impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Value::Number(f64::from(x))
    }
}

/// Creates a [`Value::Number`]; JSON numbers are always `f64`
///
/// Magnitudes above 2^53 lose precision; see
/// [`set_u64_as_string`](Value::set_u64_as_string) for an alternative.
impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Number(x as f64)
    }
}

/// Creates a [`Value::String`]
impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::String(x.to_owned())
    }
}

/// Creates a [`Value::String`]
impl From<String> for Value {
    fn from(x: String) -> Self {
        Value::String(x)
    }
}

/// Creates a [`Value::Object`] from the raw map
impl From<Object> for Value {
    fn from(x: Object) -> Self {
        Value::Object(x)
    }
}

/// Creates a [`Value::Array`] from the raw vector
impl From<Array> for Value {
    fn from(x: Array) -> Self {
        Value::Array(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_object() -> Value {
        let mut v = Value::default();
        v.set_empty_object();
        v.set_key("b", true).unwrap();
        v.set_key("n", 1.5).unwrap();
        v.set_key("s", "text").unwrap();
        v
    }

    #[test]
    fn default_is_null() {
        let v = Value::default();
        assert_eq!(Kind::Null, v.kind());
        assert_eq!(true, v.is_null());
    }

    #[test]
    fn kind_queries() {
        assert_eq!(Kind::Bool, Value::from(true).kind());
        assert_eq!(Kind::Number, Value::from(1.0).kind());
        assert_eq!(Kind::Number, Value::from(3_i32).kind());
        assert_eq!(Kind::String, Value::from("a").kind());
        assert_eq!(Kind::Object, Value::from(Object::new()).kind());
        assert_eq!(Kind::Array, Value::from(Array::new()).kind());

        assert_eq!(true, Value::from(1.0).is_number());
        assert_eq!(false, Value::from(1.0).is_bool());
    }

    #[test]
    fn strict_accessors() {
        assert_eq!(true, Value::from(true).expect_bool());
        assert_eq!(1.5, Value::from(1.5).expect_f64());
        assert_eq!("a", Value::from("a").expect_str());
        assert_eq!(0, Value::from(Object::new()).expect_object().len());
        assert_eq!(0, Value::from(Array::new()).expect_array().len());
    }

    #[test]
    #[should_panic(expected = "expected Bool value, but kind is String")]
    fn strict_accessor_panics_on_mismatch() {
        Value::from("not a bool").expect_bool();
    }

    #[test]
    #[should_panic(expected = "expected Object value, but kind is Null")]
    fn strict_object_accessor_panics_on_mismatch() {
        Value::Null.expect_object();
    }

    #[test]
    fn option_accessors() {
        assert_eq!(Some(true), Value::from(true).as_bool());
        assert_eq!(None, Value::from("true").as_bool());
        assert_eq!(Some(1.5), Value::from(1.5).as_f64());
        assert_eq!(Some("a"), Value::from("a").as_str());
        assert_eq!(None, Value::Null.as_str());
    }

    #[test]
    fn i64_accessor_truncates_toward_zero() {
        assert_eq!(Some(1), Value::from(1.9).as_i64());
        assert_eq!(Some(-1), Value::from(-1.9).as_i64());
        assert_eq!(None, Value::from("1").as_i64());
    }

    #[test]
    fn defaulting_accessors() {
        assert_eq!(true, Value::from(true).bool_or(false));
        assert_eq!(false, Value::Null.bool_or(false));
        // Requires exact bool kind; numbers do not widen
        assert_eq!(false, Value::from(1.0).bool_or(false));
        assert_eq!(1.5, Value::from(1.5).f64_or(0.0));
        assert_eq!(0.0, Value::from("1.5").f64_or(0.0));
        assert_eq!("a", Value::from("a").str_or("d"));
        assert_eq!("d", Value::from(1.0).str_or("d"));
    }

    #[test]
    fn empty_singletons() {
        let v = Value::from(1.0);
        assert_eq!(0, v.as_object_or_empty().len());
        assert_eq!(0, v.as_array_or_empty().len());
        assert_eq!(true, v.at_key("missing").is_null());
        assert_eq!(true, v.at_index(0).is_null());
    }

    #[test]
    fn result_code_accessors() {
        assert_eq!(Ok(true), Value::from(true).get_bool());
        assert_eq!(Err(AccessError::WrongType), Value::Null.get_bool());
        assert_eq!(Ok(1.5), Value::from(1.5).get_f64());
        assert_eq!(Err(AccessError::WrongType), Value::from(1.5).get_str());
    }

    #[test]
    fn object_lookup() {
        let v = sample_object();
        assert_eq!(true, v.has_key("b"));
        assert_eq!(false, v.has_key("missing"));
        assert_eq!(Some(&Value::Bool(true)), v.get_key("b"));
        assert_eq!(None, v.get_key("missing"));
        assert_eq!(&Value::Null, v.at_key("missing"));
        assert_eq!(3, v.object_len());

        assert_eq!(Ok(&Value::Number(1.5)), v.try_key("n"));
        assert_eq!(Err(AccessError::BadKey), v.try_key("missing"));
        assert_eq!(Err(AccessError::NotObject), Value::Null.try_key("n"));

        // Lookup never creates a key
        assert_eq!(3, v.object_len());
    }

    #[test]
    fn kind_filtered_lookup() {
        let v = sample_object();
        assert_eq!(Some(&Value::Bool(true)), v.key_of_kind("b", Kind::Bool));
        assert_eq!(None, v.key_of_kind("b", Kind::String));
        assert_eq!(None, v.key_of_kind("missing", Kind::Bool));
    }

    #[test]
    fn typed_object_lookups() {
        let v = sample_object();
        assert_eq!(true, v.bool_at_key("b", false));
        assert_eq!(1.5, v.f64_at_key("n", 0.0));
        assert_eq!(1, v.i64_at_key("n", 0));
        assert_eq!("text", v.str_at_key("s", "d"));
        // Wrong kind falls back to the default
        assert_eq!("d", v.str_at_key("n", "d"));
        // Not an object falls back too
        assert_eq!("d", Value::Null.str_at_key("s", "d"));
        assert_eq!(0, v.object_at_key_or_empty("b").len());
        assert_eq!(0, v.array_at_key_or_empty("missing").len());
    }

    #[test]
    fn object_mutation() {
        let mut v = sample_object();
        v.set_key("b", false).unwrap();
        assert_eq!(false, v.bool_at_key("b", true));
        assert_eq!(3, v.object_len());

        v.set_key("new", 2.0).unwrap();
        assert_eq!(4, v.object_len());

        assert_eq!(Err(AccessError::NotObject), Value::Null.set_key("k", 1.0));

        assert_eq!(Ok(()), v.remove_key("new"));
        assert_eq!(Err(AccessError::BadKey), v.remove_key("new"));
        assert_eq!(3, v.object_len());
    }

    #[test]
    fn take_key_detaches() {
        let mut v = sample_object();
        let detached = v.take_key("s").unwrap();
        assert_eq!(Value::from("text"), detached);
        assert_eq!(false, v.has_key("s"));
        assert_eq!(Err(AccessError::BadKey), v.take_key("s"));
    }

    #[test]
    fn object_iterates_in_key_order() {
        let mut v = Value::from(Object::new());
        v.set_key("c", 3.0).unwrap();
        v.set_key("a", 1.0).unwrap();
        v.set_key("b", 2.0).unwrap();
        let keys: Vec<&str> = v.expect_object().keys().map(String::as_str).collect();
        assert_eq!(vec!["a", "b", "c"], keys);
    }

    #[test]
    fn array_lookup() {
        let v = Value::from(vec![Value::from(1.0), Value::from("a")]);
        assert_eq!(2, v.array_len());
        assert_eq!(&Value::Number(1.0), v.at_index(0));
        assert_eq!(&Value::Null, v.at_index(2));
        assert_eq!(Some(&Value::from("a")), v.get_index(1));
        assert_eq!(None, v.get_index(2));

        assert_eq!(Ok(&Value::Number(1.0)), v.try_index(0));
        assert_eq!(Err(AccessError::BadIndex), v.try_index(2));
        assert_eq!(Err(AccessError::NotArray), Value::Null.try_index(0));

        assert_eq!(Some(&Value::from("a")), v.index_of_kind(1, Kind::String));
        assert_eq!(None, v.index_of_kind(1, Kind::Number));
    }

    #[test]
    fn typed_array_lookups() {
        let v = Value::from(vec![Value::from(true), Value::from(2.5), Value::from("s")]);
        assert_eq!(true, v.bool_at_index(0, false));
        assert_eq!(2.5, v.f64_at_index(1, 0.0));
        assert_eq!(2, v.i64_at_index(1, 0));
        assert_eq!("s", v.str_at_index(2, "d"));
        assert_eq!("d", v.str_at_index(0, "d"));
        assert_eq!("d", v.str_at_index(99, "d"));
    }

    #[test]
    fn array_push() {
        let mut v = Value::from(Array::new());
        v.push(1.0).unwrap();
        let slot = v.push("x").unwrap();
        *slot = Value::from("y");
        assert_eq!(2, v.array_len());
        assert_eq!("y", v.str_at_index(1, ""));

        assert!(matches!(
            Value::Null.push(1.0),
            Err(AccessError::NotArray)
        ));
    }

    #[test]
    fn filtered_iteration() {
        let v = Value::from(vec![
            Value::from(1.0),
            Value::from("a"),
            Value::from(2.0),
            Value::Null,
            Value::from(3.0),
        ]);
        let numbers: Vec<f64> = v
            .elements_of_kind(Kind::Number)
            .map(Value::expect_f64)
            .collect();
        assert_eq!(vec![1.0, 2.0, 3.0], numbers);

        // Restartable: a second call iterates from the start again
        assert_eq!(3, v.elements_of_kind(Kind::Number).count());
        // Yields nothing on a non-array
        assert_eq!(0, Value::Null.elements_of_kind(Kind::Number).count());
    }

    #[test]
    fn kind_switching_drops_old_payload() {
        let mut v = sample_object();
        v.set_empty_array();
        assert_eq!(Kind::Array, v.kind());
        assert_eq!(0, v.array_len());

        v.push(1.0).unwrap();
        // Already an array: cleared in place, kind unchanged
        v.set_empty_array();
        assert_eq!(0, v.array_len());

        v.set_null();
        assert_eq!(true, v.is_null());

        v.set_empty_object();
        assert_eq!(Kind::Object, v.kind());
    }

    #[test]
    fn set_u64_as_string() {
        let mut v = Value::default();
        v.set_u64_as_string(u64::MAX);
        assert_eq!("18446744073709551615", v.str_or(""));
    }

    #[test]
    fn clone_deep_copies() {
        let mut original = sample_object();
        let copy = original.clone();
        original.set_key("b", false).unwrap();
        // The copy is unaffected by mutation of the original
        assert_eq!(true, copy.bool_at_key("b", false));
    }

    #[test]
    fn take_leaves_null() {
        let mut v = sample_object();
        let moved = v.take();
        assert_eq!(true, v.is_null());
        assert_eq!(3, moved.object_len());
    }

    #[test]
    fn mutation_through_lookup() {
        let mut v = sample_object();
        *v.get_key_mut("n").unwrap() = Value::from(2.0);
        assert_eq!(2.0, v.f64_at_key("n", 0.0));

        let mut arr = Value::from(vec![Value::from(1.0)]);
        *arr.get_index_mut(0).unwrap() = Value::from("swapped");
        assert_eq!("swapped", arr.str_at_index(0, ""));
    }
}
