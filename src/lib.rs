#![warn(missing_docs)]
#![forbid(unsafe_code)]
// Allow needless `return` because that makes it sometimes more obvious that
// an expression is the result of the function
#![allow(clippy::needless_return)]
// Allow `assert_eq!(true, ...)` because in some cases it is used to check a bool
// value and not a 'flag' / 'state', and `assert_eq!` makes that more explicit
#![allow(clippy::bool_assert_comparison)]
// Enable 'unused' warnings for doc tests (are disabled by default)
#![doc(test(no_crate_inject))]
#![doc(test(attr(warn(unused))))]
// Fail on warnings in doc tests
#![doc(test(attr(deny(warnings))))]

//! Domson is a JSON DOM library: it parses a complete JSON document into an
//! in-memory tree of [`Value`](value::Value)s, lets you navigate and mutate
//! that tree with type-safe, default-tolerant accessors, and prints the tree
//! back to JSON text.
//!
//! It is *not* a streaming parser — the whole document is parsed into memory
//! before any query can be answered — and it is *not* an object mapper which
//! converts structs to JSON and vice versa; a dedicated library such as
//! [Serde](https://github.com/serde-rs/json) should be used for that.
//! All JSON numbers are stored as `f64`.
//!
//! # Terminology
//!
//! This crate uses the same terminology as the JSON specification:
//!
//! - *object*: `{ ... }`, an ordered-by-key mapping from string to value
//! - *array*: `[ ... ]`, an ordered sequence of values
//! - *literal*: `true`, `false` or `null`
//! - *number*: number value, for example `123.4e+10`
//! - *string*: string value, for example `"text in \"quotes\""`
//!
//! # Usage examples
//!
//! ## Parsing and navigating
//!
//! ```
//! use domson::parser::parse;
//!
//! let json = br#"{"name": "squirrel", "tags": ["small", "fast"], "mass": 0.5}"#;
//! let value = parse(json)?;
//!
//! assert_eq!("squirrel", value.str_at_key("name", "?"));
//! assert_eq!(0.5, value.f64_at_key("mass", 0.0));
//! // Missing keys and wrong kinds fall back to the default instead of failing
//! assert_eq!(true, value.bool_at_key("alive", true));
//! assert_eq!("small", value.at_key("tags").at_index(0).str_or(""));
//! # Ok::<(), domson::parser::ParseError>(())
//! ```
//!
//! ## Building and printing
//!
//! ```
//! use domson::value::Value;
//! use domson::printer::{to_json_with, PrintSettings};
//!
//! let mut value = Value::default();
//! value.set_empty_object();
//! value.set_key("a", 1.0).unwrap();
//! value.set_key("b", Vec::<Value>::new()).unwrap();
//!
//! assert_eq!(r#"{"a":1,"b":[]}"#, to_json_with(&value, &PrintSettings::minified()));
//! ```
//!
//! # Error handling
//!
//! Three disjoint error channels exist and are never mixed:
//!
//! - Malformed input is reported by the parser as a [`ParseError`](parser::ParseError)
//!   value with a message, 1-based line and 0-based byte offset. It is never a panic.
//! - Misusing a strict accessor (for example [`expect_bool`](value::Value::expect_bool)
//!   on a string) is a caller bug and panics. The defaulting and result-code accessor
//!   families exist precisely so callers with uncertain input never have to trigger
//!   these panics.
//! - Failed lookups and conversions return an [`AccessError`](value::AccessError)
//!   or a caller-supplied default, and never panic.

pub mod coerce;
pub mod parser;
pub mod printer;
pub mod value;
