//! Module for printing a [`Value`] tree as JSON text
//!
//! [`to_json`] pretty-prints with the default settings, [`to_json_with`]
//! takes explicit [`PrintSettings`]. [`Value`] also implements [`Display`],
//! which prints minified.
//!
//! Output is deterministic: object members print in key order (the order the
//! underlying map stores them in) and numbers are formatted independently of
//! the process locale, so the same tree always yields the same bytes.

use std::fmt::{self, Display, Write};

use crate::value::{Array, Object, Value};

/// Settings to customize the printed JSON text
///
/// The indent string selects between the two output modes: when it is empty,
/// output is fully minified, with no whitespace outside of strings. When it is
/// non-empty, output is pretty-printed: a newline after every opening bracket,
/// the indent repeated once per nesting level, and `": "` after object keys.
#[derive(Clone, Debug)]
pub struct PrintSettings {
    /// String inserted once per nesting level when pretty-printing; empty for
    /// minified output
    ///
    /// Defaults to a single tab.
    pub indent: String,
}

impl Default for PrintSettings {
    fn default() -> Self {
        PrintSettings {
            indent: "\t".to_owned(),
        }
    }
}

impl PrintSettings {
    /// Creates settings for minified output, for example `{"a":1,"b":[]}`
    pub fn minified() -> Self {
        PrintSettings {
            indent: String::new(),
        }
    }

    /// Creates settings for pretty-printed output with the given indent
    pub fn pretty(indent: impl Into<String>) -> Self {
        PrintSettings {
            indent: indent.into(),
        }
    }
}

/// Prints a value as JSON text with the default [`PrintSettings`]
/// (pretty-printed, tab indent)
///
/// Note that a `Value` holding a non-finite number prints it the way Rust
/// formats `f64`, which is not valid JSON; finite numbers always are.
pub fn to_json(value: &Value) -> String {
    to_json_with(value, &PrintSettings::default())
}

/// Prints a value as JSON text with the given settings, see [`to_json`]
pub fn to_json_with(value: &Value, settings: &PrintSettings) -> String {
    let mut printer = Printer {
        indent: &settings.indent,
        indent_level: 0,
        buf: String::new(),
    };
    printer.print_value(value);
    printer.buf
}

/// Prints the value as minified JSON text
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_json_with(self, &PrintSettings::minified()))
    }
}

/// Single recursive descent over the tree into a growable output buffer
struct Printer<'a> {
    /// If non-empty, we pretty-print
    indent: &'a str,
    indent_level: usize,
    buf: String,
}

impl Printer<'_> {
    /// Makes sure the buffer has room for `additional` more bytes, growing by
    /// 50% rounded up to the next 4 KiB boundary to amortize reallocation
    fn reserve_for(&mut self, additional: usize) {
        let needed = self.buf.len() + additional;
        if needed <= self.buf.capacity() {
            return;
        }
        let target = (needed * 3 / 2 + 0xfff) >> 12 << 12;
        self.buf.reserve(target - self.buf.len());
    }

    fn print_value(&mut self, value: &Value) {
        match value {
            Value::Null => {
                self.reserve_for(4);
                self.buf.push_str("null");
            }
            Value::Bool(true) => {
                self.reserve_for(4);
                self.buf.push_str("true");
            }
            Value::Bool(false) => {
                self.reserve_for(5);
                self.buf.push_str("false");
            }
            Value::Number(n) => {
                self.reserve_for(24);
                // Rust's f64 formatting: shortest digits which round-trip,
                // and the decimal separator is `.` regardless of locale
                let _ = write!(self.buf, "{n}");
            }
            Value::String(s) => self.print_quoted_string(s),
            Value::Object(map) => self.print_object(map),
            Value::Array(items) => self.print_array(items),
        }
    }

    fn print_object(&mut self, map: &Object) {
        // Special case for empty
        if map.is_empty() {
            self.reserve_for(2);
            self.buf.push_str("{}");
            return;
        }

        self.begin_block('{', map.len());
        let colon = if self.indent.is_empty() { ":" } else { ": " };
        let mut is_first = true;
        for (key, value) in map {
            self.comma(&mut is_first);
            self.print_quoted_string(key);
            self.buf.push_str(colon);
            self.print_value(value);
        }
        self.end_block('}');
    }

    fn print_array(&mut self, items: &Array) {
        // Special case for empty
        if items.is_empty() {
            self.reserve_for(2);
            self.buf.push_str("[]");
            return;
        }

        self.begin_block('[', items.len());
        let mut is_first = true;
        for value in items {
            self.comma(&mut is_first);
            self.print_value(value);
        }
        self.end_block(']');
    }

    fn begin_block(&mut self, delim: char, num_children: usize) {
        if self.indent.is_empty() {
            self.reserve_for(128 + num_children * 2);
            self.buf.push(delim);
        } else {
            // Rough estimate: body plus the indent runs for this block
            self.reserve_for(
                128 + (self.indent.len() + 4) * num_children
                    + self.indent.len() * (self.indent_level + 2),
            );
            self.buf.push(delim);
            self.buf.push('\n');
            self.indent_level += 1;
            self.write_indent();
            return;
        }
        self.indent_level += 1;
    }

    fn end_block(&mut self, delim: char) {
        self.indent_level -= 1;
        if !self.indent.is_empty() {
            self.reserve_for(2 + self.indent.len() * self.indent_level);
            self.buf.push('\n');
            self.write_indent();
        }
        self.buf.push(delim);
    }

    /// Clears the flag if this is the first element, otherwise prints the
    /// element separator
    fn comma(&mut self, is_first: &mut bool) {
        if *is_first {
            *is_first = false;
        } else if self.indent.is_empty() {
            self.buf.push(',');
        } else {
            self.buf.push_str(",\n");
            self.write_indent();
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buf.push_str(self.indent);
        }
    }

    fn print_quoted_string(&mut self, s: &str) {
        // One pass to determine how much space the escaped form needs
        let mut l = 2;
        for &b in s.as_bytes() {
            l += match b {
                b'"' | b'\\' | 0x08 | 0x0C | b'\n' | b'\r' | b'\t' => 2,
                b if b < 0x20 => 6,
                _ => 1,
            };
        }

        self.reserve_for(l);
        self.buf.push('"');
        if l == s.len() + 2 {
            // Fast path if nothing needs to be escaped
            self.buf.push_str(s);
        } else {
            for c in s.chars() {
                match c {
                    '"' => self.buf.push_str("\\\""),
                    '\\' => self.buf.push_str("\\\\"),
                    '\u{0008}' => self.buf.push_str("\\b"),
                    '\u{000C}' => self.buf.push_str("\\f"),
                    '\n' => self.buf.push_str("\\n"),
                    '\r' => self.buf.push_str("\\r"),
                    '\t' => self.buf.push_str("\\t"),
                    c if (c as u32) < 0x20 => {
                        const HEX_DIGITS: [char; 16] = [
                            '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd',
                            'e', 'f',
                        ];
                        self.buf.push_str("\\u00");
                        self.buf.push(HEX_DIGITS[(c as usize) >> 4]);
                        self.buf.push(HEX_DIGITS[(c as usize) & 0xf]);
                    }
                    c => self.buf.push(c),
                }
            }
        }
        self.buf.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn minified(value: &Value) -> String {
        to_json_with(value, &PrintSettings::minified())
    }

    fn sample() -> Value {
        let mut v = Value::from(Object::new());
        v.set_key("a", 1.0).unwrap();
        v.set_key("b", vec![Value::from(1.0), Value::from(2.0)]).unwrap();
        v.set_key("c", Object::new()).unwrap();
        v
    }

    #[test]
    fn prints_scalars() {
        assert_eq!("null", minified(&Value::Null));
        assert_eq!("true", minified(&Value::Bool(true)));
        assert_eq!("false", minified(&Value::Bool(false)));
        assert_eq!("1", minified(&Value::from(1.0)));
        assert_eq!("1.5", minified(&Value::from(1.5)));
        assert_eq!("-0.25", minified(&Value::from(-0.25)));
        assert_eq!("\"text\"", minified(&Value::from("text")));
    }

    #[test]
    fn number_decimal_separator_is_locale_independent() {
        let text = minified(&Value::from(1234.5));
        assert_eq!("1234.5", text);
        assert_eq!(true, text.contains('.'));
        assert_eq!(false, text.contains(','));
    }

    #[test]
    fn prints_minified() {
        assert_eq!(r#"{"a":1,"b":[1,2],"c":{}}"#, minified(&sample()));
    }

    #[test]
    fn prints_pretty_with_default_tab() {
        let expected = "{\n\t\"a\": 1,\n\t\"b\": [\n\t\t1,\n\t\t2\n\t],\n\t\"c\": {}\n}";
        assert_eq!(expected, to_json(&sample()));
    }

    #[test]
    fn prints_pretty_with_custom_indent() {
        let v = parse(br#"{"a": [true]}"#).unwrap();
        let expected = "{\n  \"a\": [\n    true\n  ]\n}";
        assert_eq!(expected, to_json_with(&v, &PrintSettings::pretty("  ")));
    }

    #[test]
    fn empty_collections_never_expand() {
        let v = parse(br#"{"o": {}, "a": []}"#).unwrap();
        assert_eq!("{\n\t\"a\": [],\n\t\"o\": {}\n}", to_json(&v));
        assert_eq!(r#"{"a":[],"o":{}}"#, minified(&v));
        assert_eq!("{}", to_json(&Value::from(Object::new())));
        assert_eq!("[]", to_json(&Value::from(Array::new())));
    }

    #[test]
    fn keys_print_in_key_order() {
        let v = parse(br#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        assert_eq!(r#"{"a":2,"m":3,"z":1}"#, minified(&v));
    }

    #[test]
    fn escapes_strings() {
        assert_eq!(
            r#""q\" b\\ s\b f\f n\n r\r t\t""#,
            minified(&Value::from("q\" b\\ s\u{0008} f\u{000C} n\n r\r t\t"))
        );
        // Other control characters use lowercase hex escapes
        assert_eq!(
            "\"\\u0001\\u001f\"",
            minified(&Value::from("\u{0001}\u{001f}"))
        );
        // Non-ASCII passes through raw
        assert_eq!("\"héllo 中\"", minified(&Value::from("héllo 中")));
    }

    #[test]
    fn display_is_minified() {
        assert_eq!(r#"{"a":1,"b":[1,2],"c":{}}"#, sample().to_string());
    }

    #[test]
    fn round_trips_through_parsing() {
        let input = br#"{"a": [1, 2.5, "x\ny", {"nested": null}], "b": true}"#;
        let v = parse(input).unwrap();
        assert_eq!(v, parse(minified(&v).as_bytes()).unwrap());
        assert_eq!(v, parse(to_json(&v).as_bytes()).unwrap());
    }

    #[test]
    fn minified_output_is_idempotent() {
        let v = parse(br#"{ "a" : [ 1 , 2 ] }"#).unwrap();
        let first = minified(&v);
        let again = minified(&parse(first.as_bytes()).unwrap());
        assert_eq!(first, again);
    }

    #[test]
    fn output_is_valid_for_other_parsers() {
        let v = parse(br#"{"a": [1, 2.5, "xy\n"], "b": {"c": false}}"#).unwrap();
        let ours: serde_json::Value = serde_json::from_str(&minified(&v)).unwrap();
        let pretty: serde_json::Value = serde_json::from_str(&to_json(&v)).unwrap();
        let theirs: serde_json::Value =
            serde_json::from_str(r#"{"a": [1, 2.5, "xy\n"], "b": {"c": false}}"#).unwrap();
        assert_eq!(theirs, ours);
        assert_eq!(theirs, pretty);
    }

    #[test]
    fn large_document_exercises_buffer_growth() {
        let mut v = Value::from(Array::new());
        for i in 0..2000 {
            v.push(format!("element number {i}")).unwrap();
        }
        let text = minified(&v);
        assert_eq!(true, text.len() > 0x8000);
        assert_eq!(v, parse(text.as_bytes()).unwrap());
    }
}
