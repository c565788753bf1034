//! Context-guarded JSON generation.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::token::{Decimal, Number};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Root,
    Object,
    Array,
}

/// Writes well-formed, compact JSON to a byte sink.
///
/// The writer tracks a single context (root, object, or array) plus a child
/// counter, emits separators itself, and escapes strings. Nested containers
/// run a body closure with the writer bound to the child context. No
/// insignificant whitespace is ever inserted; [`new_line`](Self::new_line)
/// emits the one byte separating JSON-lines values.
///
/// # Panics
///
/// Context misuse is a caller bug and panics rather than producing
/// malformed output: a named write outside an object, an unnamed value
/// inside an object, a second top-level value without `new_line`, or
/// `new_line` inside a container.
///
/// # Examples
///
/// ```
/// use jsonpull::JsonWriter;
///
/// let mut out = Vec::new();
/// let mut writer = JsonWriter::new(&mut out);
/// writer
///     .object(|w| {
///         w.field("name", "ada")?;
///         w.array_field("scores", |w| {
///             w.value(1)?;
///             w.value(2)
///         })
///     })
///     .unwrap();
/// assert_eq!(out, br#"{"name":"ada","scores":[1,2]}"#);
/// ```
pub struct JsonWriter<W> {
    out: W,
    context: Context,
    children: usize,
}

impl JsonWriter<BufWriter<File>> {
    /// Creates the file at `path` and writes JSON to it.
    pub fn create<P: AsRef<std::path::Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonWriter<W> {
    /// Creates a writer over any byte sink. The sink is owned exclusively;
    /// one sink call is made per emitted fragment.
    pub fn new(sink: W) -> Self {
        Self {
            out: sink,
            context: Context::Root,
            children: 0,
        }
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes an unnamed scalar at the root or inside an array.
    pub fn value<V: ToJson>(&mut self, value: V) -> io::Result<()> {
        self.before_unnamed()?;
        value.write_json(&mut self.out)
    }

    /// Writes a `name: value` property inside an object.
    pub fn field<V: ToJson>(&mut self, name: &str, value: V) -> io::Result<()> {
        self.before_named(name)?;
        value.write_json(&mut self.out)
    }

    /// Writes an unnamed `null` at the root or inside an array.
    pub fn null_value(&mut self) -> io::Result<()> {
        self.before_unnamed()?;
        self.out.write_all(b"null")
    }

    /// Writes a `name: null` property inside an object.
    pub fn null_field(&mut self, name: &str) -> io::Result<()> {
        self.before_named(name)?;
        self.out.write_all(b"null")
    }

    /// Writes an unnamed object, invoking `body` between the braces.
    pub fn object<F>(&mut self, body: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.before_unnamed()?;
        self.container(Context::Object, b"{", b"}", body)
    }

    /// Writes a `name: {...}` property inside an object.
    pub fn object_field<F>(&mut self, name: &str, body: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.before_named(name)?;
        self.container(Context::Object, b"{", b"}", body)
    }

    /// Writes an unnamed array, invoking `body` between the brackets.
    pub fn array<F>(&mut self, body: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.before_unnamed()?;
        self.container(Context::Array, b"[", b"]", body)
    }

    /// Writes a `name: [...]` property inside an object.
    pub fn array_field<F>(&mut self, name: &str, body: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.before_named(name)?;
        self.container(Context::Array, b"[", b"]", body)
    }

    /// Emits a raw newline, separating top-level values (JSON-lines).
    pub fn new_line(&mut self) -> io::Result<()> {
        assert!(
            self.context == Context::Root,
            "new_line inside a container"
        );
        self.children = 0;
        self.out.write_all(b"\n")
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn container<F>(&mut self, context: Context, open: &[u8], close: &[u8], body: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.out.write_all(open)?;
        let parent = (self.context, self.children);
        self.context = context;
        self.children = 0;
        let result = body(self);
        self.context = parent.0;
        self.children = parent.1;
        result?;
        self.out.write_all(close)
    }

    fn before_unnamed(&mut self) -> io::Result<()> {
        match self.context {
            Context::Object => panic!("unnamed value inside an object; use the *_field methods"),
            Context::Root => assert!(
                self.children == 0,
                "second top-level value; call new_line between JSON-lines values"
            ),
            Context::Array => {
                if self.children > 0 {
                    self.out.write_all(b",")?;
                }
            }
        }
        self.children += 1;
        Ok(())
    }

    fn before_named(&mut self, name: &str) -> io::Result<()> {
        assert!(
            self.context == Context::Object,
            "named value outside an object"
        );
        if self.children > 0 {
            self.out.write_all(b",")?;
        }
        self.children += 1;
        write_escaped(&mut self.out, name)?;
        self.out.write_all(b":")
    }
}

/// Scalar values the writer can emit: strings, booleans, numerics, and the
/// parser's own [`Number`] and [`Decimal`] for re-emission.
pub trait ToJson {
    /// Writes `self` as a single JSON value.
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl<T: ToJson + ?Sized> ToJson for &T {
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        (**self).write_json(out)
    }
}

impl ToJson for str {
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        write_escaped(out, self)
    }
}

impl ToJson for String {
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        write_escaped(out, self)
    }
}

impl ToJson for bool {
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(if *self { b"true" } else { b"false" })
    }
}

macro_rules! impl_to_json_for_integer {
    ($($t:ty),*) => {
        $(
            impl ToJson for $t {
                fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
                    write!(out, "{self}")
                }
            }
        )*
    };
}

impl_to_json_for_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToJson for f64 {
    /// Integral finite doubles keep a trailing `.0` so they re-parse as
    /// doubles; non-finite values have no JSON form and are written `null`.
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        if !self.is_finite() {
            return out.write_all(b"null");
        }
        if self.fract() == 0.0 {
            write!(out, "{self:.1}")
        } else {
            write!(out, "{self}")
        }
    }
}

impl ToJson for f32 {
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        f64::from(*self).write_json(out)
    }
}

impl ToJson for Number {
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            Number::Int(value) => write!(out, "{value}"),
            Number::Double(value) => value.write_json(out),
            Number::Decimal(value) => value.write_json(out),
        }
    }
}

impl ToJson for Decimal {
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.as_str().as_bytes())
    }
}

/// Escapes `"`, `\`, and every byte below 0x20; the common controls use
/// their short forms and the rest fall back to `\u00XX`. Runs of safe bytes
/// are written in one piece.
fn write_escaped(out: &mut dyn Write, s: &str) -> io::Result<()> {
    out.write_all(b"\"")?;
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if byte >= 0x20 && byte != b'"' && byte != b'\\' {
            continue;
        }
        out.write_all(&bytes[start..i])?;
        match byte {
            b'"' => out.write_all(b"\\\"")?,
            b'\\' => out.write_all(b"\\\\")?,
            b'\n' => out.write_all(b"\\n")?,
            b'\r' => out.write_all(b"\\r")?,
            b'\t' => out.write_all(b"\\t")?,
            0x08 => out.write_all(b"\\b")?,
            0x0C => out.write_all(b"\\f")?,
            _ => write!(out, "\\u{byte:04x}")?,
        }
        start = i + 1;
    }
    out.write_all(&bytes[start..])?;
    out.write_all(b"\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written<F>(build: F) -> String
    where
        F: FnOnce(&mut JsonWriter<&mut Vec<u8>>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        let mut writer = JsonWriter::new(&mut out);
        build(&mut writer).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn nested_containers_and_separators() {
        let json = written(|w| {
            w.object(|w| {
                w.array_field("a", |w| {
                    w.value(1)?;
                    w.value(2)?;
                    w.object(|w| w.null_field("b"))
                })?;
                w.field("c", "x")
            })
        });
        assert_eq!(json, r#"{"a":[1,2,{"b":null}],"c":"x"}"#);
    }

    #[test]
    fn empty_containers() {
        assert_eq!(written(|w| w.object(|_| Ok(()))), "{}");
        assert_eq!(written(|w| w.array(|_| Ok(()))), "[]");
    }

    #[test]
    fn scalar_forms() {
        assert_eq!(written(|w| w.value(true)), "true");
        assert_eq!(written(|w| w.value(false)), "false");
        assert_eq!(written(|w| w.null_value()), "null");
        assert_eq!(written(|w| w.value(-42)), "-42");
        assert_eq!(written(|w| w.value(0.5)), "0.5");
        // Integral doubles keep their double-ness.
        assert_eq!(written(|w| w.value(3.0)), "3.0");
        assert_eq!(written(|w| w.value(f64::INFINITY)), "null");
        assert_eq!(written(|w| w.value("hi")), "\"hi\"");
    }

    #[test]
    fn number_reemission_is_exact() {
        let decimal: Decimal = "-12.3400e+5".parse().unwrap();
        assert_eq!(written(|w| w.value(Number::Decimal(decimal))), "-12.3400e+5");
        assert_eq!(written(|w| w.value(Number::Int(7))), "7");
    }

    #[test]
    fn string_escaping() {
        assert_eq!(
            written(|w| w.value("a\"b\\c\nd\re\tf\u{8}g\u{c}h")),
            r#""a\"b\\c\nd\re\tf\bg\fh""#
        );
        // Controls without a short form use \u00XX.
        assert_eq!(written(|w| w.value("\u{1}")), "\"\\u0001\"");
        // Multi-byte UTF-8 passes through unescaped.
        assert_eq!(written(|w| w.value("€😀")), "\"€😀\"");
    }

    #[test]
    fn escaped_names() {
        let json = written(|w| w.object(|w| w.field("a\"b", 1)));
        assert_eq!(json, r#"{"a\"b":1}"#);
    }

    #[test]
    fn json_lines() {
        let json = written(|w| {
            w.object(|w| w.field("n", 1))?;
            w.new_line()?;
            w.value(2)?;
            w.new_line()?;
            w.object(|w| w.field("n", 3))
        });
        assert_eq!(json, "{\"n\":1}\n2\n{\"n\":3}");
    }

    #[test]
    #[should_panic(expected = "named value outside an object")]
    fn named_write_at_root_panics() {
        let mut out = Vec::new();
        let _ = JsonWriter::new(&mut out).field("a", 1);
    }

    #[test]
    #[should_panic(expected = "unnamed value inside an object")]
    fn unnamed_write_in_object_panics() {
        let mut out = Vec::new();
        let _ = JsonWriter::new(&mut out).object(|w| w.value(1));
    }

    #[test]
    #[should_panic(expected = "second top-level value")]
    fn second_root_value_panics() {
        let mut out = Vec::new();
        let mut writer = JsonWriter::new(&mut out);
        writer.value(1).unwrap();
        let _ = writer.value(2);
    }

    #[test]
    #[should_panic(expected = "new_line inside a container")]
    fn new_line_in_container_panics() {
        let mut out = Vec::new();
        let _ = JsonWriter::new(&mut out).array(|w| w.new_line());
    }
}
