/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt::{self, Write};

use crate::tokenizer::NumericValue;
use crate::tokenizer::Token::{self, *};

/// Trait for things that can serialize themselves in CSS syntax.
pub trait ToCss {
    /// Serialize `self` in CSS syntax, writing to `dest`.
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write;

    /// Serialize `self` in CSS syntax and return a string.
    ///
    /// (This is a convenience wrapper for `to_css` and probably should not be overridden.)
    #[inline]
    fn to_css_string(&self) -> String {
        let mut s = String::new();
        // Writing to a `String` does not fail.
        let _ = self.to_css(&mut s);
        s
    }
}

impl ToCss for Token {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            EndOfInput => {}
            Ident(ref value) => serialize_identifier(value, dest)?,
            AtKeyword(ref value) => {
                dest.write_str("@")?;
                serialize_identifier(value, dest)?;
            }
            Hash(ref value) => {
                dest.write_str("#")?;
                serialize_name(value, dest)?;
            }
            IDHash(ref value) => {
                dest.write_str("#")?;
                serialize_identifier(value, dest)?;
            }
            QuotedString(ref value) => serialize_string(value, dest)?,
            Url(ref value) => {
                dest.write_str("url(")?;
                serialize_unquoted_url(value, dest)?;
                dest.write_str(")")?;
            }
            // A lone backslash has to be followed by a newline to not start an escape.
            Delim('\\') => dest.write_str("\\\n")?,
            Delim(value) => dest.write_char(value)?,

            Number(ref value) => write_numeric(value, dest)?,
            Percentage(ref value) => {
                write_numeric(value, dest)?;
                dest.write_str("%")?;
            }
            Dimension(ref value, ref unit) => {
                write_numeric(value, dest)?;
                // Disambiguate with scientific notation.
                let mut chars = unit.chars();
                match (chars.next(), chars.next()) {
                    (Some(e @ 'e'), next) | (Some(e @ 'E'), next)
                        if next.map_or(true, |c| c == '-' || c.is_ascii_digit()) =>
                    {
                        hex_escape(e as u8, dest)?;
                        serialize_name(&unit[1..], dest)?;
                    }
                    _ => serialize_identifier(unit, dest)?,
                }
            }

            WhiteSpace(ref content) => dest.write_str(content)?,
            Comment(ref content) => {
                dest.write_str(content)?;
                if content.len() < 4 || !content.ends_with("*/") {
                    dest.write_str("*/")?;
                }
            }
            Colon => dest.write_str(":")?,
            Semicolon => dest.write_str(";")?,
            Comma => dest.write_str(",")?,
            CDO => dest.write_str("<!--")?,
            CDC => dest.write_str("-->")?,

            Function(ref name) => {
                serialize_identifier(name, dest)?;
                dest.write_str("(")?;
            }
            ParenthesisBlock => dest.write_str("(")?,
            SquareBracketBlock => dest.write_str("[")?,
            CurlyBracketBlock => dest.write_str("{")?,

            BadUrl(ref contents) => {
                dest.write_str("url(")?;
                serialize_unquoted_url(contents, dest)?;
                // An unescaped `(` makes the url bad, the `)` ends it.
                dest.write_str("()")?;
            }
            BadString(ref value) => {
                // The string is cut by the newline, which is not part of the token.
                dest.write_str("\"")?;
                CssStringWriter::new(dest).write_str(value)?;
                dest.write_str("\n")?;
            }
            CloseParenthesis => dest.write_str(")")?,
            CloseSquareBracket => dest.write_str("]")?,
            CloseCurlyBracket => dest.write_str("}")?,
        }
        Ok(())
    }
}

/// Serialize a sequence of tokens.
///
/// An empty comment is inserted between tokens that would otherwise merge
/// when tokenized again.
impl ToCss for [Token] {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut previous: Option<&Token> = None;
        for token in self {
            if let Some(prev) = previous {
                if needs_separator(prev, token) {
                    dest.write_str("/**/")?;
                }
                // Skip the newline already written after the previous token.
                if let WhiteSpace(ref content) = *token {
                    if ends_with_newline(prev) && content.starts_with('\n') {
                        dest.write_str(&content[1..])?;
                        previous = Some(token);
                        continue;
                    }
                }
            }
            token.to_css(dest)?;
            previous = Some(token);
        }
        Ok(())
    }
}

#[inline]
fn ends_with_newline(token: &Token) -> bool {
    matches!(*token, Delim('\\') | BadString(_))
}

fn needs_separator(a: &Token, b: &Token) -> bool {
    let b_is_identifier_like = matches!(*b, Ident(_) | Function(_) | Url(_) | BadUrl(_));
    let b_is_numeric = matches!(*b, Number(_) | Percentage(_) | Dimension(..));
    match *a {
        Ident(_) => {
            b_is_identifier_like
                || b_is_numeric
                || matches!(*b, Delim('-') | CDC | ParenthesisBlock)
        }
        AtKeyword(_) | Hash(_) | IDHash(_) | Dimension(..) | Delim('#') | Delim('-') => {
            b_is_identifier_like || b_is_numeric || matches!(*b, Delim('-') | CDC)
        }
        Number(_) => b_is_identifier_like || b_is_numeric || *b == Delim('%'),
        Delim('@') => b_is_identifier_like || matches!(*b, Delim('-') | CDC),
        Delim('.') | Delim('+') => b_is_numeric,
        Delim('/') => *b == Delim('*'),
        _ => false,
    }
}

fn write_numeric<W>(value: &NumericValue, dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    // Negative zero gets no sign.
    if value.has_sign && value.value.is_sign_positive() {
        dest.write_str("+")?;
    }

    if let Some(int_value) = value.int_value {
        return dest.write_str(itoa::Buffer::new().format(int_value));
    }

    let float = value.value.clamp(f64::MIN, f64::MAX);
    let notation = dtoa_short::write(dest, float)?;
    if float.fract() == 0. && !notation.decimal_point && !notation.scientific {
        dest.write_str(".0")?;
    }
    Ok(())
}

fn hex_escape<W>(ascii_byte: u8, dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    write!(dest, "\\{:x} ", ascii_byte)
}

fn char_escape<W>(ascii_byte: u8, dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    write!(dest, "\\{}", ascii_byte as char)
}

/// Write a CSS identifier, escaping characters as necessary.
pub fn serialize_identifier<W>(mut value: &str, dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    if value.is_empty() {
        return Ok(());
    }

    if value.starts_with("--") {
        dest.write_str("--")?;
        serialize_name(&value[2..], dest)
    } else if value == "-" {
        dest.write_str("\\-")
    } else {
        if value.starts_with('-') {
            dest.write_str("-")?;
            value = &value[1..];
        }
        if let Some(&digit @ b'0'..=b'9') = value.as_bytes().first() {
            hex_escape(digit, dest)?;
            value = &value[1..];
        }
        serialize_name(value, dest)
    }
}

/// Write a CSS name, like a custom property name.
///
/// You should only use this when you know what you're doing, when in doubt,
/// consider using `serialize_identifier`.
pub fn serialize_name<W>(value: &str, dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    let mut chunk_start = 0;
    for (i, b) in value.bytes().enumerate() {
        let escaped = match b {
            b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'-' => continue,
            _ if !b.is_ascii() => continue,
            b'\0' => Some("\u{FFFD}"),
            _ => None,
        };
        dest.write_str(&value[chunk_start..i])?;
        if let Some(escaped) = escaped {
            dest.write_str(escaped)?;
        } else if (b'\x01'..=b'\x1F').contains(&b) || b == b'\x7F' {
            hex_escape(b, dest)?;
        } else {
            char_escape(b, dest)?;
        }
        chunk_start = i + 1;
    }
    dest.write_str(&value[chunk_start..])
}

/// Write the contents of an unquoted `url(…)` token, escaping characters as necessary.
pub fn serialize_unquoted_url<W>(value: &str, dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    let mut chunk_start = 0;
    for (i, b) in value.bytes().enumerate() {
        let hex = match b {
            b'\0'..=b' ' | b'\x7F' => true,
            b'(' | b')' | b'"' | b'\'' | b'\\' => false,
            _ => continue,
        };
        dest.write_str(&value[chunk_start..i])?;
        if hex {
            hex_escape(b, dest)?;
        } else {
            char_escape(b, dest)?;
        }
        chunk_start = i + 1;
    }
    dest.write_str(&value[chunk_start..])
}

/// Write a double-quoted CSS string token, escaping content as necessary.
pub fn serialize_string<W>(value: &str, dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    dest.write_str("\"")?;
    CssStringWriter::new(dest).write_str(value)?;
    dest.write_str("\"")?;
    Ok(())
}

/// A `fmt::Write` adapter that escapes text for writing as a double-quoted CSS string.
/// Quotes are not included.
///
/// Typical usage:
///
/// ```{rust,ignore}
/// fn write_foo<W>(foo: &Foo, dest: &mut W) -> fmt::Result where W: fmt::Write {
///     dest.write_str("\"")?;
///     {
///         let mut string_dest = CssStringWriter::new(dest);
///         // Write into string_dest...
///     }
///     dest.write_str("\"")?;
///     Ok(())
/// }
/// ```
pub struct CssStringWriter<'a, W> {
    inner: &'a mut W,
}

impl<'a, W> CssStringWriter<'a, W>
where
    W: fmt::Write,
{
    /// Wrap a text writer to create a `CssStringWriter`.
    pub fn new(inner: &'a mut W) -> CssStringWriter<'a, W> {
        CssStringWriter { inner }
    }
}

impl<'a, W> fmt::Write for CssStringWriter<'a, W>
where
    W: fmt::Write,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut chunk_start = 0;
        for (i, b) in s.bytes().enumerate() {
            let escaped = match b {
                b'"' => Some("\\\""),
                b'\\' => Some("\\\\"),
                b'\0' => Some("\u{FFFD}"),
                b'\x01'..=b'\x1F' | b'\x7F' => None,
                _ => continue,
            };
            self.inner.write_str(&s[chunk_start..i])?;
            match escaped {
                Some(x) => self.inner.write_str(x)?,
                None => hex_escape(b, self.inner)?,
            };
            chunk_start = i + 1;
        }
        self.inner.write_str(&s[chunk_start..])
    }
}
