/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

// https://drafts.csswg.org/css-syntax/#input-preprocessing

use crate::code_points::REPLACEMENT_CHARACTER;

/// What to do when the tokenizer reports a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorPolicy {
    /// Abort the current `next_token()` call with a `ParseError`.
    Strict,
    /// Record the error and carry on with a degraded token.
    Lenient,
}

impl Default for ErrorPolicy {
    fn default() -> ErrorPolicy {
        ErrorPolicy::Strict
    }
}

/// The line and column number for a given position within the input.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// The line number, starting at 1 for the first line.
    pub line: u32,

    /// The number of code points consumed on the current line, so 0 at the start of a line.
    pub column: u32,
}

/// The kinds of parse errors the tokenizer can report.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseErrorKind {
    /// The input ended inside a comment.
    #[error("unterminated comment")]
    UnterminatedComment,
    /// A `\` followed by a newline outside of a string.
    #[error("invalid escape sequence")]
    BadEscape,
    /// A `\` at the very end of the input.
    #[error("cannot escape end of input")]
    EscapedEndOfInput,
    /// The input ended inside a quoted string.
    #[error("unterminated string")]
    UnterminatedString,
    /// A quoted string was cut by an unescaped newline.
    #[error("newline in string")]
    NewlineInString,
    /// A quote, `(` or non-printable code point inside `url(…)`.
    #[error("unexpected character {0:?} in url")]
    UnexpectedCharacterInUrl(char),
    /// A `\` followed by a newline inside `url(…)`.
    #[error("invalid escape sequence in url")]
    BadEscapeInUrl,
    /// The input ended inside `url(…)`.
    #[error("unterminated url")]
    UnterminatedUrl,
}

/// A parse error, with the location where it was reported.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{} on line {}:{}", .kind, .location.line, .location.column)]
pub struct ParseError {
    /// Details of this error
    pub kind: ParseErrorKind,
    /// Location where this error occurred
    pub location: SourceLocation,
}

/// Normalize newlines and NUL code points.
///
/// `\r\n`, `\r` and `\x0C` each become a single `\n`,
/// and U+0000 becomes U+FFFD.
pub fn preprocess(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                output.push('\n')
            }
            '\x0C' => output.push('\n'),
            '\0' => output.push(REPLACEMENT_CHARACTER),
            c => output.push(c),
        }
    }
    output
}

/// A preprocessed sequence of code points with a read cursor.
///
/// Position only moves forward. Lookahead is done with `peek`.
#[derive(Clone, Debug)]
pub struct InputStream {
    code_points: Vec<char>,

    /// Counted in code points. From 0.
    position: usize,

    line: u32,
    column: u32,

    error_policy: ErrorPolicy,
    errors: Vec<ParseError>,
}

impl InputStream {
    /// Preprocess `input` and create a strict stream over it.
    #[inline]
    pub fn new(input: &str) -> InputStream {
        InputStream::with_error_policy(input, ErrorPolicy::Strict)
    }

    /// Preprocess `input` and create a stream over it.
    pub fn with_error_policy(input: &str, error_policy: ErrorPolicy) -> InputStream {
        InputStream {
            code_points: preprocess(input).chars().collect(),
            position: 0,
            line: 1,
            column: 0,
            error_policy,
            errors: Vec::new(),
        }
    }

    /// Create a stream from UTF-16 code units.
    ///
    /// Unpaired surrogates are replaced with U+FFFD before the usual preprocessing.
    pub fn from_utf16(input: &[u16], error_policy: ErrorPolicy) -> InputStream {
        let decoded: String = char::decode_utf16(input.iter().cloned())
            .map(|unit| unit.unwrap_or(REPLACEMENT_CHARACTER))
            .collect();
        InputStream::with_error_policy(&decoded, error_policy)
    }

    /// The code point `offset` positions after the next one, without consuming anything.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.code_points.get(self.position + offset).cloned()
    }

    /// Whether all code points have been consumed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.position >= self.code_points.len()
    }

    /// Consume the next code point, or return `None` at the end of the input.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<char> {
        let c = *self.code_points.get(self.position)?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `n` code points, or as many as there are left.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if self.next().is_none() {
                break;
            }
        }
    }

    /// Consume code points into `dest` while `predicate` holds for the next one.
    pub fn consume_while<F>(&mut self, predicate: F, dest: &mut String)
    where
        F: Fn(Option<char>) -> bool,
    {
        while !self.is_eof() && predicate(self.peek(0)) {
            if let Some(c) = self.next() {
                dest.push(c)
            }
        }
    }

    /// Consume and discard code points while `predicate` holds for the next one.
    pub fn discard_while<F>(&mut self, predicate: F)
    where
        F: Fn(Option<char>) -> bool,
    {
        while !self.is_eof() && predicate(self.peek(0)) {
            self.next();
        }
    }

    /// The number of code points consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Line and column after the last consumed code point.
    #[inline]
    pub fn current_source_location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
        }
    }

    /// The error policy this stream was created with.
    #[inline]
    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Report a parse error at the current location.
    ///
    /// Under `ErrorPolicy::Strict` this returns the error for the caller to propagate.
    /// Under `ErrorPolicy::Lenient` the error is recorded and `Ok(())` is returned.
    pub fn error(&mut self, kind: ParseErrorKind) -> Result<(), ParseError> {
        let error = ParseError {
            kind,
            location: self.current_source_location(),
        };
        log::debug!("css parse error: {}", error);
        match self.error_policy {
            ErrorPolicy::Strict => Err(error),
            ErrorPolicy::Lenient => {
                self.errors.push(error);
                Ok(())
            }
        }
    }

    /// Errors reported so far under the lenient policy.
    #[inline]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub(crate) fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Start from errors reported on another stream.
    pub(crate) fn with_errors(mut self, errors: Vec<ParseError>) -> InputStream {
        self.errors = errors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess() {
        assert_eq!(preprocess(""), "");
        assert_eq!(
            preprocess("Lorem\r\n\t\x00ipusm\ndoror\u{FFFD}\r"),
            "Lorem\n\t\u{FFFD}ipusm\ndoror\u{FFFD}\n"
        );
        assert_eq!(preprocess("a\r\rb\x0C"), "a\n\nb\n");
        assert_eq!(preprocess("\r\n\n\r"), "\n\n\n");
        assert_eq!(preprocess("only\nnewlines\n"), "only\nnewlines\n");
    }

    #[test]
    fn lone_surrogates_are_replaced() {
        let units = [0x61, 0xDCAE, 0x62, 0xD869, 0xDF98, 0xD800];
        let mut input = InputStream::from_utf16(&units, ErrorPolicy::Strict);
        let mut decoded = String::new();
        input.consume_while(|_| true, &mut decoded);
        assert_eq!(decoded, "a\u{FFFD}b\u{2A798}\u{FFFD}");
    }

    #[test]
    fn peek_does_not_advance() {
        let mut input = InputStream::new("Thisこれは猫");
        assert_eq!(input.peek(0), Some('T'));
        assert_eq!(input.peek(2), Some('i'));
        assert_eq!(input.position(), 0);
        input.advance(4);
        assert_eq!(input.peek(0), Some('こ'));
        assert_eq!(input.peek(3), Some('猫'));
        assert_eq!(input.peek(4), None);
        assert_eq!(input.next(), Some('こ'));
        assert_eq!(input.next(), Some('れ'));
        assert_eq!(input.next(), Some('は'));
        assert_eq!(input.next(), Some('猫'));
        assert!(input.is_eof());
        assert_eq!(input.next(), None);
        assert_eq!(input.next(), None);
        assert_eq!(input.position(), 8);
    }

    #[test]
    fn line_and_column_accounting() {
        let mut input = InputStream::new("ab\r\ncd\x0Ce");
        assert_eq!(input.current_source_location(), SourceLocation { line: 1, column: 0 });
        input.advance(2);
        assert_eq!(input.current_source_location(), SourceLocation { line: 1, column: 2 });
        input.advance(1);
        assert_eq!(input.current_source_location(), SourceLocation { line: 2, column: 0 });
        input.advance(3);
        assert_eq!(input.current_source_location(), SourceLocation { line: 3, column: 0 });
        input.advance(10);
        assert_eq!(input.current_source_location(), SourceLocation { line: 3, column: 1 });
    }

    #[test]
    fn error_policies() {
        let mut strict = InputStream::new("foo\nbar");
        strict.advance(6);
        assert_eq!(
            strict.error(ParseErrorKind::UnterminatedString),
            Err(ParseError {
                kind: ParseErrorKind::UnterminatedString,
                location: SourceLocation { line: 2, column: 2 },
            })
        );
        assert!(strict.errors().is_empty());

        let mut lenient = InputStream::with_error_policy("foo", ErrorPolicy::Lenient);
        lenient.advance(1);
        assert_eq!(lenient.error(ParseErrorKind::BadEscape), Ok(()));
        assert_eq!(lenient.errors().len(), 1);
        assert_eq!(lenient.errors()[0].to_string(), "invalid escape sequence on line 1:1");
    }
}
