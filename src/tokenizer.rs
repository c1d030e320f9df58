/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

// https://drafts.csswg.org/css-syntax/#tokenization

use crate::code_points::{
    is_digit, is_hex_digit, is_name, is_name_start, is_newline, is_non_printable, is_whitespace,
    MAXIMUM_ALLOWED_CODE_POINT, REPLACEMENT_CHARACTER,
};
use crate::stream::{ErrorPolicy, InputStream, ParseError, ParseErrorKind, SourceLocation};

use self::Token::*;

/// One of the pieces the CSS input is broken into.
#[derive(PartialEq, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// The end of the input. Returned again on every subsequent call.
    EndOfInput,

    /// A [`<ident-token>`](https://drafts.csswg.org/css-syntax/#ident-token-diagram)
    Ident(String),

    /// A [`<at-keyword-token>`](https://drafts.csswg.org/css-syntax/#at-keyword-token-diagram)
    ///
    /// The value does not include the `@` marker.
    AtKeyword(String),

    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "unrestricted"
    ///
    /// The value does not include the `#` marker.
    Hash(String),

    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "id"
    ///
    /// The value does not include the `#` marker.
    IDHash(String), // Hash that is a valid ID selector.

    /// A [`<string-token>`](https://drafts.csswg.org/css-syntax/#string-token-diagram)
    ///
    /// The value does not include the quotes.
    QuotedString(String),

    /// A [`<url-token>`](https://drafts.csswg.org/css-syntax/#url-token-diagram)
    ///
    /// The value does not include the `url(` `)` markers.
    /// Note that `url( <string-token> )` is represented by a `Function` token.
    Url(String),

    /// A `<delim-token>`
    Delim(char),

    /// A [`<number-token>`](https://drafts.csswg.org/css-syntax/#number-token-diagram)
    Number(NumericValue),

    /// A [`<percentage-token>`](https://drafts.csswg.org/css-syntax/#percentage-token-diagram)
    ///
    /// The value is not divided by 100.
    Percentage(NumericValue),

    /// A [`<dimension-token>`](https://drafts.csswg.org/css-syntax/#dimension-token-diagram)
    Dimension(NumericValue, String),

    /// A [`<whitespace-token>`](https://drafts.csswg.org/css-syntax/#whitespace-token-diagram)
    ///
    /// The value is the raw run of whitespace.
    WhiteSpace(String),

    /// A comment.
    ///
    /// The CSS Syntax spec does not generate tokens for comments,
    /// but we do unless comments are stripped beforehand.
    ///
    /// The value includes the `/*` `*/` markers.
    Comment(String),

    /// A `:` `<colon-token>`
    Colon, // :

    /// A `;` `<semicolon-token>`
    Semicolon, // ;

    /// A `,` `<comma-token>`
    Comma, // ,

    /// A `<!--` [`<CDO-token>`](https://drafts.csswg.org/css-syntax/#CDO-token-diagram)
    CDO,

    /// A `-->` [`<CDC-token>`](https://drafts.csswg.org/css-syntax/#CDC-token-diagram)
    CDC,

    /// A [`<function-token>`](https://drafts.csswg.org/css-syntax/#function-token-diagram)
    ///
    /// The value (name) does not include the `(` marker.
    Function(String),

    /// A `<(-token>`
    ParenthesisBlock,

    /// A `<[-token>`
    SquareBracketBlock,

    /// A `<{-token>`
    CurlyBracketBlock,

    /// A `<bad-url-token>`
    ///
    /// This token always indicates a parse error.
    /// The value is what was decoded before the error.
    BadUrl(String),

    /// A `<bad-string-token>`
    ///
    /// This token always indicates a parse error.
    /// The value is what was decoded before the newline.
    BadString(String),

    /// A `<)-token>`
    CloseParenthesis,

    /// A `<]-token>`
    CloseSquareBracket,

    /// A `<}-token>`
    CloseCurlyBracket,
}

impl Token {
    /// Return whether this token represents a parse error.
    ///
    /// `BadUrl` and `BadString` are tokenizer-level parse errors.
    ///
    /// `CloseParenthesis`, `CloseSquareBracket`, and `CloseCurlyBracket` are *unmatched*
    /// and therefore parse errors when they reach a parser without a matching opening token.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            *self,
            BadUrl(_) | BadString(_) | CloseParenthesis | CloseSquareBracket | CloseCurlyBracket
        )
    }
}

/// The type flag of a numeric token.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericType {
    /// Neither a fractional part nor an exponent contributed to the value.
    Integer,
    /// The spec calls this "number".
    Float,
}

/// The numeric value of `Number`, `Percentage` and `Dimension` tokens.
#[derive(PartialEq, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericValue {
    /// The value as a float
    pub value: f64,

    /// If the number has the "integer" type, the value as an integer.
    ///
    /// Saturates at `i64::MIN` and `i64::MAX`.
    pub int_value: Option<i64>,

    /// Whether the number had a `+` or `-` sign.
    pub has_sign: bool,

    /// The number as written in the source.
    pub representation: String,
}

impl NumericValue {
    /// Whether this number is an integer or a float.
    #[inline]
    pub fn numeric_type(&self) -> NumericType {
        match self.int_value {
            Some(_) => NumericType::Integer,
            None => NumericType::Float,
        }
    }
}

/// Whether comments surface as `Comment` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommentMode {
    /// Emit a `Comment` token for each comment.
    Preserve,
    /// Remove comments from the input before tokenizing it.
    Strip,
}

impl Default for CommentMode {
    fn default() -> CommentMode {
        CommentMode::Preserve
    }
}

/// How a `Tokenizer` is set up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenizerOptions {
    /// Whether parse errors abort tokenization.
    pub error_policy: ErrorPolicy,
    /// Whether comments are preserved.
    pub comments: CommentMode,
}

/// Turns CSS text into tokens, one `next_token()` call at a time.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    input: InputStream,

    /// Set once the iterator has yielded an error or reached the end.
    fused: bool,
}

impl Tokenizer {
    /// A strict tokenizer that preserves comments.
    #[inline]
    pub fn new(input: &str) -> Tokenizer {
        Tokenizer::from_stream(InputStream::new(input))
    }

    /// Create a tokenizer with the given options.
    ///
    /// With `CommentMode::Strip` the whole input goes through `strip_comments` first,
    /// which fails on an unterminated comment under the strict error policy.
    pub fn with_options(input: &str, options: TokenizerOptions) -> Result<Tokenizer, ParseError> {
        let stream = match options.comments {
            CommentMode::Preserve => InputStream::with_error_policy(input, options.error_policy),
            CommentMode::Strip => {
                let mut raw = InputStream::with_error_policy(input, options.error_policy);
                let stripped = consume_without_comments(&mut raw)?;
                // Locations of these errors refer to `input`, not to the stripped text.
                InputStream::with_error_policy(&stripped, options.error_policy)
                    .with_errors(raw.take_errors())
            }
        };
        Ok(Tokenizer::from_stream(stream))
    }

    /// Tokenize an existing stream.
    #[inline]
    pub fn from_stream(input: InputStream) -> Tokenizer {
        Tokenizer {
            input,
            fused: false,
        }
    }

    /// Consume and return the next token.
    ///
    /// At the end of the input this returns `Token::EndOfInput`, and keeps doing so.
    #[inline]
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        next_token(&mut self.input)
    }

    /// Line and column after the last consumed code point.
    #[inline]
    pub fn current_source_location(&self) -> SourceLocation {
        self.input.current_source_location()
    }

    /// Errors reported so far under the lenient policy.
    #[inline]
    pub fn errors(&self) -> &[ParseError] {
        self.input.errors()
    }
}

impl Iterator for Tokenizer {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Result<Token, ParseError>> {
        if self.fused {
            return None;
        }
        match self.next_token() {
            Ok(EndOfInput) => {
                self.fused = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(error) => {
                self.fused = true;
                Some(Err(error))
            }
        }
    }
}

/// Tokenize `input` strictly, preserving comments.
///
/// The result does not include `Token::EndOfInput`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    Tokenizer::new(input).collect()
}

/// Return `input` with every comment removed.
///
/// A `/` that does not start a comment is kept. The result is preprocessed text.
pub fn strip_comments(input: &str, error_policy: ErrorPolicy) -> Result<String, ParseError> {
    consume_without_comments(&mut InputStream::with_error_policy(input, error_policy))
}

fn consume_without_comments(input: &mut InputStream) -> Result<String, ParseError> {
    let mut stripped = String::new();
    let mut comments = 0;
    loop {
        input.consume_while(|c| c != Some('/'), &mut stripped);
        if starts_comment(input) {
            consume_comment(input)?;
            comments += 1;
        } else {
            match input.next() {
                Some(c) => stripped.push(c),
                None => break,
            }
        }
    }
    log::trace!("stripped {} comment(s)", comments);
    Ok(stripped)
}

static PUNCTUATION: phf::Map<char, Token> = phf::phf_map! {
    ',' => Token::Comma,
    ':' => Token::Colon,
    ';' => Token::Semicolon,
    '(' => Token::ParenthesisBlock,
    ')' => Token::CloseParenthesis,
    '[' => Token::SquareBracketBlock,
    ']' => Token::CloseSquareBracket,
    '{' => Token::CurlyBracketBlock,
    '}' => Token::CloseCurlyBracket,
};

fn next_token(input: &mut InputStream) -> Result<Token, ParseError> {
    if input.is_eof() {
        return Ok(EndOfInput);
    }
    if starts_comment(input) {
        return consume_comment(input);
    }
    if is_whitespace(input.peek(0)) {
        let mut value = String::new();
        input.consume_while(is_whitespace, &mut value);
        return Ok(WhiteSpace(value));
    }
    if would_start_number(input.peek(0), input.peek(1), input.peek(2)) {
        return consume_numeric(input);
    }
    if starts_identifier(input) {
        return consume_ident_like(input);
    }

    let c = match input.next() {
        Some(c) => c,
        None => return Ok(EndOfInput),
    };
    let token = match c {
        // Only reached when the escape is not valid.
        '\\' => {
            input.error(ParseErrorKind::BadEscape)?;
            Delim(c)
        }
        '"' | '\'' => return consume_string(input, c),
        '#' => {
            if is_name(input.peek(0)) || is_valid_escape(input.peek(0), input.peek(1)) {
                if starts_identifier(input) {
                    IDHash(consume_name(input)?)
                } else {
                    Hash(consume_name(input)?)
                }
            } else {
                Delim(c)
            }
        }
        '<' => {
            if input.peek(0) == Some('!') && input.peek(1) == Some('-') && input.peek(2) == Some('-')
            {
                input.advance(3);
                CDO
            } else {
                Delim(c)
            }
        }
        '-' => {
            if input.peek(0) == Some('-') && input.peek(1) == Some('>') {
                input.advance(2);
                CDC
            } else {
                Delim(c)
            }
        }
        '@' => {
            if starts_identifier(input) {
                AtKeyword(consume_name(input)?)
            } else {
                Delim(c)
            }
        }
        _ => match PUNCTUATION.get(&c) {
            Some(token) => token.clone(),
            None => Delim(c),
        },
    };
    Ok(token)
}

#[inline]
fn starts_comment(input: &InputStream) -> bool {
    input.peek(0) == Some('/') && input.peek(1) == Some('*')
}

// https://drafts.csswg.org/css-syntax/#starts-with-a-valid-escape
#[inline]
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && !is_newline(second)
}

// https://drafts.csswg.org/css-syntax/#would-start-an-identifier
//
// `--` followed by `>` is left for CDC.
fn would_start_identifier(first: Option<char>, second: Option<char>, third: Option<char>) -> bool {
    match first {
        Some('-') => {
            is_name_start(second)
                || is_valid_escape(second, third)
                || (second == Some('-') && third != Some('>'))
        }
        _ => is_name_start(first) || is_valid_escape(first, second),
    }
}

#[inline]
fn starts_identifier(input: &InputStream) -> bool {
    would_start_identifier(input.peek(0), input.peek(1), input.peek(2))
}

// https://drafts.csswg.org/css-syntax/#starts-with-a-number
fn would_start_number(first: Option<char>, second: Option<char>, third: Option<char>) -> bool {
    match first {
        Some('+') | Some('-') => is_digit(second) || (second == Some('.') && is_digit(third)),
        Some('.') => is_digit(second),
        _ => is_digit(first),
    }
}

// Assumes the input starts with `/*`.
fn consume_comment(input: &mut InputStream) -> Result<Token, ParseError> {
    input.advance(2);
    let mut comment = String::from("/*");
    loop {
        input.consume_while(|c| c != Some('*'), &mut comment);
        if input.is_eof() {
            input.error(ParseErrorKind::UnterminatedComment)?;
            return Ok(Comment(comment));
        }
        input.advance(1);
        comment.push('*');
        if input.peek(0) == Some('/') {
            input.advance(1);
            comment.push('/');
            return Ok(Comment(comment));
        }
    }
}

fn consume_string(input: &mut InputStream, ending: char) -> Result<Token, ParseError> {
    let mut value = String::new();
    loop {
        input.consume_while(
            |c| c != Some(ending) && c != Some('\\') && !is_newline(c),
            &mut value,
        );
        match input.peek(0) {
            None => {
                input.error(ParseErrorKind::UnterminatedString)?;
                return Ok(QuotedString(value));
            }
            Some('\n') => {
                // The newline is left for the next token.
                input.error(ParseErrorKind::NewlineInString)?;
                return Ok(BadString(value));
            }
            Some('\\') => {
                input.advance(1);
                match input.peek(0) {
                    // Escaped EOF, do nothing.
                    None => {}
                    // Escaped newline
                    Some('\n') => input.advance(1),
                    Some(_) => value.push(consume_escape(input)?),
                }
            }
            Some(_) => {
                input.advance(1);
                return Ok(QuotedString(value));
            }
        }
    }
}

fn consume_name(input: &mut InputStream) -> Result<String, ParseError> {
    let mut value = String::new();
    loop {
        if is_valid_escape(input.peek(0), input.peek(1)) {
            input.advance(1);
            value.push(consume_escape(input)?);
        } else if is_name(input.peek(0)) {
            input.consume_while(is_name, &mut value);
        } else {
            return Ok(value);
        }
    }
}

fn consume_ident_like(input: &mut InputStream) -> Result<Token, ParseError> {
    let value = consume_name(input)?;
    if input.peek(0) != Some('(') {
        return Ok(Ident(value));
    }
    input.advance(1);
    if value.eq_ignore_ascii_case("url") {
        while is_whitespace(input.peek(0)) && is_whitespace(input.peek(1)) {
            input.advance(1);
        }
        let is_quote = |c: Option<char>| matches!(c, Some('"') | Some('\''));
        // A quoted argument is tokenized as a string inside a function.
        if is_quote(input.peek(0)) || (is_whitespace(input.peek(0)) && is_quote(input.peek(1))) {
            return Ok(Function(value));
        }
        return consume_url(input);
    }
    Ok(Function(value))
}

fn consume_numeric(input: &mut InputStream) -> Result<Token, ParseError> {
    let value = consume_number(input);
    if starts_identifier(input) {
        let unit = consume_name(input)?;
        Ok(Dimension(value, unit))
    } else if input.peek(0) == Some('%') {
        input.advance(1);
        Ok(Percentage(value))
    } else {
        Ok(Number(value))
    }
}

fn consume_digits(input: &mut InputStream) -> String {
    let mut digits = String::new();
    input.consume_while(is_digit, &mut digits);
    digits
}

// Parse [+-]?\d*(\.\d+)?([eE][+-]?\d+)?
// This is always called so that there is at least one digit in \d*(\.\d+)?
fn consume_number(input: &mut InputStream) -> NumericValue {
    let mut representation = String::new();
    let mut negative = false;
    let has_sign = matches!(input.peek(0), Some('+') | Some('-'));
    if let Some(sign) = input.peek(0).filter(|_| has_sign) {
        negative = sign == '-';
        input.advance(1);
        representation.push(sign);
    }

    let integer_part = consume_digits(input);
    representation.push_str(&integer_part);

    let mut fractional_part = String::new();
    if input.peek(0) == Some('.') && is_digit(input.peek(1)) {
        input.advance(1);
        fractional_part = consume_digits(input);
        representation.push('.');
        representation.push_str(&fractional_part);
    }

    let mut exponent_part = String::new();
    if let Some(marker @ 'e') | Some(marker @ 'E') = input.peek(0) {
        let exponent_sign = input.peek(1).filter(|&c| c == '+' || c == '-');
        let signed = exponent_sign.is_some() && is_digit(input.peek(2));
        if signed || is_digit(input.peek(1)) {
            input.advance(1);
            representation.push(marker);
            if let Some(sign) = exponent_sign.filter(|_| signed) {
                input.advance(1);
                representation.push(sign);
            }
            exponent_part = consume_digits(input);
            representation.push_str(&exponent_part);
        }
    }

    // `representation` is always a valid float literal.
    // Out-of-range exponents round to 0 or infinity.
    let value = representation.parse::<f64>().unwrap_or(0.);
    let is_zero = |digits: &str| digits.bytes().all(|b| b == b'0');
    let int_value = if is_zero(&fractional_part) && is_zero(&exponent_part) {
        Some(digits_to_i64(&integer_part, negative))
    } else {
        None
    };
    NumericValue {
        value,
        int_value,
        has_sign,
        representation,
    }
}

// Accumulates towards the sign so that `i64::MIN` is reachable.
fn digits_to_i64(digits: &str, negative: bool) -> i64 {
    digits.bytes().fold(0i64, |value, b| {
        let digit = i64::from(b - b'0');
        let value = value.saturating_mul(10);
        if negative {
            value.saturating_sub(digit)
        } else {
            value.saturating_add(digit)
        }
    })
}

// Assumes `url(` has been consumed and the argument is not quoted.
fn consume_url(input: &mut InputStream) -> Result<Token, ParseError> {
    input.discard_while(is_whitespace);
    let mut value = String::new();
    // Whitespace is only allowed right before the closing `)`.
    let mut after_whitespace = false;
    loop {
        if input.peek(0) == Some(')') {
            input.advance(1);
            return Ok(Url(value));
        }
        let c = match input.next() {
            Some(c) => c,
            None => {
                input.error(ParseErrorKind::UnterminatedUrl)?;
                return Ok(Url(value));
            }
        };
        if after_whitespace {
            consume_bad_url_remnants(input, c)?;
            return Ok(BadUrl(value));
        }
        match c {
            ' ' | '\t' | '\n' => {
                input.discard_while(is_whitespace);
                after_whitespace = true;
            }
            '"' | '\'' | '(' => {
                input.error(ParseErrorKind::UnexpectedCharacterInUrl(c))?;
                consume_bad_url_remnants(input, c)?;
                return Ok(BadUrl(value));
            }
            '\\' => {
                if is_valid_escape(Some(c), input.peek(0)) {
                    value.push(consume_escape(input)?);
                } else {
                    input.error(ParseErrorKind::BadEscapeInUrl)?;
                    consume_bad_url_remnants(input, c)?;
                    return Ok(BadUrl(value));
                }
            }
            c if is_non_printable(Some(c)) => {
                input.error(ParseErrorKind::UnexpectedCharacterInUrl(c))?;
                consume_bad_url_remnants(input, c)?;
                return Ok(BadUrl(value));
            }
            c => value.push(c),
        }
    }
}

// Skip up to and including the closing `)`, honoring escapes.
// `last` is the code point consumed just before.
fn consume_bad_url_remnants(input: &mut InputStream, last: char) -> Result<(), ParseError> {
    let mut last = Some(last);
    loop {
        match last {
            Some(')') | None => return Ok(()),
            Some('\\') if is_valid_escape(last, input.peek(0)) => {
                consume_escape(input)?;
            }
            _ => {}
        }
        input.discard_while(|c| c != Some(')') && c != Some('\\'));
        last = input.next();
    }
}

// https://drafts.csswg.org/css-syntax/#consume-escaped-code-point
//
// Assumes that the U+005C REVERSE SOLIDUS (\) has already been consumed
// and that the next input character has already been verified
// to not be a newline.
fn consume_escape(input: &mut InputStream) -> Result<char, ParseError> {
    if is_hex_digit(input.peek(0)) {
        let mut value = 0;
        let mut digits = 0;
        while digits < 6 {
            match input.peek(0).and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    input.advance(1);
                    value = value * 16 + digit;
                    digits += 1;
                }
                None => break,
            }
        }
        if is_whitespace(input.peek(0)) {
            input.advance(1);
        }
        if value == 0 || value > MAXIMUM_ALLOWED_CODE_POINT {
            return Ok(REPLACEMENT_CHARACTER);
        }
        // Surrogates have no char.
        return Ok(std::char::from_u32(value).unwrap_or(REPLACEMENT_CHARACTER));
    }
    match input.next() {
        Some(c) => Ok(c),
        None => {
            input.error(ParseErrorKind::EscapedEndOfInput)?;
            Ok(REPLACEMENT_CHARACTER)
        }
    }
}
