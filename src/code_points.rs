/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

// https://drafts.csswg.org/css-syntax/#tokenizer-definitions

//! Code point classification.
//!
//! Every predicate takes an `Option<char>`, where `None` stands for the end of the input.
//! All of them return `false` for `None`.

/// U+FFFD REPLACEMENT CHARACTER, substituted for invalid or out-of-range code points.
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// The greatest code point defined by Unicode.
pub const MAXIMUM_ALLOWED_CODE_POINT: u32 = 0x10_FFFF;

/// A code point between U+0030 DIGIT ZERO (0) and U+0039 DIGIT NINE (9) inclusive.
#[inline]
pub fn is_digit(c: Option<char>) -> bool {
    matches!(c, Some('0'..='9'))
}

/// A digit, or a code point between U+0041 (A) and U+0046 (F),
/// or between U+0061 (a) and U+0066 (f) inclusive.
#[inline]
pub fn is_hex_digit(c: Option<char>) -> bool {
    matches!(c, Some('0'..='9' | 'A'..='F' | 'a'..='f'))
}

/// An ASCII upper or lower case letter.
#[inline]
pub fn is_letter(c: Option<char>) -> bool {
    matches!(c, Some('A'..='Z' | 'a'..='z'))
}

/// A code point greater than or equal to U+0080.
#[inline]
pub fn is_non_ascii(c: Option<char>) -> bool {
    matches!(c, Some(c) if c >= '\u{80}')
}

/// A letter, a non-ASCII code point, or U+005F LOW LINE (_).
#[inline]
pub fn is_name_start(c: Option<char>) -> bool {
    is_letter(c) || is_non_ascii(c) || c == Some('_')
}

/// A name-start code point, a digit, or U+002D HYPHEN-MINUS (-).
#[inline]
pub fn is_name(c: Option<char>) -> bool {
    is_name_start(c) || is_digit(c) || c == Some('-')
}

/// U+0020 SPACE, U+0009 CHARACTER TABULATION, or a newline.
///
/// Input preprocessing leaves U+000A LINE FEED as the only newline.
#[inline]
pub fn is_whitespace(c: Option<char>) -> bool {
    matches!(c, Some(' ' | '\t' | '\n'))
}

/// U+0000 to U+0008, U+000B, U+000E to U+001F, or U+007F DELETE.
#[inline]
pub fn is_non_printable(c: Option<char>) -> bool {
    matches!(c, Some('\0'..='\x08' | '\x0B' | '\x0E'..='\x1F' | '\x7F'))
}

#[inline]
pub(crate) fn is_newline(c: Option<char>) -> bool {
    c == Some('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREDICATES: [fn(Option<char>) -> bool; 8] = [
        is_digit,
        is_hex_digit,
        is_letter,
        is_non_ascii,
        is_name_start,
        is_name,
        is_whitespace,
        is_non_printable,
    ];

    fn check(predicate: fn(Option<char>) -> bool, yes: &str, no: &str) {
        for c in yes.chars() {
            assert!(predicate(Some(c)), "expected true for {:?}", c);
        }
        for c in no.chars() {
            assert!(!predicate(Some(c)), "expected false for {:?}", c);
        }
    }

    #[test]
    fn end_of_input_matches_nothing() {
        for predicate in PREDICATES.iter() {
            assert!(!predicate(None));
        }
        assert!(!is_newline(None));
    }

    #[test]
    fn digits() {
        check(is_digit, "0123456789", "/:aA\u{660}");
        check(is_hex_digit, "09AFaf", "/:@G`g");
    }

    #[test]
    fn letters_and_names() {
        check(is_letter, "AZaz", "@[`{0_-\u{E9}");
        check(is_non_ascii, "\u{80}\u{E9}\u{FFFD}\u{10FFFF}", "\u{7F}a\0");
        check(is_name_start, "aZ_\u{80}", "-0/:@`\u{7F}");
        check(is_name, "aZ_-09\u{80}", "/:@`\u{7F} ");
    }

    #[test]
    fn whitespace_and_newlines() {
        check(is_whitespace, " \t\n", "\x0B\x0C\x0D\u{A0}a");
        check(is_newline, "\n", "\r\x0C ");
    }

    #[test]
    fn non_printable() {
        check(
            is_non_printable,
            "\0\x08\x0B\x0E\x1F\x7F",
            "\t\n\x0C\x0D \u{80}a",
        );
    }
}
