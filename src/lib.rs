/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#![crate_name = "css_tokenizer"]
#![crate_type = "rlib"]
#![cfg_attr(feature = "bench", feature(test))]
#![deny(missing_docs)]

/*!

Implementation of the tokenization stage of
[CSS Syntax Module Level 3](https://drafts.csswg.org/css-syntax/) for Rust.

# Input

Input is a `&str`. It is preprocessed first: `\r\n`, `\r` and form feeds become `\n`
and NUL becomes U+FFFD.
If you have UTF-16 code units, `InputStream::from_utf16` replaces unpaired surrogates
with U+FFFD and feeds the result to a `Tokenizer` through `Tokenizer::from_stream`.

# Errors

With `ErrorPolicy::Strict` (the default) the first parse error aborts the current
`next_token()` call with a `ParseError` that carries its line and column.
With `ErrorPolicy::Lenient` the error is recorded, see `Tokenizer::errors`,
and tokenization carries on the way CSS Syntax describes.

# Comments

`Comment` tokens are produced unless `CommentMode::Strip` is selected,
in which case `strip_comments` runs over the whole input before any token is produced.

```rust
use css_tokenizer::{Token, Tokenizer};

let mut tokenizer = Tokenizer::new("a{color:red}");
assert_eq!(tokenizer.next_token(), Ok(Token::Ident("a".into())));
assert_eq!(tokenizer.next_token(), Ok(Token::CurlyBracketBlock));
```

*/

#[cfg(feature = "bench")]
extern crate test;

pub use crate::serializer::{
    serialize_identifier, serialize_name, serialize_string, serialize_unquoted_url,
    CssStringWriter, ToCss,
};
pub use crate::stream::{
    preprocess, ErrorPolicy, InputStream, ParseError, ParseErrorKind, SourceLocation,
};
pub use crate::tokenizer::{
    strip_comments, tokenize, CommentMode, NumericType, NumericValue, Token, Tokenizer,
    TokenizerOptions,
};

pub mod code_points;
mod serializer;
mod stream;
mod tokenizer;
