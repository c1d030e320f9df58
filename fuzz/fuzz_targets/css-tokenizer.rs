#![no_main]

use css_tokenizer::*;

const DEBUG: bool = false;

fn options(error_policy: ErrorPolicy, comments: CommentMode) -> TokenizerOptions {
    TokenizerOptions {
        error_policy,
        comments,
    }
}

fn tokenize_leniently(input: &str, comments: CommentMode) -> (Vec<Token>, Vec<ParseError>) {
    let mut tokenizer =
        Tokenizer::with_options(input, options(ErrorPolicy::Lenient, comments)).unwrap();
    let tokens = tokenizer.by_ref().map(Result::unwrap).collect();
    (tokens, tokenizer.errors().to_vec())
}

fn fuzz(data: &str, comments: CommentMode) {
    let (tokens, errors) = tokenize_leniently(data, comments);
    if DEBUG {
        println!("{:?}", tokens);
    }

    // Strict tokenization fails exactly where lenient tokenization first recovers.
    if comments == CommentMode::Preserve {
        match tokenize(data) {
            Ok(strict) => {
                assert!(errors.is_empty());
                assert_eq!(strict, tokens);
            }
            Err(error) => assert_eq!(Some(&error), errors.first()),
        }
    }

    // TODO: Compare token streams once numbers serialize back to the same
    // representation. dtoa rounding changes values near the precision limits.
    let serialization = tokens.to_css_string();
    let _ = tokenize_leniently(&serialization, comments);
}

libfuzzer_sys::fuzz_target!(|data: &str| {
    fuzz(data, CommentMode::Preserve);
    fuzz(data, CommentMode::Strip);
});
