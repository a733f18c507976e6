//! Tokenizers shared by the metric calculators

use regex::Regex;
use std::sync::OnceLock;

static TOKENIZER_13A_RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn rules_13a() -> &'static [(Regex, &'static str)] {
    TOKENIZER_13A_RULES.get_or_init(|| {
        [
            // standalone punctuation and symbols
            (r"([{-~\[-` -&(-+:-@/])", " ${1} "),
            // period and comma unless preceded by a digit
            (r"([^0-9])([\.,])", "${1} ${2} "),
            // period and comma unless followed by a digit
            (r"([\.,])([^0-9])", " ${1} ${2}"),
            // dash when preceded by a digit
            (r"([0-9])(-)", "${1} ${2} "),
        ]
        .into_iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
        .collect()
    })
}

/// The mteval-v13a tokenization used for BLEU reporting.
///
/// Splits punctuation away from words while keeping decimal numbers and
/// thousands separators intact.
pub fn tokenize_13a(text: &str) -> Vec<String> {
    let mut line = text
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");

    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    for (regex, replacement) in rules_13a() {
        line = regex.replace_all(&line, *replacement).into_owned();
    }

    line.split_whitespace().map(str::to_string).collect()
}

/// Whitespace tokenization, optionally lowercased.
pub fn tokenize_whitespace(text: &str, lowercase: bool) -> Vec<String> {
    text.split_whitespace()
        .map(|token| {
            if lowercase {
                token.to_lowercase()
            } else {
                token.to_string()
            }
        })
        .collect()
}

/// Lowercased alphanumeric runs; every other character separates tokens.
pub fn tokenize_alphanumeric(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
