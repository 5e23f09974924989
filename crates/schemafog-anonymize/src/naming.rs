//! Identifier tokenization and structural feature extraction.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];
const ID_LIKE_TOKENS: &[&str] = &["id", "pid", "uid", "cid", "eid", "gid"];

/// Structural features of a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFeatures {
    /// Lowercased token.
    pub token: String,
    /// Token as it appeared in the identifier.
    pub original: String,
    pub length: usize,
    pub num_vowels: usize,
    pub num_consonants: usize,
    pub is_abbreviation: bool,
    pub is_numeric: bool,
    pub looks_like_id: bool,
    pub is_all_caps: bool,
    pub is_single_letter: bool,
    pub has_mixed_digits: bool,
}

/// Letter-case convention of a whole identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePattern {
    Snake,
    Camel,
    Upper,
    Lower,
    Mixed,
}

impl fmt::Display for CasePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CasePattern::Snake => "snake",
            CasePattern::Camel => "camel",
            CasePattern::Upper => "upper",
            CasePattern::Lower => "lower",
            CasePattern::Mixed => "mixed",
        };
        f.write_str(label)
    }
}

/// Structural features of one identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NameFeatures {
    pub original_name: String,
    pub normalized_name: String,
    pub tokens: Vec<TokenFeatures>,
    pub num_tokens: usize,
    pub has_digit_token: bool,
    pub has_abbreviation_token: bool,
    pub has_vowel_rich_token: bool,
    pub case_pattern: CasePattern,
    pub alpha_ratio: f64,
}

impl NameFeatures {
    /// Lowercase tokens joined with `separator`.
    pub fn joined_tokens(&self, separator: &str) -> String {
        self.tokens
            .iter()
            .map(|token| token.token.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Analyze one identifier.
pub fn analyze_name(name: &str) -> NameFeatures {
    let tokens: Vec<TokenFeatures> = tokenize(name)
        .iter()
        .map(|token| token_features(token))
        .collect();

    let chars: Vec<char> = name.chars().filter(|ch| *ch != '_').collect();
    let alpha = chars.iter().filter(|ch| ch.is_alphabetic()).count();
    let alpha_ratio = if chars.is_empty() {
        0.0
    } else {
        alpha as f64 / chars.len() as f64
    };

    NameFeatures {
        original_name: name.to_string(),
        normalized_name: name.to_lowercase(),
        num_tokens: tokens.len(),
        has_digit_token: tokens.iter().any(|token| token.is_numeric),
        has_abbreviation_token: tokens.iter().any(|token| token.is_abbreviation),
        has_vowel_rich_token: tokens.iter().any(|token| token.num_vowels >= 2),
        case_pattern: case_pattern(name),
        alpha_ratio,
        tokens,
    }
}

/// Compute the features of a single token.
pub fn token_features(original: &str) -> TokenFeatures {
    let token = original.to_lowercase();
    let length = token.chars().count();
    let is_numeric = !token.is_empty() && token.chars().all(|ch| ch.is_ascii_digit());
    let num_vowels = token.chars().filter(|ch| VOWELS.contains(ch)).count();
    let num_consonants = token
        .chars()
        .filter(|ch| ch.is_alphabetic() && !VOWELS.contains(ch))
        .count();

    let mut chars = original.chars();
    let is_single_letter = matches!((chars.next(), chars.next()), (Some(ch), None) if ch.is_alphabetic());

    TokenFeatures {
        is_abbreviation: !is_numeric && length <= 4 && num_consonants >= num_vowels,
        looks_like_id: ID_LIKE_TOKENS.contains(&token.as_str()),
        is_all_caps: is_all_upper(original),
        has_mixed_digits: token.chars().any(|ch| ch.is_ascii_digit())
            && token.chars().any(char::is_alphabetic),
        is_single_letter,
        is_numeric,
        length,
        num_vowels,
        num_consonants,
        original: original.to_string(),
        token,
    }
}

/// Split an identifier on underscores, whitespace, and case boundaries.
///
/// Each underscore/whitespace chunk is scanned left to right; at every
/// position the first matching rule wins:
/// 1. an uppercase run ending before `Xy`, a digit, or a word boundary
/// 2. an optional uppercase letter followed by a lowercase run
/// 3. a digit run
/// 4. any remaining uppercase run
///
/// Characters matched by no rule are dropped.
pub fn tokenize(name: &str) -> Vec<String> {
    chunk_splitter()
        .split(name)
        .filter(|chunk| !chunk.is_empty())
        .flat_map(|chunk| split_chunk(&chunk.chars().collect::<Vec<_>>()))
        .collect()
}

fn chunk_splitter() -> &'static Regex {
    static SPLITTER: OnceLock<Regex> = OnceLock::new();
    SPLITTER.get_or_init(|| Regex::new(r"[_\s]+").expect("chunk pattern is valid"))
}

fn split_chunk(chars: &[char]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let matched = upper_run_before_boundary(chars, pos)
            .or_else(|| capitalized_word(chars, pos))
            .or_else(|| run_len(chars, pos, |ch| ch.is_ascii_digit()))
            .or_else(|| run_len(chars, pos, |ch| ch.is_ascii_uppercase()));

        match matched {
            Some(len) => {
                tokens.push(chars[pos..pos + len].iter().collect());
                pos += len;
            }
            None => pos += 1,
        }
    }

    tokens
}

fn run_len(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> Option<usize> {
    let len = chars[start..].iter().take_while(|ch| pred(**ch)).count();
    (len > 0).then_some(len)
}

/// Rule 1: the longest uppercase run whose end is followed by an
/// Uppercase+lowercase pair, a digit, or a word boundary.
fn upper_run_before_boundary(chars: &[char], start: usize) -> Option<usize> {
    let run = run_len(chars, start, |ch| ch.is_ascii_uppercase())?;

    (1..=run).rev().find(|&len| {
        let end = start + len;
        let next = chars.get(end).copied();
        let after = chars.get(end + 1).copied();

        let starts_word = next.is_some_and(|ch| ch.is_ascii_uppercase())
            && after.is_some_and(|ch| ch.is_ascii_lowercase());
        let digit = next.is_some_and(|ch| ch.is_ascii_digit());
        // The run itself ends in a word character, so a boundary follows
        // exactly when the next character is not one.
        let boundary = next.is_none_or(|ch| !is_word_char(ch));

        starts_word || digit || boundary
    })
}

/// Rule 2: `[A-Z]?[a-z]+`.
fn capitalized_word(chars: &[char], start: usize) -> Option<usize> {
    let lead = usize::from(chars[start].is_ascii_uppercase());
    let lower = chars
        .get(start + lead..)
        .and_then(|rest| run_len(rest, 0, |ch| ch.is_ascii_lowercase()))?;
    Some(lead + lower)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// At least one cased character and no lowercase ones.
fn is_all_upper(value: &str) -> bool {
    value.chars().any(char::is_uppercase) && !value.chars().any(char::is_lowercase)
}

fn is_all_lower(value: &str) -> bool {
    value.chars().any(char::is_lowercase) && !value.chars().any(char::is_uppercase)
}

fn case_pattern(name: &str) -> CasePattern {
    if name.contains('_') {
        return CasePattern::Snake;
    }
    if is_all_upper(name) {
        return CasePattern::Upper;
    }
    if is_all_lower(name) {
        return CasePattern::Lower;
    }

    let chars: Vec<char> = name.chars().collect();
    if chars
        .windows(2)
        .any(|pair| pair[0].is_ascii_lowercase() && pair[1].is_ascii_uppercase())
    {
        return CasePattern::Camel;
    }
    CasePattern::Mixed
}
