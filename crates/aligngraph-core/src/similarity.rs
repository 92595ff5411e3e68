//! Lexical similarity primitives.
//!
//! [`LexicalSimilarity`] is the default [`SimilarityPrimitives`]: bag-of-words
//! Jaccard over tokenised names (optionally stemmed or synonym-aware) and a
//! normalised Levenshtein string similarity. Matchers only depend on the
//! trait, so a richer scorer can be dropped in.

use crate::expression::ElementSet;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;

pub trait SimilarityPrimitives: Send + Sync {
    /// Similarity of two entity names in `[0, 1]`.
    fn name_similarity(&self, s: &str, t: &str, use_thesaurus: bool) -> f64;

    /// Word-set similarity of two phrases in `[0, 1]`.
    fn word_similarity(&self, s: &str, t: &str, stemmed: bool) -> f64;

    /// `|a ∩ b| / |a ∪ b|` over decomposition elements.
    fn weighted_jaccard(&self, a: &ElementSet, b: &ElementSet) -> f64 {
        jaccard(a, b)
    }
}

/// External synonym source consulted by name similarity.
pub trait Thesaurus: Send + Sync {
    fn are_synonyms(&self, a: &str, b: &str) -> bool;
}

/// Symmetric in-memory synonym groups.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    synonyms: AHashMap<String, AHashSet<String>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares every word in `group` synonymous with every other.
    pub fn add_group<I, S>(&mut self, group: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = group
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        for word in &words {
            let entry = self.synonyms.entry(word.clone()).or_default();
            entry.extend(words.iter().filter(|w| *w != word).cloned());
        }
        self
    }
}

impl Thesaurus for SynonymTable {
    fn are_synonyms(&self, a: &str, b: &str) -> bool {
        self.synonyms
            .get(&a.to_lowercase())
            .is_some_and(|set| set.contains(&b.to_lowercase()))
    }
}

#[derive(Default)]
pub struct LexicalSimilarity {
    thesaurus: Option<Box<dyn Thesaurus>>,
}

impl LexicalSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thesaurus(mut self, thesaurus: impl Thesaurus + 'static) -> Self {
        self.thesaurus = Some(Box::new(thesaurus));
        self
    }

    fn words_match(&self, a: &str, b: &str, use_thesaurus: bool) -> bool {
        if a == b {
            return true;
        }
        use_thesaurus
            && self
                .thesaurus
                .as_ref()
                .is_some_and(|t| t.are_synonyms(a, b))
    }

    /// Jaccard where a word counts as shared if the other side has an equal
    /// or synonymous word.
    fn matched_word_similarity(
        &self,
        a: &BTreeSet<String>,
        b: &BTreeSet<String>,
        use_thesaurus: bool,
    ) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let matched = a
            .iter()
            .filter(|wa| b.iter().any(|wb| self.words_match(wa, wb, use_thesaurus)))
            .count();
        let union = a.len() + b.len() - matched;
        (matched as f64 / union as f64).min(1.0)
    }
}

impl SimilarityPrimitives for LexicalSimilarity {
    fn name_similarity(&self, s: &str, t: &str, use_thesaurus: bool) -> f64 {
        let s_words = tokenize(s);
        let t_words = tokenize(t);
        if s_words.is_empty() || t_words.is_empty() {
            return 0.0;
        }
        let s_norm = s_words.join(" ");
        let t_norm = t_words.join(" ");
        if s_norm == t_norm {
            return 1.0;
        }

        let word_sim = self.matched_word_similarity(
            &s_words.into_iter().collect(),
            &t_words.into_iter().collect(),
            use_thesaurus,
        );
        word_sim.max(string_similarity(&s_norm, &t_norm))
    }

    fn word_similarity(&self, s: &str, t: &str, stemmed: bool) -> f64 {
        jaccard(&word_set(s, stemmed), &word_set(t, stemmed))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Plain set Jaccard; 0 when both sets are empty.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Lowercased words, split on non-alphanumerics and camelCase boundaries.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            flush(&mut current, &mut words);
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // "hasPet" -> has|Pet, "HTMLPage" -> HTML|Page
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                flush(&mut current, &mut words);
            }
        }
        current.extend(c.to_lowercase());
    }
    flush(&mut current, &mut words);
    words
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

pub fn word_set(text: &str, stemmed: bool) -> BTreeSet<String> {
    tokenize(text)
        .into_iter()
        .map(|w| if stemmed { stem(&w) } else { w })
        .collect()
}

/// Light suffix stripper for English words (expects lowercase input).
///
/// Plural endings go first, then `-ing`/`-ed`, so "papers" and "paper" meet
/// at the same stem and "submitted" reduces to "submit".
pub fn stem(word: &str) -> String {
    if word.chars().count() <= 3 || !word.is_ascii() {
        return word.to_string();
    }

    let mut w = word.to_string();
    if let Some(base) = w.strip_suffix("ies").filter(|b| b.len() >= 2) {
        w = format!("{base}y");
    } else if let Some(base) = w.strip_suffix("sses") {
        w = format!("{base}ss");
    } else if w.ends_with('s') && !w.ends_with("ss") && !w.ends_with("us") && !w.ends_with("is") {
        w.pop();
    }

    for suffix in ["ing", "ed"] {
        if let Some(base) = w.strip_suffix(suffix) {
            if base.len() >= 3 && base.chars().any(is_vowel) {
                w = undouble(base);
                break;
            }
        }
    }
    w
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

fn undouble(base: &str) -> String {
    let bytes = base.as_bytes();
    let n = bytes.len();
    if n >= 2 && bytes[n - 1] == bytes[n - 2] && !matches!(bytes[n - 1], b'l' | b's' | b'z') {
        return base[..n - 1].to_string();
    }
    base.to_string()
}

/// `1 - levenshtein / max_len` over characters.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a_chars, &b_chars) as f64 / max_len as f64
}

/// Two-row dynamic-programming edit distance.
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    let n = b.len();
    if a.is_empty() {
        return n;
    }
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for j in 1..=n {
            let cost = usize::from(*ca != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}
