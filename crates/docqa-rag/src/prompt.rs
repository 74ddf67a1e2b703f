use docqa_core::types::ScoredMatch;

/// Passage texts in the order given, separated by a blank line.
pub fn build_context(matches: &[ScoredMatch]) -> String {
    matches
        .iter()
        .map(|m| m.passage.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Whether `answer` is empty or just the don't-know sentinel.
///
/// Comparison ignores case, surrounding quotes, trailing periods and curly
/// apostrophes, which small models add freely.
pub fn is_dont_know(answer: &str, sentinel: &str) -> bool {
    let answer = normalize(answer);
    answer.is_empty() || answer == normalize(sentinel)
}

fn normalize(s: &str) -> String {
    s.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}'))
        .trim()
        .trim_end_matches('.')
        .replace('\u{2019}', "'")
        .to_lowercase()
}
