use std::collections::HashMap;

/// Bracket characters dropped before any comparison
const BRACKETS: [char; 8] = ['「', '」', '『', '』', '（', '）', '(', ')'];

/// Canonical form for comparing text: no brackets, no whitespace of any width
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !BRACKETS.contains(c) && !c.is_whitespace())
        .collect()
}

/// `normalize` plus full-width digits folded to ASCII
pub fn normalize_for_alignment(text: &str) -> String {
    text.chars()
        .filter(|c| !BRACKETS.contains(c) && !c.is_whitespace())
        .map(fold_digit)
        .collect()
}

fn fold_digit(c: char) -> char {
    match c {
        '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
        _ => c,
    }
}

/// Memo for `normalize_for_alignment` over strings that recur across comparisons
#[derive(Debug, Default)]
pub struct NormalizeCache {
    entries: HashMap<String, String>,
}

impl NormalizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, text: &str) -> &str {
        self.entries
            .entry(text.to_string())
            .or_insert_with(|| normalize_for_alignment(text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
