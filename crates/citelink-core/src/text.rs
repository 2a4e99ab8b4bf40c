use crate::layout::PositionedFragment;

/// Rebuild a search-friendly citation string from an entry's fragments.
///
/// Words hyphenated across a line wrap are rejoined, all other fragments are
/// separated by a single space, and tokens without any letter (page numbers,
/// reference markers, stray punctuation) are dropped.
pub fn build_entry_text(entry: &[PositionedFragment]) -> String {
    let joined = entry.iter().fold(String::new(), |mut acc, frag| {
        if acc.ends_with('-') {
            acc.pop();
        } else {
            acc.push(' ');
        }
        acc.push_str(&frag.text);
        acc
    });

    joined
        .split_whitespace()
        .filter(|word| word.chars().any(char::is_alphabetic))
        .collect::<Vec<_>>()
        .join(" ")
}
