//! # Pronunciation Scoring
//!
//! Compares the word a learner was asked to say against what the speech-to-text
//! provider heard, and produces an accuracy percentage in [0, 100].
//!
//! ## How the comparison works:
//! - **Exact match**: the transcript is the expected word → 100
//! - **Partial match**: one word contains the other (e.g. "appl" heard for
//!   "apple") → scored by length difference, capped at 90
//! - **Fuzzy match**: characters compared position by position, penalized by
//!   length difference, capped at 95; anything under 30 counts as a wrong
//!   word and scores 0
//!
//! This is deliberately not an edit-distance metric. It is a cheap,
//! order-sensitive heuristic tuned against real transcripts, and the branch
//! order and constants are part of the scoring contract.

/// Characters that end the portion of the transcript we score.
/// Speech-to-text output often arrives as a sentence ("Apple. Great job!"),
/// so everything from the first terminator on is discarded.
const TERMINATORS: [char; 6] = ['.', '\n', ' ', '!', '?', ','];

/// Minimum fuzzy similarity to count as an attempt at the right word.
/// Below this the learner most likely said a different word entirely.
const WRONG_WORD_THRESHOLD: f64 = 30.0;

/// Partial (containment) matches never score above this.
const PARTIAL_MATCH_CAP: i64 = 90;

/// Fuzzy (positional) matches never score above this.
const FUZZY_MATCH_CAP: i64 = 95;

/// Score how closely a transcript matches the expected word.
///
/// `expected` is the example word the learner was prompted with; `received`
/// is the raw transcript from the speech-to-text provider. Returns an
/// accuracy percentage in [0, 100].
///
/// ## Example:
/// ```
/// // Learner was asked to say "ball" and the provider heard "wall":
/// // 3 of 4 characters line up, so the score is 75.
/// ```
pub fn score(expected: &str, received: &str) -> u8 {
    let received = normalize_transcript(received);
    let expected = expected.trim().to_lowercase();

    // Exact match after normalization
    if received == expected {
        return 100;
    }

    // Nothing usable on either side
    if received.is_empty() || expected.is_empty() {
        return 0;
    }

    let expected_chars: Vec<char> = expected.chars().collect();
    let received_chars: Vec<char> = received.chars().collect();
    let len_diff = expected_chars.len().abs_diff(received_chars.len());

    // Partial match: one word contains the other
    if expected.contains(&received) || received.contains(&expected) {
        let similarity = (100 - len_diff as i64 * 10).max(0);
        return similarity.min(PARTIAL_MATCH_CAP) as u8;
    }

    // Fuzzy match: same-index character comparison
    let matches = expected_chars
        .iter()
        .zip(received_chars.iter())
        .filter(|(a, b)| a == b)
        .count();
    let max_len = expected_chars.len().max(received_chars.len());

    let len_penalty = (len_diff * 5) as f64;
    let similarity = (matches as f64 / max_len as f64) * 100.0 - len_penalty;

    if similarity < WRONG_WORD_THRESHOLD {
        return 0;
    }

    (similarity as i64).clamp(0, FUZZY_MATCH_CAP) as u8
}

/// Reduce a raw transcript to the single word being scored.
///
/// Strips leading spaces, cuts the string at the first terminator character
/// (so only the first word of the first sentence survives), then trims and
/// lower-cases what remains.
fn normalize_transcript(raw: &str) -> String {
    let stripped = raw.trim_start_matches(' ');

    let cut = match stripped.find(|c| TERMINATORS.contains(&c)) {
        Some(index) => &stripped[..index],
        None => stripped,
    };

    cut.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_100() {
        assert_eq!(score("apple", "apple"), 100);
        assert_eq!(score("apple", "APPLE"), 100);
        assert_eq!(score("  apple  ", "   apple"), 100);
        assert_eq!(score("Zebra", "zebra"), 100);
    }

    #[test]
    fn test_empty_input_scores_0() {
        assert_eq!(score("apple", ""), 0);
        assert_eq!(score("", "apple"), 0);
        assert_eq!(score("apple", "   "), 0);
        // Transcript that is nothing but punctuation normalizes to empty
        assert_eq!(score("apple", "..."), 0);
    }

    #[test]
    fn test_partial_match_capped_at_90() {
        // "appl" is contained in "apple": length diff 1 -> 100 - 10 = 90
        assert_eq!(score("apple", "appl"), 90);
        // "applesauce" contains "apple": diff 5 -> 100 - 50 = 50
        assert_eq!(score("apple", "applesauce"), 50);
        // Large length difference bottoms out at 0
        assert_eq!(score("a", "abcdefghijklmn"), 0);
    }

    #[test]
    fn test_wrong_word_scores_0() {
        // No containment, no positional overlap
        assert_eq!(score("apple", "zzzzz"), 0);
        assert_eq!(score("tree", "bomb"), 0);
    }

    #[test]
    fn test_positional_overlap() {
        // b-all vs w-all: 3 of 4 characters line up -> 75
        assert_eq!(score("ball", "wall"), 75);
        // tree vs free: 3 of 4 -> 75
        assert_eq!(score("tree", "free"), 75);
    }

    #[test]
    fn test_length_penalty_applies_to_fuzzy_match() {
        // "sundae" vs "sunday": 5 of 6 match, no length diff -> 83
        assert_eq!(score("sunday", "sundae"), 83);
        // "pens" vs "pent": 3 of 4 match, equal length -> 75
        assert_eq!(score("pens", "pent"), 75);
    }

    #[test]
    fn test_transcript_truncated_at_first_terminator() {
        assert_eq!(score("apple", "apple. Great job!"), 100);
        assert_eq!(score("apple", "apple, I think"), 100);
        assert_eq!(score("apple", "apple\nmore text"), 100);
        // Interior space ends the scored word
        assert_eq!(score("apple", " apple pie"), 100);
    }

    #[test]
    fn test_leading_spaces_stripped_before_truncation() {
        // Leading spaces must not trigger the word cut
        assert_eq!(score("pen", "   pen"), 100);
        assert_eq!(score("pen", "   pen and paper"), 100);
    }

    #[test]
    fn test_score_is_within_bounds() {
        let words = ["sunday", "free", "love", "boat", "ball", "pen", "tree", "apple", "zebra"];
        for expected in words {
            for received in words {
                let s = score(expected, received);
                assert!(s <= 100, "score({expected}, {received}) = {s}");
            }
        }
    }
}
