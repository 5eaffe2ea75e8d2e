use crate::model::gold::GoldEntity;

/// Which rule tied a guess to a gold mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    GuessContainsMention,
    MentionContainsGuess,
    EditDistance,
    HeadToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    Matched(MatchRule),
    /// A containment rule only fired on text right after "of ". Not a match;
    /// surfaced so the pair can be reviewed by hand.
    OfPrefixed,
    NoMatch,
}

impl MatchVerdict {
    pub fn is_match(self) -> bool {
        matches!(self, MatchVerdict::Matched(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
    Found,
    OfPrefixed,
    Absent,
}

const TYPO_MIN_LEN: usize = 15;
const TYPO_MAX_LEN_DIFF: usize = 5;
const TYPO_LEN_DIVISOR: usize = 6;

/// Lower-cases and restores parentheses escaped by the tokenizer.
pub fn normalize_guess(guess: &str) -> String {
    guess
        .trim()
        .to_lowercase()
        .replace("-lrb-", "(")
        .replace("-rrb-", ")")
}

pub fn matches(gold: &GoldEntity, guess: &str) -> bool {
    match_gold(gold, guess).is_match()
}

/// Decides whether `guess` names the same entity as `gold`. Mentions are
/// tried in order and each mention runs the rules from most to least
/// precise: delimited containment either way, edit distance for long
/// near-equal strings, then equality of the last tokens.
pub fn match_gold(gold: &GoldEntity, guess: &str) -> MatchVerdict {
    let guess = normalize_guess(guess);
    if guess.is_empty() {
        return MatchVerdict::NoMatch;
    }
    let guess_tail = tail(&guess);
    let guess_len = guess.chars().count();
    let mut of_prefixed = false;

    for mention in &gold.mentions {
        let mention = mention.trim().to_lowercase();
        if mention.is_empty() {
            continue;
        }

        match contains_delimited(&guess, &mention) {
            Containment::Found => return MatchVerdict::Matched(MatchRule::GuessContainsMention),
            Containment::OfPrefixed => of_prefixed = true,
            Containment::Absent => {}
        }
        match contains_delimited(&mention, &guess) {
            Containment::Found => return MatchVerdict::Matched(MatchRule::MentionContainsGuess),
            Containment::OfPrefixed => of_prefixed = true,
            Containment::Absent => {}
        }

        let mention_len = mention.chars().count();
        if guess_len > TYPO_MIN_LEN
            && mention_len > TYPO_MIN_LEN
            && guess_len.abs_diff(mention_len) < TYPO_MAX_LEN_DIFF
            && edit_distance(&guess, &mention) < guess_len / TYPO_LEN_DIVISOR
        {
            return MatchVerdict::Matched(MatchRule::EditDistance);
        }

        if tail(&mention) == guess_tail {
            return MatchVerdict::Matched(MatchRule::HeadToken);
        }
    }

    if of_prefixed {
        MatchVerdict::OfPrefixed
    } else {
        MatchVerdict::NoMatch
    }
}

/// Looks for `needle` in `haystack` bounded by spaces or the string ends.
/// Every occurrence is tried, overlapping ones included.
fn contains_delimited(haystack: &str, needle: &str) -> Containment {
    let mut result = Containment::Absent;
    if needle.is_empty() {
        return result;
    }
    let mut pos = 0;
    while let Some(offset) = haystack[pos..].find(needle) {
        let start = pos + offset;
        pos = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
        let end = start + needle.len();
        let before = &haystack[..start];
        let after = &haystack[end..];
        if !(before.is_empty() || before.ends_with(' ')) {
            continue;
        }
        if !(after.is_empty() || after.starts_with(' ')) {
            continue;
        }
        if before == "of " || before.ends_with(" of ") {
            result = Containment::OfPrefixed;
            continue;
        }
        return Containment::Found;
    }
    result
}

fn tail(text: &str) -> &str {
    text.rsplit(' ').next().unwrap_or(text)
}

/// Character-level Levenshtein distance.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Crude redundancy test between two guesses: equal ignoring case, or one
/// ends with the other, allowing a plural `s`/`es` on the shorter side.
/// Only used to stop near-duplicate wrong guesses from being counted twice.
pub fn similar(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    suffix_variant(&a, &b) || suffix_variant(&b, &a)
}

fn suffix_variant(longer: &str, shorter: &str) -> bool {
    longer.ends_with(shorter)
        || longer.ends_with(&format!("{shorter}s"))
        || longer.ends_with(&format!("{shorter}es"))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_match.rs"]
mod tests;
