//! Query parsing and per-target fuzzy matching.
//!
//! A query is split on whitespace. `@term` only looks at the path, `#term`
//! only at tags, anything else at both. Matching is a case-insensitive
//! subsequence test; [`match_target`] additionally scores how well a term
//! fits one target string.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Path,
    Tag,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub scope: Scope,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
}

impl Query {
    pub fn parse(input: &str) -> Self {
        let mut terms = Vec::new();
        for raw in input.split_whitespace() {
            let (scope, text) = if let Some(rest) = raw.strip_prefix('@') {
                (Scope::Path, rest)
            } else if let Some(rest) = raw.strip_prefix('#') {
                (Scope::Tag, rest)
            } else {
                (Scope::Any, raw)
            };
            if !text.is_empty() {
                terms.push(Term {
                    scope,
                    text: text.to_string(),
                });
            }
        }
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn tag_terms(&self) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .filter(|term| term.scope == Scope::Tag)
            .map(|term| term.text.as_str())
    }

    pub fn has_tag_terms(&self) -> bool {
        self.tag_terms().next().is_some()
    }
}

const CONTIGUOUS_BONUS: i64 = 1000;
const ADJACENT_BONUS: i64 = 40;
const GAP_PENALTY: i64 = 4;
const START_PENALTY: i64 = 3;
const START_CAP: usize = 64;
const LENGTH_PENALTY: i64 = 1;
const LENGTH_CAP: usize = 256;

/// How one term matched one target string. `positions` are char indices
/// into the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMatch {
    pub score: i64,
    pub positions: Vec<usize>,
}

fn chars_eq(left: char, right: char) -> bool {
    left == right || left.to_lowercase().eq(right.to_lowercase())
}

pub fn fuzzy_match(term: &str, text: &str) -> bool {
    let mut chars = term.chars().filter(|c| !c.is_whitespace());
    let mut current = chars.next();
    if current.is_none() {
        return true;
    }

    for t in text.chars() {
        if let Some(q) = current {
            if chars_eq(q, t) {
                current = chars.next();
                if current.is_none() {
                    return true;
                }
            }
        }
    }
    false
}

/// Scores `term` against `target`: an exact (case-insensitive) substring
/// beats a scattered subsequence, earlier starts beat later ones and
/// shorter targets beat longer ones.
pub fn match_target(term: &str, target: &str) -> Option<TargetMatch> {
    let needle: Vec<char> = term.chars().filter(|c| !c.is_whitespace()).collect();
    let haystack: Vec<char> = target.chars().collect();
    if needle.is_empty() {
        return Some(TargetMatch {
            score: 0,
            positions: Vec::new(),
        });
    }

    let (positions, quality) = match find_contiguous(&haystack, &needle) {
        Some(start) => {
            let positions: Vec<usize> = (start..start + needle.len()).collect();
            let adjacent = needle.len() as i64 - 1;
            (positions, CONTIGUOUS_BONUS + ADJACENT_BONUS * adjacent)
        }
        None => {
            let positions = find_subsequence(&haystack, &needle)?;
            let mut adjacent = 0i64;
            let mut gaps = 0i64;
            for window in positions.windows(2) {
                if let [prev, next] = window {
                    if *next == prev + 1 {
                        adjacent += 1;
                    } else {
                        gaps += (next - prev - 1) as i64;
                    }
                }
            }
            (positions, ADJACENT_BONUS * adjacent - GAP_PENALTY * gaps)
        }
    };

    let start = positions.first().copied().unwrap_or(0);
    let score = quality
        - START_PENALTY * start.min(START_CAP) as i64
        - LENGTH_PENALTY * haystack.len().min(LENGTH_CAP) as i64;
    Some(TargetMatch { score, positions })
}

fn find_contiguous(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(left, right)| chars_eq(*left, *right))
    })
}

fn find_subsequence(haystack: &[char], needle: &[char]) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut qi = 0usize;
    for (ti, t) in haystack.iter().enumerate() {
        if qi >= needle.len() {
            break;
        }
        if chars_eq(needle[qi], *t) {
            positions.push(ti);
            qi += 1;
        }
    }
    (qi == needle.len()).then_some(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scoped_terms() {
        let query = Query::parse("  @create #mods  plain @ # ");
        assert_eq!(
            query.terms(),
            &[
                Term {
                    scope: Scope::Path,
                    text: "create".to_string()
                },
                Term {
                    scope: Scope::Tag,
                    text: "mods".to_string()
                },
                Term {
                    scope: Scope::Any,
                    text: "plain".to_string()
                },
            ]
        );
        assert!(query.has_tag_terms());
        assert!(Query::parse("   ").is_empty());
    }

    #[test]
    fn fuzzy_match_is_case_insensitive_subsequence() {
        assert!(fuzzy_match("CrM", "create-mods"));
        assert!(fuzzy_match("", "anything"));
        assert!(!fuzzy_match("mc", "create"));
        assert!(fuzzy_match("ÉT", "été"));
    }

    #[test]
    fn contiguous_beats_scattered() {
        let contiguous = match_target("mod", "create-mods").unwrap();
        let scattered = match_target("cms", "create-mods").unwrap();
        assert!(contiguous.score > scattered.score);
        assert_eq!(contiguous.positions, vec![7, 8, 9]);
    }

    #[test]
    fn earlier_start_and_shorter_target_score_higher() {
        let early = match_target("ab", "abxx").unwrap();
        let late = match_target("ab", "xxab").unwrap();
        assert!(early.score > late.score);

        let short = match_target("ab", "ab").unwrap();
        let long = match_target("ab", "abcdefgh").unwrap();
        assert!(short.score > long.score);
    }

    #[test]
    fn missing_characters_do_not_match() {
        assert_eq!(match_target("xyz", "create"), None);
        assert_eq!(match_target("createx", "create"), None);
    }
}
