//! Filtering and ordering of index candidates.
//!
//! In [`SortMode::Match`] every term is scored and results come out by score
//! (descending) then path (ascending). Every other mode only filters and
//! then orders with that mode's comparator, again falling back to the path.

use std::cmp::Ordering;

use crate::index::{Candidate, Index};
use crate::query::{fuzzy_match, match_target, Query, Scope, TargetMatch};
use crate::sort::{SortMode, TimeField};

/// Extra weight for a term found in the last path component rather than
/// somewhere in the full path.
const NAME_BONUS: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanTarget {
    Name,
    Path,
    Tag(usize),
}

/// Char positions one term matched inside one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub target: SpanTarget,
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Position of the candidate inside the index it was ranked from.
    pub position: usize,
    pub score: i64,
    pub spans: Vec<MatchSpan>,
}

impl MatchResult {
    pub fn candidate<'a>(&self, index: &'a Index) -> Option<&'a Candidate> {
        index.get(self.position)
    }

    /// Matched positions inside the entry name, sorted and deduplicated.
    pub fn name_positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .spans
            .iter()
            .filter(|span| span.target == SpanTarget::Name)
            .flat_map(|span| span.positions.iter().copied())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }
}

pub fn rank(index: &Index, query: &Query, mode: SortMode) -> Vec<MatchResult> {
    let candidates = index.candidates();
    let mut results: Vec<MatchResult> = if mode == SortMode::Match {
        candidates
            .iter()
            .enumerate()
            .filter_map(|(position, candidate)| {
                let (score, spans) = score_candidate(candidate, query)?;
                Some(MatchResult {
                    position,
                    score,
                    spans,
                })
            })
            .collect()
    } else {
        candidates
            .iter()
            .enumerate()
            .filter(|(_, candidate)| matches(candidate, query))
            .map(|(position, _)| MatchResult {
                position,
                score: 0,
                spans: Vec::new(),
            })
            .collect()
    };

    results.sort_by(|left, right| {
        let left_candidate = &candidates[left.position];
        let right_candidate = &candidates[right.position];
        match mode {
            SortMode::Match => right
                .score
                .cmp(&left.score)
                .then_with(|| left_candidate.path.cmp(&right_candidate.path)),
            _ => compare_candidates(left_candidate, right_candidate, mode),
        }
    });
    results
}

/// True when every term of `query` is satisfied by `candidate`.
pub fn matches(candidate: &Candidate, query: &Query) -> bool {
    query.terms().iter().all(|term| {
        let path_match = || fuzzy_match(&term.text, &candidate.path);
        let tag_match = || candidate.tags.iter().any(|tag| fuzzy_match(&term.text, tag));
        match term.scope {
            Scope::Path => path_match(),
            Scope::Tag => tag_match(),
            Scope::Any => path_match() || tag_match(),
        }
    })
}

/// Sum of the best per-term scores, or `None` when some term fails.
pub fn score_candidate(candidate: &Candidate, query: &Query) -> Option<(i64, Vec<MatchSpan>)> {
    let mut total = 0i64;
    let mut spans = Vec::with_capacity(query.terms().len());
    for term in query.terms() {
        let path_best = match term.scope {
            Scope::Path | Scope::Any => best_path_match(&term.text, candidate),
            Scope::Tag => None,
        };
        let tag_best = match term.scope {
            Scope::Tag | Scope::Any => best_tag_match(&term.text, &candidate.tags),
            Scope::Path => None,
        };
        let (score, span) = match (path_best, tag_best) {
            (Some(path), Some(tag)) if tag.0 > path.0 => tag,
            (Some(path), _) => path,
            (None, Some(tag)) => tag,
            (None, None) => return None,
        };
        total = total.saturating_add(score);
        spans.push(span);
    }
    Some((total, spans))
}

fn best_path_match(term: &str, candidate: &Candidate) -> Option<(i64, MatchSpan)> {
    if let Some(found) = match_target(term, candidate.name()) {
        return Some(to_span(found, SpanTarget::Name, NAME_BONUS));
    }
    match_target(term, &candidate.path).map(|found| to_span(found, SpanTarget::Path, 0))
}

fn best_tag_match(term: &str, tags: &[String]) -> Option<(i64, MatchSpan)> {
    let mut best: Option<(i64, MatchSpan)> = None;
    for (slot, tag) in tags.iter().enumerate() {
        let Some(found) = match_target(term, tag) else {
            continue;
        };
        if best.as_ref().map_or(true, |(score, _)| found.score > *score) {
            best = Some(to_span(found, SpanTarget::Tag(slot), 0));
        }
    }
    best
}

fn to_span(found: TargetMatch, target: SpanTarget, bonus: i64) -> (i64, MatchSpan) {
    (
        found.score + bonus,
        MatchSpan {
            target,
            positions: found.positions,
        },
    )
}

pub fn compare_candidates(left: &Candidate, right: &Candidate, mode: SortMode) -> Ordering {
    match mode {
        SortMode::Match | SortMode::AlphaAsc => compare_names(left, right),
        SortMode::AlphaDesc => compare_name_keys(right, left).then_with(|| left.path.cmp(&right.path)),
        SortMode::CreatedAsc => compare_time(left, right, TimeField::Created, false),
        SortMode::CreatedDesc => compare_time(left, right, TimeField::Created, true),
        SortMode::ModifiedAsc => compare_time(left, right, TimeField::Modified, false),
        SortMode::ModifiedDesc => compare_time(left, right, TimeField::Modified, true),
    }
}

fn compare_name_keys(left: &Candidate, right: &Candidate) -> Ordering {
    left.name().to_lowercase().cmp(&right.name().to_lowercase())
}

fn compare_names(left: &Candidate, right: &Candidate) -> Ordering {
    compare_name_keys(left, right).then_with(|| left.path.cmp(&right.path))
}

/// Known timestamps always come before unknown ones, whatever the direction.
fn compare_time(left: &Candidate, right: &Candidate, field: TimeField, descending: bool) -> Ordering {
    let ordering = match (field.of(left), field.of(right)) {
        (Some(left_value), Some(right_value)) if descending => right_value.cmp(&left_value),
        (Some(left_value), Some(right_value)) => left_value.cmp(&right_value),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    ordering.then_with(|| left.path.cmp(&right.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Source;
    use pretty_assertions::assert_eq;

    fn candidate(path: &str, tags: &[&str]) -> Candidate {
        Candidate::new(
            path,
            Source::IndexedFolder,
            tags.iter().map(|tag| tag.to_string()).collect(),
        )
    }

    fn ranked_paths(index: &Index, query: &str, mode: SortMode) -> Vec<String> {
        rank(index, &Query::parse(query), mode)
            .iter()
            .map(|result| result.candidate(index).unwrap().path.clone())
            .collect()
    }

    fn sample_index() -> Index {
        Index::from_candidates(vec![
            candidate("/a/create-mods", &["mods", "create"]),
            candidate("/a/other", &["minecraft"]),
            candidate("/b/notes", &["writing"]),
            candidate("/b/creative", &[]),
        ])
    }

    #[test]
    fn path_and_tag_scopes_combine() {
        let index = sample_index();
        assert_eq!(
            ranked_paths(&index, "@create #mods", SortMode::Match),
            vec!["/a/create-mods".to_string()]
        );
    }

    #[test]
    fn tag_scope_ignores_paths() {
        let index = sample_index();
        assert_eq!(ranked_paths(&index, "#notes", SortMode::Match), Vec::<String>::new());
        assert_eq!(
            ranked_paths(&index, "#mine", SortMode::Match),
            vec!["/a/other".to_string()]
        );
    }

    #[test]
    fn path_scope_ignores_tags() {
        let index = sample_index();
        assert_eq!(ranked_paths(&index, "@minecraft", SortMode::Match), Vec::<String>::new());
    }

    #[test]
    fn unscoped_terms_match_either_side() {
        let index = sample_index();
        let found = ranked_paths(&index, "writing", SortMode::Match);
        assert_eq!(found, vec!["/b/notes".to_string()]);
    }

    #[test]
    fn empty_query_returns_everything_by_path() {
        let index = sample_index();
        let results = rank(&index, &Query::default(), SortMode::Match);
        assert!(results.iter().all(|result| result.score == 0));
        assert_eq!(
            ranked_paths(&index, "", SortMode::Match),
            vec![
                "/a/create-mods".to_string(),
                "/a/other".to_string(),
                "/b/creative".to_string(),
                "/b/notes".to_string(),
            ]
        );
    }

    #[test]
    fn better_matches_rank_first() {
        let index = Index::from_candidates(vec![
            candidate("/x/c-r-e-a-t-e", &[]),
            candidate("/x/create", &[]),
            candidate("/x/create-something-long", &[]),
        ]);
        assert_eq!(
            ranked_paths(&index, "create", SortMode::Match),
            vec![
                "/x/create".to_string(),
                "/x/create-something-long".to_string(),
                "/x/c-r-e-a-t-e".to_string(),
            ]
        );
    }

    #[test]
    fn equal_scores_fall_back_to_path() {
        let index = Index::from_candidates(vec![
            candidate("/z/same", &[]),
            candidate("/a/same", &[]),
        ]);
        let results = rank(&index, &Query::parse("same"), SortMode::Match);
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(
            ranked_paths(&index, "same", SortMode::Match),
            vec!["/a/same".to_string(), "/z/same".to_string()]
        );
    }

    #[test]
    fn name_spans_are_reported() {
        let index = sample_index();
        let results = rank(&index, &Query::parse("mods"), SortMode::Match);
        let top = &results[0];
        assert_eq!(top.candidate(&index).unwrap().path, "/a/create-mods");
        assert_eq!(top.name_positions(), vec![7, 8, 9, 10]);
    }

    #[test]
    fn alpha_modes_order_by_entry_name() {
        let index = sample_index();
        assert_eq!(
            ranked_paths(&index, "", SortMode::AlphaAsc),
            vec![
                "/a/create-mods".to_string(),
                "/b/creative".to_string(),
                "/b/notes".to_string(),
                "/a/other".to_string(),
            ]
        );
        assert_eq!(
            ranked_paths(&index, "", SortMode::AlphaDesc),
            vec![
                "/a/other".to_string(),
                "/b/notes".to_string(),
                "/b/creative".to_string(),
                "/a/create-mods".to_string(),
            ]
        );
    }

    #[test]
    fn unknown_timestamps_sort_last_in_both_directions() {
        let mut old = candidate("/old", &[]);
        old.modified_at = Some(100);
        let mut new = candidate("/new", &[]);
        new.modified_at = Some(200);
        let unknown = candidate("/unknown", &[]);
        let index = Index::from_candidates(vec![unknown, old, new]);

        assert_eq!(
            ranked_paths(&index, "", SortMode::ModifiedDesc),
            vec!["/new".to_string(), "/old".to_string(), "/unknown".to_string()]
        );
        assert_eq!(
            ranked_paths(&index, "", SortMode::ModifiedAsc),
            vec!["/old".to_string(), "/new".to_string(), "/unknown".to_string()]
        );
    }

    #[test]
    fn filter_modes_still_apply_the_query() {
        let index = sample_index();
        assert_eq!(
            ranked_paths(&index, "#mods", SortMode::CreatedDesc),
            vec!["/a/create-mods".to_string()]
        );
    }
}
