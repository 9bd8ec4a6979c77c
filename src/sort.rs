use crate::index::{Candidate, Generation, Index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Match,
    AlphaAsc,
    AlphaDesc,
    CreatedAsc,
    CreatedDesc,
    ModifiedAsc,
    ModifiedDesc,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Match => SortMode::AlphaAsc,
            SortMode::AlphaAsc => SortMode::AlphaDesc,
            SortMode::AlphaDesc => SortMode::CreatedAsc,
            SortMode::CreatedAsc => SortMode::CreatedDesc,
            SortMode::CreatedDesc => SortMode::ModifiedAsc,
            SortMode::ModifiedAsc => SortMode::ModifiedDesc,
            SortMode::ModifiedDesc => SortMode::Match,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Match => "Match",
            SortMode::AlphaAsc => "A->Z",
            SortMode::AlphaDesc => "Z->A",
            SortMode::CreatedAsc => "Created ^",
            SortMode::CreatedDesc => "Created v",
            SortMode::ModifiedAsc => "Modified ^",
            SortMode::ModifiedDesc => "Modified v",
        }
    }

    pub fn time_field(self) -> Option<TimeField> {
        match self {
            SortMode::CreatedAsc | SortMode::CreatedDesc => Some(TimeField::Created),
            SortMode::ModifiedAsc | SortMode::ModifiedDesc => Some(TimeField::Modified),
            _ => None,
        }
    }

    pub fn uses_time(self) -> bool {
        self.time_field().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Created,
    Modified,
}

impl TimeField {
    pub fn of(self, candidate: &Candidate) -> Option<i64> {
        match self {
            TimeField::Created => candidate.created_at,
            TimeField::Modified => candidate.modified_at,
        }
    }
}

/// Work order for the metadata worker: fetch timestamps for `paths` and tag
/// the results with `generation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub generation: Generation,
    pub paths: Vec<String>,
}

/// Current sort mode plus bookkeeping for the single metadata pass allowed
/// per index generation.
#[derive(Debug, Default)]
pub struct SortController {
    mode: SortMode,
    in_flight: Option<Generation>,
    completed: Option<Generation>,
}

impl SortController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    /// Moves to the next mode. Entering a time-based mode with unknown
    /// timestamps yields a refresh to schedule.
    pub fn advance(&mut self, index: &Index) -> Option<RefreshRequest> {
        self.mode = self.mode.next();
        let field = self.mode.time_field()?;
        self.request_refresh(index, Some(field))
    }

    /// Asks for a metadata pass over `index`. With `field` set, a pass only
    /// starts when that field is unknown somewhere; with `None`, when any
    /// timestamp is unknown. At most one pass runs per generation.
    pub fn request_refresh(
        &mut self,
        index: &Index,
        field: Option<TimeField>,
    ) -> Option<RefreshRequest> {
        let generation = index.generation();
        if self.in_flight == Some(generation) || self.completed == Some(generation) {
            return None;
        }
        let needed = index.candidates().iter().any(|candidate| match field {
            Some(field) => field.of(candidate).is_none(),
            None => candidate.created_at.is_none() || candidate.modified_at.is_none(),
        });
        if !needed {
            return None;
        }
        self.in_flight = Some(generation);
        Some(RefreshRequest {
            generation,
            paths: index.missing_timestamps(),
        })
    }

    /// Call when the index was replaced by a new generation.
    pub fn on_new_generation(&mut self, index: &Index) -> Option<RefreshRequest> {
        let field = self.mode.time_field()?;
        self.request_refresh(index, Some(field))
    }

    pub fn refresh_finished(&mut self, generation: Generation) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }
        self.completed = Some(generation);
    }

    pub fn is_refreshing(&self, generation: Generation) -> bool {
        self.in_flight == Some(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{MetadataEntry, Source, Timestamps};

    fn index_of(paths: &[&str]) -> Index {
        Index::from_candidates(
            paths
                .iter()
                .map(|path| Candidate::new(*path, Source::StaticItem, Vec::new())),
        )
    }

    #[test]
    fn seven_advances_return_to_start() {
        let mut mode = SortMode::Match;
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, SortMode::Match);
        seen.dedup();
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn entering_time_mode_requests_one_refresh_per_generation() {
        let index = index_of(&["/a", "/b"]);
        let mut controller = SortController::new();

        assert_eq!(controller.advance(&index), None);
        assert_eq!(controller.advance(&index), None);
        let request = controller.advance(&index).expect("refresh for CreatedAsc");
        assert_eq!(controller.mode(), SortMode::CreatedAsc);
        assert_eq!(request.generation, index.generation());
        assert_eq!(request.paths, vec!["/a".to_string(), "/b".to_string()]);
        assert!(controller.is_refreshing(index.generation()));

        // Coalesced while in flight.
        assert_eq!(controller.advance(&index), None);

        controller.refresh_finished(index.generation());
        assert!(!controller.is_refreshing(index.generation()));
        assert_eq!(controller.advance(&index), None);
    }

    #[test]
    fn complete_timestamps_need_no_refresh() {
        let mut index = index_of(&["/a"]);
        let generation = index.generation();
        index.enrich(
            generation,
            &[MetadataEntry {
                path: "/a".to_string(),
                timestamps: Timestamps {
                    created: Some(1),
                    modified: Some(2),
                },
            }],
        );
        let mut controller = SortController::new();
        assert_eq!(controller.request_refresh(&index, None), None);
    }

    #[test]
    fn new_generation_gets_its_own_refresh() {
        let first = index_of(&["/a"]);
        let mut controller = SortController::new();
        for _ in 0..5 {
            controller.advance(&first);
        }
        assert_eq!(controller.mode(), SortMode::ModifiedAsc);
        assert!(controller.is_refreshing(first.generation()));

        let second = index_of(&["/a"]);
        let request = controller.on_new_generation(&second).unwrap();
        assert_eq!(request.generation, second.generation());
    }
}
