//! Congruence dispatch: pick and run an enumeration strategy for a
//! congruence, racing candidates against one another when more than one is
//! worth trying.

pub mod err;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    coxeter::{Side, ToddCoxeterEngine},
    element::ElementOps,
    semigroup::{
        algs::froidure_pin::{FpRelation, FroidurePinEngine},
        word::{Relation, Word},
    },
};

use err::DispatcherError;

/// Semigroups at or below this size are run single-threaded from a prefilled
/// coset table rather than raced against an unprefilled candidate.
pub const SMALL_SEMIGROUP_THRESHOLD: usize = 1024;

/// The enumeration strategies the dispatcher can race. Only Todd-Coxeter
/// variants are implemented in this version (a Knuth-Bendix-based strategy
/// was an open question, decided against — see `DESIGN.md`); the variants
/// below and [`RaceCandidate`] are the extension point a future strategy
/// would plug into, without the race loop in [`race_candidates`] changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ToddCoxeterPrefilled,
    ToddCoxeterUnprefilled,
}

/// Capability a racing enumerator must provide to enter [`race_candidates`].
pub(crate) trait RaceCandidate {
    fn run_candidate(&mut self);
    fn candidate_done(&self) -> bool;
    fn set_candidate_kill_flag(&mut self, kill: Arc<AtomicBool>);
}

impl RaceCandidate for ToddCoxeterEngine {
    fn run_candidate(&mut self) {
        self.run();
    }

    fn candidate_done(&self) -> bool {
        self.is_done()
    }

    fn set_candidate_kill_flag(&mut self, kill: Arc<AtomicBool>) {
        self.set_kill_flag(kill);
    }
}

/// Produces and caches an enumerator for a congruence, choosing (and
/// possibly racing) candidates according to the selection policy in
/// `SPEC_FULL.md` §4.4.
pub struct CongruenceDispatcher {
    winner: ToddCoxeterEngine,
}

impl CongruenceDispatcher {
    /// No semigroup is available: a single Todd-Coxeter candidate, no race.
    pub fn from_presentation(
        nrgens: usize,
        relations: Vec<Relation>,
        extra: Vec<Relation>,
        side: Side,
    ) -> Result<Self, DispatcherError> {
        let winner = ToddCoxeterEngine::new(nrgens, relations, extra, side)?;
        Ok(Self { winner })
    }

    /// A semigroup is available: prefill a Todd-Coxeter instance from its
    /// Cayley graph. If the semigroup is small or only one thread is
    /// permitted, run that candidate alone; otherwise race it against an
    /// unprefilled candidate built from the semigroup's own relations.
    pub fn from_semigroup<E: ElementOps>(
        semigroup: &mut FroidurePinEngine<E>,
        extra: Vec<Relation>,
        side: Side,
        threads: usize,
    ) -> Result<Self, DispatcherError> {
        let size = semigroup.size();
        let table = match side {
            Side::Left => semigroup.left_cayley().clone(),
            Side::Right | Side::TwoSided => semigroup.right_cayley().clone(),
        };
        let nrgens = table.n_cols();

        let mut prefilled = ToddCoxeterEngine::new(nrgens, Vec::new(), extra.clone(), side)?;
        prefilled.prefill(table)?;

        if size <= SMALL_SEMIGROUP_THRESHOLD || threads <= 1 {
            return Ok(Self { winner: prefilled });
        }

        let relations = relations_from_semigroup(semigroup);
        let unprefilled = ToddCoxeterEngine::new(nrgens, relations, extra, side)?;

        let winner = race_candidates(vec![prefilled, unprefilled], None)?;
        Ok(Self { winner })
    }

    pub fn run(&mut self) {
        self.winner.run();
    }

    pub fn is_done(&self) -> bool {
        self.winner.is_done()
    }

    pub fn nr_classes(&mut self) -> usize {
        self.winner.nr_classes()
    }

    pub fn word_to_class_index(&mut self, word: &[usize]) -> usize {
        self.winner.word_to_class_index(word)
    }

    pub fn nontrivial_classes(&mut self) -> Vec<Vec<Word>> {
        self.winner.nontrivial_classes()
    }
}

/// Reconstruct the semigroup's own defining relations as words, for an
/// unprefilled Todd-Coxeter candidate to trace from scratch.
fn relations_from_semigroup<E: ElementOps>(semigroup: &mut FroidurePinEngine<E>) -> Vec<Relation> {
    let mut relations = Vec::new();
    while let Some(relation) = semigroup.next_relation() {
        match relation {
            FpRelation::Duplicate { first, dup } => relations.push((vec![first], vec![dup])),
            FpRelation::Product { i, g, j } => {
                let mut lhs = semigroup
                    .factorisation(i)
                    .expect("next_relation only names already-enumerated indices");
                lhs.push(g);
                let rhs = semigroup
                    .factorisation(j)
                    .expect("next_relation only names already-enumerated indices");
                relations.push((lhs, rhs));
            }
        }
    }
    relations
}

/// Race `candidates` via `std::thread::scope`: whoever finishes first sets
/// the shared kill flag so the rest notice at their next cancellation check.
/// `timeout`, if given, also arms a watcher thread that kills the race after
/// that long regardless of progress (`Dispatcher::race_with_timeout`).
fn race_candidates<T: RaceCandidate + Send>(
    mut candidates: Vec<T>,
    timeout: Option<Duration>,
) -> Result<T, DispatcherError> {
    let kill = Arc::new(AtomicBool::new(false));
    for candidate in candidates.iter_mut() {
        candidate.set_candidate_kill_flag(Arc::clone(&kill));
    }

    let winner_idx = AtomicUsize::new(usize::MAX);
    std::thread::scope(|scope| {
        if let Some(timeout) = timeout {
            let watcher_kill = Arc::clone(&kill);
            scope.spawn(move || {
                std::thread::sleep(timeout);
                watcher_kill.store(true, Ordering::Relaxed);
            });
        }
        for (idx, candidate) in candidates.iter_mut().enumerate() {
            let kill = Arc::clone(&kill);
            let winner_idx = &winner_idx;
            scope.spawn(move || {
                candidate.run_candidate();
                if candidate.candidate_done() {
                    let _ = winner_idx.compare_exchange(
                        usize::MAX,
                        idx,
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    );
                    kill.store(true, Ordering::Relaxed);
                }
            });
        }
    });

    let idx = winner_idx.load(Ordering::SeqCst);
    if idx == usize::MAX {
        return if timeout.is_some() {
            err::TimedOutSnafu.fail()
        } else {
            err::NoCandidateCompletedSnafu.fail()
        };
    }
    Ok(candidates.into_iter().nth(idx).unwrap())
}

/// Race a caller-assembled set of Todd-Coxeter candidates, arming a timeout
/// watcher that kills the race after `timeout` regardless of progress.
pub fn race_with_timeout(
    candidates: Vec<ToddCoxeterEngine>,
    timeout: Duration,
) -> Result<ToddCoxeterEngine, DispatcherError> {
    race_candidates(candidates, Some(timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::transformation::Transformation;

    fn trivial_presentation() -> (usize, Vec<Relation>, Side) {
        (
            2,
            vec![
                (vec![0, 0], vec![0]),
                (vec![1, 1], vec![1]),
                (vec![0, 1, 0], vec![0]),
            ],
            Side::TwoSided,
        )
    }

    #[test]
    fn from_presentation_matches_direct_engine() {
        let (nrgens, relations, side) = trivial_presentation();
        let mut dispatcher =
            CongruenceDispatcher::from_presentation(nrgens, relations.clone(), vec![], side)
                .unwrap();
        let mut direct = ToddCoxeterEngine::new(nrgens, relations, vec![], side).unwrap();
        assert_eq!(dispatcher.nr_classes(), direct.nr_classes());
    }

    #[test]
    fn from_small_semigroup_runs_single_threaded_prefilled() {
        let gens = vec![
            Transformation::from_vec(3, vec![1, 0, 0]).unwrap(),
            Transformation::from_vec(3, vec![0, 1, 2]).unwrap(),
        ];
        let mut semigroup = FroidurePinEngine::new(gens).unwrap();
        let mut dispatcher =
            CongruenceDispatcher::from_semigroup(&mut semigroup, vec![], Side::Right, 4).unwrap();
        assert_eq!(dispatcher.nr_classes(), 3);
    }

    #[test]
    fn race_equivalence_direct_vs_dispatcher() {
        let gens = vec![
            Transformation::from_vec(3, vec![1, 0, 0]).unwrap(),
            Transformation::from_vec(3, vec![0, 1, 2]).unwrap(),
        ];
        let mut semigroup = FroidurePinEngine::new(gens).unwrap();
        let extra = vec![(vec![0], vec![1])];
        let mut via_dispatcher =
            CongruenceDispatcher::from_semigroup(&mut semigroup, extra.clone(), Side::Right, 8)
                .unwrap();

        let mut direct_semigroup = FroidurePinEngine::new(vec![
            Transformation::from_vec(3, vec![1, 0, 0]).unwrap(),
            Transformation::from_vec(3, vec![0, 1, 2]).unwrap(),
        ])
        .unwrap();
        let table = direct_semigroup.right_cayley().clone();
        let mut direct =
            ToddCoxeterEngine::new(table.n_cols(), vec![], extra, Side::Right).unwrap();
        direct.prefill(table).unwrap();

        assert_eq!(via_dispatcher.nr_classes(), direct.nr_classes());
    }
}
