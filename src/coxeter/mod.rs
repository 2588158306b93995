//! Todd-Coxeter coset enumeration: deriving the (right, left, or two-sided)
//! cosets of a congruence on a finitely presented semigroup from its
//! generators, defining relations, and the extra pairs that generate the
//! congruence.
//!
//! Cosets are arena-indexed, never pointers: `table`, `preim_init` and
//! `preim_next` are flat `(coset, generator)`-indexed arrays, and the active
//! list plus the free list of recyclable coset slots share the same
//! `forwd`/`bckwd` storage, distinguished only by the sign of `bckwd`.

pub mod err;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    reporting::{Algorithm, NoopReporter, ReportRecord, Reporter},
    semigroup::word::{reverse_relations, Relation, Word},
    utils::vec2::Vec2,
    DetHashMap, DetHashSet,
};

use err::ToddCoxeterError;

/// How `relations`/`extra` relate the congruence to the free semigroup on
/// `nrgens` letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    TwoSided,
}

/// Number of definitions/trace steps between cancellation-flag checks.
const CANCELLATION_CHECK_INTERVAL: usize = 2048;
/// Initial `active` count at which a lookahead (packing) phase is triggered.
const DEFAULT_PACK_THRESHOLD: usize = 1024;
/// Minimum coincidences a lookahead must produce between progress reports
/// before it is judged to have stalled and is cut short.
const LOOKAHEAD_STALL_FLOOR: usize = 100;
/// How many cosets a lookahead visits between each stall/progress check.
const LOOKAHEAD_REPORT_INTERVAL: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    TracingExtra { idx: usize },
    MainLoop,
    Done,
}

/// One step of [`ToddCoxeterEngine::trace`]'s table walk: either the word was
/// empty (the coset itself is the answer) or one letter remains to compare
/// through the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceEnd {
    Coset(usize),
    Pending(usize, usize),
}

/// Coset-table based enumerator for a congruence presented by generators,
/// relations, and congruence-generating pairs.
pub struct ToddCoxeterEngine {
    nrgens: usize,
    relations: Vec<Relation>,
    extra: Vec<Relation>,
    side: Side,
    /// For [`Side::TwoSided`], the original `extra` pairs folded into
    /// `relations` at construction time (since a two-sided congruence's
    /// generating pairs must hold at every coset, not just the identity
    /// coset). Kept separately so [`Self::prefill`] can restore them into
    /// `relations` after clearing the presentation relations a prefilled
    /// table already satisfies by construction. Empty for `Left`/`Right`,
    /// where `extra` is never folded and survives `prefill` untouched.
    congruence_pairs: Vec<Relation>,
    /// Every distinct word appearing in the original (pre-reversal) relations
    /// and extra pairs, kept only to answer [`Self::nontrivial_classes`].
    original_words: Vec<Word>,

    table: Vec2<Option<usize>>,
    preim_init: Vec2<Option<usize>>,
    preim_next: Vec2<Option<usize>>,
    /// Doubles as the active-list forward link (while `bckwd[c] >= 0`) and
    /// the free-list next-pointer (while `bckwd[c] < 0`).
    forwd: Vec<usize>,
    /// `>= 0`: the active-list backward link. `< 0`: `c` was identified with
    /// coset `-bckwd[c] - 1`.
    bckwd: Vec<isize>,

    current: usize,
    current_no_add: usize,
    /// Head of the free list, or (when the free list is empty) the index a
    /// freshly-appended coset would receive: `forwd[last]` always equals
    /// this value, so `current == next` signals "nothing left to visit".
    next: usize,
    last: usize,
    active: usize,
    defined: usize,

    lhs_stack: Vec<usize>,
    rhs_stack: Vec<usize>,

    phase: Phase,
    pack_threshold: usize,
    ops_since_check: usize,

    kill: Option<Arc<AtomicBool>>,
    reporter: Box<dyn Reporter>,
}

impl ToddCoxeterEngine {
    /// Build an engine for the congruence on the semigroup presented by
    /// `relations`, generated further by `extra`, on the given `side`.
    pub fn new(
        nrgens: usize,
        relations: Vec<Relation>,
        extra: Vec<Relation>,
        side: Side,
    ) -> Result<Self, ToddCoxeterError> {
        for (u, v) in relations.iter().chain(extra.iter()) {
            for &g in u.iter().chain(v.iter()) {
                if g >= nrgens {
                    return err::LetterOutOfRangeSnafu { letter: g, nrgens }.fail();
                }
            }
        }

        let mut original_words = DetHashSet::default();
        for (u, v) in relations.iter().chain(extra.iter()) {
            original_words.insert(u.clone());
            original_words.insert(v.clone());
        }
        let mut original_words: Vec<Word> = original_words.into_iter().collect();
        original_words.sort();

        let (mut relations, mut extra) = (relations, extra);
        let mut congruence_pairs = Vec::new();
        match side {
            Side::Left => {
                relations = reverse_relations(&relations);
                extra = reverse_relations(&extra);
            }
            Side::Right => {}
            Side::TwoSided => {
                congruence_pairs = extra.clone();
                relations.append(&mut extra);
                extra = Vec::new();
            }
        }

        Ok(Self {
            nrgens,
            relations,
            extra,
            side,
            congruence_pairs,
            original_words,
            table: Vec2::new(1, nrgens),
            preim_init: Vec2::new(1, nrgens),
            preim_next: Vec2::new(1, nrgens),
            forwd: vec![1],
            bckwd: vec![0],
            current: 0,
            current_no_add: 0,
            next: 1,
            last: 0,
            active: 1,
            defined: 1,
            lhs_stack: Vec::new(),
            rhs_stack: Vec::new(),
            phase: Phase::TracingExtra { idx: 0 },
            pack_threshold: DEFAULT_PACK_THRESHOLD,
            ops_since_check: 0,
            kill: None,
            reporter: Box::new(NoopReporter),
        })
    }

    /// Seed the coset table from the rows of a right (or left) Cayley graph
    /// of some finite semigroup; row 0 becomes the identity coset. The
    /// presentation relations are assumed already satisfied by the supplied
    /// table and are dropped; for [`Side::TwoSided`], the original
    /// congruence-generating pairs are restored into `relations` (they must
    /// still be retraced from every coset) and only `extra`, which stays
    /// empty for that side, is traced from the identity coset afterwards.
    pub fn prefill(&mut self, table: Vec2<Option<usize>>) -> Result<(), ToddCoxeterError> {
        if table.n_rows() == 0 {
            return err::EmptyPrefillSnafu.fail();
        }
        if table.n_cols() != self.nrgens {
            return err::PrefillColumnMismatchSnafu {
                expected: self.nrgens,
                actual: table.n_cols(),
            }
            .fail();
        }

        let n = table.n_rows();
        let mut preim_init = Vec2::new(n, self.nrgens);
        let mut preim_next = Vec2::new(n, self.nrgens);
        for c in 0..n {
            for g in 0..self.nrgens {
                if let Some(d) = table[(c, g)] {
                    preim_next[(c, g)] = preim_init[(d, g)];
                    preim_init[(d, g)] = Some(c);
                }
            }
        }

        self.table = table;
        self.preim_init = preim_init;
        self.preim_next = preim_next;
        self.forwd = (1..=n).collect();
        self.bckwd = (0..n as isize).collect();
        self.current = 0;
        self.current_no_add = 0;
        self.next = n;
        self.last = n - 1;
        self.active = n;
        self.defined = n;
        self.relations.clear();
        self.relations.extend(self.congruence_pairs.iter().cloned());
        self.phase = Phase::TracingExtra { idx: 0 };
        Ok(())
    }

    /// Supply a [`Reporter`] to receive progress records during `run`.
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Share a cancellation flag: when set, `run`/`run_bounded` return at the
    /// next check point leaving state consistent but `is_done()` false.
    pub fn with_kill_flag(mut self, kill: Arc<AtomicBool>) -> Self {
        self.kill = Some(kill);
        self
    }

    /// Same as [`Self::with_kill_flag`], for callers that already own the
    /// engine (e.g. a dispatcher assembling a list of race candidates).
    pub fn set_kill_flag(&mut self, kill: Arc<AtomicBool>) {
        self.kill = Some(kill);
    }

    pub fn nrgens(&self) -> usize {
        self.nrgens
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Run enumeration to completion (or until cancelled).
    pub fn run(&mut self) {
        self.run_bounded(None);
    }

    /// Run enumeration until closed, cancelled, or `budget` new cosets have
    /// been defined (whichever comes first). Resumable.
    pub fn run_bounded(&mut self, budget: Option<usize>) {
        let start_defined = self.defined;
        loop {
            if self.is_done() {
                return;
            }
            if self.check_cancelled() {
                return;
            }
            if let Some(budget) = budget {
                if self.defined - start_defined >= budget {
                    return;
                }
            }

            match self.phase {
                Phase::TracingExtra { idx } => {
                    if idx >= self.extra.len() {
                        self.phase = if self.relations.is_empty() {
                            Phase::Done
                        } else {
                            Phase::MainLoop
                        };
                        continue;
                    }
                    let relation = self.extra[idx].clone();
                    self.trace(0, &relation, true);
                    self.phase = Phase::TracingExtra { idx: idx + 1 };
                }
                Phase::MainLoop => {
                    if self.current == self.next {
                        self.phase = Phase::Done;
                        continue;
                    }
                    for rel_idx in 0..self.relations.len() {
                        let relation = self.relations[rel_idx].clone();
                        self.trace(self.current, &relation, true);
                        self.current = self.resolve(self.current);
                    }
                    if self.active > self.pack_threshold {
                        self.lookahead();
                    }
                    self.current = self.forwd[self.current];
                    log::debug!(
                        "todd-coxeter: current advanced, {} active, {} defined",
                        self.active,
                        self.defined
                    );
                }
                Phase::Done => unreachable!("handled above"),
            }
        }
    }

    fn check_cancelled(&mut self) -> bool {
        self.ops_since_check += 1;
        if self.ops_since_check < CANCELLATION_CHECK_INTERVAL {
            return false;
        }
        self.ops_since_check = 0;
        self.kill
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Resolve a (possibly forwarded/identified) coset to its live
    /// representative.
    fn resolve(&self, mut c: usize) -> usize {
        while self.bckwd[c] < 0 {
            c = (-self.bckwd[c] - 1) as usize;
        }
        c
    }

    fn new_coset(&mut self, c: usize, g: usize) -> usize {
        let d = self.next;
        if d < self.defined {
            self.next = self.forwd[d];
            for h in 0..self.nrgens {
                self.table[(d, h)] = None;
                self.preim_init[(d, h)] = None;
                self.preim_next[(d, h)] = None;
            }
        } else {
            self.table.add_row();
            self.preim_init.add_row();
            self.preim_next.add_row();
            self.forwd.push(0);
            self.bckwd.push(0);
            self.defined += 1;
            self.next = self.defined;
        }

        self.forwd[self.last] = d;
        self.bckwd[d] = self.last as isize;
        self.last = d;
        self.forwd[d] = self.next;
        self.active += 1;

        self.table[(c, g)] = Some(d);
        self.preim_init[(d, g)] = Some(c);
        self.preim_next[(c, g)] = None;
        d
    }

    fn define_table(&mut self, c: usize, g: usize, target: usize) {
        self.table[(c, g)] = Some(target);
        self.preim_next[(c, g)] = self.preim_init[(target, g)];
        self.preim_init[(target, g)] = Some(c);
    }

    fn follow(&mut self, start: usize, word: &[usize], allow_new: bool) -> Option<TraceEnd> {
        if word.is_empty() {
            return Some(TraceEnd::Coset(start));
        }
        let mut c = start;
        for &g in &word[..word.len() - 1] {
            c = match self.table[(c, g)] {
                Some(next) => next,
                None if allow_new => self.new_coset(c, g),
                None => return None,
            };
        }
        Some(TraceEnd::Pending(c, word[word.len() - 1]))
    }

    /// Trace one relation/extra pair from `c`, identifying cosets or (when
    /// `allow_new`) defining new ones as needed. Returns whether the trace
    /// ran to completion (false only when blocked by `!allow_new`).
    fn trace(&mut self, c: usize, relation: &Relation, allow_new: bool) -> bool {
        let Some(lhs) = self.follow(c, &relation.0, allow_new) else {
            return false;
        };
        let Some(rhs) = self.follow(c, &relation.1, allow_new) else {
            return false;
        };

        match (lhs, rhs) {
            (TraceEnd::Coset(x), TraceEnd::Coset(y)) => {
                if x != y {
                    self.identify(x, y);
                }
            }
            (TraceEnd::Coset(x), TraceEnd::Pending(c2, b)) => match self.table[(c2, b)] {
                Some(y) => {
                    if x != y {
                        self.identify(x, y);
                    }
                }
                None => {
                    if !allow_new {
                        return false;
                    }
                    self.define_table(c2, b, x);
                }
            },
            (TraceEnd::Pending(c1, a), TraceEnd::Coset(y)) => match self.table[(c1, a)] {
                Some(x) => {
                    if x != y {
                        self.identify(x, y);
                    }
                }
                None => {
                    if !allow_new {
                        return false;
                    }
                    self.define_table(c1, a, y);
                }
            },
            (TraceEnd::Pending(c1, a), TraceEnd::Pending(c2, b)) => {
                match (self.table[(c1, a)], self.table[(c2, b)]) {
                    (None, None) => {
                        if !allow_new {
                            return false;
                        }
                        let d = self.new_coset(c1, a);
                        self.define_table(c2, b, d);
                    }
                    (Some(x), None) => self.define_table(c2, b, x),
                    (None, Some(y)) => self.define_table(c1, a, y),
                    (Some(x), Some(y)) => {
                        if x != y {
                            self.identify(x, y);
                        }
                    }
                }
            }
        }
        true
    }

    /// Merge cosets `a` and `b`, and propagate any further coincidences this
    /// uncovers, via a pair stack rather than recursion.
    fn identify(&mut self, a: usize, b: usize) {
        self.lhs_stack.push(a);
        self.rhs_stack.push(b);
        while let (Some(lhs), Some(rhs)) = (self.lhs_stack.pop(), self.rhs_stack.pop()) {
            let lhs = self.resolve(lhs);
            let rhs = self.resolve(rhs);
            if lhs == rhs {
                continue;
            }
            let (low, high) = if lhs < rhs { (lhs, rhs) } else { (rhs, lhs) };
            self.merge_cosets(low, high);
        }
    }

    fn merge_cosets(&mut self, low: usize, high: usize) {
        let hb = self.bckwd[high] as usize;
        let hf = self.forwd[high];
        let was_last = high == self.last;

        self.forwd[hb] = hf;
        if was_last {
            self.last = hb;
        } else {
            self.bckwd[hf] = hb as isize;
        }
        if self.current == high {
            self.current = hb;
        }
        if self.current_no_add == high {
            self.current_no_add = hb;
        }

        self.bckwd[high] = -(low as isize) - 1;
        self.forwd[high] = self.next;
        self.next = high;
        self.active -= 1;

        // `self.last`'s forward link always mirrors `next`, whether `last`
        // just changed above or this free happened elsewhere in the list.
        self.forwd[self.last] = self.next;

        for g in 0..self.nrgens {
            self.redirect_preimages(low, high, g);
            self.merge_outgoing(low, high, g);
        }
    }

    /// Every coset `pc` with `table[pc][g] == high` is repointed at `low`,
    /// and `high`'s preimage chain under `g` is spliced onto `low`'s.
    fn redirect_preimages(&mut self, low: usize, high: usize, g: usize) {
        let Some(head) = self.preim_init[(high, g)] else {
            return;
        };
        let mut tail = head;
        self.table[(tail, g)] = Some(low);
        while let Some(next) = self.preim_next[(tail, g)] {
            self.table[(next, g)] = Some(low);
            tail = next;
        }
        self.preim_next[(tail, g)] = self.preim_init[(low, g)];
        self.preim_init[(low, g)] = Some(head);
    }

    /// If `high` had an outgoing `g`-edge, fold it into `low`'s, pushing a
    /// coincidence if both already disagreed.
    fn merge_outgoing(&mut self, low: usize, high: usize, g: usize) {
        let Some(v) = self.table[(high, g)] else {
            return;
        };
        self.remove_preimage(v, g, high);
        match self.table[(low, g)] {
            None => self.define_table(low, g, v),
            Some(existing) => {
                self.lhs_stack.push(existing);
                self.rhs_stack.push(v);
            }
        }
    }

    fn remove_preimage(&mut self, v: usize, g: usize, target: usize) {
        let mut cur = self.preim_init[(v, g)];
        let mut prev: Option<usize> = None;
        while let Some(c) = cur {
            if c == target {
                let next = self.preim_next[(c, g)];
                match prev {
                    Some(p) => self.preim_next[(p, g)] = next,
                    None => self.preim_init[(v, g)] = next,
                }
                return;
            }
            prev = Some(c);
            cur = self.preim_next[(c, g)];
        }
    }

    /// Apply every relation, forbidding new cosets, to a snapshot of the
    /// currently-active list past `current`; abort early if coincidences
    /// dry up, and grow `pack_threshold` by 10% regardless.
    fn lookahead(&mut self) {
        let start = Instant::now();

        let mut frontier = Vec::new();
        let mut c = self.forwd[self.current];
        while c != self.next {
            frontier.push(c);
            c = self.forwd[c];
        }

        let mut killed_since_report = 0usize;
        let mut killed_total = 0usize;
        for (visited, c) in frontier.into_iter().enumerate() {
            if self.bckwd[c] >= 0 {
                let before = self.active;
                for rel_idx in 0..self.relations.len() {
                    let relation = self.relations[rel_idx].clone();
                    self.trace(c, &relation, false);
                }
                let killed = before.saturating_sub(self.active);
                killed_since_report += killed;
                killed_total += killed;
            }

            if (visited + 1) % LOOKAHEAD_REPORT_INTERVAL == 0 {
                if killed_since_report < LOOKAHEAD_STALL_FLOOR {
                    break;
                }
                self.reporter.report(ReportRecord {
                    algorithm: Algorithm::ToddCoxeter,
                    phase: "lookahead",
                    count: killed_total,
                    elapsed: start.elapsed(),
                    thread: Some(std::thread::current().id()),
                });
                killed_since_report = 0;
            }
        }

        self.current_no_add = self.current;
        self.pack_threshold += self.pack_threshold / 10;
        log::debug!(
            "todd-coxeter: lookahead coalesced {} cosets, {} active remain, pack_threshold now {}",
            killed_total,
            self.active,
            self.pack_threshold
        );
    }

    /// Number of congruence classes (runs enumeration to completion).
    pub fn nr_classes(&mut self) -> usize {
        self.run();
        self.active
    }

    /// A canonical 0-based index for the class `w` belongs to: cosets are
    /// relabelled in breadth-first visit order from coset 0 via the table so
    /// that two independently-run, equivalent enumerations agree.
    pub fn word_to_class_index(&mut self, word: &[usize]) -> usize {
        self.run();
        let mut letters = word.to_vec();
        if self.side == Side::Left {
            letters.reverse();
        }
        let mut c = 0usize;
        for g in letters {
            c = self.table[(c, g)].expect("completed coset table is fully defined");
        }
        let c = self.resolve(c);
        self.compress_index_of(c)
    }

    fn compress_index_of(&self, target: usize) -> usize {
        let mut order: DetHashMap<usize, usize> = DetHashMap::default();
        let mut queue = VecDeque::new();
        order.insert(0, 0);
        queue.push_back(0usize);
        while let Some(c) = queue.pop_front() {
            for g in 0..self.nrgens {
                if let Some(d) = self.table[(c, g)] {
                    let d = self.resolve(d);
                    if !order.contains_key(&d) {
                        order.insert(d, order.len());
                        queue.push_back(d);
                    }
                }
            }
        }
        *order
            .get(&target)
            .expect("every active coset is reachable from coset 0")
    }

    /// Classes with more than one distinct word (among the relations' and
    /// extra pairs' original words) mapping into them.
    pub fn nontrivial_classes(&mut self) -> Vec<Vec<Word>> {
        self.run();
        let words = self.original_words.clone();
        let mut groups: DetHashMap<usize, Vec<Word>> = DetHashMap::default();
        for word in words {
            let idx = self.word_to_class_index(&word);
            groups.entry(idx).or_default().push(word);
        }
        let mut result: Vec<Vec<Word>> = groups
            .into_values()
            .filter(|words| words.len() > 1)
            .collect();
        result.sort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_presentation_has_four_classes() {
        let mut engine = ToddCoxeterEngine::new(
            2,
            vec![
                (vec![0, 0], vec![0]),
                (vec![1, 1], vec![1]),
                (vec![0, 1, 0], vec![0]),
            ],
            vec![],
            Side::TwoSided,
        )
        .unwrap();
        assert_eq!(engine.nr_classes(), 4);
        assert_eq!(
            engine.word_to_class_index(&[0, 1, 0]),
            engine.word_to_class_index(&[0]),
        );
        // After however many coincidences ran during enumeration, walking
        // the active list from coset 0 must reach exactly `last` after
        // `active` steps, with `forwd[last]` still mirroring `next`.
        let mut visited = 1;
        let mut c = 0;
        while engine.forwd[c] != engine.next {
            c = engine.forwd[c];
            visited += 1;
        }
        assert_eq!(c, engine.last);
        assert_eq!(visited, engine.active);
    }

    #[test]
    fn prefilled_engine_is_a_no_op_with_empty_extra() {
        let mut table = Vec2::new(3, 2);
        table[(0, 0)] = Some(1);
        table[(0, 1)] = Some(2);
        table[(1, 0)] = Some(0);
        table[(1, 1)] = Some(1);
        table[(2, 0)] = Some(2);
        table[(2, 1)] = Some(0);

        let mut engine = ToddCoxeterEngine::new(2, vec![], vec![], Side::Right).unwrap();
        engine.prefill(table).unwrap();
        assert_eq!(engine.nr_classes(), 3);
    }

    #[test]
    fn two_sided_prefill_still_honors_extra_pairs() {
        let mut table = Vec2::new(3, 2);
        table[(0, 0)] = Some(1);
        table[(0, 1)] = Some(2);
        table[(1, 0)] = Some(0);
        table[(1, 1)] = Some(1);
        table[(2, 0)] = Some(2);
        table[(2, 1)] = Some(0);

        // extra identifies coset 1 (word [0]) with coset 2 (word [1]) from
        // the identity coset; Side::TwoSided folds this into `relations` at
        // construction time, so `prefill` must restore it rather than
        // silently dropping the congruence this engine was built for.
        let mut engine =
            ToddCoxeterEngine::new(2, vec![], vec![(vec![0], vec![1])], Side::TwoSided).unwrap();
        engine.prefill(table).unwrap();
        assert_eq!(engine.nr_classes(), 2);
    }

    #[test]
    fn prefill_rejects_wrong_column_count() {
        let engine = ToddCoxeterEngine::new(2, vec![], vec![], Side::Right).unwrap();
        let bad = Vec2::new(2, 3);
        let mut engine = engine;
        assert!(engine.prefill(bad).is_err());
    }

    #[test]
    fn prefill_rejects_zero_rows() {
        let mut engine = ToddCoxeterEngine::new(2, vec![], vec![], Side::Right).unwrap();
        let empty = Vec2::new(0, 2);
        assert!(engine.prefill(empty).is_err());
    }

    #[test]
    fn rejects_relation_with_out_of_range_letter() {
        let result = ToddCoxeterEngine::new(2, vec![(vec![5], vec![0])], vec![], Side::Right);
        assert!(result.is_err());
    }

    #[test]
    fn left_congruence_reverses_words() {
        // `ba = b` under a left congruence behaves like `ab = b` under a
        // right congruence once words are reversed.
        let mut left = ToddCoxeterEngine::new(
            2,
            vec![(vec![1, 0], vec![1])],
            vec![],
            Side::Left,
        )
        .unwrap();
        let mut right = ToddCoxeterEngine::new(
            2,
            vec![(vec![0, 1], vec![1])],
            vec![],
            Side::Right,
        )
        .unwrap();
        assert_eq!(left.nr_classes(), right.nr_classes());
    }

    #[test]
    fn nontrivial_classes_groups_collapsed_words() {
        let mut engine = ToddCoxeterEngine::new(
            1,
            vec![(vec![0, 0, 0], vec![0])],
            vec![],
            Side::TwoSided,
        )
        .unwrap();
        let classes = engine.nontrivial_classes();
        assert!(classes
            .iter()
            .any(|words| words.contains(&vec![0]) && words.contains(&vec![0, 0, 0])));
    }

    #[test]
    fn cancellation_leaves_active_list_consistent() {
        let kill = Arc::new(AtomicBool::new(false));
        // The free commutative monoid on two generators is infinite, so the
        // main loop never reaches `current == next` on its own.
        let mut engine = ToddCoxeterEngine::new(
            2,
            vec![(vec![0, 1], vec![1, 0])],
            vec![],
            Side::TwoSided,
        )
        .unwrap()
        .with_kill_flag(Arc::clone(&kill));
        kill.store(true, Ordering::Relaxed);
        engine.run_bounded(Some(1));
        assert!(!engine.is_done());
        for c in 0..engine.defined {
            if engine.bckwd[c] >= 0 {
                for g in 0..engine.nrgens {
                    if let Some(d) = engine.table[(c, g)] {
                        let mut found = false;
                        let mut p = engine.preim_init[(d, g)];
                        while let Some(pc) = p {
                            if pc == c {
                                found = true;
                                break;
                            }
                            p = engine.preim_next[(pc, g)];
                        }
                        assert!(found, "preimage chain missing entry for ({c}, {g})");
                    }
                }
            }
        }
    }
}
