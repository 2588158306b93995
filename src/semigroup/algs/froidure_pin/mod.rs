//! The Froidure-Pin algorithm: breadth-first enumeration of a finite
//! semigroup from a set of generators, producing elements, the left/right
//! Cayley graphs, and a presentation by generators and relations.

pub mod err;

#[cfg(test)]
mod oracle;

use std::time::Instant;

use crate::{
    element::ElementOps,
    reporting::{Algorithm, NoopReporter, ReportRecord, Reporter},
    semigroup::{word::Word, Semigroup},
    utils::vec2::Vec2,
    DetHashMap,
};

use err::FroidurePinError;

const DEFAULT_BATCH_SIZE: usize = 8192;

/// One defining relation discovered during enumeration.
///
/// Duplicate-generator identifications are kept distinct from ordinary
/// `elements[i] * generators[g] = elements[j]` relations because they carry
/// no witness element, only a pair of generator indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpRelation {
    Duplicate { first: usize, dup: usize },
    Product { i: usize, g: usize, j: usize },
}

/// Breadth-first Froidure-Pin enumeration engine.
///
/// Every cross-reference between elements (`prefix`, `suffix`, the Cayley
/// graphs) is a plain index into `elements`, never a pointer: the whole
/// structure is a handful of parallel arenas indexed by element position or
/// `(element, generator)` pair.
pub struct FroidurePinEngine<E>
where
    E: ElementOps,
{
    generators: Vec<E>,
    /// `letter_to_pos[g]` is the index in `elements` of generator `g`'s
    /// canonical representative (duplicate generators collapse onto the
    /// first occurrence).
    letter_to_pos: Vec<usize>,
    /// `canonical_letter[g] == g` unless `g` is a duplicate, in which case
    /// it names the earlier generator index `g` collapsed onto.
    canonical_letter: Vec<usize>,
    /// Pairs `(g, g')` recording that generator `g'` duplicates generator `g`.
    duplicate_gens: Vec<(usize, usize)>,

    elements: Vec<E>,
    element_map: DetHashMap<E, usize>,

    /// `right[(i, g)] = Some(j)` means `elements[i] * generators[g] = elements[j]`.
    right: Vec2<Option<usize>>,
    left: Vec2<Option<usize>>,
    /// `reduced[(i, g)]` is true exactly when `elements[i] * generators[g]`
    /// was new the first time it was computed, i.e. it is not a relation.
    reduced: Vec2<bool>,

    /// Word-tree bookkeeping: `elements[i] = elements[prefix[i]] * generators[final_letter[i]]
    /// = generators[first[i]] * elements[suffix[i]]`.
    first: Vec<usize>,
    final_letter: Vec<usize>,
    prefix: Vec<Option<usize>>,
    suffix: Vec<Option<usize>>,
    length: Vec<usize>,

    /// Boundaries of each wave: `lenindex[k+1]` is the first position past
    /// every element of length `<= k`.
    lenindex: Vec<usize>,
    /// Number of elements whose row has been fully processed.
    pos: usize,
    nr: usize,
    nrrules: usize,
    wordlen: usize,

    tmp_product: Option<E>,
    found_one: bool,
    pos_one: Option<usize>,

    next_relation_dup_idx: usize,
    next_relation_i: usize,
    next_relation_g: usize,

    batch_size: usize,
    reporter: Box<dyn Reporter>,
}

impl<E> FroidurePinEngine<E>
where
    E: ElementOps,
{
    /// Build an engine seeded with `generators`. All generators must share a
    /// degree.
    pub fn new(generators: Vec<E>) -> Result<Self, FroidurePinError> {
        if let Some(first) = generators.first() {
            let degree = first.degree();
            if let Some(bad) = generators.iter().find(|g| g.degree() != degree) {
                return err::MismatchingDegreeSnafu {
                    degree1: degree,
                    degree2: bad.degree(),
                }
                .fail();
            }
        }

        let nrgens = generators.len();
        let mut letter_to_pos = Vec::with_capacity(nrgens);
        let mut canonical_letter = Vec::with_capacity(nrgens);
        let mut duplicate_gens = Vec::new();
        let mut elements = Vec::new();
        let mut element_map = DetHashMap::default();
        let mut first = Vec::new();
        let mut final_letter = Vec::new();
        let mut prefix = Vec::new();
        let mut suffix = Vec::new();
        let mut length = Vec::new();
        let mut found_one = false;
        let mut pos_one = None;

        for (g, elem) in generators.iter().enumerate() {
            if let Some(&idx) = element_map.get(elem) {
                let canon_g = first[idx];
                letter_to_pos.push(idx);
                canonical_letter.push(canon_g);
                duplicate_gens.push((canon_g, g));
            } else {
                let idx = elements.len();
                elements.push(elem.clone());
                element_map.insert(elem.clone(), idx);
                first.push(g);
                final_letter.push(g);
                prefix.push(None);
                suffix.push(None);
                length.push(1);
                letter_to_pos.push(idx);
                canonical_letter.push(g);
                if !found_one && elem.is_id() {
                    found_one = true;
                    pos_one = Some(idx);
                }
            }
        }

        let nr = elements.len();
        let tmp_product = generators.first().cloned();

        Ok(Self {
            generators,
            letter_to_pos,
            canonical_letter,
            duplicate_gens,
            element_map,
            elements,
            right: Vec2::new(nr, nrgens),
            left: Vec2::new(nr, nrgens),
            reduced: Vec2::new(nr, nrgens),
            first,
            final_letter,
            prefix,
            suffix,
            length,
            lenindex: vec![0, nr],
            pos: 0,
            nr,
            nrrules: 0,
            wordlen: 0,
            tmp_product,
            found_one,
            pos_one,
            next_relation_dup_idx: 0,
            next_relation_i: 0,
            next_relation_g: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            reporter: Box::new(NoopReporter),
        })
    }

    /// Build an engine from a [`Semigroup`]'s generators.
    pub fn from_semigroup<S>(semigroup: &S) -> Result<Self, FroidurePinError>
    where
        S: Semigroup<E>,
    {
        Self::new(semigroup.generators().to_vec())
    }

    /// Supply a [`Reporter`] to receive progress records as waves complete.
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Override how many new elements [`Self::position`] and [`Self::at`]
    /// enumerate at a time while searching.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn nrgens(&self) -> usize {
        self.generators.len()
    }

    fn closed(&self) -> bool {
        self.pos >= self.nr
    }

    /// Run the enumeration until closed, or until at least `limit` elements
    /// have been discovered (whichever comes first). `None` means run to
    /// closure.
    pub fn enumerate(&mut self, limit: Option<usize>) {
        let target = limit.unwrap_or(usize::MAX);
        while self.nr < target && !self.closed() {
            self.run_wave();
        }
    }

    fn run_wave(&mut self) {
        let start = Instant::now();
        let wave_start = self.pos;
        let wave_end = self.nr;

        for i in wave_start..wave_end {
            self.extend_right_row(i);
        }
        for i in wave_start..wave_end {
            self.fill_left_row(i);
        }

        self.pos = wave_end;
        self.wordlen += 1;
        self.lenindex.push(self.nr);

        self.reporter.report(ReportRecord {
            algorithm: Algorithm::FroidurePin,
            phase: "wave",
            count: self.nr,
            elapsed: start.elapsed(),
            thread: Some(std::thread::current().id()),
        });
        log::debug!(
            "froidure-pin: wave {} complete, {} elements discovered",
            self.wordlen,
            self.nr
        );
    }

    fn extend_right_row(&mut self, i: usize) {
        for g in 0..self.nrgens() {
            if self.canonical_letter[g] != g {
                let canon = self.canonical_letter[g];
                self.right[(i, g)] = self.right[(i, canon)];
                continue;
            }
            if self.right[(i, g)].is_some() {
                continue;
            }
            match self.suffix[i] {
                None => self.extend_via_multiply(i, g),
                Some(suf) => {
                    if !self.reduced[(suf, g)] {
                        let r = self.right[(suf, g)].expect("suffix row already computed");
                        let result = if self.found_one && Some(r) == self.pos_one {
                            self.letter_to_pos[self.first[i]]
                        } else if let Some(pr) = self.prefix[r] {
                            let x = self.left[(pr, self.first[i])]
                                .expect("left entry computed in an earlier wave");
                            self.right[(x, self.final_letter[r])]
                                .expect("right entry computed in an earlier wave")
                        } else {
                            let x = self.letter_to_pos[self.first[i]];
                            self.right[(x, self.final_letter[r])]
                                .expect("right entry computed in an earlier wave")
                        };
                        self.right[(i, g)] = Some(result);
                        self.nrrules += 1;
                    } else {
                        self.extend_via_multiply(i, g);
                    }
                }
            }
        }
    }

    fn extend_via_multiply(&mut self, i: usize, g: usize) {
        let elem_i = self.elements[i].clone();
        let gen_g = self.generators[g].clone();
        if self.tmp_product.is_none() {
            self.tmp_product = Some(elem_i.clone());
        }
        {
            let tmp = self.tmp_product.as_mut().unwrap();
            E::multiply_into(tmp, &elem_i, &gen_g);
        }
        let product_is_id = self.tmp_product.as_ref().unwrap().is_id();

        if let Some(&existing) = self.element_map.get(self.tmp_product.as_ref().unwrap()) {
            self.right[(i, g)] = Some(existing);
            self.nrrules += 1;
            if !self.found_one && product_is_id {
                self.found_one = true;
                self.pos_one = Some(existing);
            }
            return;
        }

        let new_idx = self.nr;
        let new_elem = self.tmp_product.as_ref().unwrap().clone();
        self.elements.push(new_elem.clone());
        self.element_map.insert(new_elem, new_idx);
        self.first.push(self.first[i]);
        self.final_letter.push(g);
        self.prefix.push(Some(i));
        let suf = match self.suffix[i] {
            Some(s) => self.right[(s, g)].expect("suffix row already computed"),
            None => self.letter_to_pos[g],
        };
        self.suffix.push(Some(suf));
        self.length.push(self.length[i] + 1);

        self.right.add_row();
        self.left.add_row();
        self.reduced.add_row();
        self.reduced[(i, g)] = true;
        self.right[(i, g)] = Some(new_idx);

        self.nr += 1;
        if !self.found_one && product_is_id {
            self.found_one = true;
            self.pos_one = Some(new_idx);
        }
    }

    fn fill_left_row(&mut self, i: usize) {
        for g in 0..self.nrgens() {
            if self.canonical_letter[g] != g {
                let canon = self.canonical_letter[g];
                self.left[(i, g)] = self.left[(i, canon)];
                continue;
            }
            if self.left[(i, g)].is_some() {
                continue;
            }
            let base = match self.prefix[i] {
                Some(p) => self.left[(p, g)].expect("left row of prefix already filled"),
                None => self.letter_to_pos[g],
            };
            self.left[(i, g)] = self.right[(base, self.final_letter[i])];
        }
    }

    /// Number of elements discovered so far without triggering enumeration.
    pub fn nr_known(&self) -> usize {
        self.nr
    }

    /// Run to closure and return the semigroup's size.
    pub fn size(&mut self) -> usize {
        self.enumerate(None);
        self.nr
    }

    /// Number of relations discovered so far.
    pub fn nrrules(&self) -> usize {
        self.nrrules
    }

    /// Degree shared by every element, if any generators exist.
    pub fn degree(&self) -> Option<usize> {
        self.generators.first().map(|g| g.degree())
    }

    /// Index of `element` among the enumerated elements, enumerating
    /// further (in batches) if it has not yet been discovered. Returns
    /// `None` if `element` is not in the closure (or has the wrong degree).
    pub fn position(&mut self, element: &E) -> Option<usize> {
        if let Some(d) = self.degree() {
            if element.degree() != d {
                return None;
            }
        }
        if let Some(&idx) = self.element_map.get(element) {
            return Some(idx);
        }
        loop {
            if self.closed() {
                return None;
            }
            let target = self.nr + self.batch_size;
            self.enumerate(Some(target));
            if let Some(&idx) = self.element_map.get(element) {
                return Some(idx);
            }
        }
    }

    /// The element at index `i`, enumerating further if necessary.
    pub fn at(&mut self, i: usize) -> Option<&E> {
        if i >= self.nr {
            self.enumerate(Some(i + 1));
        }
        self.elements.get(i)
    }

    /// A minimal-length word of generator indices equal to `elements[i]`.
    pub fn factorisation(&mut self, i: usize) -> Option<Word> {
        if i >= self.nr {
            self.enumerate(Some(i + 1));
        }
        if i >= self.nr {
            return None;
        }
        let mut letters = Vec::new();
        let mut cur = i;
        loop {
            match self.prefix[cur] {
                Some(p) => {
                    letters.push(self.final_letter[cur]);
                    cur = p;
                }
                None => {
                    letters.push(self.first[cur]);
                    break;
                }
            }
        }
        letters.reverse();
        Some(letters)
    }

    /// The next defining relation, or `None` once every relation among
    /// currently-known elements has been emitted. The cursor is resumable:
    /// calling [`Self::enumerate`] and then this method again continues
    /// where it left off.
    pub fn next_relation(&mut self) -> Option<FpRelation> {
        if self.next_relation_dup_idx < self.duplicate_gens.len() {
            let (first, dup) = self.duplicate_gens[self.next_relation_dup_idx];
            self.next_relation_dup_idx += 1;
            return Some(FpRelation::Duplicate { first, dup });
        }
        loop {
            if self.next_relation_i >= self.pos {
                return None;
            }
            let i = self.next_relation_i;
            let g = self.next_relation_g;
            if g >= self.nrgens() {
                self.next_relation_i += 1;
                self.next_relation_g = 0;
                continue;
            }
            self.next_relation_g += 1;
            if self.canonical_letter[g] != g {
                continue;
            }
            if !self.reduced[(i, g)] {
                let j = self.right[(i, g)].expect("right entry defined for a processed row");
                return Some(FpRelation::Product { i, g, j });
            }
        }
    }

    /// The fully enumerated right Cayley graph.
    pub fn right_cayley(&mut self) -> &Vec2<Option<usize>> {
        self.enumerate(None);
        &self.right
    }

    /// The fully enumerated left Cayley graph.
    pub fn left_cayley(&mut self) -> &Vec2<Option<usize>> {
        self.enumerate(None);
        &self.left
    }

    fn promote_or_register_generator(&mut self, elem: E) {
        let g = self.generators.len();
        if let Some(&idx) = self.element_map.get(&elem) {
            let already_a_generator = self.prefix[idx].is_none()
                && self.letter_to_pos.get(self.first[idx]) == Some(&idx)
                && self.canonical_letter[self.first[idx]] == self.first[idx];
            if already_a_generator {
                let canon_g = self.first[idx];
                self.duplicate_gens.push((canon_g, g));
                self.letter_to_pos.push(idx);
                self.canonical_letter.push(canon_g);
            } else {
                self.first[idx] = g;
                self.final_letter[idx] = g;
                self.prefix[idx] = None;
                self.suffix[idx] = None;
                self.length[idx] = 1;
                self.letter_to_pos.push(idx);
                self.canonical_letter.push(g);
            }
        } else {
            let idx = self.elements.len();
            self.elements.push(elem.clone());
            self.element_map.insert(elem.clone(), idx);
            self.first.push(g);
            self.final_letter.push(g);
            self.prefix.push(None);
            self.suffix.push(None);
            self.length.push(1);
            self.letter_to_pos.push(idx);
            self.canonical_letter.push(g);
            self.nr += 1;
            self.right.add_row();
            self.left.add_row();
            self.reduced.add_row();
            if !self.found_one && elem.is_id() {
                self.found_one = true;
                self.pos_one = Some(idx);
            }
        }
        self.generators.push(elem);
    }

    /// Extend the generator set in place, reusing every previously computed
    /// element index, Cayley-graph entry, and relation.
    ///
    /// Only the `(i, g)` pairs touching a new generator column, or an
    /// element row that had not yet been processed, do any work: already
    /// filled `right`/`left` entries are left untouched.
    pub fn add_generators(&mut self, more: Vec<E>) -> Result<(), FroidurePinError> {
        if more.is_empty() {
            return Ok(());
        }
        if let Some(degree) = self.degree().or_else(|| more.first().map(|e| e.degree())) {
            if let Some(bad) = self
                .generators
                .iter()
                .chain(more.iter())
                .find(|e| e.degree() != degree)
            {
                return err::MismatchingDegreeSnafu {
                    degree1: degree,
                    degree2: bad.degree(),
                }
                .fail();
            }
        }

        let old_nrgens = self.generators.len();
        for elem in more {
            self.promote_or_register_generator(elem);
        }
        for _ in old_nrgens..self.generators.len() {
            self.right.add_col();
            self.left.add_col();
            self.reduced.add_col();
        }

        let old_pos = self.pos;
        for i in 0..old_pos {
            self.extend_right_row(i);
        }
        for i in 0..old_pos {
            self.fill_left_row(i);
        }
        Ok(())
    }

    /// Alias of [`Self::add_generators`] for the semigroup-closure framing:
    /// `closure(more)` is the semigroup generated by the union of the
    /// current generators with `more`.
    pub fn closure(&mut self, more: Vec<E>) -> Result<(), FroidurePinError> {
        self.add_generators(more)
    }
}

impl<E> FroidurePinEngine<E>
where
    E: ElementOps + Sync,
{
    /// Count idempotents (`x` with `x * x = x`) among the enumerated
    /// elements, scanning `0..nr` in `threads` chunks with no shared
    /// mutable state beyond the atomic tally.
    pub fn nr_idempotents(&mut self, threads: usize) -> usize {
        self.enumerate(None);
        let nr = self.nr;
        if nr == 0 {
            return 0;
        }
        let threads = threads.max(1).min(nr);
        let chunk = (nr + threads - 1) / threads;
        let elements = &self.elements[..nr];
        let counter = std::sync::atomic::AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for t in 0..threads {
                let start = t * chunk;
                let end = ((t + 1) * chunk).min(nr);
                if start >= end {
                    continue;
                }
                let counter = &counter;
                scope.spawn(move || {
                    let local = (start..end)
                        .filter(|&x| elements[x].multiply(&elements[x]) == elements[x])
                        .count();
                    counter.fetch_add(local, std::sync::atomic::Ordering::Relaxed);
                });
            }
        });
        counter.load(std::sync::atomic::Ordering::Relaxed)
    }
}
