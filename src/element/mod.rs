pub mod transformation;

use std::hash::Hash;

/// Contract a concrete element type must satisfy to be enumerated by
/// [`crate::semigroup::algs::froidure_pin::FroidurePinEngine`].
///
/// Multiplication must be associative, but this is not (and cannot be)
/// checked by the engine. `degree` and `complexity` are cost hints consumed
/// by the enumeration algorithm's reduction shortcut; `multiply_into` must
/// never fail and must not allocate.
pub trait ElementOps: Clone + Eq + Hash {
    /// Multiply two elements together, producing a new element.
    fn multiply(&self, other: &Self) -> Self {
        let mut dst = self.clone();
        Self::multiply_into(&mut dst, self, other);
        dst
    }

    /// Write `a * b` into `dst` without allocating. `dst` is not assumed to
    /// hold any particular prior value; implementations may freely overwrite
    /// it in place.
    fn multiply_into(dst: &mut Self, a: &Self, b: &Self);

    /// Degree of this element (e.g. the number of points a transformation
    /// acts on). All elements of one semigroup must share a degree; the
    /// engine rejects mismatches before calling `multiply_into`.
    fn degree(&self) -> usize;

    /// Monotonic cost estimate for computing a product directly, versus
    /// following the Cayley graph to reach the same result. Higher means
    /// more expensive.
    fn complexity(&self) -> usize {
        self.degree()
    }

    /// The identity element for this element's semigroup, if well-defined
    /// for this element type.
    fn identity(&self) -> Self;

    /// Whether this element is the identity for its semigroup.
    fn is_id(&self) -> bool {
        false
    }
}
