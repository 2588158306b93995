use std::sync::Arc;

use super::ElementOps;

pub mod err;

/// Representation of a transformation on the points 0..degree-1.
/// This is stored as a vector using the images of each point from 0..degree-1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transformation {
    degree: usize,
    vals: Arc<[usize]>,
}

impl Transformation {
    pub fn as_vec(&self) -> &[usize] {
        &self.vals[..]
    }

    /// Create transformation from vec of images
    /// This returns an error if the points are not defined on the given degree.
    pub fn from_vec(degree: usize, vals: Vec<usize>) -> Result<Self, err::TransformationError> {
        if vals.len() != degree || !vals.iter().all(|x| *x < degree) {
            Err(err::TransformationError::InvalidImage {
                degree,
                image: vals,
            })
        } else {
            Ok(Transformation::from_vec_unchecked(degree, vals))
        }
    }

    /// Create a Transformation given an image. This does not perform the validation.
    pub(crate) fn from_vec_unchecked(degree: usize, vals: Vec<usize>) -> Self {
        Self {
            degree,
            vals: vals.into(),
        }
    }

    /// Return the identity transformation on degree points
    /// ```
    /// use semigroups::element::transformation::Transformation;
    ///
    /// let id = Transformation::id(5);
    /// assert!(id.is_id())
    /// ```
    pub fn id(degree: usize) -> Self {
        let vals: Vec<_> = (0..degree).collect();
        Self {
            degree,
            vals: vals.into(),
        }
    }

    /// Return if a transformation is the identity transformation.
    pub fn is_id(&self) -> bool {
        self.vals.iter().enumerate().all(|(i, x)| i == *x)
    }

    /// Return the degree of the transformation
    /// ```
    /// use semigroups::element::transformation::Transformation;
    ///
    /// let id = Transformation::id(8);
    /// assert_eq!(8_usize, id.degree())
    /// ```
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Apply the transformation to a given point.
    /// If x is less than the degree of the tranformation, then the result of applying the transformation is returned. Otherwise an error is returned.
    /// ```
    /// use semigroups::element::transformation::Transformation;
    ///
    /// let f = Transformation::from_vec(3, vec![0, 2, 2]).unwrap();
    /// assert_eq!(2, f.apply(1).unwrap());
    /// assert!(f.apply(5).is_err())
    /// ```
    pub fn apply(&self, x: usize) -> Result<usize, err::TransformationError> {
        if x < self.degree {
            Ok(self.vals[x])
        } else {
            Err(err::TransformationError::InvalidPoint {
                degree: self.degree,
                point: x,
            })
        }
    }

    /// Compose two tranformations.
    /// This is only defined for transformations of the same degree
    /// ```
    /// use semigroups::element::transformation::Transformation;
    ///
    /// let f = Transformation::from_vec(3, vec![0, 2, 2]).unwrap();
    /// let g = Transformation::from_vec(3, vec![2, 1, 0]).unwrap();
    /// let fg = f.multiply(&g).unwrap();
    /// assert_eq!(0, fg.apply(1).unwrap())
    /// ```
    pub fn multiply(&self, other: &Self) -> Result<Self, err::TransformationError> {
        if self.degree == other.degree {
            let vals = (0..self.degree)
                .map(|x| other.apply(self.apply(x).unwrap()).unwrap())
                .collect();
            Ok(Transformation::from_vec_unchecked(self.degree, vals))
        } else {
            Err(err::TransformationError::MismatchingDegree {
                degree1: self.degree,
                degree2: other.degree,
            })
        }
    }
}

impl ElementOps for Transformation {
    fn multiply_into(dst: &mut Self, a: &Self, b: &Self) {
        debug_assert_eq!(
            a.degree, b.degree,
            "multiply_into called on transformations of differing degree"
        );
        let vals: Vec<usize> = (0..a.degree).map(|x| b.vals[a.vals[x]]).collect();
        dst.degree = a.degree;
        dst.vals = vals.into();
    }

    fn degree(&self) -> usize {
        self.degree
    }

    fn complexity(&self) -> usize {
        self.degree
    }

    fn identity(&self) -> Self {
        Transformation::id(self.degree)
    }

    fn is_id(&self) -> bool {
        self.is_id()
    }
}

impl std::fmt::Display for Transformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        let mut sep = "";
        for (i, x) in self.vals.iter().enumerate() {
            write!(f, "{}{}:{}", sep, i, x)?;
            sep = ", "
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementOps, Transformation};

    #[test]
    fn id() {
        let id0 = Transformation::id(0);
        let id10 = Transformation::id(10);
        let f = Transformation::from_vec(2, vec![1, 1]).unwrap();
        assert!(id0.is_id());
        assert!(id10.is_id());
        assert!(!f.is_id());
    }

    #[test]
    fn invalid_image() {
        // Invalid for value out of range
        let f = Transformation::from_vec(3, vec![0, 0, 4]);
        // Invalid for too many values
        let g = Transformation::from_vec(4, vec![1, 2, 3]);
        assert!(f.is_err());
        assert!(g.is_err());
    }

    #[test]
    fn multiply_inverse() {
        let f = Transformation::from_vec(4, vec![3, 2, 1, 0]).unwrap();
        let f2 = f.multiply(&f).unwrap();
        assert!(f2.is_id())
    }

    #[test]
    fn multiply() {
        let f = Transformation::from_vec(4, vec![2, 2, 3, 1]).unwrap();
        let g = Transformation::from_vec(4, vec![2, 1, 1, 3]).unwrap();
        let fg = Transformation::from_vec(4, vec![1, 1, 3, 1]).unwrap();
        assert_eq!(fg, f.multiply(&g).unwrap());
    }

    #[test]
    fn multiply_into_matches_multiply() {
        let f = Transformation::from_vec(5, vec![1, 0, 2, 4, 3]).unwrap();
        let g = Transformation::from_vec(5, vec![4, 3, 2, 1, 0]).unwrap();
        let mut dst = Transformation::id(5);
        ElementOps::multiply_into(&mut dst, &f, &g);
        assert_eq!(dst, f.multiply(&g).unwrap());
    }

    #[test]
    fn identity_is_identity() {
        let f = Transformation::from_vec(4, vec![2, 2, 3, 1]).unwrap();
        let id = ElementOps::identity(&f);
        assert_eq!(f.multiply(&id).unwrap(), f);
        assert_eq!(id.multiply(&f).unwrap(), f);
    }
}
