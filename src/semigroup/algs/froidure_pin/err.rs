use snafu::Snafu;

/// Errors raised while constructing or extending a [`super::FroidurePinEngine`].
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum FroidurePinError {
    #[snafu(display("generators have mismatching degrees {degree1} and {degree2}"))]
    MismatchingDegree { degree1: usize, degree2: usize },
}
