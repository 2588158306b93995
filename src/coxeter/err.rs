use snafu::Snafu;

/// Errors raised while constructing or seeding a [`super::ToddCoxeterEngine`].
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ToddCoxeterError {
    #[snafu(display("relation word uses letter {letter}, outside 0..{nrgens}"))]
    LetterOutOfRange { letter: usize, nrgens: usize },
    #[snafu(display("prefill table must have at least one row"))]
    EmptyPrefill,
    #[snafu(display("prefill table has {actual} columns, expected {expected} (nrgens)"))]
    PrefillColumnMismatch { expected: usize, actual: usize },
}
