use snafu::Snafu;

use crate::coxeter::err::ToddCoxeterError;

/// Errors raised while assembling or racing a [`super::CongruenceDispatcher`].
#[derive(Debug, Snafu)]
pub enum DispatcherError {
    #[snafu(display("invalid presentation: {source}"))]
    Presentation { source: ToddCoxeterError },
    #[snafu(display("every racing candidate failed to complete"))]
    NoCandidateCompleted,
    #[snafu(display("race timed out before any candidate completed"))]
    TimedOut,
}

impl From<ToddCoxeterError> for DispatcherError {
    fn from(source: ToddCoxeterError) -> Self {
        DispatcherError::Presentation { source }
    }
}
