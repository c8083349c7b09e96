use thiserror::Error;

use crate::ranked::MatchPhase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("cannot {action} while match is {phase:?}")]
    InvalidTransition {
        phase: MatchPhase,
        action: &'static str,
    },
}
