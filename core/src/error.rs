use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("Invalid cell, out of bounds or not selectable")]
    InvalidCell,
    #[error("Round already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Reveal at least one cell before cashing out")]
    NothingRevealedYet,
    #[error("Pick a hinted cell or cancel the hint selection first")]
    PendingHintSelection,
    #[error("Not enough winnings to pay for the hint")]
    InsufficientCredits,
    #[error("No revealed cell has a hidden neighbour to hint")]
    NoHintCandidates,
}

pub type Result<T> = core::result::Result<T, SessionError>;
