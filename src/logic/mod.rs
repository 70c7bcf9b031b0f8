//! Bracket progression: starting a tournament and advancing it round by round.

mod bracket;

pub use bracket::next_round_pairings;
