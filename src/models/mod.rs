//! Data structures for the bracket: tournament, matches, teams.

mod game;
mod team;
mod tournament;

pub use game::{pick_winner, GameMatch, MatchId, Pairing, RoundNumber};
pub use team::{Score, Team, TeamId, TeamProfile};
pub use tournament::{
    Outcome, Tournament, TournamentConfig, TournamentError, TournamentId, TournamentTag,
};
