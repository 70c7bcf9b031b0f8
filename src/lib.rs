//! Knockout bracket orchestrator: plays a single-elimination tournament against a
//! remote scoring authority and reports progress to an observer.

pub mod authority;
pub mod logic;
pub mod models;
pub mod observer;

pub use authority::{Authority, AuthorityError, HttpAuthority, SimulatedAuthority};
pub use logic::next_round_pairings;
pub use models::{
    pick_winner, GameMatch, MatchId, Outcome, Pairing, RoundNumber, Score, Team, TeamId,
    TeamProfile, Tournament, TournamentConfig, TournamentError, TournamentId, TournamentTag,
};
pub use observer::{Event, EventContext, EventKind, EventLog, EventSink, NoopObserver, Observer};
