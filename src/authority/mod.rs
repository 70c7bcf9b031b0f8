//! The scoring authority: the remote service that hands out pairings, scores and winners.
//!
//! The [`Authority`] trait is the only way the bracket logic talks to it, so the
//! [`HttpAuthority`] client, the in-process [`SimulatedAuthority`], or a test fake
//! can be swapped in.

mod http;
mod simulated;

pub use http::HttpAuthority;
pub use simulated::SimulatedAuthority;

use crate::models::{MatchId, Pairing, RoundNumber, Score, TeamId, TeamProfile, TournamentId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by (or while reaching) the authority.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AuthorityError {
    /// The request could not be delivered or answered.
    #[error("authority unavailable: {0}")]
    Unavailable(String),
    /// The authority refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
    /// The answer could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// No tournament with this id was started.
    #[error("unknown tournament {0}")]
    UnknownTournament(TournamentId),
    /// The team id is not part of the tournament.
    #[error("unknown team {team_id} in tournament {tournament_id}")]
    UnknownTeam {
        tournament_id: TournamentId,
        team_id: TeamId,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub teams_per_match: usize,
    #[serde(alias = "numberOfTeams")]
    pub total_teams: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub tournament_id: TournamentId,
    #[serde(alias = "matchUps")]
    pub pairings: Vec<Pairing>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScoreRequest {
    pub tournament_id: TournamentId,
    pub round: RoundNumber,
    #[serde(alias = "match")]
    pub match_id: MatchId,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfoRequest {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerRequest {
    pub tournament_id: TournamentId,
    pub team_scores: Vec<Score>,
    pub match_score: Score,
}

/// The four operations the bracket needs from the authority.
///
/// Futures are not `Send`: a tournament runs on a single task and its fan-out
/// happens by polling several requests at once on that task.
#[async_trait(?Send)]
pub trait Authority {
    /// Begin a tournament and get the first round's pairings.
    async fn start_tournament(&self, request: StartRequest) -> Result<StartResponse, AuthorityError>;

    /// Score for one match of one round.
    async fn match_score(&self, request: MatchScoreRequest) -> Result<Score, AuthorityError>;

    /// Name and score of a team.
    async fn team_info(&self, request: TeamInfoRequest) -> Result<TeamProfile, AuthorityError>;

    /// The winning score among `team_scores`.
    async fn winner(&self, request: WinnerRequest) -> Result<Score, AuthorityError>;
}
