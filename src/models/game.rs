//! GameMatch: one contest among a fixed group of teams within a round.

use crate::authority::{MatchScoreRequest, WinnerRequest};
use crate::models::team::{Score, Team, TeamId};
use crate::models::tournament::{Tournament, TournamentError};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Identifier for a match, unique within its round.
pub type MatchId = u64;

/// 1-based round number.
pub type RoundNumber = u32;

/// A group of teams assigned to one match, in the shape the authority uses.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pairing {
    #[serde(alias = "match")]
    pub match_id: MatchId,
    pub team_ids: Vec<TeamId>,
}

impl Pairing {
    pub fn new(match_id: MatchId, team_ids: Vec<TeamId>) -> Self {
        Self { match_id, team_ids }
    }
}

/// A match in a round. Participants are kept in ascending id order so that on
/// a score tie the lower id is found first.
#[derive(Clone, Debug)]
pub struct GameMatch {
    pub id: MatchId,
    pub round: RoundNumber,
    team_ids: Vec<TeamId>,
    /// None until the round has been resolved.
    winner: Option<Rc<Team>>,
}

impl GameMatch {
    pub fn new(id: MatchId, round: RoundNumber, mut team_ids: Vec<TeamId>) -> Self {
        team_ids.sort_unstable();
        Self {
            id,
            round,
            team_ids,
            winner: None,
        }
    }

    pub fn from_pairing(pairing: Pairing, round: RoundNumber) -> Self {
        Self::new(pairing.match_id, round, pairing.team_ids)
    }

    pub fn team_ids(&self) -> &[TeamId] {
        &self.team_ids
    }

    pub fn winner(&self) -> Option<&Rc<Team>> {
        self.winner.as_ref()
    }

    pub(crate) fn set_winner(&mut self, team: Rc<Team>) {
        self.winner = Some(team);
    }

    /// Play the match: resolve every participant through the tournament's cache,
    /// fetch the match score, then ask the authority which score wins.
    pub async fn run(&self, tournament: &Tournament) -> Result<Rc<Team>, TournamentError> {
        let tournament_id = tournament.require_id()?;
        let teams = try_join_all(self.team_ids.iter().map(|&id| tournament.resolve_team(id)))
            .await
            .map_err(|source| TournamentError::Match {
                tournament_id,
                round: self.round,
                match_id: self.id,
                source: Box::new(source),
            })?;

        let authority = tournament.authority();
        let match_score = authority
            .match_score(MatchScoreRequest {
                tournament_id,
                round: self.round,
                match_id: self.id,
            })
            .await
            .map_err(|source| TournamentError::MatchScore {
                tournament_id,
                round: self.round,
                match_id: self.id,
                source,
            })?;

        let team_scores: Vec<Score> = teams.iter().filter_map(|t| t.score()).collect();
        log::debug!(
            "Will play match {{tournament:{},round:{},match:{}}} between {}",
            tournament_id,
            self.round,
            self.id,
            teams
                .iter()
                .map(|t| format!("{} [{}]", t.name().unwrap_or("?"), t.score().unwrap_or_default()))
                .collect::<Vec<_>>()
                .join(" and ")
        );

        let winning_score = authority
            .winner(WinnerRequest {
                tournament_id,
                team_scores: team_scores.clone(),
                match_score,
            })
            .await
            .map_err(|source| TournamentError::Winner {
                tournament_id,
                round: self.round,
                match_id: self.id,
                team_scores,
                match_score,
                source,
            })?;

        let winner = pick_winner(&teams, winning_score)
            .cloned()
            .ok_or(TournamentError::WinnerNotFound {
                tournament_id,
                round: self.round,
                match_id: self.id,
                score: winning_score,
            })?;

        tournament
            .observer()
            .on_match_ended(&tournament.match_context(self), &winner);
        Ok(winner)
    }
}

/// First team, in the given order, whose score equals `winning_score`.
pub fn pick_winner(teams: &[Rc<Team>], winning_score: Score) -> Option<&Rc<Team>> {
    teams.iter().find(|t| t.score() == Some(winning_score))
}
