//! Tournament, its configuration, and errors.

use crate::authority::{Authority, AuthorityError};
use crate::models::game::{GameMatch, MatchId, RoundNumber};
use crate::models::team::{Score, Team, TeamId};
use crate::observer::{EventContext, Observer};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

/// Identifier assigned to a tournament by the scoring authority.
pub type TournamentId = u64;

/// Per-instance routing tag carried on every event.
pub type TournamentTag = Uuid;

/// Errors that can end a tournament. Each one is fatal to the whole bracket.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Group size or team count out of range.
    #[error("invalid tournament configuration: {0}")]
    InvalidConfig(String),
    /// The authority has not assigned an id yet.
    #[error("tournament has not been started by the authority yet")]
    NotStarted,
    /// The start request failed.
    #[error("could not start tournament ({teams_per_match} teams per match, {total_teams} teams): {source}")]
    Start {
        teams_per_match: usize,
        total_teams: usize,
        #[source]
        source: AuthorityError,
    },
    /// Initial pairings were empty or contained an empty group.
    #[error("authority returned no usable pairings for tournament {tournament_id}")]
    EmptyBracket { tournament_id: TournamentId },
    /// Fetching a team's name and score failed.
    #[error("could not get data for team <{tournament_id},{team_id}>: {source}")]
    Team {
        tournament_id: TournamentId,
        team_id: TeamId,
        #[source]
        source: AuthorityError,
    },
    /// Fetching a match score failed.
    #[error("could not get score for match <tournament:{tournament_id}, round:{round}, match:{match_id}>: {source}")]
    MatchScore {
        tournament_id: TournamentId,
        round: RoundNumber,
        match_id: MatchId,
        #[source]
        source: AuthorityError,
    },
    /// The winner request failed.
    #[error("could not get winner for match <tournament:{tournament_id}, round:{round}, match:{match_id}, teamScores:{team_scores:?}, matchScore:{match_score}>: {source}")]
    Winner {
        tournament_id: TournamentId,
        round: RoundNumber,
        match_id: MatchId,
        team_scores: Vec<Score>,
        match_score: Score,
        #[source]
        source: AuthorityError,
    },
    /// The winning score matched none of the participants.
    #[error("no team in match <tournament:{tournament_id}, round:{round}, match:{match_id}> has winning score {score}")]
    WinnerNotFound {
        tournament_id: TournamentId,
        round: RoundNumber,
        match_id: MatchId,
        score: Score,
    },
    /// A participant could not be resolved.
    #[error("could not play match <tournament:{tournament_id}, round:{round}, match:{match_id}>: {source}")]
    Match {
        tournament_id: TournamentId,
        round: RoundNumber,
        match_id: MatchId,
        #[source]
        source: Box<TournamentError>,
    },
    /// A match in the round failed.
    #[error("could not play round {round} of tournament {tournament_id}: {source}")]
    Round {
        tournament_id: TournamentId,
        round: RoundNumber,
        #[source]
        source: Box<TournamentError>,
    },
}

/// Bracket shape requested from the authority.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    pub teams_per_match: usize,
    #[serde(alias = "numberOfTeams")]
    pub total_teams: usize,
}

impl TournamentConfig {
    pub fn new(teams_per_match: usize, total_teams: usize) -> Self {
        Self {
            teams_per_match,
            total_teams,
        }
    }

    /// A group size below 2 can never reduce the field to one winner.
    pub fn validate(&self) -> Result<(), TournamentError> {
        if self.teams_per_match < 2 {
            return Err(TournamentError::InvalidConfig(format!(
                "teams per match must be at least 2 (got {})",
                self.teams_per_match
            )));
        }
        if self.total_teams == 0 {
            return Err(TournamentError::InvalidConfig(
                "a tournament needs at least one team".to_string(),
            ));
        }
        Ok(())
    }
}

/// Final result of a completed tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub winner_id: TeamId,
    pub winner_name: String,
    pub rounds_played: usize,
}

/// A single-elimination tournament. Owns its round history and team cache;
/// matches and teams borrow it while they run.
pub struct Tournament {
    tag: TournamentTag,
    config: TournamentConfig,
    id: Option<TournamentId>,
    /// Every round played, in order. Kept as an audit trail.
    pub(crate) rounds: Vec<Vec<GameMatch>>,
    teams: RefCell<HashMap<TeamId, Rc<Team>>>,
    authority: Rc<dyn Authority>,
    observer: Rc<dyn Observer>,
}

impl Tournament {
    pub fn new(
        config: TournamentConfig,
        authority: Rc<dyn Authority>,
        observer: Rc<dyn Observer>,
    ) -> Self {
        Self {
            tag: Uuid::new_v4(),
            config,
            id: None,
            rounds: Vec::new(),
            teams: RefCell::new(HashMap::new()),
            authority,
            observer,
        }
    }

    /// Use a caller-chosen routing tag instead of a random one.
    pub fn with_tag(mut self, tag: TournamentTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn tag(&self) -> TournamentTag {
        self.tag
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Authority-assigned id; `None` until started.
    pub fn id(&self) -> Option<TournamentId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: TournamentId) {
        self.id = Some(id);
    }

    pub(crate) fn require_id(&self) -> Result<TournamentId, TournamentError> {
        self.id.ok_or(TournamentError::NotStarted)
    }

    pub fn rounds(&self) -> &[Vec<GameMatch>] {
        &self.rounds
    }

    /// Number of the most recently started round (0 before play).
    pub fn current_round(&self) -> RoundNumber {
        self.rounds.len() as RoundNumber
    }

    pub fn cached_team(&self, team_id: TeamId) -> Option<Rc<Team>> {
        self.teams.borrow().get(&team_id).cloned()
    }

    pub fn team_count(&self) -> usize {
        self.teams.borrow().len()
    }

    pub(crate) fn authority(&self) -> &dyn Authority {
        self.authority.as_ref()
    }

    pub(crate) fn observer(&self) -> &dyn Observer {
        self.observer.as_ref()
    }

    /// Get a populated team, creating and caching it on first reference.
    ///
    /// The entry is cached before the fetch starts, so concurrent lookups of the
    /// same id share one instance and one authority request.
    pub async fn resolve_team(&self, team_id: TeamId) -> Result<Rc<Team>, TournamentError> {
        let tournament_id = self.require_id()?;
        let team = Rc::clone(
            self.teams
                .borrow_mut()
                .entry(team_id)
                .or_insert_with(|| Rc::new(Team::new(team_id))),
        );
        team.populate(self.authority(), tournament_id).await?;
        Ok(team)
    }

    pub(crate) fn context(&self) -> EventContext {
        EventContext::new(self.tag, self.id)
    }

    pub(crate) fn round_context(&self, round: RoundNumber) -> EventContext {
        self.context().with_round(round)
    }

    pub(crate) fn match_context(&self, game: &GameMatch) -> EventContext {
        self.round_context(game.round).with_match(game.id)
    }
}
