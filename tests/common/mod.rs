//! Scripted authority used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use knockout_bracket::authority::{
    MatchScoreRequest, StartRequest, StartResponse, TeamInfoRequest, WinnerRequest,
};
use knockout_bracket::{Authority, AuthorityError, Pairing, Score, TeamId, TeamProfile};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// How the fake picks a winning score from the participants' scores.
pub type WinnerRule = fn(&[Score], Score) -> Score;

pub fn highest(scores: &[Score], _match_score: Score) -> Score {
    scores.iter().copied().max().unwrap_or_default()
}

pub fn lowest(scores: &[Score], _match_score: Score) -> Score {
    scores.iter().copied().min().unwrap_or_default()
}

/// Answers from fixed data and counts every call it receives.
pub struct ScriptedAuthority {
    pub tournament_id: u64,
    pub pairings: Vec<Pairing>,
    pub scores: HashMap<TeamId, Score>,
    pub winner_rule: WinnerRule,
    pub fail_start: bool,
    pub failing_teams: HashSet<TeamId>,
    pub failing_matches: HashSet<(u32, u64)>,
    pub failing_winners: Vec<Vec<Score>>,
    pub team_calls: RefCell<HashMap<TeamId, usize>>,
    pub match_calls: RefCell<Vec<MatchScoreRequest>>,
    pub start_calls: RefCell<usize>,
}

impl ScriptedAuthority {
    /// Teams `0..total`, each scoring its own id, paired in consecutive chunks.
    pub fn bracket(tournament_id: u64, teams_per_match: usize, total: u64) -> Self {
        let ids: Vec<TeamId> = (0..total).collect();
        let pairings = ids
            .chunks(teams_per_match)
            .enumerate()
            .map(|(i, c)| Pairing::new(i as u64, c.to_vec()))
            .collect();
        Self::with_pairings(tournament_id, pairings, ids.iter().map(|&id| (id, id)).collect())
    }

    pub fn with_pairings(
        tournament_id: u64,
        pairings: Vec<Pairing>,
        scores: HashMap<TeamId, Score>,
    ) -> Self {
        Self {
            tournament_id,
            pairings,
            scores,
            winner_rule: highest,
            fail_start: false,
            failing_teams: HashSet::new(),
            failing_matches: HashSet::new(),
            failing_winners: Vec::new(),
            team_calls: RefCell::new(HashMap::new()),
            match_calls: RefCell::new(Vec::new()),
            start_calls: RefCell::new(0),
        }
    }

    pub fn winner_rule(mut self, rule: WinnerRule) -> Self {
        self.winner_rule = rule;
        self
    }

    pub fn failing_team(mut self, team_id: TeamId) -> Self {
        self.failing_teams.insert(team_id);
        self
    }

    /// Score lookups for this round and match answer with an error.
    pub fn failing_match_score(mut self, round: u32, match_id: u64) -> Self {
        self.failing_matches.insert((round, match_id));
        self
    }

    /// Winner lookups for exactly these team scores answer with an error.
    pub fn failing_winner(mut self, team_scores: Vec<Score>) -> Self {
        self.failing_winners.push(team_scores);
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn team_calls(&self, team_id: TeamId) -> usize {
        self.team_calls.borrow().get(&team_id).copied().unwrap_or(0)
    }

    pub fn max_team_calls(&self) -> usize {
        self.team_calls.borrow().values().copied().max().unwrap_or(0)
    }

    /// Number of distinct rounds the matches were scored in.
    pub fn rounds_scored(&self) -> usize {
        self.match_calls
            .borrow()
            .iter()
            .map(|r| r.round)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[async_trait(?Send)]
impl Authority for ScriptedAuthority {
    async fn start_tournament(&self, _request: StartRequest) -> Result<StartResponse, AuthorityError> {
        *self.start_calls.borrow_mut() += 1;
        tokio::task::yield_now().await;
        if self.fail_start {
            return Err(AuthorityError::Unavailable("connection refused".to_string()));
        }
        Ok(StartResponse {
            tournament_id: self.tournament_id,
            pairings: self.pairings.clone(),
        })
    }

    async fn match_score(&self, request: MatchScoreRequest) -> Result<Score, AuthorityError> {
        let key = (request.round, request.match_id);
        self.match_calls.borrow_mut().push(request);
        tokio::task::yield_now().await;
        if self.failing_matches.contains(&key) {
            return Err(AuthorityError::Unavailable("timed out".to_string()));
        }
        Ok(50)
    }

    async fn team_info(&self, request: TeamInfoRequest) -> Result<TeamProfile, AuthorityError> {
        *self.team_calls.borrow_mut().entry(request.team_id).or_insert(0) += 1;
        tokio::task::yield_now().await;
        if self.failing_teams.contains(&request.team_id) {
            return Err(AuthorityError::Unavailable("503 Service Unavailable".to_string()));
        }
        let score = self
            .scores
            .get(&request.team_id)
            .copied()
            .ok_or(AuthorityError::UnknownTeam {
                tournament_id: request.tournament_id,
                team_id: request.team_id,
            })?;
        Ok(TeamProfile {
            name: format!("Team {}", request.team_id),
            score,
        })
    }

    async fn winner(&self, request: WinnerRequest) -> Result<Score, AuthorityError> {
        tokio::task::yield_now().await;
        if self.failing_winners.contains(&request.team_scores) {
            return Err(AuthorityError::Rejected("400 Bad Request".to_string()));
        }
        Ok((self.winner_rule)(&request.team_scores, request.match_score))
    }
}
