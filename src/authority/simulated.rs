//! In-process authority with seeded random scores, for the server and tests.

use super::{
    Authority, AuthorityError, MatchScoreRequest, StartRequest, StartResponse, TeamInfoRequest,
    WinnerRequest,
};
use crate::models::{Pairing, Score, TeamId, TeamProfile, TournamentId};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

const MAX_SCORE: Score = 100;

const ADJECTIVES: &[&str] = &[
    "Crimson", "Silent", "Rapid", "Golden", "Iron", "Lucky", "Northern", "Wild",
];
const NOUNS: &[&str] = &[
    "Falcons", "Otters", "Comets", "Badgers", "Rockets", "Wolves", "Pilots", "Hornets",
];

/// Plays the authority's role locally. Team and match scores are drawn from a
/// seeded RNG, so a given seed always produces the same bracket.
pub struct SimulatedAuthority {
    rng: RefCell<StdRng>,
    tournaments: RefCell<HashMap<TournamentId, HashMap<TeamId, TeamProfile>>>,
    next_id: Cell<TournamentId>,
    latency: Duration,
}

impl SimulatedAuthority {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            tournaments: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Delay every response by `latency`, on top of the yield each call makes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn respond(&self) {
        tokio::task::yield_now().await;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn team_name(&self, team_id: TeamId) -> String {
        let mut rng = self.rng.borrow_mut();
        let adjective = ADJECTIVES.choose(&mut *rng).copied().unwrap_or("Plain");
        let noun = NOUNS.choose(&mut *rng).copied().unwrap_or("Team");
        format!("{adjective} {noun} #{team_id}")
    }
}

#[async_trait(?Send)]
impl Authority for SimulatedAuthority {
    async fn start_tournament(&self, request: StartRequest) -> Result<StartResponse, AuthorityError> {
        self.respond().await;
        if request.teams_per_match == 0 || request.total_teams == 0 {
            return Err(AuthorityError::Rejected(format!(
                "teamsPerMatch and totalTeams must be positive (got {} and {})",
                request.teams_per_match, request.total_teams
            )));
        }

        let tournament_id = self.next_id.get();
        self.next_id.set(tournament_id + 1);

        let team_ids: Vec<TeamId> = (0..request.total_teams as TeamId).collect();
        let mut teams = HashMap::with_capacity(team_ids.len());
        for &team_id in &team_ids {
            let name = self.team_name(team_id);
            let score = self.rng.borrow_mut().gen_range(0..MAX_SCORE);
            teams.insert(team_id, TeamProfile { name, score });
        }
        self.tournaments.borrow_mut().insert(tournament_id, teams);

        let pairings = team_ids
            .chunks(request.teams_per_match)
            .zip(0..)
            .map(|(chunk, match_id)| Pairing::new(match_id, chunk.to_vec()))
            .collect();
        log::debug!(
            "Simulated authority opened tournament {} with {} teams",
            tournament_id,
            request.total_teams
        );
        Ok(StartResponse {
            tournament_id,
            pairings,
        })
    }

    async fn match_score(&self, request: MatchScoreRequest) -> Result<Score, AuthorityError> {
        self.respond().await;
        if !self.tournaments.borrow().contains_key(&request.tournament_id) {
            return Err(AuthorityError::UnknownTournament(request.tournament_id));
        }
        Ok(self.rng.borrow_mut().gen_range(0..MAX_SCORE))
    }

    async fn team_info(&self, request: TeamInfoRequest) -> Result<TeamProfile, AuthorityError> {
        self.respond().await;
        let tournaments = self.tournaments.borrow();
        let teams = tournaments
            .get(&request.tournament_id)
            .ok_or(AuthorityError::UnknownTournament(request.tournament_id))?;
        teams
            .get(&request.team_id)
            .cloned()
            .ok_or(AuthorityError::UnknownTeam {
                tournament_id: request.tournament_id,
                team_id: request.team_id,
            })
    }

    /// The team score closest to the match score wins; the earlier entry wins a tie.
    async fn winner(&self, request: WinnerRequest) -> Result<Score, AuthorityError> {
        self.respond().await;
        if !self.tournaments.borrow().contains_key(&request.tournament_id) {
            return Err(AuthorityError::UnknownTournament(request.tournament_id));
        }
        request
            .team_scores
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|&(idx, score)| (score.abs_diff(request.match_score), idx))
            .map(|(_, score)| score)
            .ok_or_else(|| AuthorityError::Rejected("no team scores given".to_string()))
    }
}
