//! Round advancement: start the tournament, play rounds until one winner is left.

use crate::authority::StartRequest;
use crate::models::{
    GameMatch, MatchId, Outcome, Pairing, Team, TeamId, Tournament, TournamentError,
};
use futures_util::future::try_join_all;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Group winners into the next round's pairings: consecutive chunks of
/// `teams_per_match`, in the order given. The last chunk may be short.
pub fn next_round_pairings(winner_ids: &[TeamId], teams_per_match: usize) -> Vec<Pairing> {
    winner_ids
        .chunks(teams_per_match.max(1))
        .zip(0..)
        .map(|(chunk, match_id): (&[TeamId], MatchId)| Pairing::new(match_id, chunk.to_vec()))
        .collect()
}

/// The only team in the bracket, if the pairings name exactly one.
fn sole_entrant(pairings: &[Pairing]) -> Option<TeamId> {
    let ids: BTreeSet<TeamId> = pairings.iter().flat_map(|p| p.team_ids.iter().copied()).collect();
    match ids.len() {
        1 => ids.into_iter().next(),
        _ => None,
    }
}

impl Tournament {
    /// Run the whole tournament.
    ///
    /// Any failure is reported once through `on_tournament_error` and returned;
    /// nothing is retried.
    pub async fn start(&mut self) -> Result<Outcome, TournamentError> {
        let result = self.play().await;
        if let Err(err) = &result {
            log::error!("Tournament {} failed: {}", self.tag(), err);
            self.observer().on_tournament_error(&self.context(), &err.to_string());
        }
        result
    }

    async fn play(&mut self) -> Result<Outcome, TournamentError> {
        let config = *self.config();
        config.validate()?;

        let started = self
            .authority()
            .start_tournament(StartRequest {
                teams_per_match: config.teams_per_match,
                total_teams: config.total_teams,
            })
            .await
            .map_err(|source| TournamentError::Start {
                teams_per_match: config.teams_per_match,
                total_teams: config.total_teams,
                source,
            })?;
        self.set_id(started.tournament_id);
        log::info!(
            "Tournament {} started ({} teams, {} per match)",
            started.tournament_id,
            config.total_teams,
            config.teams_per_match
        );
        self.observer().on_tournament_started(&self.context());

        let mut pairings = started.pairings;
        if pairings.is_empty() || pairings.iter().any(|p| p.team_ids.is_empty()) {
            return Err(TournamentError::EmptyBracket {
                tournament_id: started.tournament_id,
            });
        }

        if let Some(team_id) = sole_entrant(&pairings) {
            let champion = self.resolve_team(team_id).await?;
            return Ok(self.finish(&champion));
        }

        loop {
            let winners = self.advance_round(pairings).await?;
            if let [champion] = winners.as_slice() {
                return Ok(self.finish(champion));
            }
            let winner_ids: Vec<TeamId> = winners.iter().map(|t| t.id()).collect();
            pairings = next_round_pairings(&winner_ids, config.teams_per_match);
        }
    }

    /// Play one round from its pairings and return the winners in match order.
    ///
    /// All matches of the round run at once; the first failure fails the round.
    pub async fn advance_round(
        &mut self,
        pairings: Vec<Pairing>,
    ) -> Result<Vec<Rc<Team>>, TournamentError> {
        let tournament_id = self.require_id()?;
        let round = self.current_round() + 1;
        log::info!("Starting round {} of tournament {}", round, tournament_id);

        let matches: Vec<GameMatch> = pairings
            .into_iter()
            .map(|p| GameMatch::from_pairing(p, round))
            .collect();
        for game in &matches {
            self.observer().on_match_created(&self.match_context(game));
        }
        self.rounds.push(matches);
        let idx = self.rounds.len() - 1;

        let this = &*self;
        let winners = try_join_all(this.rounds[idx].iter().map(|game| game.run(this)))
            .await
            .map_err(|source| TournamentError::Round {
                tournament_id,
                round,
                source: Box::new(source),
            })?;

        for (game, winner) in self.rounds[idx].iter_mut().zip(&winners) {
            game.set_winner(Rc::clone(winner));
        }
        self.observer().on_round_ended(&self.round_context(round));
        log::info!(
            "Winning teams for round {} are {}",
            round,
            winners
                .iter()
                .map(|t| format!("{}@{}", t.id(), t.name().unwrap_or("?")))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(winners)
    }

    fn finish(&self, champion: &Team) -> Outcome {
        let winner_name = champion.name().unwrap_or_default().to_string();
        log::info!(
            "Final winner {} decided in {} round(s)",
            winner_name,
            self.current_round()
        );
        self.observer().on_tournament_ended(&self.context(), &winner_name);
        Outcome {
            winner_id: champion.id(),
            winner_name,
            rounds_played: self.rounds().len(),
        }
    }
}
