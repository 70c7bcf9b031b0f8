//! Team: a lazily populated competitor, cached per tournament.

use crate::authority::{Authority, TeamInfoRequest};
use crate::models::tournament::{TournamentError, TournamentId};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// Identifier assigned to a team by the scoring authority.
pub type TeamId = u64;

/// Numeric score used for teams, matches and winner lookups.
pub type Score = u64;

/// Name and score of a team, as reported by the authority.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub name: String,
    pub score: Score,
}

/// A competitor. Created on first reference and filled in once from the authority.
#[derive(Debug)]
pub struct Team {
    id: TeamId,
    profile: OnceCell<TeamProfile>,
}

impl Team {
    pub fn new(id: TeamId) -> Self {
        Self {
            id,
            profile: OnceCell::new(),
        }
    }

    pub fn id(&self) -> TeamId {
        self.id
    }

    /// `None` until populated.
    pub fn profile(&self) -> Option<&TeamProfile> {
        self.profile.get()
    }

    pub fn name(&self) -> Option<&str> {
        self.profile().map(|p| p.name.as_str())
    }

    pub fn score(&self) -> Option<Score> {
        self.profile().map(|p| p.score)
    }

    pub fn is_populated(&self) -> bool {
        self.profile.initialized()
    }

    /// Fetch name and score from the authority.
    ///
    /// Concurrent callers on the same instance wait for a single request; once it
    /// has succeeded the stored profile is returned without contacting the authority.
    pub async fn populate(
        &self,
        authority: &dyn Authority,
        tournament_id: TournamentId,
    ) -> Result<&TeamProfile, TournamentError> {
        self.profile
            .get_or_try_init(|| async {
                log::debug!("Fetching team <{},{}>", tournament_id, self.id);
                authority
                    .team_info(TeamInfoRequest {
                        tournament_id,
                        team_id: self.id,
                    })
                    .await
                    .map_err(|source| TournamentError::Team {
                        tournament_id,
                        team_id: self.id,
                        source,
                    })
            })
            .await
    }
}
