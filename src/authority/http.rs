//! HTTP client for a remote scoring authority.
//!
//! Endpoints: `POST /tournament` (urlencoded form), `GET /match`, `GET /team` and
//! `GET /winner`, all answering JSON. Array parameters repeat their key
//! (`teamScores=8&teamScores=9`).

use super::{
    Authority, AuthorityError, MatchScoreRequest, StartRequest, StartResponse, TeamInfoRequest,
    WinnerRequest,
};
use crate::models::{Score, TeamProfile};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: Score,
}

/// Talks to an authority at `base_url` (e.g. `http://localhost:3000`).
#[derive(Clone, Debug)]
pub struct HttpAuthority {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuthority {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AuthorityError> {
        let request = self.client.get(self.url(path)).query(query);
        Self::send(request, "get", path).await
    }

    async fn send<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
        method: &str,
        path: &str,
    ) -> Result<T, AuthorityError> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthorityError::Unavailable(format!("couldn't {method} {path}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthorityError::Rejected(format!(
                "couldn't {method} {path}: {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| AuthorityError::InvalidResponse(format!("{method} {path}: {e}")))
    }
}

#[async_trait(?Send)]
impl Authority for HttpAuthority {
    async fn start_tournament(&self, request: StartRequest) -> Result<StartResponse, AuthorityError> {
        let form = [
            ("teamsPerMatch", request.teams_per_match.to_string()),
            ("numberOfTeams", request.total_teams.to_string()),
        ];
        let builder = self.client.post(self.url("/tournament")).form(&form);
        Self::send(builder, "post", "/tournament").await
    }

    async fn match_score(&self, request: MatchScoreRequest) -> Result<Score, AuthorityError> {
        let query = [
            ("tournamentId", request.tournament_id.to_string()),
            ("round", request.round.to_string()),
            ("match", request.match_id.to_string()),
        ];
        let body: ScoreResponse = self.get("/match", &query).await?;
        Ok(body.score)
    }

    async fn team_info(&self, request: TeamInfoRequest) -> Result<TeamProfile, AuthorityError> {
        let query = [
            ("tournamentId", request.tournament_id.to_string()),
            ("teamId", request.team_id.to_string()),
        ];
        self.get("/team", &query).await
    }

    async fn winner(&self, request: WinnerRequest) -> Result<Score, AuthorityError> {
        let mut query = Vec::with_capacity(request.team_scores.len() + 2);
        query.push(("tournamentId", request.tournament_id.to_string()));
        query.extend(
            request
                .team_scores
                .iter()
                .map(|score| ("teamScores", score.to_string())),
        );
        query.push(("matchScore", request.match_score.to_string()));
        let body: ScoreResponse = self.get("/winner", &query).await?;
        Ok(body.score)
    }
}
