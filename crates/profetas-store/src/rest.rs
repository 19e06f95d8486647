use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use profetas_types::models::{Match, NewParticipation, Participation, Pick, Profile};

use crate::Backend;
use crate::error::{DecodeError, Result, StoreError};
use crate::rows::{MatchRow, ParticipationRow, ProfileRow, decode_json, decode_rows};

/// Columns requested for the match list, with both team references expanded
/// through their foreign keys.
const MATCH_SELECT: &str = "id,start_time,status,round,home_score,away_score,\
home_team:teams!home_team_id(id,name,logo_url),\
away_team:teams!away_team_id(id,name,logo_url)";

const PROFILE_SELECT: &str = "id,username,total_points,created_at";

/// Client for the hosted table store's REST interface.
///
/// Wraps a [`reqwest::Client`]; every request carries the project key both as
/// `apikey` and as a bearer token.
pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct RejectionBody {
    message: Option<String>,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: client,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send and return the body text, turning non-success statuses into
    /// [`StoreError::Rejected`] with the store's message.
    async fn send(&self, url: &str, request: RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(|source| {
            warn!("Request to {} failed: {}", url, source);
            StoreError::Http {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| {
            warn!("Reading response from {} failed: {}", url, source);
            StoreError::ResponseBody {
                url: url.to_string(),
                source,
            }
        })?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                url: url.to_string(),
                status,
                message: rejection_message(&body, status),
            });
        }

        debug!("{} answered {} ({} bytes)", url, status, body.len());
        Ok(body)
    }
}

fn rejection_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<RejectionBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status))
}

impl RestBackend {
    fn matches_request(&self, limit: u32) -> (String, RequestBuilder) {
        let url = self.table_url("matches");
        let limit = limit.to_string();
        let request = self.request(Method::GET, &url).query(&[
            ("select", MATCH_SELECT),
            ("order", "start_time.desc"),
            ("limit", limit.as_str()),
        ]);
        (url, request)
    }

    fn profiles_request(&self) -> (String, RequestBuilder) {
        let url = self.table_url("profiles");
        let request = self.request(Method::GET, &url).query(&[("select", PROFILE_SELECT)]);
        (url, request)
    }

    fn participation_request(&self, new: &NewParticipation) -> (String, RequestBuilder) {
        let url = self.table_url("participaciones");
        let request = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(new);
        (url, request)
    }

    fn picks_request(&self, picks: &[Pick]) -> (String, RequestBuilder) {
        let url = self.table_url("pronosticos_quiniela");
        let request = self
            .request(Method::POST, &url)
            .header("Prefer", "return=minimal")
            .json(picks);
        (url, request)
    }

    fn delete_request(&self, id: Uuid) -> (String, RequestBuilder) {
        let url = self.table_url("participaciones");
        let filter = format!("eq.{}", id);
        let request = self
            .request(Method::DELETE, &url)
            .query(&[("id", filter.as_str())]);
        (url, request)
    }
}

#[async_trait]
impl Backend for RestBackend {
    fn name(&self) -> &'static str {
        "supabase"
    }

    #[instrument(skip(self))]
    async fn load_matches(&self, limit: u32) -> Result<Vec<Match>> {
        let (url, request) = self.matches_request(limit);
        let body = self.send(&url, request).await?;
        let rows: Vec<MatchRow> = decode_json("matches", &body)?;
        Ok(decode_rows(rows)?)
    }

    #[instrument(skip(self))]
    async fn load_profiles(&self) -> Result<Vec<Profile>> {
        let (url, request) = self.profiles_request();
        let body = self.send(&url, request).await?;
        let rows: Vec<ProfileRow> = decode_json("profiles", &body)?;
        Ok(decode_rows(rows)?)
    }

    #[instrument(skip(self, new), fields(jornada = new.jornada))]
    async fn create_participation(&self, new: &NewParticipation) -> Result<Participation> {
        let (url, request) = self.participation_request(new);
        let body = self.send(&url, request).await?;
        let rows: Vec<ParticipationRow> = decode_json("participaciones", &body)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(DecodeError::EmptyInsert { table: "participaciones" })?;
        Ok(Participation::try_from(row)?)
    }

    #[instrument(skip(self, picks), fields(count = picks.len()))]
    async fn create_picks(&self, picks: &[Pick]) -> Result<()> {
        if picks.is_empty() {
            return Ok(());
        }
        let (url, request) = self.picks_request(picks);
        self.send(&url, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_participation(&self, id: Uuid) -> Result<()> {
        let (url, request) = self.delete_request(id);
        self.send(&url, request).await?;
        Ok(())
    }
}
