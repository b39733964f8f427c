//! SportsDataIO scores client
//!
//! Game-winner markets resolve against the scores-by-date feed. Auth is a
//! plain query-parameter key; field names vary slightly between leagues
//! (HomeScore vs HomeTeamScore) so the row type carries serde aliases.

use super::SourceError;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const BASE_URL: &str = "https://api.sportsdata.io/v3";

/// One scheduled game from the scores feed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Game {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default, alias = "HomeTeamScore")]
    pub home_score: Option<i32>,
    #[serde(default, alias = "AwayTeamScore")]
    pub away_score: Option<i32>,
    #[serde(default)]
    pub home_team_name: Option<String>,
    #[serde(default)]
    pub away_team_name: Option<String>,
}

/// Side that won a final game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    HomeWin,
    AwayWin,
    Tie,
}

impl Game {
    pub fn is_final(&self) -> bool {
        matches!(self.status.as_deref(), Some("Final") | Some("F/OT") | Some("F/SO"))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self.status.as_deref(), Some("Canceled") | Some("Cancelled") | Some("Forfeit"))
    }

    pub fn is_postponed(&self) -> bool {
        matches!(self.status.as_deref(), Some("Postponed") | Some("Suspended") | Some("Delayed"))
    }

    /// Result of a final game, None if scores are missing
    pub fn result(&self) -> Option<GameResult> {
        let home = self.home_score?;
        let away = self.away_score?;
        Some(match home.cmp(&away) {
            std::cmp::Ordering::Greater => GameResult::HomeWin,
            std::cmp::Ordering::Less => GameResult::AwayWin,
            std::cmp::Ordering::Equal => GameResult::Tie,
        })
    }

    /// Case-insensitive match against the team key or full name
    pub fn involves(&self, team: &str) -> bool {
        self.matches_home(team) || self.matches_away(team)
    }

    pub fn matches_home(&self, team: &str) -> bool {
        team_matches(&self.home_team, self.home_team_name.as_deref(), team)
    }

    pub fn matches_away(&self, team: &str) -> bool {
        team_matches(&self.away_team, self.away_team_name.as_deref(), team)
    }
}

fn team_matches(key: &str, full_name: Option<&str>, wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    if key.to_lowercase() == wanted {
        return true;
    }
    if let Some(name) = full_name {
        let name = name.to_lowercase();
        if name == wanted || name.contains(&wanted) || wanted.contains(&name) {
            return true;
        }
    }
    false
}

/// Find the game involving both teams, if scheduled that day
pub fn find_game<'a>(games: &'a [Game], first_team: &str, second_team: &str) -> Option<&'a Game> {
    games
        .iter()
        .find(|g| g.involves(first_team) && g.involves(second_team))
}

pub struct SportsDataClient {
    client: Client,
    api_key: Option<String>,
}

impl SportsDataClient {
    pub fn new(timeout_secs: u64, api_key: Option<String>) -> Self {
        Self { client: super::http_client(timeout_secs), api_key }
    }

    /// Fetch all games for a league on a given date
    pub async fn fetch_games(&self, league: &str, date: NaiveDate) -> Result<Vec<Game>, SourceError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            SourceError::AuthenticationFailed("SPORTSDATA_API_KEY not set".to_string())
        })?;

        let url = format!(
            "{}/{}/scores/json/GamesByDate/{}?key={}",
            BASE_URL,
            league.to_lowercase(),
            date.format("%Y-%b-%d"),
            key
        );
        debug!("Fetching {} games for {}", league, date);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::from_network_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::from_network_error(&e))?;

        if !status.is_success() {
            return Err(SourceError::from_response(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| SourceError::MalformedResponse(format!("games body: {}", e)))
    }
}
