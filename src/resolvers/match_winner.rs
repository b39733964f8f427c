//! Esports match-winner resolver
//!
//! "Vitality vs FaZe: who takes the series?" style questions, answered from
//! an HLTV event results page. A match absent from the results is not yet
//! played.

use crate::config::Config;
use crate::services::with_retry;
use crate::sources::hltv::{find_match, MatchResult};
use crate::sources::{HltvClient, SourceError};
use crate::types::Outcome;

pub struct MatchWinnerResolver {
    client: HltvClient,
    retry: crate::services::RetryConfig,
}

impl MatchWinnerResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            client: HltvClient::new(config.http_timeout_secs),
            retry: config.retry.clone(),
        }
    }

    pub async fn resolve(
        &self,
        event_url: &str,
        first_team: &str,
        second_team: &str,
    ) -> Result<(Outcome, String), SourceError> {
        let results = with_retry(&self.retry, "hltv results", || {
            self.client.fetch_results(event_url)
        })
        .await?;

        Ok(decide(&results, first_team, second_team))
    }
}

/// Pure decision over parsed result rows
pub fn decide(results: &[MatchResult], first_team: &str, second_team: &str) -> (Outcome, String) {
    let Some(result) = find_match(results, first_team, second_team) else {
        return (
            Outcome::TooEarly,
            format!("{} vs {} not in event results yet", first_team, second_team),
        );
    };

    match result.winner() {
        Some(winner) => {
            let first_won = winner.to_lowercase().contains(&first_team.to_lowercase())
                || first_team.to_lowercase().contains(&winner.to_lowercase());
            (
                if first_won { Outcome::First } else { Outcome::Second },
                format!("{} won {}-{}", winner, result.score1.max(result.score2), result.score1.min(result.score2)),
            )
        }
        None => (
            Outcome::Unknown,
            format!("match recorded as a {}-{} draw", result.score1, result.score2),
        ),
    }
}
