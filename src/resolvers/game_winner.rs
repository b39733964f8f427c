//! Sports game-winner resolver
//!
//! "Chiefs vs Bills: who wins?" style questions, answered from the
//! SportsDataIO scores-by-date feed. Canceled games are a 50-50 (`unknown`),
//! postponed or missing games are too early, per prevailing market rules.

use crate::config::Config;
use crate::services::with_retry;
use crate::sources::sportsdataio::{find_game, Game, GameResult};
use crate::sources::{SourceError, SportsDataClient};
use crate::types::Outcome;
use chrono::NaiveDate;

pub struct GameWinnerResolver {
    client: SportsDataClient,
    retry: crate::services::RetryConfig,
}

impl GameWinnerResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            client: SportsDataClient::new(
                config.http_timeout_secs,
                config.sportsdata_api_key.clone(),
            ),
            retry: config.retry.clone(),
        }
    }

    pub async fn resolve(
        &self,
        league: &str,
        date: NaiveDate,
        first_team: &str,
        second_team: &str,
    ) -> Result<(Outcome, String), SourceError> {
        let games = with_retry(&self.retry, "sportsdataio games", || {
            self.client.fetch_games(league, date)
        })
        .await?;

        Ok(decide(&games, first_team, second_team))
    }
}

/// Pure decision over the day's scoreboard
pub fn decide(games: &[Game], first_team: &str, second_team: &str) -> (Outcome, String) {
    let Some(game) = find_game(games, first_team, second_team) else {
        return (
            Outcome::TooEarly,
            format!("no game between {} and {} on the scoreboard", first_team, second_team),
        );
    };

    if game.is_canceled() {
        return (Outcome::Unknown, "game canceled".to_string());
    }

    if game.is_postponed() {
        return (Outcome::TooEarly, "game postponed".to_string());
    }

    if !game.is_final() {
        return (
            Outcome::TooEarly,
            format!("game not final (status: {})", game.status.as_deref().unwrap_or("unknown")),
        );
    }

    match game.result() {
        Some(GameResult::Tie) => (Outcome::Unknown, "game ended in a tie".to_string()),
        Some(result) => {
            let first_is_home = game.matches_home(first_team);
            let first_won = matches!(
                (result, first_is_home),
                (GameResult::HomeWin, true) | (GameResult::AwayWin, false)
            );
            let (winner, score) = if matches!(result, GameResult::HomeWin) {
                (&game.home_team, format!("{}-{}", game.home_score.unwrap_or(0), game.away_score.unwrap_or(0)))
            } else {
                (&game.away_team, format!("{}-{}", game.away_score.unwrap_or(0), game.home_score.unwrap_or(0)))
            };
            (
                if first_won { Outcome::First } else { Outcome::Second },
                format!("{} won {}", winner, score),
            )
        }
        None => (Outcome::Unknown, "final game has no scores".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn games(json: &str) -> Vec<Game> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_team_wins_as_away() {
        let board = games(
            r#"[{
                "Status": "Final",
                "HomeTeam": "KC", "AwayTeam": "BUF",
                "HomeScore": 24, "AwayScore": 27,
                "HomeTeamName": "Kansas City Chiefs",
                "AwayTeamName": "Buffalo Bills"
            }]"#,
        );
        let (outcome, reason) = decide(&board, "Buffalo Bills", "Kansas City Chiefs");
        assert_eq!(outcome, Outcome::First);
        assert!(reason.contains("BUF won 27-24"));
    }

    #[test]
    fn test_second_team_wins() {
        let board = games(
            r#"[{
                "Status": "Final",
                "HomeTeam": "KC", "AwayTeam": "BUF",
                "HomeScore": 27, "AwayScore": 24
            }]"#,
        );
        let (outcome, _) = decide(&board, "BUF", "KC");
        assert_eq!(outcome, Outcome::Second);
    }

    #[test]
    fn test_tie_is_unknown() {
        let board = games(
            r#"[{
                "Status": "Final",
                "HomeTeam": "PHI", "AwayTeam": "DAL",
                "HomeScore": 20, "AwayScore": 20
            }]"#,
        );
        let (outcome, _) = decide(&board, "PHI", "DAL");
        assert_eq!(outcome, Outcome::Unknown);
    }

    #[test]
    fn test_canceled_is_unknown() {
        let board = games(
            r#"[{"Status": "Canceled", "HomeTeam": "PHI", "AwayTeam": "DAL"}]"#,
        );
        let (outcome, reason) = decide(&board, "PHI", "DAL");
        assert_eq!(outcome, Outcome::Unknown);
        assert!(reason.contains("canceled"));
    }

    #[test]
    fn test_postponed_is_too_early() {
        let board = games(
            r#"[{"Status": "Postponed", "HomeTeam": "PHI", "AwayTeam": "DAL"}]"#,
        );
        let (outcome, _) = decide(&board, "PHI", "DAL");
        assert_eq!(outcome, Outcome::TooEarly);
    }

    #[test]
    fn test_in_progress_is_too_early() {
        let board = games(
            r#"[{
                "Status": "InProgress",
                "HomeTeam": "PHI", "AwayTeam": "DAL",
                "HomeScore": 10, "AwayScore": 3
            }]"#,
        );
        let (outcome, reason) = decide(&board, "PHI", "DAL");
        assert_eq!(outcome, Outcome::TooEarly);
        assert!(reason.contains("InProgress"));
    }

    #[test]
    fn test_missing_game_is_too_early() {
        let (outcome, _) = decide(&[], "PHI", "DAL");
        assert_eq!(outcome, Outcome::TooEarly);
    }
}
