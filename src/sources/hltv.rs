//! HLTV event results client
//!
//! Esports match markets resolve against an HLTV event results page. There is
//! no JSON API, so result rows are pulled out of the HTML with a regex.

use super::SourceError;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use tracing::debug;

/// One completed match from a results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub team1: String,
    pub score1: u32,
    pub score2: u32,
    pub team2: String,
}

impl MatchResult {
    /// Winning team name, None on a drawn map score
    pub fn winner(&self) -> Option<&str> {
        match self.score1.cmp(&self.score2) {
            std::cmp::Ordering::Greater => Some(&self.team1),
            std::cmp::Ordering::Less => Some(&self.team2),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        let wanted = team.to_lowercase();
        self.team1.to_lowercase().contains(&wanted) || self.team2.to_lowercase().contains(&wanted)
    }
}

fn result_row_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?s)<div class="team1">.*?<div class="team[^"]*">([^<]+)</div>.*?<span class="score-(?:won|lost|tie)">(\d+)</span>\s*-\s*<span class="score-(?:won|lost|tie)">(\d+)</span>.*?<div class="team2">.*?<div class="team[^"]*">([^<]+)</div>"#,
        )
        .expect("invalid result row regex")
    })
}

/// Extract result rows from a results page body
pub fn parse_results(html: &str) -> Vec<MatchResult> {
    result_row_regex()
        .captures_iter(html)
        .filter_map(|caps| {
            Some(MatchResult {
                team1: caps.get(1)?.as_str().trim().to_string(),
                score1: caps.get(2)?.as_str().parse().ok()?,
                score2: caps.get(3)?.as_str().parse().ok()?,
                team2: caps.get(4)?.as_str().trim().to_string(),
            })
        })
        .collect()
}

/// Find the completed match between two teams
pub fn find_match<'a>(
    results: &'a [MatchResult],
    first_team: &str,
    second_team: &str,
) -> Option<&'a MatchResult> {
    results
        .iter()
        .find(|r| r.involves(first_team) && r.involves(second_team))
}

pub struct HltvClient {
    client: Client,
}

impl HltvClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self { client: super::http_client(timeout_secs) }
    }

    /// Fetch an event results page and extract completed matches.
    ///
    /// A page that loads but yields no parsable rows is malformed, not empty:
    /// HLTV renders finished events with at least the bracket results.
    pub async fn fetch_results(&self, event_url: &str) -> Result<Vec<MatchResult>, SourceError> {
        debug!("Fetching results page {}", event_url);

        let response = self
            .client
            .get(event_url)
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

        let results = parse_results(&body);
        if results.is_empty() {
            return Err(SourceError::MalformedResponse(
                "no result rows found on event page".to_string(),
            ));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="results-all">
          <div class="result-con">
            <div class="team1"><img alt="Vitality"/><div class="team team-won">Vitality</div></div>
            <td class="result-score"><span class="score-won">2</span> - <span class="score-lost">0</span></td>
            <div class="team2"><img alt="FaZe"/><div class="team">FaZe</div></div>
          </div>
          <div class="result-con">
            <div class="team1"><img alt="NAVI"/><div class="team">NAVI</div></div>
            <td class="result-score"><span class="score-lost">1</span> - <span class="score-won">2</span></td>
            <div class="team2"><img alt="Spirit"/><div class="team team-won">Team Spirit</div></div>
          </div>
        </div>
    "#;

    #[test]
    fn test_parse_result_rows() {
        let results = parse_results(PAGE);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].team1, "Vitality");
        assert_eq!(results[0].score1, 2);
        assert_eq!(results[0].score2, 0);
        assert_eq!(results[1].team2, "Team Spirit");
    }

    #[test]
    fn test_winner() {
        let results = parse_results(PAGE);
        assert_eq!(results[0].winner(), Some("Vitality"));
        assert_eq!(results[1].winner(), Some("Team Spirit"));
    }

    #[test]
    fn test_find_match_case_insensitive() {
        let results = parse_results(PAGE);
        let m = find_match(&results, "navi", "spirit").unwrap();
        assert_eq!(m.winner(), Some("Team Spirit"));
        assert!(find_match(&results, "Vitality", "NAVI").is_none());
    }

    #[test]
    fn test_empty_page_yields_no_rows() {
        assert!(parse_results("<html><body>maintenance</body></html>").is_empty());
    }
}
