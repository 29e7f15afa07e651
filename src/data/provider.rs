//! HTTP schedule provider
//!
//! Fetches NFL schedules and team descriptions from an ESPN-style scoreboard
//! API. All calls are blocking, with a request timeout and bounded retry.

use crate::{GameRecord, GameType, ProviderConfig, Result};
use serde::Deserialize;

/// Weeks queried when syncing a full regular season. Seasons with fewer
/// weeks simply return empty results for the tail.
pub const REGULAR_SEASON_WEEKS: u8 = 18;

/// Source of schedule and team data
pub trait ScheduleSource {
    /// Scheduled regular-season games for one week. Empty when none exist.
    fn fetch_week(&self, season: u16, week: u8) -> Result<Vec<GameRecord>>;

    /// All regular-season games for a season.
    fn fetch_season(&self, season: u16) -> Result<Vec<GameRecord>>;

    /// Descriptive (abbreviation, display name) rows for every team.
    fn fetch_team_profiles(&self) -> Result<Vec<(String, String)>>;
}

/// Retry an operation with exponential backoff
pub fn with_retry<T, F>(mut operation: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_error = None;
    for attempt in 0..max_attempts {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                log::warn!("Attempt {} failed: {}", attempt + 1, e);
                last_error = Some(e);
                if attempt < max_attempts - 1 {
                    let delay = std::time::Duration::from_millis(100 * 2u64.pow(attempt));
                    std::thread::sleep(delay);
                }
            }
        }
    }
    Err(last_error.unwrap())
}

/// Scoreboard client for the public ESPN NFL API
pub struct EspnScheduleProvider {
    client: reqwest::blocking::Client,
    scoreboard_url: String,
    teams_url: String,
    max_retries: u32,
}

impl EspnScheduleProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("gridiron/0.1")
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(EspnScheduleProvider {
            client,
            scoreboard_url: config.scoreboard_url.clone(),
            teams_url: config.teams_url.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    fn get_text(&self, url: &str) -> Result<String> {
        with_retry(
            || {
                let resp = self.client.get(url).send()?.error_for_status()?;
                Ok(resp.text()?)
            },
            self.max_retries,
        )
    }
}

impl ScheduleSource for EspnScheduleProvider {
    fn fetch_week(&self, season: u16, week: u8) -> Result<Vec<GameRecord>> {
        let url = format!(
            "{}?year={}&week={}&seasontype=2",
            self.scoreboard_url, season, week
        );
        log::debug!("Fetching {}", url);
        let body = self.get_text(&url)?;
        parse_scoreboard(&body, season, week)
    }

    fn fetch_season(&self, season: u16) -> Result<Vec<GameRecord>> {
        let mut games = Vec::new();
        for week in 1..=REGULAR_SEASON_WEEKS {
            let week_games = self.fetch_week(season, week)?;
            log::debug!("Season {} week {}: {} games", season, week, week_games.len());
            games.extend(week_games);
        }
        Ok(games)
    }

    fn fetch_team_profiles(&self) -> Result<Vec<(String, String)>> {
        let body = self.get_text(&self.teams_url)?;
        parse_team_list(&body)
    }
}

// ==================== Wire format ====================

#[derive(Debug, Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<ScoreboardEvent>,
}

#[derive(Debug, Deserialize)]
struct ScoreboardEvent {
    id: String,
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
    #[serde(default)]
    odds: Vec<OddsEntry>,
    status: Option<CompetitionStatus>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    #[serde(rename = "homeAway")]
    home_away: String,
    score: Option<String>,
    team: TeamInfo,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    abbreviation: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OddsEntry {
    spread: Option<f32>,
    #[serde(rename = "overUnder")]
    over_under: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompetitionStatus {
    #[serde(rename = "type")]
    status_type: Option<StatusType>,
}

#[derive(Debug, Deserialize)]
struct StatusType {
    #[serde(default)]
    completed: bool,
}

/// Parse a scoreboard response into game records.
///
/// Scores are only taken from completed games; scheduled games keep None.
fn parse_scoreboard(body: &str, season: u16, week: u8) -> Result<Vec<GameRecord>> {
    let scoreboard: Scoreboard = serde_json::from_str(body)
        .map_err(|e| crate::GridironError::Parse(format!("scoreboard JSON: {}", e)))?;

    let mut games = Vec::new();
    for event in scoreboard.events {
        let Some(competition) = event.competitions.into_iter().next() else {
            continue;
        };

        let completed = competition
            .status
            .as_ref()
            .and_then(|s| s.status_type.as_ref())
            .map(|t| t.completed)
            .unwrap_or(false);

        let mut home = None;
        let mut away = None;
        for competitor in competition.competitors {
            match competitor.home_away.as_str() {
                "home" => home = Some(competitor),
                "away" => away = Some(competitor),
                _ => {}
            }
        }
        let (Some(home), Some(away)) = (home, away) else {
            log::warn!("Event {} missing home or away competitor, skipping", event.id);
            continue;
        };

        let score_of = |c: &Competitor| -> Option<f32> {
            if completed {
                c.score.as_deref().and_then(|s| s.parse().ok())
            } else {
                None
            }
        };

        let odds = competition.odds.first();
        games.push(GameRecord {
            game_id: event.id,
            season,
            week,
            game_type: GameType::Regular,
            home_team: home.team.abbreviation.clone(),
            away_team: away.team.abbreviation.clone(),
            home_score: score_of(&home),
            away_score: score_of(&away),
            spread_line: odds.and_then(|o| o.spread),
            total_line: odds.and_then(|o| o.over_under),
        });
    }

    Ok(games)
}

#[derive(Debug, Deserialize)]
struct TeamList {
    #[serde(default)]
    sports: Vec<SportEntry>,
}

#[derive(Debug, Deserialize)]
struct SportEntry {
    #[serde(default)]
    leagues: Vec<LeagueEntry>,
}

#[derive(Debug, Deserialize)]
struct LeagueEntry {
    #[serde(default)]
    teams: Vec<TeamEntry>,
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    team: TeamInfo,
}

fn parse_team_list(body: &str) -> Result<Vec<(String, String)>> {
    let list: TeamList = serde_json::from_str(body)
        .map_err(|e| crate::GridironError::Parse(format!("team list JSON: {}", e)))?;

    let mut profiles = Vec::new();
    for sport in list.sports {
        for league in sport.leagues {
            for entry in league.teams {
                let name = entry
                    .team
                    .display_name
                    .unwrap_or_else(|| entry.team.abbreviation.clone());
                profiles.push((entry.team.abbreviation, name));
            }
        }
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOREBOARD_FIXTURE: &str = r#"{
        "events": [
            {
                "id": "401547403",
                "competitions": [{
                    "competitors": [
                        {"homeAway": "home", "score": "21", "team": {"abbreviation": "KC"}},
                        {"homeAway": "away", "score": "20", "team": {"abbreviation": "DET"}}
                    ],
                    "odds": [{"spread": -4.5, "overUnder": 53.0}],
                    "status": {"type": {"completed": true}}
                }]
            },
            {
                "id": "401547404",
                "competitions": [{
                    "competitors": [
                        {"homeAway": "home", "score": "0", "team": {"abbreviation": "NYG"}},
                        {"homeAway": "away", "score": "0", "team": {"abbreviation": "DAL"}}
                    ],
                    "status": {"type": {"completed": false}}
                }]
            }
        ]
    }"#;

    #[test]
    fn test_parse_scoreboard() {
        let games = parse_scoreboard(SCOREBOARD_FIXTURE, 2023, 1).unwrap();
        assert_eq!(games.len(), 2);

        let played = &games[0];
        assert_eq!(played.game_id, "401547403");
        assert_eq!(played.home_team, "KC");
        assert_eq!(played.away_team, "DET");
        assert_eq!(played.home_score, Some(21.0));
        assert_eq!(played.spread_line, Some(-4.5));
        assert_eq!(played.total_line, Some(53.0));
        assert_eq!(played.season, 2023);
        assert_eq!(played.week, 1);

        // Scheduled game: pre-game "0" scores must not be taken as results
        let upcoming = &games[1];
        assert!(!upcoming.is_played());
        assert_eq!(upcoming.spread_line, None);
    }

    #[test]
    fn test_parse_empty_scoreboard() {
        let games = parse_scoreboard(r#"{"events": []}"#, 2023, 30).unwrap();
        assert!(games.is_empty());
    }

    #[test]
    fn test_parse_team_list() {
        let body = r#"{
            "sports": [{"leagues": [{"teams": [
                {"team": {"abbreviation": "KC", "displayName": "Kansas City Chiefs"}},
                {"team": {"abbreviation": "SF", "displayName": "San Francisco 49ers"}}
            ]}]}]
        }"#;
        let profiles = parse_team_list(body).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].0, "KC");
        assert_eq!(profiles[1].1, "San Francisco 49ers");
    }
}
