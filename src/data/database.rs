//! SQLite storage for synced schedule data

use crate::{GameRecord, GameType, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id TEXT NOT NULL UNIQUE,
                season INTEGER NOT NULL,
                week INTEGER NOT NULL,
                game_type TEXT NOT NULL,
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                home_score REAL,
                away_score REAL,
                spread_line REAL,
                total_line REAL
            );

            CREATE TABLE IF NOT EXISTS team_profiles (
                abbreviation TEXT PRIMARY KEY,
                display_name TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_games_season_week ON games(season, week);
            CREATE INDEX IF NOT EXISTS idx_games_teams ON games(home_team, away_team);
            "#,
        )?;
        Ok(())
    }

    // ==================== Game Operations ====================

    /// Insert or update a game; scores and lines win over stale values
    pub fn upsert_game(&self, game: &GameRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO games (game_id, season, week, game_type, home_team, away_team,
                               home_score, away_score, spread_line, total_line)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(game_id) DO UPDATE SET
                home_score = COALESCE(excluded.home_score, home_score),
                away_score = COALESCE(excluded.away_score, away_score),
                spread_line = COALESCE(excluded.spread_line, spread_line),
                total_line = COALESCE(excluded.total_line, total_line)
            "#,
            params![
                game.game_id,
                game.season,
                game.week,
                game.game_type.code(),
                game.home_team,
                game.away_team,
                game.home_score,
                game.away_score,
                game.spread_line,
                game.total_line,
            ],
        )?;
        Ok(())
    }

    pub fn upsert_games(&self, games: &[GameRecord]) -> Result<usize> {
        let mut count = 0;
        for game in games {
            self.upsert_game(game)?;
            count += 1;
        }
        Ok(count)
    }

    /// Regular-season games in a season range, ordered season then week
    pub fn get_regular_season_games(&self, start: u16, end: u16) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT game_id, season, week, game_type, home_team, away_team,
                    home_score, away_score, spread_line, total_line
             FROM games
             WHERE season >= ?1 AND season <= ?2 AND game_type = 'REG'
             ORDER BY season, week",
        )?;

        let games = stmt
            .query_map(params![start, end], Self::row_to_game)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    /// Regular-season games for one week
    pub fn get_week_games(&self, season: u16, week: u8) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT game_id, season, week, game_type, home_team, away_team,
                    home_score, away_score, spread_line, total_line
             FROM games
             WHERE season = ?1 AND week = ?2 AND game_type = 'REG'
             ORDER BY game_id",
        )?;

        let games = stmt
            .query_map(params![season, week], Self::row_to_game)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    fn row_to_game(row: &rusqlite::Row) -> rusqlite::Result<GameRecord> {
        let type_code: String = row.get(3)?;
        Ok(GameRecord {
            game_id: row.get(0)?,
            season: row.get(1)?,
            week: row.get(2)?,
            game_type: GameType::from_code(&type_code).unwrap_or(GameType::Regular),
            home_team: row.get(4)?,
            away_team: row.get(5)?,
            home_score: row.get(6)?,
            away_score: row.get(7)?,
            spread_line: row.get(8)?,
            total_line: row.get(9)?,
        })
    }

    // ==================== Team Profiles ====================

    /// Store descriptive team rows. Not consumed by the feature schema;
    /// kept as an extension point.
    pub fn upsert_team_profiles(&self, profiles: &[(String, String)]) -> Result<usize> {
        let mut count = 0;
        for (abbreviation, display_name) in profiles {
            self.conn.execute(
                "INSERT INTO team_profiles (abbreviation, display_name) VALUES (?1, ?2)
                 ON CONFLICT(abbreviation) DO UPDATE SET display_name = excluded.display_name",
                params![abbreviation, display_name],
            )?;
            count += 1;
        }
        Ok(count)
    }

    pub fn team_profile_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM team_profiles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let game_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;

        let played_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM games WHERE home_score IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        let earliest: Option<i64> = self
            .conn
            .query_row("SELECT MIN(season) FROM games", [], |row| row.get(0))
            .optional()?
            .flatten();

        let latest: Option<i64> = self
            .conn
            .query_row("SELECT MAX(season) FROM games", [], |row| row.get(0))
            .optional()?
            .flatten();

        Ok(DatabaseStats {
            game_count: game_count as usize,
            played_count: played_count as usize,
            earliest_season: earliest.map(|s| s as u16),
            latest_season: latest.map(|s| s as u16),
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub game_count: usize,
    pub played_count: usize,
    pub earliest_season: Option<u16>,
    pub latest_season: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(season: u16, week: u8, home: &str, away: &str) -> GameRecord {
        GameRecord {
            game_id: format!("{}_{:02}_{}_{}", season, week, away, home),
            season,
            week,
            game_type: GameType::Regular,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score: None,
            away_score: None,
            spread_line: Some(-3.5),
            total_line: Some(47.5),
        }
    }

    #[test]
    fn test_create_database() {
        let db = Database::in_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.game_count, 0);
        assert_eq!(stats.earliest_season, None);
    }

    #[test]
    fn test_upsert_updates_scores() {
        let db = Database::in_memory().unwrap();
        let mut g = game(2023, 1, "KC", "DET");
        db.upsert_game(&g).unwrap();

        g.home_score = Some(20.0);
        g.away_score = Some(21.0);
        db.upsert_game(&g).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.game_count, 1);
        assert_eq!(stats.played_count, 1);

        let stored = &db.get_week_games(2023, 1).unwrap()[0];
        assert_eq!(stored.home_score, Some(20.0));
        assert_eq!(stored.spread_line, Some(-3.5));
    }

    #[test]
    fn test_range_query_orders_and_filters() {
        let db = Database::in_memory().unwrap();
        let mut post = game(2022, 1, "KC", "JAX");
        post.game_type = GameType::Postseason;
        post.game_id = "2022_POST_JAX_KC".to_string();
        db.upsert_games(&[
            game(2023, 2, "BUF", "LV"),
            game(2022, 5, "KC", "LV"),
            post,
            game(2023, 1, "KC", "DET"),
        ])
        .unwrap();

        let games = db.get_regular_season_games(2022, 2023).unwrap();
        assert_eq!(games.len(), 3);
        assert_eq!(games[0].season, 2022);
        assert_eq!(games[1].week, 1);
        assert_eq!(games[2].week, 2);
    }

    #[test]
    fn test_team_profiles() {
        let db = Database::in_memory().unwrap();
        let rows = vec![
            ("KC".to_string(), "Kansas City Chiefs".to_string()),
            ("SF".to_string(), "San Francisco 49ers".to_string()),
        ];
        assert_eq!(db.upsert_team_profiles(&rows).unwrap(), 2);
        assert_eq!(db.team_profile_count().unwrap(), 2);
    }
}
