//! SQLite storage for season records
//!
//! The record source and school directory the pipeline reads from. An
//! external fetcher populates it through the upsert APIs; the pipeline
//! only loads typed records per season.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::features::{ClassYear, Position};
use crate::{GameRecord, HoopsError, PlayerRecord, Result, School, SchoolId};

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

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schools (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                aliases TEXT DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                year INTEGER NOT NULL,
                school_id INTEGER NOT NULL REFERENCES schools(id),
                opponent_id INTEGER NOT NULL REFERENCES schools(id),
                score INTEGER NOT NULL,
                opponent_score INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                year INTEGER NOT NULL,
                school_id INTEGER NOT NULL REFERENCES schools(id),
                games REAL,
                height REAL,
                fg_made REAL,
                fg_attempted REAL,
                three_made REAL,
                three_attempted REAL,
                ft_made REAL,
                ft_attempted REAL,
                rebounds REAL,
                assists REAL,
                blocks REAL,
                steals REAL,
                points REAL,
                turnovers REAL,
                double_doubles REAL,
                triple_doubles REAL,
                position TEXT,
                class TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_games_year ON games(year);
            CREATE INDEX IF NOT EXISTS idx_games_school ON games(year, school_id);
            CREATE INDEX IF NOT EXISTS idx_players_year ON players(year, school_id);
            "#,
        )?;
        Ok(())
    }

    // ==================== School Operations ====================

    /// Insert or update a school. IDs are the source site's stable
    /// identifiers, not autoincremented.
    pub fn upsert_school(&self, id: SchoolId, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO schools (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![id.0, name],
        )?;
        Ok(())
    }

    /// Get school by ID
    pub fn get_school(&self, id: SchoolId) -> Result<School> {
        self.conn
            .query_row(
                "SELECT id, name, aliases FROM schools WHERE id = ?1",
                params![id.0],
                Self::row_to_school,
            )
            .map_err(|_| HoopsError::SchoolNotFound(id))
    }

    /// Find a school by name or alias
    pub fn find_school_by_name(&self, name: &str) -> Result<Option<School>> {
        let name_lower = name.to_lowercase();

        let school: Option<School> = self
            .conn
            .query_row(
                "SELECT id, name, aliases FROM schools WHERE LOWER(name) = ?1",
                params![&name_lower],
                Self::row_to_school,
            )
            .optional()?;

        if school.is_some() {
            return Ok(school);
        }

        // Check aliases
        for school in self.get_all_schools()? {
            if school.matches_name(name) {
                return Ok(Some(school));
            }
        }

        Ok(None)
    }

    /// Resolve a school name to its stable ID, failing loudly on a name
    /// the directory has never seen
    pub fn school_id_for_name(&self, name: &str) -> Result<SchoolId> {
        self.find_school_by_name(name)?
            .map(|s| s.id)
            .ok_or_else(|| HoopsError::UnknownSchool(name.to_string()))
    }

    /// Get all schools
    pub fn get_all_schools(&self) -> Result<Vec<School>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, aliases FROM schools ORDER BY name")?;

        let schools = stmt
            .query_map([], Self::row_to_school)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(schools)
    }

    /// Add an alias for a school
    pub fn add_school_alias(&self, id: SchoolId, alias: &str) -> Result<()> {
        let school = self.get_school(id)?;
        let mut aliases = school.aliases;
        if !aliases
            .iter()
            .any(|a| a.to_lowercase() == alias.to_lowercase())
        {
            aliases.push(alias.to_string());
            let aliases_json = serde_json::to_string(&aliases)
                .map_err(|e| HoopsError::Config(e.to_string()))?;
            self.conn.execute(
                "UPDATE schools SET aliases = ?1 WHERE id = ?2",
                params![aliases_json, id.0],
            )?;
        }
        Ok(())
    }

    fn row_to_school(row: &rusqlite::Row) -> rusqlite::Result<School> {
        let id = SchoolId(row.get(0)?);
        let name: String = row.get(1)?;
        let aliases_json: String = row.get(2)?;
        let aliases: Vec<String> = serde_json::from_str(&aliases_json).unwrap_or_default();
        Ok(School { id, name, aliases })
    }

    // ==================== Game Operations ====================

    /// Insert a game row (one school's perspective)
    pub fn insert_game(&self, game: &GameRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO games (year, school_id, opponent_id, score, opponent_score)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                game.year,
                game.school.0,
                game.opponent.0,
                game.score,
                game.opponent_score,
            ],
        )?;
        Ok(())
    }

    /// Insert multiple game rows
    pub fn insert_games(&self, games: &[GameRecord]) -> Result<usize> {
        for game in games {
            self.insert_game(game)?;
        }
        Ok(games.len())
    }

    /// Load a season's game rows in insertion order
    pub fn load_games(&self, year: u16) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT year, school_id, opponent_id, score, opponent_score
             FROM games WHERE year = ?1 ORDER BY id",
        )?;

        let games = stmt
            .query_map(params![year], |row| {
                Ok(GameRecord {
                    year: row.get(0)?,
                    school: SchoolId(row.get(1)?),
                    opponent: SchoolId(row.get(2)?),
                    score: row.get(3)?,
                    opponent_score: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    // ==================== Player Operations ====================

    /// Insert a player stat line for a season
    pub fn insert_player(&self, year: u16, player: &PlayerRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO players (year, school_id, games, height,
                fg_made, fg_attempted, three_made, three_attempted,
                ft_made, ft_attempted, rebounds, assists, blocks, steals,
                points, turnovers, double_doubles, triple_doubles,
                position, class)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            params![
                year,
                player.school.0,
                player.games,
                player.height,
                player.field_goals_made,
                player.field_goals_attempted,
                player.three_pointers_made,
                player.three_pointers_attempted,
                player.free_throws_made,
                player.free_throws_attempted,
                player.rebounds,
                player.assists,
                player.blocks,
                player.steals,
                player.points,
                player.turnovers,
                player.double_doubles,
                player.triple_doubles,
                player.position.code(),
                player.class_year.code(),
            ],
        )?;
        Ok(())
    }

    /// Load a season's player stat lines in insertion order.
    ///
    /// Missing numeric stats are zero ("did not play/contribute");
    /// unrecognized categorical codes are a fatal data error surfaced
    /// here, before any roster is built from them.
    pub fn load_players(&self, year: u16) -> Result<Vec<PlayerRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT school_id,
                    COALESCE(games, 0), COALESCE(height, 0),
                    COALESCE(fg_made, 0), COALESCE(fg_attempted, 0),
                    COALESCE(three_made, 0), COALESCE(three_attempted, 0),
                    COALESCE(ft_made, 0), COALESCE(ft_attempted, 0),
                    COALESCE(rebounds, 0), COALESCE(assists, 0),
                    COALESCE(blocks, 0), COALESCE(steals, 0),
                    COALESCE(points, 0), COALESCE(turnovers, 0),
                    COALESCE(double_doubles, 0), COALESCE(triple_doubles, 0),
                    position, class
             FROM players WHERE year = ?1 ORDER BY id",
        )?;

        let raw_rows = stmt
            .query_map(params![year], |row| {
                let numerics: Vec<f32> = (1..17)
                    .map(|i| row.get(i))
                    .collect::<std::result::Result<_, _>>()?;
                let school: i64 = row.get(0)?;
                let position: Option<String> = row.get(17)?;
                let class: Option<String> = row.get(18)?;
                Ok((school, numerics, position, class))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut players = Vec::with_capacity(raw_rows.len());
        for (school, n, position, class) in raw_rows {
            // Blank codes mean the column was empty on the source page
            let position = position.filter(|s| !s.is_empty());
            let class = class.filter(|s| !s.is_empty());
            players.push(PlayerRecord {
                school: SchoolId(school),
                games: n[0],
                height: n[1],
                field_goals_made: n[2],
                field_goals_attempted: n[3],
                three_pointers_made: n[4],
                three_pointers_attempted: n[5],
                free_throws_made: n[6],
                free_throws_attempted: n[7],
                rebounds: n[8],
                assists: n[9],
                blocks: n[10],
                steals: n[11],
                points: n[12],
                turnovers: n[13],
                double_doubles: n[14],
                triple_doubles: n[15],
                position: Position::from_code(position.as_deref())?,
                class_year: ClassYear::from_code(class.as_deref())?,
            });
        }

        Ok(players)
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let school_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM schools", [], |row| row.get(0))?;

        let game_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;

        let player_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;

        let earliest_year: Option<u16> = self
            .conn
            .query_row("SELECT MIN(year) FROM games", [], |row| row.get(0))
            .optional()?
            .flatten();

        let latest_year: Option<u16> = self
            .conn
            .query_row("SELECT MAX(year) FROM games", [], |row| row.get(0))
            .optional()?
            .flatten();

        Ok(DatabaseStats {
            school_count: school_count as usize,
            game_count: game_count as usize,
            player_count: player_count as usize,
            earliest_year,
            latest_year,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub school_count: usize,
    pub game_count: usize,
    pub player_count: usize,
    pub earliest_year: Option<u16>,
    pub latest_year: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(school: i64, games: f32, position: Position, class: ClassYear) -> PlayerRecord {
        PlayerRecord {
            school: SchoolId(school),
            games,
            height: 77.0,
            field_goals_made: 120.0,
            field_goals_attempted: 250.0,
            three_pointers_made: 30.0,
            three_pointers_attempted: 90.0,
            free_throws_made: 60.0,
            free_throws_attempted: 80.0,
            rebounds: 150.0,
            assists: 70.0,
            blocks: 15.0,
            steals: 35.0,
            points: 330.0,
            turnovers: 50.0,
            double_doubles: 3.0,
            triple_doubles: 0.0,
            position,
            class_year: class,
        }
    }

    #[test]
    fn test_create_database() {
        let db = Database::in_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.school_count, 0);
        assert_eq!(stats.game_count, 0);
        assert_eq!(stats.player_count, 0);
        assert!(stats.earliest_year.is_none());
    }

    #[test]
    fn test_school_directory() {
        let db = Database::in_memory().unwrap();
        db.upsert_school(SchoolId(101), "Gonzaga").unwrap();
        db.upsert_school(SchoolId(102), "Saint Mary's (CA)").unwrap();

        assert_eq!(db.school_id_for_name("Gonzaga").unwrap(), SchoolId(101));
        assert_eq!(db.school_id_for_name("gonzaga").unwrap(), SchoolId(101));
        assert!(matches!(
            db.school_id_for_name("Hogwarts"),
            Err(HoopsError::UnknownSchool(_))
        ));
    }

    #[test]
    fn test_school_alias_lookup() {
        let db = Database::in_memory().unwrap();
        db.upsert_school(SchoolId(101), "North Carolina").unwrap();
        db.add_school_alias(SchoolId(101), "UNC").unwrap();

        assert_eq!(db.school_id_for_name("UNC").unwrap(), SchoolId(101));
        // Adding the same alias again is a no-op
        db.add_school_alias(SchoolId(101), "unc").unwrap();
        assert_eq!(db.get_school(SchoolId(101)).unwrap().aliases.len(), 1);
    }

    #[test]
    fn test_games_round_trip_in_order() {
        let db = Database::in_memory().unwrap();
        db.upsert_school(SchoolId(1), "A").unwrap();
        db.upsert_school(SchoolId(2), "B").unwrap();

        let games = vec![
            GameRecord {
                year: 2017,
                school: SchoolId(1),
                opponent: SchoolId(2),
                score: 80,
                opponent_score: 75,
            },
            GameRecord {
                year: 2017,
                school: SchoolId(2),
                opponent: SchoolId(1),
                score: 75,
                opponent_score: 80,
            },
        ];
        db.insert_games(&games).unwrap();

        let loaded = db.load_games(2017).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].school, SchoolId(1));
        assert_eq!(loaded[1].school, SchoolId(2));
        assert!(db.load_games(2016).unwrap().is_empty());
    }

    #[test]
    fn test_players_round_trip() {
        let db = Database::in_memory().unwrap();
        db.upsert_school(SchoolId(1), "A").unwrap();
        db.insert_player(2017, &player(1, 30.0, Position::Guard, ClassYear::Senior))
            .unwrap();
        db.insert_player(2017, &player(1, 12.0, Position::None, ClassYear::Unknown))
            .unwrap();

        let players = db.load_players(2017).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].games, 30.0);
        assert_eq!(players[0].position, Position::Guard);
        assert_eq!(players[1].position, Position::None);
        assert_eq!(players[1].class_year, ClassYear::Unknown);
    }

    #[test]
    fn test_unknown_position_code_is_fatal_on_load() {
        let db = Database::in_memory().unwrap();
        db.upsert_school(SchoolId(1), "A").unwrap();
        db.conn
            .execute(
                "INSERT INTO players (year, school_id, games, position, class)
                 VALUES (2017, 1, 10, 'PG', 'Fr.')",
                [],
            )
            .unwrap();

        assert!(matches!(
            db.load_players(2017),
            Err(HoopsError::UnknownCategory { field: "position", .. })
        ));
    }

    #[test]
    fn test_null_stats_load_as_zero() {
        let db = Database::in_memory().unwrap();
        db.upsert_school(SchoolId(1), "A").unwrap();
        db.conn
            .execute(
                "INSERT INTO players (year, school_id, games) VALUES (2017, 1, 5)",
                [],
            )
            .unwrap();

        let players = db.load_players(2017).unwrap();
        assert_eq!(players[0].games, 5.0);
        assert_eq!(players[0].points, 0.0);
        assert_eq!(players[0].rebounds, 0.0);
        assert_eq!(players[0].position, Position::None);
    }
}
