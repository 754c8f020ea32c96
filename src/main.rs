//! NCAA basketball prediction CLI
//!
//! Dataset construction and score prediction over per-season records.

use clap::{Parser, Subcommand};
use hoops::{Config, PredictionMode, Result};

#[derive(Parser)]
#[command(name = "hoops")]
#[command(about = "NCAA basketball dataset pipeline and score prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Build training tensors for one or more seasons
    Build {
        /// Season years (e.g. 2015,2016,2017)
        #[arg(long, value_delimiter = ',', required = true)]
        years: Vec<u16>,
        /// Label mode: winner or score
        #[arg(long, default_value = "winner")]
        mode: PredictionMode,
        /// Override worker thread count (0 = one per core)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Predict a matchup score from historical results
    Predict {
        /// First school name
        school: String,
        /// Second school name
        opponent: String,
        /// Tournament year (uses the prior season's games)
        #[arg(long)]
        year: u16,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Show database status
    Status,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Build {
            years,
            mode,
            workers,
        } => commands::build(&config, &years, mode, workers),
        Commands::Predict {
            school,
            opponent,
            year,
        } => commands::predict(&config, &school, &opponent, year),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use hoops::data::{build_corpus, CancelToken, Database, DatasetCache, SeasonDataset};
    use hoops::features::TeamIndex;
    use hoops::predict::{historical_score, predict_matchup};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all(&config.data.cache_dir)?;
        println!("Created data/ and cache directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Populate {} with season records", config.data.database_path);
        println!("  3. Run 'hoops build --years 2015,2016' to build training tensors");
        println!("  4. Run 'hoops predict \"School A\" \"School B\" --year 2017'");

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;

        println!("Database: {}", config.data.database_path);
        println!("  Schools: {}", stats.school_count);
        println!("  Games:   {}", stats.game_count);
        println!("  Players: {}", stats.player_count);
        match (stats.earliest_year, stats.latest_year) {
            (Some(first), Some(last)) => println!("  Seasons: {} - {}", first, last),
            _ => println!("  Seasons: none"),
        }

        Ok(())
    }

    pub fn build(
        config: &Config,
        years: &[u16],
        mode: PredictionMode,
        workers: Option<usize>,
    ) -> Result<()> {
        let cache = DatasetCache::new(&config.data.cache_dir);
        let workers = workers.unwrap_or(config.build.workers);
        let database_path = config.data.database_path.clone();

        println!("Building {} dataset for {:?}...", mode, years);

        // Each season task opens its own connection; SQLite connections
        // are not shared across workers.
        let corpus = build_corpus(
            &cache,
            years,
            mode,
            workers,
            &CancelToken::new(),
            |year| {
                let db = Database::open(&database_path)?;
                let games = db.load_games(year)?;
                let index = TeamIndex::build(db.load_players(year)?);
                Ok(SeasonDataset::build(year, &games, &index, mode))
            },
        )?;

        let [games, sides, players, features] = corpus.features.shape();
        println!(
            "Built corpus: features [{}, {}, {}, {}], labels [{}, {}]",
            games,
            sides,
            players,
            features,
            corpus.labels.num_games(),
            mode.label_width(),
        );
        println!("Seasons included: {:?}", corpus.years);
        println!("Artifacts cached in {}", config.data.cache_dir);

        Ok(())
    }

    /// The season feeding into a tournament year
    fn prior_season(year: u16) -> Result<u16> {
        year.checked_sub(1).ok_or_else(|| {
            hoops::HoopsError::Config(format!("Invalid tournament year: {}", year))
        })
    }

    pub fn predict(config: &Config, school: &str, opponent: &str, year: u16) -> Result<()> {
        // The heuristic reads the season leading into the tournament
        let season = prior_season(year)?;

        let db = Database::open(&config.data.database_path)?;
        let school_id = db.school_id_for_name(school)?;
        let opponent_id = db.school_id_for_name(opponent)?;

        let games = db.load_games(season)?;

        let school_hist = historical_score(&games, school_id);
        let opponent_hist = historical_score(&games, opponent_id);
        let matchup = predict_matchup(&school_hist, &opponent_hist);

        println!("{} vs {} ({} season):", school, opponent, season);
        if !matchup.is_available() {
            println!("  Historical prediction unavailable (insufficient games)");
            return Ok(());
        }

        println!("  {}: {:.1}", school, matchup.school_score);
        println!("  {}: {:.1}", opponent, matchup.opponent_score);
        println!("  Total: {:.1}", matchup.total());

        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_prior_season() {
            assert_eq!(prior_season(2017).unwrap(), 2016);
            assert_eq!(prior_season(1).unwrap(), 0);
        }

        #[test]
        fn test_year_zero_is_a_config_error() {
            assert!(matches!(
                prior_season(0),
                Err(hoops::HoopsError::Config(_))
            ));
        }
    }
}
