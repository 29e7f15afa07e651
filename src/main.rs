//! Gridiron prediction CLI
//!
//! Syncs NFL schedules, trains the gradient-boosted bundle, and serves
//! week and matchup predictions.

use clap::{Parser, Subcommand};
use gridiron::{Config, Result};

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "NFL game outcome prediction using gradient boosted trees", long_about = None)]
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
    /// Train the three estimators and save the bundle
    Train {
        /// Override boosting rounds
        #[arg(long)]
        rounds: Option<usize>,
        /// Override first season of the historical range
        #[arg(long)]
        start_year: Option<u16>,
    },
    /// Predict a week of games, or one matchup with --home/--away
    Predict {
        /// Season year
        #[arg(long)]
        season: u16,
        /// Week number
        #[arg(long)]
        week: u8,
        /// Home team code (e.g. KC)
        #[arg(long, requires = "away")]
        home: Option<String>,
        /// Away team code (e.g. LV)
        #[arg(long, requires = "home")]
        away: Option<String>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Sync historical seasons from the schedule provider
    Sync {
        /// First season to sync (default: configured start year)
        #[arg(long)]
        start: Option<u16>,
        /// Last season to sync (default: last completed season)
        #[arg(long)]
        end: Option<u16>,
    },
    /// Show database status
    Status,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
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
            DataCommands::Sync { start, end } => commands::data_sync(&config, start, end),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Train { rounds, start_year } => commands::train(&config, rounds, start_year),
        Commands::Predict {
            season,
            week,
            home,
            away,
            format,
        } => commands::predict(&config, season, week, home, away, format),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use gridiron::data::{Database, EspnScheduleProvider, ScheduleSource};
    use gridiron::model::ModelBundle;
    use gridiron::predict::{format_matchup, format_week_table, Predictor};
    use gridiron::training;
    use gridiron::{last_completed_season, GridironError, PredictionRow};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'gridiron data sync' to fetch historical schedules");
        println!("  3. Run 'gridiron train' to train the model bundle");
        println!("  4. Run 'gridiron predict --season 2024 --week 1' for a week of predictions");

        Ok(())
    }

    pub fn data_sync(config: &Config, start: Option<u16>, end: Option<u16>) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let provider = EspnScheduleProvider::new(&config.provider)?;

        let start = start.unwrap_or(config.training.start_year);
        let end = end.unwrap_or_else(last_completed_season);
        if start > end {
            return Err(GridironError::Config(format!(
                "sync range is empty: {} > {}",
                start, end
            )));
        }

        let mut total = 0;
        for season in start..=end {
            println!("Syncing season {}...", season);
            let games = provider.fetch_season(season)?;
            let count = db.upsert_games(&games)?;
            println!("  {} games stored", count);
            total += count;
        }

        let profiles = provider.fetch_team_profiles()?;
        let stored = db.upsert_team_profiles(&profiles)?;
        println!("Stored {} team profiles", stored);

        println!("Sync complete: {} games across {}-{}", total, start, end);
        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.database_path);
        println!("  Games:    {} ({} played)", stats.game_count, stats.played_count);
        println!("  Profiles: {}", db.team_profile_count()?);
        if let (Some(earliest), Some(latest)) = (stats.earliest_season, stats.latest_season) {
            println!("  Seasons:  {} to {}", earliest, latest);
        }

        Ok(())
    }

    pub fn train(config: &Config, rounds: Option<usize>, start_year: Option<u16>) -> Result<()> {
        let mut training_config = config.clone();
        if let Some(r) = rounds {
            training_config.training.boosting_rounds = r;
        }
        if let Some(y) = start_year {
            training_config.training.start_year = y;
        }

        println!("Initializing training...");
        let db = Database::open(&config.data.database_path)?;

        let outcome = training::train_and_save(&training_config, &db)?;

        println!("\nTraining complete!");
        println!("  Rows:     {} (train {}, holdout {})", outcome.total_rows, outcome.train_rows, outcome.test_rows);
        println!("  Holdout:  {}", outcome.holdout);
        println!("  Artifact: {}", outcome.model_path);

        Ok(())
    }

    pub fn predict(
        config: &Config,
        season: u16,
        week: u8,
        home: Option<String>,
        away: Option<String>,
        format: OutputFormat,
    ) -> Result<()> {
        let provider = EspnScheduleProvider::new(&config.provider)?;
        let predictor = Predictor::load(config, &provider)?;

        if let (Some(home), Some(away)) = (home, away) {
            let row = predictor.predict_matchup(&home, &away, season, week)?;
            match format {
                OutputFormat::Table => print!("{}", format_matchup(&row)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&row).unwrap()),
                OutputFormat::Csv => print_csv(&[row]),
            }
        } else {
            let rows = predictor.predict_week(season, week)?;
            if rows.is_empty() {
                println!("No games scheduled for {} week {}", season, week);
                return Ok(());
            }
            match format {
                OutputFormat::Table => print!("{}", format_week_table(&rows)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows).unwrap()),
                OutputFormat::Csv => print_csv(&rows),
            }
        }

        Ok(())
    }

    fn print_csv(rows: &[PredictionRow]) {
        println!("game_id,home_team,away_team,exp_home_pts,exp_away_pts,p_home_win,confidence,synthetic");
        for row in rows {
            println!(
                "{},{},{},{},{},{:.3},{},{}",
                row.game_id,
                row.home_team,
                row.away_team,
                row.exp_home_pts,
                row.exp_away_pts,
                row.p_home_win,
                row.confidence,
                row.synthetic
            );
        }
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let path = std::path::Path::new(&config.data.model_path);
        if !path.exists() {
            return Err(GridironError::NoModel);
        }
        let size = std::fs::metadata(path)?.len();

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Path:           {}", config.data.model_path);
        println!("  Size:           {} KiB", size / 1024);
        println!("  Estimators:     {}", ModelBundle::ROLES.join(", "));
        println!("  Rounds:         {}", config.training.boosting_rounds);
        println!("  Learning rate:  {}", config.training.learning_rate);
        println!("  Max depth:      {}", config.training.max_depth);

        Ok(())
    }
}
