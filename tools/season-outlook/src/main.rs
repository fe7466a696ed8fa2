//! Season Outlook CLI
//!
//! Runs the roster simulator against a league export:
//! - outlook: playoff and championship odds for every team
//! - matchup: head-to-head odds for a team's next game
//! - trades: asymmetric trade suggestions
//! - analyze: value impact of one proposed trade
//! - free-agents: pickups ranked against the current roster
//! - config: print the effective configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tracing::info;

use league_registry::{LeagueRegistry, LookupError, Player, PlayerId, Position, TeamId};
use roster_sim::{
    initialize_logging_with_config, PlayerSummary, Priority, Recommendation, RosterSimulator,
    SimulatorConfig, TradeResult, Valuation,
};

#[derive(Parser)]
#[command(name = "season-outlook")]
#[command(about = "Monte Carlo matchup, trade and season projections for a fantasy league")]
#[command(version = "0.1.0")]
struct Cli {
    /// League export (JSON)
    #[arg(short, long, default_value = "league.json")]
    league: PathBuf,

    /// Simulator configuration (TOML); FANTASY_SIM_* variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trials per projection, overriding the configuration
    #[arg(short = 'n', long)]
    simulations: Option<usize>,

    /// Seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Playoff and championship odds for every team
    Outlook,

    /// Win odds for a team's game in a given week
    Matchup {
        #[arg(short, long)]
        team: TeamId,

        /// Defaults to the week after the league's current week
        #[arg(short, long)]
        week: Option<u32>,
    },

    /// Trades that favour a team
    Trades {
        #[arg(short, long)]
        team: TeamId,

        /// Minimum value gain per trade
        #[arg(long, default_value = "2.0")]
        min_advantage: f64,

        /// Suggestions kept per opponent
        #[arg(long, default_value = "3")]
        per_team: usize,

        /// Value players over the remaining schedule instead of season average
        #[arg(long)]
        ros: bool,
    },

    /// Value impact of one proposed trade
    Analyze {
        #[arg(short, long)]
        team: TeamId,

        /// Trade partner; defaults to the team rostering the first incoming player
        #[arg(short, long)]
        with: Option<TeamId>,

        /// Players sent away, by id or name
        #[arg(long, value_delimiter = ',', required = true)]
        give: Vec<String>,

        /// Players received, by id or name
        #[arg(long, value_delimiter = ',', required = true)]
        get: Vec<String>,

        /// Value players over the remaining schedule instead of season average
        #[arg(long)]
        ros: bool,
    },

    /// Free-agent pickups for a team
    FreeAgents {
        #[arg(short, long)]
        team: TeamId,

        /// JSON array of available players
        #[arg(short, long)]
        pool: PathBuf,

        #[arg(long, default_value = "10")]
        top: usize,

        /// Restrict to positions (QB, RB, WR, TE, K, D/ST)
        #[arg(long, value_delimiter = ',')]
        positions: Vec<Position>,

        /// Include injured or questionable players
        #[arg(long)]
        include_injured: bool,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SimulatorConfig::load(cli.config.as_deref())?;
    if let Some(n) = cli.simulations {
        config.simulation.n_simulations = n;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    initialize_logging_with_config(&config.logging)?;

    let registry = LeagueRegistry::load_from_file(&cli.league)
        .with_context(|| format!("Failed to load league from {:?}", cli.league))?;
    info!(
        "Loaded league {} with {} teams and {} players",
        registry.league().year,
        registry.team_count(),
        registry.player_count()
    );

    let mut rng = match config.simulation.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let n_simulations = config.simulation.n_simulations;

    let mut simulator = RosterSimulator::new(config).context("Failed to build simulator")?;
    simulator.train_league(registry.league());

    match cli.command {
        Commands::Outlook => run_outlook(&simulator, &registry, n_simulations, &mut rng),
        Commands::Matchup { team, week } => {
            run_matchup(&simulator, &registry, team, week, n_simulations, &mut rng)
        }
        Commands::Trades { team, min_advantage, per_team, ros } => {
            run_trades(&simulator, &registry, team, min_advantage, per_team, ros)
        }
        Commands::Analyze { team, with, give, get, ros } => {
            run_analyze(&simulator, &registry, team, with, &give, &get, ros)
        }
        Commands::FreeAgents { team, pool, top, positions, include_injured } => {
            run_free_agents(&simulator, &registry, team, &pool, top, &positions, include_injured)
        }
        Commands::Config => Ok(()),
    }
}

fn run_outlook(
    simulator: &RosterSimulator,
    registry: &LeagueRegistry,
    n_simulations: usize,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let league = registry.league();
    let outlook = simulator.simulate_season_rest_of_season(league, n_simulations, rng);

    let mut rows: Vec<_> = outlook.values().collect();
    rows.sort_by(|a, b| b.playoff_odds.total_cmp(&a.playoff_odds));

    let title = format!("Season Outlook {} (week {})", league.year, league.current_week);
    println!("{}", title.cyan().bold());
    println!("{}", "=".repeat(72));
    println!(
        "{:<28} {:>6} {:>10} {:>10} {:>12}",
        "Team", "Wins", "Projected", "Playoffs", "Championship"
    );

    for row in rows {
        let playoffs = format!("{:>9.1}%", row.playoff_odds);
        let playoffs = if row.playoff_odds >= 50.0 { playoffs.green() } else { playoffs.red() };
        println!(
            "{:<28} {:>6} {:>10.1} {} {:>11.1}%",
            row.team_name, row.current_wins, row.projected_wins, playoffs, row.championship_odds
        );
    }

    Ok(())
}

fn run_matchup(
    simulator: &RosterSimulator,
    registry: &LeagueRegistry,
    team_id: TeamId,
    week: Option<u32>,
    n_simulations: usize,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let league = registry.league();
    let week = week.unwrap_or(league.current_week + 1);
    let team = registry.get_team(team_id)?;
    let opponent_id = team
        .opponent_in_week(week)
        .with_context(|| format!("{} has no game in week {week}", team.team_name))?;
    let opponent = registry.get_team(opponent_id)?;

    let result = simulator.simulate_matchup(team, opponent, n_simulations, rng);

    let title = format!("Week {week}: {} vs {}", team.team_name, opponent.team_name);
    println!("{}", title.cyan().bold());
    for (name, odds, summary) in [
        (&team.team_name, result.team1_win_probability, &result.team1),
        (&opponent.team_name, result.team2_win_probability, &result.team2),
    ] {
        println!(
            "  {:<28} {} avg {:>6.1} ± {:>5.1} (p10 {:.1}, p90 {:.1})",
            name,
            format!("{odds:>5.1}%").yellow().bold(),
            summary.avg_score,
            summary.score_std,
            summary.score_range.0,
            summary.score_range.1
        );
    }

    Ok(())
}

fn run_trades(
    simulator: &RosterSimulator,
    registry: &LeagueRegistry,
    team_id: TeamId,
    min_advantage: f64,
    per_team: usize,
    ros: bool,
) -> Result<()> {
    let valuation = valuation_for(registry, ros);
    let opportunities = simulator.find_trade_opportunities(
        registry.league(),
        team_id,
        min_advantage,
        per_team,
        valuation,
    )?;

    if opportunities.is_empty() {
        println!("{}", "No trades clear the advantage threshold".yellow());
        return Ok(());
    }

    println!("{}", format!("{} trade opportunities", opportunities.len()).cyan().bold());
    for trade in &opportunities {
        let names = |players: &[PlayerSummary]| {
            let labels: Vec<String> =
                players.iter().map(|p| format!("{} ({})", p.name, p.position)).collect();
            labels.join(", ")
        };
        let verdict = match trade.analysis.recommendation {
            Recommendation::Accept => "ACCEPT".green().bold(),
            Recommendation::Reject => "REJECT".red().bold(),
        };
        println!(
            "  {} with {}: give {} | get {}",
            verdict,
            trade.other_team_name,
            names(&trade.give),
            names(&trade.receive)
        );
        println!(
            "      +{:.1} for you, {:+.1} for them, {:+.2}/week, confidence {:.0}",
            trade.analysis.my_value_change,
            trade.analysis.their_value_change,
            trade.analysis.projected_points_added_per_week,
            trade.analysis.confidence
        );
    }

    Ok(())
}

fn run_analyze(
    simulator: &RosterSimulator,
    registry: &LeagueRegistry,
    team_id: TeamId,
    partner: Option<TeamId>,
    give: &[String],
    get: &[String],
    ros: bool,
) -> Result<()> {
    let my_team = registry.get_team(team_id)?;
    let partner_id = match partner {
        Some(id) => id,
        None => {
            let first = get.first().context("No incoming players given")?;
            let player = registry.find_player(first).map_err(|e| suggest(registry, e))?;
            registry.owner_of(player.player_id)?.team_id
        }
    };
    let other_team = registry.get_team(partner_id)?;

    let players_out = player_ids(registry, team_id, give)?;
    let players_in = player_ids(registry, partner_id, get)?;

    let valuation = valuation_for(registry, ros);
    let weeks_remaining = simulator.weeks_remaining(registry.league(), valuation);
    let result = simulator.analyze_trade(
        my_team,
        other_team,
        &players_out,
        &players_in,
        weeks_remaining,
        valuation,
    )?;

    let title = format!("{} trading with {}", my_team.team_name, other_team.team_name);
    println!("{}", title.cyan().bold());
    print_trade_result(&result);

    Ok(())
}

fn print_trade_result(result: &TradeResult) {
    let verdict = match result.recommendation {
        Recommendation::Accept => "ACCEPT".green().bold(),
        Recommendation::Reject => "REJECT".red().bold(),
    };
    let basis = if result.uses_ros_projections { "rest of season" } else { "season average" };

    println!("  Recommendation: {} (confidence {:.0})", verdict, result.confidence);
    println!("  Your value change:  {:+.2}", result.my_value_change);
    println!("  Their value change: {:+.2}", result.their_value_change);
    println!("  Advantage margin:   {:+.2}", result.advantage_margin);
    println!(
        "  {:+.2} points/week over {} weeks ({})",
        result.projected_points_added_per_week, result.weeks_remaining, basis
    );
}

/// Resolve players by id or name against one team's roster
fn player_ids(
    registry: &LeagueRegistry,
    team_id: TeamId,
    references: &[String],
) -> Result<Vec<PlayerId>> {
    let players =
        registry.resolve_player_refs(team_id, references).map_err(|e| suggest(registry, e))?;
    Ok(players.iter().map(|p| p.player_id).collect())
}

/// Attach close name matches to an unknown-name error
fn suggest(registry: &LeagueRegistry, err: LookupError) -> anyhow::Error {
    if let LookupError::PlayerNameNotFound(name) = &err {
        let first_word = name.split_whitespace().next().unwrap_or(name.as_str());
        let matches: Vec<&str> =
            registry.search_players(first_word).into_iter().map(|p| p.name.as_str()).collect();
        if !matches.is_empty() {
            let hint = format!("did you mean: {}?", matches.join(", "));
            return anyhow::Error::new(err).context(hint);
        }
    }
    err.into()
}

fn valuation_for(registry: &LeagueRegistry, ros: bool) -> Valuation {
    if ros {
        Valuation::RestOfSeason { start_week: registry.league().current_week + 1 }
    } else {
        Valuation::SeasonAverage
    }
}

fn run_free_agents(
    simulator: &RosterSimulator,
    registry: &LeagueRegistry,
    team_id: TeamId,
    pool: &Path,
    top: usize,
    positions: &[Position],
    include_injured: bool,
) -> Result<()> {
    let team = registry.get_team(team_id)?;
    let content = std::fs::read_to_string(pool)
        .with_context(|| format!("Failed to read free-agent pool {pool:?}"))?;
    let free_agents: Vec<Player> =
        serde_json::from_str(&content).context("Invalid free-agent pool")?;

    let recommendations = simulator.recommend_free_agents(
        team,
        &free_agents,
        top,
        Some(positions),
        !include_injured,
    );

    println!("{}", format!("Free agents for {}", team.team_name).cyan().bold());
    for rec in &recommendations {
        let priority = match rec.priority {
            Priority::High => "HIGH".green().bold(),
            Priority::Medium => "MEDIUM".yellow(),
            Priority::Low => "LOW".normal(),
        };
        let drop = rec.drop_candidate_name.as_deref().unwrap_or("none (roster expansion)");
        println!(
            "  {:<7} {:<24} {:<5} +{:.1}  drop {}  ({:.0}% owned)",
            priority, rec.name, rec.position, rec.value_added, drop, rec.percent_owned
        );
    }

    Ok(())
}
