use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use minestake_core::simulation::{PolicyKind, SimulationConfig, SimulationReport, run_simulation};
use minestake_core::{CellCount, Credits, EntropyModel, PayoutRules};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Cash out when danger is high, buy hints when cheap
    Heuristic,
    /// Cash out after a fixed number of safe reveals
    CashOutAfter,
    /// Keep revealing until the board is cleared or a bomb goes off
    RevealAll,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Entropy {
    /// Hypergeometric posterior over the hint's neighbourhood
    Hypergeometric,
    /// Legacy weighting, hints always cost the base price
    Legacy,
}

impl From<Entropy> for EntropyModel {
    fn from(value: Entropy) -> Self {
        match value {
            Entropy::Hypergeometric => EntropyModel::Hypergeometric,
            Entropy::Legacy => EntropyModel::Legacy,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Estimate the return to player of the mines game", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Number of rounds to play
    #[arg(short = 'n', long, default_value_t = 10_000)]
    iterations: u32,

    /// Credits wagered per round
    #[arg(long, default_value_t = 10.0)]
    stake: Credits,

    /// Bombs per board
    #[arg(short, long, default_value_t = 3)]
    bombs: CellCount,

    /// Starting balance of the simulated player
    #[arg(long, default_value_t = minestake_core::simulation::DEFAULT_STARTING_BALANCE)]
    balance: Credits,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Automated player
    #[arg(long, value_enum, default_value_t = Policy::Heuristic)]
    policy: Policy,

    /// Safe reveals before cashing out, for the cash-out-after policy
    #[arg(long, default_value_t = 3)]
    cash_out_after: CellCount,

    /// Model used to discount hint prices
    #[arg(long, value_enum, default_value_t = Entropy::Hypergeometric)]
    entropy_model: Entropy,

    /// Base return to player before hint adjustments
    #[arg(long, default_value_t = minestake_core::BASE_RTP)]
    base_rtp: f64,

    /// RTP added per hint, scaled by the safe cell count
    #[arg(long, default_value_t = minestake_core::RTP_ADJUSTMENT_FACTOR)]
    rtp_adjustment: f64,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn policy_kind(&self) -> PolicyKind {
        match self.policy {
            Policy::Heuristic => PolicyKind::Heuristic,
            Policy::CashOutAfter => PolicyKind::CashOutAfter(self.cash_out_after),
            Policy::RevealAll => PolicyKind::RevealAll,
        }
    }

    fn rules(&self) -> PayoutRules {
        PayoutRules {
            base_rtp: self.base_rtp,
            rtp_adjustment_factor: self.rtp_adjustment,
            entropy_model: self.entropy_model.into(),
            ..PayoutRules::default()
        }
    }
}

fn print_summary(report: &SimulationReport) {
    let summary = &report.summary;
    println!("Policy:                {}", report.policy);
    println!("Seed:                  {}", report.config.seed);
    println!(
        "Games:                 {} ({} won)",
        summary.total_games, summary.games_won
    );
    println!("Money gambled:         {:.2}", summary.total_money_gambled);
    println!("Money spent on hints:  {:.2}", summary.total_money_spent_on_hints);
    println!("Money won:             {:.2}", summary.total_money_won);
    println!("Avg cells revealed:    {:.2}", summary.average_cells_revealed);
    println!("Empirical RTP:         {:.2}%", summary.empirical_rtp_percent);
    println!("Final balance:         {:.2}", summary.final_balance);
    println!("Player net:            {:+.2}", summary.player_net);
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {seed}");

    let policy_kind = args.policy_kind();
    let config = SimulationConfig::new(args.iterations, args.stake, args.bombs, seed)
        .with_starting_balance(args.balance)
        .with_rules(args.rules());
    let mut policy = policy_kind.create_policy(seed);

    let report = run_simulation(&config, policy.as_mut())
        .with_context(|| format!("simulation with {policy_kind} failed"))?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{json}");
    } else {
        print_summary(&report);
    }

    Ok(())
}
