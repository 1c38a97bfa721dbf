use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bondcredit_core::{
    OpportunityDescriptor, OpportunityScoreTracker, SimulatedMetrics, TrackerConfig,
};
use bondcredit_trust::{ScoringConfig, ScoringEngine};
use bondcredit_types::{ActivityMetrics, AgentSubScores, MetricsSnapshot, QualitySignals};

#[derive(Parser)]
#[command(author, version, about = "Bond Credit scoring harness", long_about = None)]
struct Cli {
    /// JSON scoring configuration overriding the built-in tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of log lines
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate protocol rewards from on-chain activity
    Rewards {
        /// Transaction volume in USD
        #[arg(long, default_value_t = 7_500.0)]
        volume: f64,
        /// Smart contract calls
        #[arg(long, default_value_t = 320)]
        calls: u64,
        /// Unique wallets
        #[arg(long, default_value_t = 40)]
        wallets: u64,
    },
    /// Score a yield opportunity
    Opportunity {
        /// Used only when no 30-day APY is reported
        #[arg(long)]
        apy_7d: Option<f64>,
        #[arg(long, default_value_t = 12.2)]
        apy_30d: f64,
        #[arg(long, default_value_t = 95.5)]
        success_rate: f64,
        /// Average gas per intent, in TGas
        #[arg(long, default_value_t = 45.0)]
        gas: f64,
        /// Average latency, in milliseconds
        #[arg(long, default_value_t = 1800.0)]
        latency: f64,
        #[arg(long)]
        audited: bool,
        #[arg(long)]
        incidents: bool,
    },
    /// Assess an agent's credibility from its sub-scores
    Agent {
        #[arg(long)]
        provenance: f64,
        #[arg(long)]
        performance: f64,
        #[arg(long)]
        perception: f64,
        #[arg(long)]
        verification: f64,
        #[arg(long, default_value_t = 100.0)]
        completeness: f64,
        #[arg(long, default_value_t = 100.0)]
        consistency: f64,
        #[arg(long, default_value_t = 100.0)]
        verified_methods: f64,
        #[arg(long, default_value_t = 100.0)]
        stability: f64,
    },
    /// Track simulated opportunities over several refresh rounds
    Simulate {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 5)]
        rounds: u32,
        /// Pause between rounds, in milliseconds
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let config = load_config(cli.config.as_ref())?;
    let engine = ScoringEngine::new(config.clone()).context("invalid scoring configuration")?;

    match cli.command {
        Commands::Rewards {
            volume,
            calls,
            wallets,
        } => {
            let activity = ActivityMetrics {
                transaction_volume_usd: volume,
                smart_contract_calls: calls,
                unique_wallets: wallets,
            };
            let estimate = engine.rewards().estimate(&activity);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                info!("Activity: ${volume} volume, {calls} contract calls, {wallets} wallets");
                info!(
                    "  Points: volume {}, calls {}, wallets {}",
                    estimate.breakdown.volume,
                    estimate.breakdown.contract_calls,
                    estimate.breakdown.unique_wallets
                );
                info!("Estimate: {}", estimate);
                match engine.rewards().points_to_next_tier(estimate.points) {
                    Some((tier, missing)) => info!("  {missing} more points to reach {tier}"),
                    None => info!("  Top tier reached"),
                }
            }
        }
        Commands::Opportunity {
            apy_7d,
            apy_30d,
            success_rate,
            gas,
            latency,
            audited,
            incidents,
        } => {
            let metrics = MetricsSnapshot {
                apy_7d,
                apy_30d: Some(apy_30d),
                success_rate_pct: success_rate,
                avg_gas_used: gas,
                avg_latency_ms: latency,
                is_audited: audited,
                has_incidents: incidents,
                ..Default::default()
            };
            let score = engine.opportunity().score(&metrics);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&score)?);
            } else {
                info!("Opportunity score: {}", score);
            }
        }
        Commands::Agent {
            provenance,
            performance,
            perception,
            verification,
            completeness,
            consistency,
            verified_methods,
            stability,
        } => {
            let credibility = engine.credibility().assess(
                &AgentSubScores {
                    provenance,
                    performance,
                    perception,
                    verification,
                },
                &QualitySignals {
                    data_completeness: completeness,
                    scoring_consistency: consistency,
                    verified_methods,
                    historical_stability: stability,
                },
            );
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&credibility)?);
            } else {
                info!(
                    "Agent credibility: {}/100 (confidence {}%)",
                    credibility.score.overall, credibility.score.confidence
                );
                info!("  Tier: {}", credibility.tier);
                info!("  Display tier: {}", credibility.display_tier);
            }
        }
        Commands::Simulate {
            seed,
            rounds,
            interval_ms,
        } => {
            simulate(config, seed, rounds, interval_ms, cli.json).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<ScoringConfig> {
    let Some(path) = path else {
        return Ok(ScoringConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading scoring config {}", path.display()))?;
    let config = ScoringConfig::from_json(&raw)
        .with_context(|| format!("parsing scoring config {}", path.display()))?;
    info!("Loaded scoring configuration from {}", path.display());
    Ok(config)
}

async fn simulate(
    config: ScoringConfig,
    seed: u64,
    rounds: u32,
    interval_ms: u64,
    json: bool,
) -> Result<()> {
    let tracker = OpportunityScoreTracker::new(TrackerConfig {
        scoring: config.opportunity,
        ..Default::default()
    })?;
    let source = SimulatedMetrics::new(seed);
    let opportunities = [
        OpportunityDescriptor::new("usdc-lending", "USDC Lending", "usdc.lending.bondcredit.near", "lending"),
        OpportunityDescriptor::new("near-staking", "NEAR Staking", "near.staking.bondcredit.near", "staking"),
        OpportunityDescriptor::new("stable-lp", "Stable LP", "stable.lp.bondcredit.near", "liquidity"),
    ];

    info!("Simulating {rounds} refresh rounds (seed {seed})");
    for round in 1..=rounds {
        for opportunity in &opportunities {
            let record = tracker.refresh(opportunity, &source)?;
            info!("Round {round}: {} -> {}", opportunity, record.current_score);
        }
        if interval_ms > 0 && round < rounds {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    }

    let ranking = tracker.top_opportunities(opportunities.len());
    if json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
    } else {
        info!("Ranking after {rounds} rounds:");
        for (position, record) in ranking.iter().enumerate() {
            info!(
                "  {}. {} {} ({} snapshots)",
                position + 1,
                record.name,
                record.current_score,
                record.history.len()
            );
        }
    }
    Ok(())
}
