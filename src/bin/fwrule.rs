//! fwrule: CLI tool for checking packets against firewall rule files.

use clap::{Parser, Subcommand};
use fwrule::{ErrorPolicy, LoadReport, LoaderConfig, QueryRunner, RuleLoader};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fwrule")]
#[command(version)]
#[command(about = "Check packets against static firewall rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query file against a rule file and report pass/fail counts
    Check {
        /// Rule file, one `direction,protocol,port,ip` record per line
        #[arg(short, long)]
        rules: PathBuf,

        /// Query file, one `direction,protocol,port,ip,expected` record per line
        #[arg(short, long)]
        queries: PathBuf,

        /// What to do with malformed rule lines (abort or skip)
        #[arg(long, default_value_t = ErrorPolicy::Abort)]
        on_error: ErrorPolicy,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decide a single packet
    Query {
        /// Rule file
        #[arg(short, long)]
        rules: PathBuf,

        /// inbound or outbound
        direction: String,

        /// tcp or udp
        protocol: String,

        /// Destination port
        port: u16,

        /// Dotted-quad address
        ip: String,
    },

    /// Print index statistics for a rule file
    Stats {
        /// Rule file
        #[arg(short, long)]
        rules: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            rules,
            queries,
            on_error,
            json,
            verbose,
        } => check(&rules, &queries, on_error, json, verbose),
        Commands::Query {
            rules,
            direction,
            protocol,
            port,
            ip,
        } => query(&rules, &direction, &protocol, port, &ip),
        Commands::Stats { rules, json } => stats(&rules, json),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load(rules: &Path, policy: ErrorPolicy) -> Result<LoadReport, fwrule::Error> {
    RuleLoader::new(LoaderConfig::with_policy(policy)).open(rules)
}

fn check(
    rules: &Path,
    queries: &Path,
    policy: ErrorPolicy,
    json: bool,
    verbose: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    if verbose {
        println!("Reading rule file: {:?}", rules);
    }

    let report = load(rules, policy)?;
    for skipped in &report.skipped {
        eprintln!("Skipped: {}", skipped);
    }

    if verbose {
        println!("Built index: {}", report.index.stats());
        println!("Reading query file: {:?}", queries);
    }

    let summary = QueryRunner::new(&report.index).run(fs::File::open(queries)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for failure in &summary.failures {
            println!(
                "testCase: {} is WRONG (line {}, got {})",
                failure.record, failure.line, failure.outcome
            );
        }
        println!("{}", summary);
    }

    Ok(summary.all_passed())
}

fn query(
    rules: &Path,
    direction: &str,
    protocol: &str,
    port: u16,
    ip: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let report = load(rules, ErrorPolicy::Abort)?;
    let permitted = report.index.accept_packet(direction, protocol, port, ip)?;
    println!("{}", if permitted { "permit" } else { "deny" });
    Ok(true)
}

fn stats(rules: &Path, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let report = load(rules, ErrorPolicy::Abort)?;
    let stats = report.index.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(true)
}
