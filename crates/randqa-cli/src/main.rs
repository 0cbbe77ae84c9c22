//! CLI for randqa: randomness quality assessment for bit streams.

mod advisor;
mod commands;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use randqa_core::SourceKind;

use commands::TuningArgs;

#[derive(Parser)]
#[command(name = "randqa")]
#[command(about = "randqa: randomness quality assessment for bit streams")]
#[command(version = randqa_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full battery on one source, file or hex payload.
    /// Prints a Markdown report with advice and writes report.json + report.md.
    Analyze {
        /// Bit source: lcg (weak), xorshift (fast PRNG), osrandom (OS CSPRNG)
        #[arg(long, default_value = "lcg", conflicts_with_all = ["file", "hex"])]
        source: SourceKind,

        /// Number of bits to analyse [default: 100000, or the whole payload]
        #[arg(long)]
        bits: Option<usize>,

        /// Seed for PRNG sources (ignored for osrandom)
        #[arg(long, default_value = "42")]
        seed: u32,

        /// Analyse the bytes of a file (LSB-first) instead of a generator
        #[arg(long, conflicts_with = "hex")]
        file: Option<PathBuf>,

        /// Analyse a hex string (LSB-first) instead of a generator
        #[arg(long)]
        hex: Option<String>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Output directory for report.json and report.md
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },

    /// Run every listed source with the same parameters and print a comparison table
    Compare {
        /// Comma-separated sources
        #[arg(long, value_delimiter = ',', default_value = "lcg,xorshift,osrandom")]
        sources: Vec<SourceKind>,

        /// Number of bits per source
        #[arg(long, default_value = "100000")]
        bits: usize,

        /// Seed for PRNG sources
        #[arg(long, default_value = "42")]
        seed: u32,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Write the comparison as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP analysis server
    Server {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Defaults for parameters a request omits
        #[command(flatten)]
        tuning: TuningArgs,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            bits,
            seed,
            file,
            hex,
            tuning,
            out,
        } => commands::analyze::run(commands::analyze::AnalyzeCommandConfig {
            source,
            bits,
            seed,
            file: file.as_deref(),
            hex: hex.as_deref(),
            tuning: &tuning,
            out_dir: &out,
        }),
        Commands::Compare {
            sources,
            bits,
            seed,
            tuning,
            output,
        } => commands::compare::run(commands::compare::CompareCommandConfig {
            sources: &sources,
            bits,
            seed,
            tuning: &tuning,
            output_path: output.as_deref(),
        }),
        Commands::Server { host, port, tuning } => commands::server::run(&host, port, &tuning),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compare_parses_source_list() {
        let cli = Cli::try_parse_from(["randqa", "compare", "--sources", "lcg,osrandom"]).unwrap();
        let Commands::Compare { sources, .. } = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(sources, vec![SourceKind::Lcg, SourceKind::OsRandom]);
    }

    #[test]
    fn analyze_rejects_source_with_file() {
        let parsed = Cli::try_parse_from([
            "randqa", "analyze", "--source", "xorshift", "--file", "data.bin",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_source_is_a_parse_error() {
        assert!(Cli::try_parse_from(["randqa", "analyze", "--source", "mt19937"]).is_err());
    }
}
