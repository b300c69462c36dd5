use anyhow::Result;
use branchprint::commands::{self, CompareOptions};
use clap::{Parser, Subcommand};

/// Structural fingerprinting of conditional-branch graphs in ELF binaries.
///
/// The binary is intentionally thin: it parses args, dispatches to command
/// helpers, and lets `branchprint-core` + `commands` own the real work for
/// testability and reuse. Argument errors exit 2 (clap's default); I/O,
/// disassembly, and graph-loading failures exit 1.
#[derive(Parser, Debug)]
#[command(
    name = "branchprint",
    version,
    about = "Extract conditional-jump graphs from ELF binaries and compare shared subgraph structure",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the conditional-jump graph from an ELF binary.
    Extract {
        /// Path to the target ELF binary.
        #[arg(long)]
        binary: String,

        /// Path to the graph JSON output.
        #[arg(long)]
        output: String,
    },

    /// Compare a new binary's graph against a previously extracted graph.
    Compare {
        /// Path to the new target ELF binary.
        #[arg(long)]
        binary: String,

        /// Path to a previously extracted graph JSON.
        #[arg(long)]
        prior_graph: String,

        /// Path to the comparison JSON output.
        #[arg(long)]
        output: String,

        /// Optional path to also save the newly extracted graph JSON.
        #[arg(long)]
        extracted_output: Option<String>,

        /// Collect matching windows across all sizes down to --min-size,
        /// instead of only the best size.
        #[arg(long, default_value_t = false)]
        collect_all_sizes: bool,

        /// Minimum subgraph window size to consider.
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
        min_size: u32,

        /// Only report matches with this exact window size.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        size_filter: Option<u32>,

        /// Maximum number of matching windows to report.
        /// Defaults to 1 (best size only) or 200 with --collect-all-sizes.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_report: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Extract { binary, output } => commands::extract_command(&binary, &output)?,
        Command::Compare {
            binary,
            prior_graph,
            output,
            extracted_output,
            collect_all_sizes,
            min_size,
            size_filter,
            max_report,
        } => commands::compare_command(&CompareOptions {
            binary,
            prior_graph,
            output,
            extracted_output,
            collect_all_sizes,
            min_size,
            size_filter,
            max_report,
        })?,
    }

    Ok(())
}
