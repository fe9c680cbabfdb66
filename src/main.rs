use std::io::Write;

use clap::Parser;

use rook_and_ply::search::iterative_deepening::{SearchConfig, SearchMode};
use rook_and_ply::uci::uci_top::run_stdio_loop;

#[derive(Parser, Debug)]
#[command(author, version, about = "UCI chess engine", long_about = None)]
struct Args {
    /// Default search depth when `go` carries no limits and the mode is depth-bounded.
    #[arg(long, default_value_t = 4)]
    depth: u8,

    /// Default per-move budget in milliseconds.
    #[arg(long, default_value_t = 1000)]
    movetime: u64,

    /// Search to `--depth` instead of the time budget when `go` has no limits.
    #[arg(long)]
    fixed_depth: bool,

    /// Enable debug logging on stderr.
    #[arg(long)]
    debug: bool,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();

    let config = SearchConfig {
        max_depth: args.depth.max(1),
        movetime_ms: args.movetime.max(1),
        mode: if args.fixed_depth {
            SearchMode::DepthBounded
        } else {
            SearchMode::TimeBounded
        },
    };
    log::info!(
        "starting UCI loop (depth {}, movetime {} ms, {:?})",
        config.max_depth,
        config.movetime_ms,
        config.mode
    );

    run_stdio_loop(config)
}
