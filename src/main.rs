//! Command-line driver: search one position and print the chosen move.
//!
//! Usage:
//!   kestrel                                   # start position, depth 3, 5 s
//!   kestrel --fen "<fen>" --depth 5 --time-ms 2000
//!   kestrel --moves "e2e4 e7e5 g1f3"          # apply moves first
//!   kestrel --network net.knet                # learned evaluator

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use kestrel_core::Position;
use kestrel_engine::{Engine, EngineConfig, Evaluator, FallbackEvaluator, HeuristicEvaluator, NetworkEvaluator};
use tracing::{info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut pos = match parse_arg_str(&args, "--fen") {
        Some(fen) => Position::from_fen(&fen).with_context(|| format!("bad --fen {fen:?}"))?,
        None => Position::starting_position(),
    };
    if let Some(moves) = parse_arg_str(&args, "--moves") {
        for text in moves.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
            let mv = pos.parse_uci(text)?;
            pos.make_move(mv);
        }
    }

    let mut config = EngineConfig::default();
    if let Some(depth) = parse_arg(&args, "--depth")? {
        config.max_depth = depth;
    }
    if let Some(ms) = parse_arg::<u64>(&args, "--time-ms")? {
        config.time_budget = (ms > 0).then(|| Duration::from_millis(ms));
    }
    if let Some(seed) = parse_arg(&args, "--seed")? {
        config.seed = seed;
    }
    if let Some(mb) = parse_arg(&args, "--hash-mb")? {
        config.tt_size_mb = mb;
    }
    config.use_tt = !args.iter().any(|a| a == "--no-tt");
    config.null_move = !args.iter().any(|a| a == "--no-null-move");
    config.randomize_ties = args.iter().any(|a| a == "--random-ties");

    let side = pos.side_to_move();
    let mut engine = match parse_arg_str(&args, "--network") {
        Some(path) => match NetworkEvaluator::load(&path) {
            Ok(net) => {
                let evaluator: Box<dyn Evaluator> =
                    Box::new(FallbackEvaluator::new(net, HeuristicEvaluator::default()));
                Engine::with_evaluator(config, side, evaluator)
            }
            Err(err) => {
                warn!(error = %err, "could not load network, using heuristic evaluation");
                Engine::with_config(config, side)
            }
        },
        None => Engine::with_config(config, side),
    };

    info!(fen = %pos, evaluator = engine.evaluator_name(), "kestrel starting");

    if pos.legal_moves().is_empty() {
        match pos.outcome() {
            Some(outcome) => bail!("no legal moves: {outcome}"),
            None => bail!("no legal moves"),
        }
    }

    let result = engine.search_with(&mut pos, |depth, score, nodes, pv| {
        let line: Vec<String> = pv.iter().map(ToString::to_string).collect();
        println!("info depth {depth} score cp {score} nodes {nodes} pv {}", line.join(" "));
    });
    let best = match result {
        Ok(result) => {
            println!(
                "info time {} nodes {} nps {}",
                result.elapsed.as_millis(),
                result.nodes,
                result.nps()
            );
            result.best_move
        }
        Err(err) => {
            warn!(error = %err, "search did not complete a depth, playing fallback move");
            engine.fallback_move(&pos).context("no legal moves")?
        }
    };
    println!("bestmove {best}");
    Ok(())
}

fn parse_arg<T>(args: &[String], flag: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_arg_str(args, flag)
        .map(|value| value.parse::<T>().with_context(|| format!("invalid value {value:?} for {flag}")))
        .transpose()
}

fn parse_arg_str(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn print_usage() {
    println!("Usage: kestrel [options]");
    println!();
    println!("  --fen <fen>         Position to search (default: start position)");
    println!("  --moves <uci...>    Moves to apply first, space or comma separated");
    println!("  --depth <n>         Maximum search depth in plies (default: 3)");
    println!("  --time-ms <ms>      Time budget, 0 for none (default: 5000)");
    println!("  --seed <n>          Seed for tie-breaking and fallback moves");
    println!("  --hash-mb <n>       Transposition table size (default: 16)");
    println!("  --network <path>    Evaluate with a KNET network file");
    println!("  --no-tt             Disable the transposition table");
    println!("  --no-null-move      Disable null-move pruning");
    println!("  --random-ties       Break move-ordering ties from the seed");
    println!("  --help, -h          Show this help");
}
