//! Iterative-deepening search driver.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use kestrel_core::{Color, Move, Position};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EvalError, SearchError};
use crate::eval::{EvalParams, Evaluator, HeuristicEvaluator};
use control::SearchControl;
use heuristics::{HistoryTable, KillerTable};
use negamax::{INF, MATE_THRESHOLD, PvTable, SearchContext, negamax, quiescence, side_sign};
use ordering::MoveOrderer;
use tt::TranspositionTable;

/// Result of the deepest completed iteration.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move found at the highest completed depth.
    pub best_move: Move,
    /// Score in centipawns from the side to move's point of view.
    pub score: i32,
    /// Depth of the iteration that produced `best_move`.
    pub depth: u8,
    /// Nodes visited over the whole call, aborted iteration included.
    pub nodes: u64,
    /// Principal variation, starting with `best_move`.
    pub pv: Vec<Move>,
    pub elapsed: Duration,
}

impl SearchResult {
    /// Nodes per second over the whole call.
    pub fn nps(&self) -> u64 {
        let micros = self.elapsed.as_micros().max(1) as u64;
        self.nodes.saturating_mul(1_000_000) / micros
    }
}

/// A configured player: evaluator, search tables and settings.
///
/// Tables persist across [`choose_move`](Self::choose_move) calls within a
/// game; call [`new_game`](Self::new_game) between games. One engine per
/// thread: nothing here is shared.
pub struct Engine {
    config: EngineConfig,
    side: Color,
    evaluator: Box<dyn Evaluator>,
    tt: TranspositionTable,
    killers: KillerTable,
    history: HistoryTable,
    orderer: MoveOrderer,
    rng: StdRng,
    stop: Arc<AtomicBool>,
}

impl Engine {
    /// Heuristic engine searching to `max_depth` with default settings.
    pub fn new(max_depth: u8, side: Color) -> Self {
        Self::with_config(EngineConfig::with_depth(max_depth), side)
    }

    /// Heuristic engine with default evaluation parameters.
    pub fn with_config(config: EngineConfig, side: Color) -> Self {
        Self::with_params(config, side, EvalParams::default())
    }

    /// Heuristic engine with custom evaluation parameters. Capture and
    /// promotion ordering uses the same piece values.
    pub fn with_params(config: EngineConfig, side: Color, params: EvalParams) -> Self {
        let values = params.mg_values;
        Self::build(config, side, Box::new(HeuristicEvaluator::new(params)), values)
    }

    /// Engine with an arbitrary evaluation backend.
    pub fn with_evaluator(config: EngineConfig, side: Color, evaluator: Box<dyn Evaluator>) -> Self {
        let values = EvalParams::default().mg_values;
        Self::build(config, side, evaluator, values)
    }

    fn build(config: EngineConfig, side: Color, evaluator: Box<dyn Evaluator>, values: [i32; 6]) -> Self {
        let orderer = if config.randomize_ties {
            MoveOrderer::with_tie_break(values, config.seed)
        } else {
            MoveOrderer::new(values)
        };
        debug!(
            evaluator = evaluator.name(),
            depth = config.max_depth,
            tt_mb = config.tt_size_mb,
            "engine created"
        );
        Self {
            tt: TranspositionTable::new(config.tt_size_mb),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            orderer,
            rng: StdRng::seed_from_u64(config.seed),
            stop: Arc::new(AtomicBool::new(false)),
            evaluator,
            side,
            config,
        }
    }

    pub fn evaluator_name(&self) -> &str {
        self.evaluator.name()
    }

    /// Flag that aborts a running search when set from another thread.
    ///
    /// A stop raised before a search starts aborts that search. The flag is
    /// cleared when the search returns.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Transposition table occupancy, per thousand.
    pub fn hashfull(&self) -> usize {
        self.tt.hashfull()
    }

    /// Forget everything learned in the previous game.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
    }

    /// Pick a move for the side to move.
    ///
    /// Only fails when `pos` has no legal moves. Any other search failure
    /// degrades to the last completed depth, and failing that to a seeded
    /// random capture, then checking move, then any legal move. `pos` is
    /// left exactly as it was passed in.
    pub fn choose_move(&mut self, pos: &mut Position) -> Result<Move, SearchError> {
        if pos.legal_move_count() == 0 {
            return Err(SearchError::NoLegalMoves);
        }
        match self.search(pos) {
            Ok(result) => {
                info!(
                    best = %result.best_move,
                    score = result.score,
                    depth = result.depth,
                    nodes = result.nodes,
                    nps = result.nps(),
                    elapsed_ms = result.elapsed.as_millis() as u64,
                    "move chosen"
                );
                Ok(result.best_move)
            }
            Err(err) => {
                let mv = self.fallback_move(pos).ok_or(SearchError::NoLegalMoves)?;
                warn!(error = %err, fallback = %mv, "no depth completed, playing fallback move");
                Ok(mv)
            }
        }
    }

    /// Iterative-deepening search without a per-iteration callback.
    pub fn search(&mut self, pos: &mut Position) -> Result<SearchResult, SearchError> {
        self.search_with(pos, |_, _, _, _| {})
    }

    /// Run iterative deepening from depth 1 to the configured maximum.
    ///
    /// Calls `on_iter(depth, score, nodes, pv)` after each completed
    /// iteration. An iteration cut short by the clock is discarded. Returns
    /// an error only when no iteration completed.
    pub fn search_with<F>(&mut self, pos: &mut Position, mut on_iter: F) -> Result<SearchResult, SearchError>
    where
        F: FnMut(u8, i32, u64, &[Move]),
    {
        if pos.legal_move_count() == 0 {
            return Err(SearchError::NoLegalMoves);
        }
        if pos.side_to_move() != self.side {
            warn!(engine = ?self.side, to_move = ?pos.side_to_move(), "searching for the side to move");
        }

        let control = SearchControl::with_stop_flag(self.config.time_budget, Arc::clone(&self.stop));
        let sign = side_sign(pos.side_to_move());
        let mut ctx = SearchContext {
            nodes: 0,
            tt: &mut self.tt,
            killers: &mut self.killers,
            history: &mut self.history,
            orderer: &mut self.orderer,
            evaluator: &mut *self.evaluator,
            control: &control,
            config: &self.config,
            pv: PvTable::new(),
            root_best: None,
        };

        let mut completed: Option<SearchResult> = None;
        let mut failure = None;

        for depth in 1..=self.config.max_depth.max(1) {
            if depth > 1 && control.expired() {
                break;
            }
            ctx.root_best = None;

            match negamax(pos, depth, 0, -INF, INF, sign, &mut ctx) {
                Ok(score) => {
                    let Some(best_move) = ctx.root_best else {
                        failure = Some(SearchError::Internal {
                            reason: format!("no root move recorded at depth {depth}"),
                        });
                        break;
                    };
                    let mut pv = ctx.pv.root_pv().to_vec();
                    if pv.first() != Some(&best_move) {
                        pv = vec![best_move];
                    }
                    debug!(depth, score, nodes = ctx.nodes, best = %best_move, "iteration complete");
                    on_iter(depth, score, ctx.nodes, &pv);
                    completed = Some(SearchResult {
                        best_move,
                        score,
                        depth,
                        nodes: ctx.nodes,
                        pv,
                        elapsed: control.elapsed(),
                    });
                    if self.config.stop_on_mate && score.abs() > MATE_THRESHOLD {
                        break;
                    }
                }
                Err(SearchError::Timeout) => {
                    debug!(depth, nodes = ctx.nodes, "iteration aborted");
                    break;
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        let nodes = ctx.nodes;
        self.stop.store(false, Ordering::Relaxed);
        match (completed, failure) {
            (Some(mut result), failure) => {
                if let Some(err) = failure {
                    warn!(error = %err, depth = result.depth, "search failed, keeping last completed depth");
                }
                result.nodes = nodes;
                result.elapsed = control.elapsed();
                Ok(result)
            }
            (None, Some(err)) => Err(err),
            (None, None) => Err(SearchError::Timeout),
        }
    }

    /// Static evaluation from the side to move's point of view.
    pub fn evaluate(&mut self, pos: &Position) -> Result<i32, EvalError> {
        Ok(self.evaluator.evaluate(pos)? * side_sign(pos.side_to_move()))
    }

    /// Capture-only search of `pos` with a full window, from the side to
    /// move's point of view. Never below [`evaluate`](Self::evaluate).
    pub fn quiesce(&mut self, pos: &mut Position) -> Result<i32, SearchError> {
        let control = SearchControl::new(None);
        let sign = side_sign(pos.side_to_move());
        let mut ctx = SearchContext {
            nodes: 0,
            tt: &mut self.tt,
            killers: &mut self.killers,
            history: &mut self.history,
            orderer: &mut self.orderer,
            evaluator: &mut *self.evaluator,
            control: &control,
            config: &self.config,
            pv: PvTable::new(),
            root_best: None,
        };
        quiescence(pos, 0, 0, -INF, INF, sign, &mut ctx)
    }

    /// Move played when no search result is available: a random capture,
    /// else a random checking move, else any legal move. Draws from the
    /// engine's seeded generator.
    pub fn fallback_move(&mut self, pos: &Position) -> Option<Move> {
        let legal = pos.legal_moves();
        let captures: Vec<Move> = legal.iter().copied().filter(|&mv| pos.is_capture(mv)).collect();
        if let Some(&mv) = captures.choose(&mut self.rng) {
            return Some(mv);
        }
        let checks: Vec<Move> = legal.iter().copied().filter(|&mv| pos.gives_check(mv)).collect();
        if let Some(&mv) = checks.choose(&mut self.rng) {
            return Some(mv);
        }
        legal.choose(&mut self.rng).copied()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("side", &self.side)
            .field("evaluator", &self.evaluator.name())
            .field("config", &self.config)
            .field("tt", &self.tt)
            .finish()
    }
}
