//! Negamax alpha-beta search with null-move pruning and quiescence.

use kestrel_core::{Color, Move, Position};

use crate::config::EngineConfig;
use crate::error::SearchError;
use crate::eval::Evaluator;
use crate::search::control::SearchControl;
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::ordering::MoveOrderer;
use crate::search::tt::{Bound, TranspositionTable};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 30_000;

/// Base score for checkmate (adjusted by ply for mate distance).
pub const MATE_SCORE: i32 = 29_000;

/// Scores beyond this magnitude indicate a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Recursion ceiling in plies.
pub const MAX_PLY: usize = 128;

/// Minimum remaining depth for null-move pruning.
const NULL_MOVE_MIN_DEPTH: u8 = 3;

/// Depth removed by a null-move search.
const NULL_MOVE_REDUCTION: u8 = 3;

/// +1 when White is to move, -1 when Black is.
#[inline]
pub fn side_sign(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Per-call search state borrowed from the engine.
pub(crate) struct SearchContext<'a> {
    pub nodes: u64,
    pub tt: &'a mut TranspositionTable,
    pub killers: &'a mut KillerTable,
    pub history: &'a mut HistoryTable,
    pub orderer: &'a mut MoveOrderer,
    pub evaluator: &'a mut dyn Evaluator,
    pub control: &'a SearchControl,
    pub config: &'a EngineConfig,
    pub pv: PvTable,
    /// Best root move of the iteration in progress.
    pub root_best: Option<Move>,
}

impl SearchContext<'_> {
    /// Static score from the side to move's point of view.
    fn static_eval(&mut self, pos: &Position, sign: i32) -> Result<i32, SearchError> {
        Ok(self.evaluator.evaluate(pos)? * sign)
    }
}

/// Negamax alpha-beta search.
///
/// Returns the score of `pos` for the side to move, where `sign` is
/// [`side_sign`] of that side. The position is restored before returning,
/// including when an error propagates.
pub(crate) fn negamax(
    pos: &mut Position,
    depth: u8,
    ply: usize,
    mut alpha: i32,
    mut beta: i32,
    sign: i32,
    ctx: &mut SearchContext<'_>,
) -> Result<i32, SearchError> {
    ctx.pv.clear_ply(ply);
    ctx.nodes += 1;
    ctx.control.check(ctx.nodes)?;

    let is_root = ply == 0;

    // The caller has already ruled out a terminal root.
    if !is_root && let Some(outcome) = pos.outcome() {
        return Ok(if outcome.is_draw() { 0 } else { -(MATE_SCORE - ply as i32) });
    }

    if ply >= MAX_PLY {
        return ctx.static_eval(pos, sign);
    }

    let hash = pos.hash();
    let mut tt_move = None;
    if ctx.config.use_tt
        && let Some(entry) = ctx.tt.probe(hash, ply)
    {
        tt_move = entry.best_move;
        if !is_root && entry.depth >= depth {
            match entry.bound {
                Bound::Exact => return Ok(entry.score),
                Bound::Lower => alpha = alpha.max(entry.score),
                Bound::Upper => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                return Ok(entry.score);
            }
        }
    }

    // Bounds are judged against the window the children actually see.
    let original_alpha = alpha;

    if depth == 0 {
        return if ctx.config.quiescence {
            quiescence(pos, ply, 0, alpha, beta, sign, ctx)
        } else {
            ctx.static_eval(pos, sign)
        };
    }

    if ctx.config.null_move
        && !is_root
        && depth >= NULL_MOVE_MIN_DEPTH
        && let Some(mut child) = pos.play_null()
    {
        let score = -negamax(
            &mut child,
            depth - NULL_MOVE_REDUCTION,
            ply + 1,
            -beta,
            -beta + 1,
            -sign,
            ctx,
        )?;
        if score >= beta {
            return Ok(beta);
        }
    }

    let moves = pos.legal_moves();
    if moves.is_empty() {
        return Ok(if pos.is_check() { -(MATE_SCORE - ply as i32) } else { 0 });
    }
    let moves = ctx.orderer.order(pos, moves, tt_move, ctx.killers.at(depth), ctx.history);

    let mut best_score = -INF;
    let mut best_move = None;

    for mv in moves {
        if is_root {
            ctx.control.check_now()?;
        }
        let quiet = !pos.is_capture(mv);
        let score = {
            let mut child = pos.play(mv);
            -negamax(&mut child, depth - 1, ply + 1, -beta, -alpha, -sign, ctx)?
        };

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
            if score > alpha {
                alpha = score;
                ctx.pv.update(ply, mv);
            }
        }

        if alpha >= beta {
            if quiet {
                ctx.killers.store(depth, mv);
                ctx.history.record(mv, depth);
            }
            break;
        }
    }

    if is_root {
        ctx.root_best = best_move;
    }

    if ctx.config.use_tt {
        let bound = if best_score <= original_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        ctx.tt.store(hash, depth, bound, best_score, best_move, ply);
    }

    Ok(best_score)
}

/// Capture-only search past the horizon. Fail-hard: results are clamped
/// to `[alpha, beta]`.
///
/// The side to move may always stand pat, so the result is never below the
/// static evaluation when searched with a full window. Checkmates are not
/// detected here.
pub(crate) fn quiescence(
    pos: &mut Position,
    ply: usize,
    qply: u8,
    mut alpha: i32,
    beta: i32,
    sign: i32,
    ctx: &mut SearchContext<'_>,
) -> Result<i32, SearchError> {
    ctx.nodes += 1;
    ctx.control.check(ctx.nodes)?;

    let stand_pat = ctx.static_eval(pos, sign)?;
    if stand_pat >= beta {
        return Ok(beta);
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }
    if qply >= ctx.config.qsearch_max_ply || ply >= MAX_PLY {
        return Ok(alpha);
    }

    let tactical: Vec<Move> = pos
        .legal_moves()
        .into_iter()
        .filter(|&mv| pos.is_capture(mv) || mv.get_promotion().is_some())
        .collect();
    let tactical = ctx.orderer.order(pos, tactical, None, &[], ctx.history);

    for mv in tactical {
        let score = {
            let mut child = pos.play(mv);
            -quiescence(&mut child, ply + 1, qply + 1, -beta, -alpha, -sign, ctx)?
        };
        if score >= beta {
            return Ok(beta);
        }
        if score > alpha {
            alpha = score;
        }
    }

    Ok(alpha)
}

/// Triangular principal-variation table.
///
/// Row `ply` holds the best line found from that ply onward.
pub struct PvTable {
    lines: Vec<Vec<Move>>,
}

impl PvTable {
    pub fn new() -> Self {
        Self {
            lines: (0..=MAX_PLY).map(|_| Vec::with_capacity(16)).collect(),
        }
    }

    /// Clear the line at `ply` (called at the top of each node).
    pub fn clear_ply(&mut self, ply: usize) {
        if let Some(line) = self.lines.get_mut(ply) {
            line.clear();
        }
    }

    /// Set the line at `ply` to `mv` followed by the line at `ply + 1`.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let (top, bottom) = self.lines.split_at_mut(ply + 1);
        let line = &mut top[ply];
        line.clear();
        line.push(mv);
        line.extend_from_slice(&bottom[0]);
    }

    /// The principal variation from the root.
    pub fn root_pv(&self) -> &[Move] {
        &self.lines[0]
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}
