//! Static evaluation.
//!
//! Every [`Evaluator`] scores from White's point of view: positive is good
//! for White regardless of who is to move. The search applies the
//! side-to-move sign.

pub mod heuristic;
pub mod network;
pub mod params;
pub mod phase;
pub mod pst;

use kestrel_core::Position;
use tracing::warn;

use crate::error::EvalError;

pub use heuristic::HeuristicEvaluator;
pub use network::{Network, NetworkEvaluator};
pub use params::EvalParams;

/// A static evaluation backend, chosen at engine construction.
pub trait Evaluator: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Centipawn score of `pos`, positive favouring White.
    fn evaluate(&mut self, pos: &Position) -> Result<i32, EvalError>;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&mut self, pos: &Position) -> Result<i32, EvalError> {
        (**self).evaluate(pos)
    }
}

/// Wraps a fallible evaluator and answers with the heuristic evaluator
/// whenever it fails. Warns on the first failure only.
pub struct FallbackEvaluator<E> {
    primary: E,
    backup: HeuristicEvaluator,
    warned: bool,
}

impl<E: Evaluator> FallbackEvaluator<E> {
    pub fn new(primary: E, backup: HeuristicEvaluator) -> Self {
        Self {
            primary,
            backup,
            warned: false,
        }
    }
}

impl<E: Evaluator> Evaluator for FallbackEvaluator<E> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn evaluate(&mut self, pos: &Position) -> Result<i32, EvalError> {
        match self.primary.evaluate(pos) {
            Ok(score) => Ok(score),
            Err(err) => {
                if !self.warned {
                    warn!(evaluator = self.primary.name(), error = %err, "falling back to heuristic evaluation");
                    self.warned = true;
                }
                self.backup.evaluate(pos)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::Position;

    use super::{Evaluator, FallbackEvaluator, HeuristicEvaluator};
    use crate::error::EvalError;

    struct Broken;

    impl Evaluator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn evaluate(&mut self, _pos: &Position) -> Result<i32, EvalError> {
            Err(EvalError::NonFinite)
        }
    }

    #[test]
    fn fallback_answers_with_heuristic() {
        let pos = Position::starting_position();
        let expected = HeuristicEvaluator::default().score(&pos);
        let mut eval = FallbackEvaluator::new(Broken, HeuristicEvaluator::default());
        assert_eq!(eval.evaluate(&pos).unwrap(), expected);
        assert_eq!(eval.evaluate(&pos).unwrap(), expected);
        assert_eq!(eval.name(), "broken");
    }

    #[test]
    fn boxed_evaluator_delegates() {
        let mut eval: Box<dyn Evaluator> = Box::new(HeuristicEvaluator::default());
        assert_eq!(eval.name(), "heuristic");
        assert!(eval.evaluate(&Position::starting_position()).is_ok());
    }
}
