//! Search and evaluation errors.

/// Errors raised by an [`Evaluator`](crate::Evaluator) backend.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The network file could not be read.
    #[error("failed to read network file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Network bytes do not match the expected layout.
    #[error("malformed network data: {reason}")]
    Format {
        /// What was wrong with the data.
        reason: String,
    },

    /// The backend produced NaN or an infinite value.
    #[error("evaluator produced a non-finite value")]
    NonFinite,
}

/// Errors that end a search call early.
///
/// Only [`SearchError::NoLegalMoves`] escapes [`Engine::choose_move`](crate::Engine::choose_move);
/// everything else degrades to the best move of the last completed depth or
/// to a fallback move.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The time budget ran out or the stop flag was raised.
    #[error("search stopped: time budget exhausted")]
    Timeout,

    /// The root position has no legal moves (checkmate or stalemate).
    #[error("no legal moves in the root position")]
    NoLegalMoves,

    /// Unexpected failure inside the recursion.
    #[error("internal search error: {reason}")]
    Internal {
        /// Description of what went wrong.
        reason: String,
    },

    /// The evaluator failed on a leaf position.
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvalError),
}

#[cfg(test)]
mod tests {
    use super::{EvalError, SearchError};

    #[test]
    fn eval_error_converts_into_search_error() {
        let err: SearchError = EvalError::NonFinite.into();
        assert!(matches!(err, SearchError::Evaluation(EvalError::NonFinite)));
        assert_eq!(
            err.to_string(),
            "evaluation failed: evaluator produced a non-finite value"
        );
    }
}
