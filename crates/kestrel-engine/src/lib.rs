//! Search and evaluation for kestrel.

pub mod config;
pub mod error;
pub mod eval;
pub mod search;

pub use config::EngineConfig;
pub use error::{EvalError, SearchError};
pub use eval::{EvalParams, Evaluator, FallbackEvaluator, HeuristicEvaluator, Network, NetworkEvaluator};
pub use search::control::SearchControl;
pub use search::negamax::{INF, MATE_SCORE, MATE_THRESHOLD};
pub use search::{Engine, SearchResult};
