//! Learned evaluator: a one-hidden-layer network over 768 piece-square
//! features.
//!
//! File layout (little-endian):
//! - magic `b"KNET"`
//! - `u32` hidden size `H`
//! - `f32` input weights, `768 * H`, feature-major (`w[f * H + h]`)
//! - `f32` hidden bias, `H`
//! - `f32` output weights, `H`
//! - `f32` output bias

use std::path::Path;

use kestrel_core::{ALL_PIECES, Color, PieceKind, Position, Square};
use tracing::debug;

use crate::error::EvalError;
use crate::eval::Evaluator;

/// Number of input features: 12 piece planes of 64 squares.
pub const INPUTS: usize = 768;

/// Leading bytes of a network file.
pub const MAGIC: &[u8; 4] = b"KNET";

/// Scale applied to the `tanh` output to get centipawns.
const OUTPUT_SCALE: f32 = 10_000.0;

/// Feature index of a `color` `kind` piece on `sq`.
///
/// Planes 0-5 are White pawn..king, planes 6-11 Black pawn..king; squares
/// are LERF (a1 = 0) from White's side for both colours.
#[inline]
pub fn feature_index(color: Color, kind: PieceKind, sq: Square) -> usize {
    let plane = match color {
        Color::White => kind.to_index(),
        Color::Black => 6 + kind.to_index(),
    };
    plane * 64 + sq.to_index()
}

/// Network weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    hidden: usize,
    input_weights: Vec<f32>,
    hidden_bias: Vec<f32>,
    output_weights: Vec<f32>,
    output_bias: f32,
}

impl Network {
    /// Build a network, checking every layer has the size `hidden` implies.
    pub fn new(
        hidden: usize,
        input_weights: Vec<f32>,
        hidden_bias: Vec<f32>,
        output_weights: Vec<f32>,
        output_bias: f32,
    ) -> Result<Self, EvalError> {
        if hidden == 0 {
            return Err(format_error("hidden layer is empty"));
        }
        if input_weights.len() != INPUTS * hidden {
            return Err(format_error(format!(
                "expected {} input weights, found {}",
                INPUTS * hidden,
                input_weights.len()
            )));
        }
        if hidden_bias.len() != hidden || output_weights.len() != hidden {
            return Err(format_error("hidden bias or output weights do not match hidden size"));
        }
        Ok(Self {
            hidden,
            input_weights,
            hidden_bias,
            output_weights,
            output_bias,
        })
    }

    /// All-zero network of the given width. Evaluates every position to 0.
    pub fn zeroed(hidden: usize) -> Result<Self, EvalError> {
        Self::new(hidden, vec![0.0; INPUTS * hidden], vec![0.0; hidden], vec![0.0; hidden], 0.0)
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden
    }

    /// Read a network file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| EvalError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let net = Self::from_bytes(&bytes)?;
        debug!(path = %path.display(), hidden = net.hidden_size(), "network loaded");
        Ok(net)
    }

    /// Parse the binary layout described in the module docs.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EvalError> {
        let Some(rest) = bytes.strip_prefix(MAGIC.as_slice()) else {
            return Err(format_error("missing KNET magic"));
        };
        let Some((size, rest)) = rest.split_first_chunk::<4>() else {
            return Err(format_error("truncated header"));
        };
        let hidden = u32::from_le_bytes(*size) as usize;
        let expected = INPUTS * hidden + 2 * hidden + 1;
        if rest.len() != expected * 4 {
            return Err(format_error(format!(
                "expected {} payload bytes for hidden size {hidden}, found {}",
                expected * 4,
                rest.len()
            )));
        }

        let mut floats = rest
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]));
        let input_weights: Vec<f32> = floats.by_ref().take(INPUTS * hidden).collect();
        let hidden_bias: Vec<f32> = floats.by_ref().take(hidden).collect();
        let output_weights: Vec<f32> = floats.by_ref().take(hidden).collect();
        let output_bias = floats.next().ok_or_else(|| format_error("missing output bias"))?;

        Self::new(hidden, input_weights, hidden_bias, output_weights, output_bias)
    }

    /// Serialize to the file layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let floats = self.input_weights.len() + 2 * self.hidden + 1;
        let mut out = Vec::with_capacity(8 + floats * 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(self.hidden as u32).to_le_bytes());
        for w in self
            .input_weights
            .iter()
            .chain(&self.hidden_bias)
            .chain(&self.output_weights)
            .chain(std::iter::once(&self.output_bias))
        {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out
    }

    /// Forward pass over active feature indices. Returns the raw `tanh`
    /// output in `[-1, 1]`, or NaN if any weight is non-finite.
    ///
    /// `scratch` must hold at least `hidden_size()` values.
    pub fn forward(&self, features: &[usize], scratch: &mut [f32]) -> f32 {
        let acc = &mut scratch[..self.hidden];
        acc.copy_from_slice(&self.hidden_bias);
        for &f in features {
            let row = &self.input_weights[f * self.hidden..(f + 1) * self.hidden];
            for (a, w) in acc.iter_mut().zip(row) {
                *a += w;
            }
        }
        let sum: f32 = acc
            .iter()
            .zip(&self.output_weights)
            .map(|(&a, &w)| a.max(0.0) * w)
            .sum();
        (sum + self.output_bias).tanh()
    }

    #[cfg(test)]
    pub(crate) fn set_output_bias(&mut self, bias: f32) {
        self.output_bias = bias;
    }
}

/// [`Evaluator`] backed by a [`Network`]. Fails with
/// [`EvalError::NonFinite`] if the network produces NaN or infinity.
#[derive(Debug, Clone)]
pub struct NetworkEvaluator {
    net: Network,
    scratch: Vec<f32>,
    features: Vec<usize>,
}

impl NetworkEvaluator {
    pub fn new(net: Network) -> Self {
        let scratch = vec![0.0; net.hidden_size()];
        Self {
            net,
            scratch,
            features: Vec::with_capacity(32),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EvalError> {
        Network::load(path).map(Self::new)
    }
}

impl Evaluator for NetworkEvaluator {
    fn name(&self) -> &str {
        "network"
    }

    fn evaluate(&mut self, pos: &Position) -> Result<i32, EvalError> {
        self.features.clear();
        for color in [Color::White, Color::Black] {
            for kind in ALL_PIECES {
                for sq in pos.pieces(color, kind) {
                    self.features.push(feature_index(color, kind, sq));
                }
            }
        }
        let out = self.net.forward(&self.features, &mut self.scratch);
        if !out.is_finite() {
            return Err(EvalError::NonFinite);
        }
        Ok((out * OUTPUT_SCALE) as i32)
    }
}

fn format_error(reason: impl Into<String>) -> EvalError {
    EvalError::Format {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::{Color, PieceKind, Position, Square};

    use super::{INPUTS, Network, NetworkEvaluator, feature_index};
    use crate::error::EvalError;
    use crate::eval::Evaluator;

    #[test]
    fn feature_planes() {
        assert_eq!(feature_index(Color::White, PieceKind::Pawn, Square::A1), 0);
        assert_eq!(feature_index(Color::White, PieceKind::King, Square::H8), 5 * 64 + 63);
        assert_eq!(feature_index(Color::Black, PieceKind::Pawn, Square::A1), 6 * 64);
        assert_eq!(feature_index(Color::Black, PieceKind::King, Square::H8), INPUTS - 1);
    }

    #[test]
    fn zeroed_network_scores_zero() {
        let mut eval = NetworkEvaluator::new(Network::zeroed(8).unwrap());
        assert_eq!(eval.evaluate(&Position::starting_position()).unwrap(), 0);
    }

    #[test]
    fn output_bias_saturates_through_tanh() {
        let mut net = Network::zeroed(4).unwrap();
        net.set_output_bias(100.0);
        let mut eval = NetworkEvaluator::new(net);
        assert_eq!(eval.evaluate(&Position::starting_position()).unwrap(), 10_000);
    }

    #[test]
    fn single_feature_drives_output() {
        let hidden = 2;
        let mut input = vec![0.0; INPUTS * hidden];
        // White queen on d1 lights up hidden unit 0.
        let f = feature_index(Color::White, PieceKind::Queen, Square::D1);
        input[f * hidden] = 0.5;
        let net = Network::new(hidden, input, vec![0.0; hidden], vec![1.0, 0.0], 0.0).unwrap();
        let mut eval = NetworkEvaluator::new(net);
        let expected = (0.5f32.tanh() * 10_000.0) as i32;
        assert_eq!(eval.evaluate(&Position::starting_position()).unwrap(), expected);
    }

    #[test]
    fn nan_weights_are_rejected_at_evaluation() {
        let mut net = Network::zeroed(4).unwrap();
        net.set_output_bias(f32::NAN);
        let mut eval = NetworkEvaluator::new(net);
        let err = eval.evaluate(&Position::starting_position()).unwrap_err();
        assert!(matches!(err, EvalError::NonFinite));
    }

    #[test]
    fn bytes_roundtrip() {
        let mut net = Network::zeroed(3).unwrap();
        net.set_output_bias(0.25);
        let parsed = Network::from_bytes(&net.to_bytes()).unwrap();
        assert_eq!(parsed, net);
    }

    #[test]
    fn bad_magic_and_truncation_are_format_errors() {
        assert!(matches!(
            Network::from_bytes(b"NOPE\x01\x00\x00\x00"),
            Err(EvalError::Format { .. })
        ));
        let mut bytes = Network::zeroed(2).unwrap().to_bytes();
        bytes.pop();
        assert!(matches!(Network::from_bytes(&bytes), Err(EvalError::Format { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Network::load("/nonexistent/kestrel.knet").unwrap_err();
        assert!(matches!(err, EvalError::Io { .. }));
    }
}
