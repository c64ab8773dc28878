// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Native feed-forward pose classifier.
//!
//! The network normalizes the 51-value landmark row into a 34-value embedding
//! and runs it through `Dense(128, relu6) -> Dense(64, relu6) -> Dense(N, softmax)`.
//! Dropout only matters during training and has no inference-time layer.

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::ActionClassifier;
use crate::error::{PoseError, Result};
use crate::keypoint::{NUM_KEYPOINTS, NUM_LANDMARK_VALUES};
use crate::normalize::landmarks_to_embedding;

/// Width of the normalized embedding fed to the first layer.
pub const EMBEDDING_SIZE: usize = NUM_KEYPOINTS * 2;

/// Hidden layer widths.
pub const HIDDEN_UNITS: [usize; 2] = [128, 64];

/// Layer activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// `min(max(x, 0), 6)`
    Relu6,
    /// Normalized exponential over the layer output.
    Softmax,
}

/// Fully connected layer computing `activation(x · weights + bias)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    /// Kernel with shape (inputs, outputs).
    pub weights: Array2<f32>,
    /// Bias with shape (outputs,).
    pub bias: Array1<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    /// Create a layer.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoadError` if the bias length differs from the kernel's output width.
    pub fn new(weights: Array2<f32>, bias: Array1<f32>, activation: Activation) -> Result<Self> {
        if weights.ncols() != bias.len() {
            return Err(PoseError::ModelLoadError(format!(
                "Layer kernel has {} outputs but bias has {}",
                weights.ncols(),
                bias.len()
            )));
        }
        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    /// Glorot-uniform kernel with zero bias.
    #[allow(clippy::cast_precision_loss)]
    fn glorot(inputs: usize, outputs: usize, activation: Activation, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (inputs + outputs) as f32).sqrt();
        let weights = Array2::from_shape_fn((inputs, outputs), |_| rng.gen_range(-limit..=limit));
        Self {
            weights,
            bias: Array1::zeros(outputs),
            activation,
        }
    }

    #[must_use]
    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    #[must_use]
    pub fn outputs(&self) -> usize {
        self.weights.ncols()
    }

    fn forward(&self, x: &Array1<f32>) -> Array1<f32> {
        let y = x.dot(&self.weights) + &self.bias;
        match self.activation {
            Activation::Relu6 => y.mapv(relu6),
            Activation::Softmax => super::softmax(&y.view()),
        }
    }
}

/// `min(max(x, 0), 6)`.
#[must_use]
pub fn relu6(x: f32) -> f32 {
    x.clamp(0.0, 6.0)
}

/// On-disk layer layout. The kernel is stored row-major.
#[derive(Serialize, Deserialize)]
struct LayerArtifact {
    inputs: usize,
    outputs: usize,
    activation: Activation,
    weights: Vec<f32>,
    bias: Vec<f32>,
}

/// On-disk network layout.
#[derive(Serialize, Deserialize)]
struct MlpArtifact {
    layers: Vec<LayerArtifact>,
}

/// Feed-forward action classifier.
///
/// # Example
///
/// ```no_run
/// use pose_action::classifier::{ActionClassifier, MlpClassifier};
///
/// let mut clf = MlpClassifier::build(3, 42)?;
/// clf.save("pose_classifier.json")?;
///
/// let probs = clf.predict(&[0.0; 51])?;
/// assert_eq!(probs.len(), 3);
/// # Ok::<(), pose_action::PoseError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MlpClassifier {
    layers: Vec<DenseLayer>,
}

impl MlpClassifier {
    /// Build a fresh network for `num_classes` classes with Glorot-uniform
    /// weights drawn from a generator seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `num_classes` is zero.
    pub fn build(num_classes: usize, seed: u64) -> Result<Self> {
        if num_classes == 0 {
            return Err(PoseError::ConfigError(
                "classifier needs at least one class".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut layers = Vec::with_capacity(HIDDEN_UNITS.len() + 1);
        let mut inputs = EMBEDDING_SIZE;
        for units in HIDDEN_UNITS {
            layers.push(DenseLayer::glorot(inputs, units, Activation::Relu6, &mut rng));
            inputs = units;
        }
        layers.push(DenseLayer::glorot(inputs, num_classes, Activation::Softmax, &mut rng));

        Ok(Self { layers })
    }

    /// Assemble a network from explicit layers.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoadError` if the first layer doesn't take the 34-value
    /// embedding, consecutive layers don't chain, or the last layer isn't softmax.
    pub fn from_layers(layers: Vec<DenseLayer>) -> Result<Self> {
        let Some(last) = layers.last() else {
            return Err(PoseError::ModelLoadError("network has no layers".to_string()));
        };
        if last.activation != Activation::Softmax {
            return Err(PoseError::ModelLoadError(
                "last layer must use softmax".to_string(),
            ));
        }

        let mut inputs = EMBEDDING_SIZE;
        for (i, layer) in layers.iter().enumerate() {
            if layer.inputs() != inputs {
                return Err(PoseError::ModelLoadError(format!(
                    "layer {i} takes {} inputs, expected {inputs}",
                    layer.inputs()
                )));
            }
            inputs = layer.outputs();
        }

        Ok(Self { layers })
    }

    /// Load a network saved with [`MlpClassifier::save`].
    ///
    /// # Errors
    ///
    /// Returns `ModelLoadError` if the file is missing, malformed, or describes
    /// an inconsistent network.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PoseError::ModelLoadError(format!(
                "Classifier file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(|e| {
            PoseError::ModelLoadError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parse a network from its JSON artifact.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoadError` if the JSON is malformed or inconsistent.
    pub fn from_json(content: &str) -> Result<Self> {
        let artifact: MlpArtifact = serde_json::from_str(content)?;
        let layers = artifact
            .layers
            .into_iter()
            .map(|l| {
                let weights = Array2::from_shape_vec((l.inputs, l.outputs), l.weights)
                    .map_err(|e| PoseError::ModelLoadError(format!("Invalid layer kernel: {e}")))?;
                DenseLayer::new(weights, Array1::from_vec(l.bias), l.activation)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_layers(layers)
    }

    /// Serialize the network to its JSON artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let artifact = MlpArtifact {
            layers: self
                .layers
                .iter()
                .map(|l| LayerArtifact {
                    inputs: l.inputs(),
                    outputs: l.outputs(),
                    activation: l.activation,
                    weights: l.weights.iter().copied().collect(),
                    bias: l.bias.to_vec(),
                })
                .collect(),
        };
        Ok(serde_json::to_string(&artifact)?)
    }

    /// Write the network to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| {
            PoseError::IoError(format!("Failed to write {}: {e}", path.display()))
        })
    }

    /// Layers in evaluation order.
    #[must_use]
    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }
}

impl ActionClassifier for MlpClassifier {
    fn num_classes(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::outputs)
    }

    fn infer(&mut self, landmarks: &[f32; NUM_LANDMARK_VALUES]) -> Result<Array1<f32>> {
        let row = ArrayView2::from_shape((1, NUM_LANDMARK_VALUES), landmarks.as_slice())
            .map_err(|e| PoseError::InferenceError(format!("Invalid landmark row: {e}")))?;
        let embedding = landmarks_to_embedding(&row)?;

        let mut x = embedding.row(0).to_owned();
        for layer in &self.layers {
            x = layer.forward(&x);
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_row() -> [f32; NUM_LANDMARK_VALUES] {
        #[allow(clippy::cast_precision_loss)]
        std::array::from_fn(|i| match i % 3 {
            0 => 100.0 + i as f32,
            1 => 200.0 - i as f32 * 2.0,
            _ => 0.9,
        })
    }

    #[test]
    fn test_build_shapes() {
        let clf = MlpClassifier::build(5, 1).unwrap();
        let dims: Vec<(usize, usize)> = clf.layers().iter().map(|l| (l.inputs(), l.outputs())).collect();
        assert_eq!(dims, vec![(34, 128), (128, 64), (64, 5)]);
        assert_eq!(clf.num_classes(), 5);
        assert!(clf.layers().iter().all(|l| l.bias.iter().all(|&b| b == 0.0)));

        let limit = (6.0_f32 / (34.0 + 128.0)).sqrt();
        assert!(clf.layers()[0].weights.iter().all(|w| w.abs() <= limit));
    }

    #[test]
    fn test_build_rejects_zero_classes() {
        assert!(matches!(
            MlpClassifier::build(0, 1).unwrap_err(),
            PoseError::ConfigError(_)
        ));
    }

    #[test]
    fn test_seed_is_deterministic() {
        assert_eq!(MlpClassifier::build(3, 9).unwrap(), MlpClassifier::build(3, 9).unwrap());
        assert_ne!(MlpClassifier::build(3, 9).unwrap(), MlpClassifier::build(3, 10).unwrap());
    }

    #[test]
    fn test_predict_is_distribution() {
        let mut clf = MlpClassifier::build(4, 3).unwrap();
        let probs = clf.predict(&sample_row()).unwrap();
        assert_eq!(probs.len(), 4);
        assert!((probs.sum() - 1.0).abs() < 1e-5);
        assert!(probs.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_json_preserves_predictions() {
        let mut clf = MlpClassifier::build(3, 11).unwrap();
        let mut loaded = MlpClassifier::from_json(&clf.to_json().unwrap()).unwrap();

        let a = clf.predict(&sample_row()).unwrap();
        let b = loaded.predict(&sample_row()).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_from_layers_validation() {
        let softmax_layer = DenseLayer::new(Array2::zeros((34, 2)), Array1::zeros(2), Activation::Softmax).unwrap();
        assert!(MlpClassifier::from_layers(vec![softmax_layer.clone()]).is_ok());
        assert!(MlpClassifier::from_layers(Vec::new()).is_err());

        let relu_last = DenseLayer::new(Array2::zeros((34, 2)), Array1::zeros(2), Activation::Relu6).unwrap();
        assert!(MlpClassifier::from_layers(vec![relu_last]).is_err());

        let wrong_input = DenseLayer::new(Array2::zeros((51, 2)), Array1::zeros(2), Activation::Softmax).unwrap();
        assert!(MlpClassifier::from_layers(vec![wrong_input]).is_err());

        assert!(DenseLayer::new(Array2::zeros((34, 2)), Array1::zeros(3), Activation::Softmax).is_err());
    }

    #[test]
    fn test_from_json_rejects_bad_kernel() {
        let json = r#"{"layers":[{"inputs":34,"outputs":2,"activation":"softmax","weights":[1.0],"bias":[0.0,0.0]}]}"#;
        assert!(matches!(
            MlpClassifier::from_json(json).unwrap_err(),
            PoseError::ModelLoadError(_)
        ));
        assert!(MlpClassifier::from_json("not json").is_err());
    }

    #[test]
    fn test_zero_network_is_uniform() {
        let layer = DenseLayer::new(Array2::zeros((34, 4)), Array1::zeros(4), Activation::Softmax).unwrap();
        let mut clf = MlpClassifier::from_layers(vec![layer]).unwrap();
        let probs = clf.predict(&sample_row()).unwrap();
        assert_eq!(probs, array![0.25_f32, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_relu6() {
        assert!(relu6(-1.0).abs() < f32::EPSILON);
        assert!((relu6(3.0) - 3.0).abs() < f32::EPSILON);
        assert!((relu6(9.0) - 6.0).abs() < f32::EPSILON);
    }
}
