// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Prediction results.
//!
//! [`Probs`] wraps one classifier probability vector; [`Prediction`] binds it
//! to the file it was computed for and the label it resolved to.

use std::fmt;

use ndarray::Array1;

/// Class probabilities for one image or one aggregated video.
#[derive(Debug, Clone, PartialEq)]
pub struct Probs {
    /// Probability data with shape (`num_classes`,).
    pub data: Array1<f32>,
}

impl Probs {
    /// Create a new Probs instance.
    #[must_use]
    pub const fn new(data: Array1<f32>) -> Self {
        Self { data }
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index of the highest probability.
    ///
    /// Ties resolve to the lowest index; NaN entries never win.
    /// Returns 0 for an empty vector.
    #[must_use]
    pub fn top1(&self) -> usize {
        self.data
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |(best, best_val), (i, &v)| {
                if v > best_val { (i, v) } else { (best, best_val) }
            })
            .0
    }
}

/// Predicted label for one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Image file name or video file name.
    pub file_name: String,
    /// Resolved class name.
    pub label: String,
    /// Probabilities the label was taken from. For videos this is the
    /// element-wise sum over frames.
    pub probs: Probs,
}

impl Prediction {
    /// Index of the predicted class.
    #[must_use]
    pub fn class_index(&self) -> usize {
        self.probs.top1()
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is {}", self.file_name, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_probs() {
        let probs = Probs::new(array![0.1_f32, 0.3, 0.6]);

        assert_eq!(probs.len(), 3);
        assert_eq!(probs.top1(), 2);
    }

    #[test]
    fn test_top1_ties_and_nan() {
        assert_eq!(Probs::new(array![0.5_f32, 0.5]).top1(), 0);
        assert_eq!(Probs::new(array![f32::NAN, 0.2]).top1(), 1);
        assert_eq!(Probs::new(Array1::zeros(0)).top1(), 0);
        assert!(Probs::new(Array1::zeros(0)).is_empty());
    }

    #[test]
    fn test_prediction_line() {
        let prediction = Prediction {
            file_name: "run_01.jpg".to_string(),
            label: "run".to_string(),
            probs: Probs::new(array![0.9_f32, 0.1]),
        };
        assert_eq!(prediction.to_string(), "run_01.jpg is run");
        assert_eq!(prediction.class_index(), 0);
    }
}
