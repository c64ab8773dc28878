// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Turning classifier outputs into labels and scoring them.
//!
//! Images take the argmax of their own probability row. Videos sum the rows
//! of all valid frames and take the argmax of the sum, so the label follows
//! the cumulative evidence rather than a per-frame majority.

use ndarray::{Array1, ArrayView2, Axis};

use crate::catalog::ClassCatalog;
use crate::error::{PoseError, Result};
use crate::results::Probs;

/// Resolve a class index to its catalog name.
///
/// # Errors
///
/// Returns `CatalogError` if the index is outside the catalog.
pub fn label_for(catalog: &ClassCatalog, index: usize) -> Result<String> {
    catalog.get(index).map(str::to_string).ok_or_else(|| {
        PoseError::CatalogError(format!(
            "class index {index} outside catalog of {} classes",
            catalog.len()
        ))
    })
}

/// One label per probability row.
///
/// # Errors
///
/// Returns `CatalogError` if a row's argmax is outside the catalog.
pub fn image_labels(probs: &ArrayView2<'_, f32>, catalog: &ClassCatalog) -> Result<Vec<String>> {
    probs
        .rows()
        .into_iter()
        .map(|row| label_for(catalog, Probs::new(row.to_owned()).top1()))
        .collect()
}

/// Element-wise sum of all frame rows.
#[must_use]
pub fn soft_vote(frame_probs: &ArrayView2<'_, f32>) -> Array1<f32> {
    frame_probs.sum_axis(Axis(0))
}

/// Label of a video from its frame probability rows.
///
/// # Errors
///
/// Returns `NoValidData` if there are no frames, or `CatalogError` if the
/// winning index is outside the catalog.
pub fn video_label(frame_probs: &ArrayView2<'_, f32>, catalog: &ClassCatalog) -> Result<(String, Probs)> {
    if frame_probs.nrows() == 0 {
        return Err(PoseError::NoValidData("no frame probabilities to aggregate".to_string()));
    }
    let summed = Probs::new(soft_vote(frame_probs));
    let label = label_for(catalog, summed.top1())?;
    Ok((label, summed))
}

/// Ground-truth label encoded in a file name: the text before the first `_`.
///
/// A name without `_` is its own ground truth.
#[must_use]
pub fn ground_truth_from_file_name(file_name: &str) -> &str {
    file_name.split('_').next().unwrap_or(file_name)
}

/// Percentage of exact matches between predicted and ground-truth labels.
///
/// Pairs are compared up to the shorter list. Returns 0.0 for empty input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accuracy<P: AsRef<str>, G: AsRef<str>>(predicted: &[P], ground_truth: &[G]) -> f64 {
    let total = predicted.len().min(ground_truth.len());
    if total == 0 {
        return 0.0;
    }
    let matches = predicted
        .iter()
        .zip(ground_truth)
        .filter(|&(p, g)| p.as_ref() == g.as_ref())
        .count();
    matches as f64 / total as f64 * 100.0
}

/// Warning for every ground-truth prefix that is not a catalog class.
#[must_use]
pub fn unknown_ground_truth_warnings<S: AsRef<str>>(file_names: &[S], catalog: &ClassCatalog) -> Vec<String> {
    file_names
        .iter()
        .filter_map(|name| {
            let name = name.as_ref();
            let truth = ground_truth_from_file_name(name);
            (!catalog.contains(truth)).then(|| {
                format!("Ground truth \"{truth}\" derived from {name} is not a known class.")
            })
        })
        .collect()
}
