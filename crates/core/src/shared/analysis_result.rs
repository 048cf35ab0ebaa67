use std::fmt;
use std::path::PathBuf;

/// Outcome of one pipeline call: where the annotated image went, and what
/// was found.
///
/// `processed_image_path` is `None` only when the source image could not be
/// loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult<L> {
    pub processed_image_path: Option<PathBuf>,
    pub label: L,
}

impl<L> AnalysisResult<L> {
    pub fn new(processed_image_path: Option<PathBuf>, label: L) -> Self {
        Self {
            processed_image_path,
            label,
        }
    }
}

impl<L: fmt::Display> fmt::Display for AnalysisResult<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.processed_image_path {
            Some(path) => write!(f, "{}\t{}", path.display(), self.label),
            None => write!(f, "-\t{}", self.label),
        }
    }
}
