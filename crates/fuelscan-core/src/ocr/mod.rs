//! Text observation sources.
//!
//! A source turns a receipt image into unordered [`TextFragment`]s. It owns
//! no semantics: the heuristic parser decides what the fragments mean.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrSource;

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::RecognitionError;

/// One unit of recognized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text.
    pub content: String,

    /// Reading-order ordinal (0 = top of the document). Used only for
    /// ordering, never as a signal of meaning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl TextFragment {
    /// Fragment with a known reading-order position.
    pub fn new(content: impl Into<String>, position: usize) -> Self {
        Self {
            content: content.into(),
            position: Some(position),
        }
    }

    /// Fragment without position information.
    pub fn unpositioned(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            position: None,
        }
    }

    /// Fragments from lines of text, positioned by line index.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<Self> {
        lines
            .into_iter()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
            .map(|(i, l)| Self::new(l, i))
            .collect()
    }
}

/// Visit fragments top-down: positioned fragments by ascending position,
/// then unpositioned ones in input order.
pub fn in_reading_order(fragments: &[TextFragment]) -> Vec<&TextFragment> {
    let mut ordered: Vec<&TextFragment> = fragments.iter().collect();
    // Stable sort keeps input order among equal keys.
    ordered.sort_by_key(|f| f.position.unwrap_or(usize::MAX));
    ordered
}

/// Join fragment contents in reading order, one per line.
pub fn joined_text(fragments: &[TextFragment]) -> String {
    in_reading_order(fragments)
        .iter()
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A text-recognition capability.
///
/// Finding no text is `Ok(vec![])`, not an error.
#[async_trait]
pub trait TextObservationSource: Send + Sync {
    /// Recognize text fragments in an image.
    async fn observe(&self, image: &DynamicImage) -> Result<Vec<TextFragment>, RecognitionError>;

    /// Engine name for logs.
    fn name(&self) -> &str;
}

/// Source that returns a fixed set of fragments regardless of the image.
///
/// Used for text already recognized elsewhere and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTextSource {
    fragments: Vec<TextFragment>,
}

impl StaticTextSource {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self { fragments }
    }

    /// One positioned fragment per non-empty line.
    pub fn from_text(text: &str) -> Self {
        Self::new(TextFragment::from_lines(text.lines()))
    }

    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }
}

#[async_trait]
impl TextObservationSource for StaticTextSource {
    async fn observe(&self, _image: &DynamicImage) -> Result<Vec<TextFragment>, RecognitionError> {
        Ok(self.fragments.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
