//! On-device text observation using `pure-onnx-ocr`.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::RecognitionError;
use crate::models::config::OcrConfig;

use super::{TextFragment, TextObservationSource};

/// A recognized line with its top-left corner, before ordering.
struct Observed {
    text: String,
    top: f32,
    left: f32,
}

/// Text observation source backed by `pure-onnx-ocr` (pure Rust, no external runtime).
pub struct PureOcrSource {
    engine: Arc<Mutex<pure_onnx_ocr::engine::OcrEngine>>,
    config: OcrConfig,
}

impl PureOcrSource {
    /// Load the engine from the model files named in `config`.
    ///
    /// Missing model files mean the capability is unavailable, not that a
    /// scan failed.
    pub fn from_config(config: OcrConfig) -> Result<Self, RecognitionError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(RecognitionError::Unavailable(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| RecognitionError::Unavailable(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            config,
        })
    }

    fn recognize(
        engine: &Mutex<pure_onnx_ocr::engine::OcrEngine>,
        config: &OcrConfig,
        image: &DynamicImage,
    ) -> Result<Vec<TextFragment>, RecognitionError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        debug!("Recognizing text in {}x{} image", width, height);

        let engine = engine
            .lock()
            .map_err(|_| RecognitionError::Unavailable("OCR engine poisoned".to_string()))?;

        let results = engine
            .run_from_image(image)
            .map_err(|e| RecognitionError::Failed(format!("pure-onnx-ocr: {}", e)))?;

        let observed: Vec<Observed> = results
            .iter()
            .filter_map(|r| {
                let text = if config.keep_unknown_glyphs {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                let text = text.trim().to_string();
                if text.is_empty() {
                    return None;
                }
                let (left, top) = top_left(&r.bounding_box);
                Some(Observed { text, top, left })
            })
            .collect();

        let fragments = order_fragments(observed, config.row_tolerance);

        info!(
            "OCR complete: {} fragments in {}ms",
            fragments.len(),
            start.elapsed().as_millis()
        );

        Ok(fragments)
    }
}

#[async_trait]
impl TextObservationSource for PureOcrSource {
    async fn observe(&self, image: &DynamicImage) -> Result<Vec<TextFragment>, RecognitionError> {
        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();
        let image = image.clone();

        // Recognition is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || Self::recognize(&engine, &config, &image))
            .await
            .map_err(|e| RecognitionError::Failed(format!("recognition task aborted: {}", e)))?
    }

    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }
}

/// Group detector boxes into lines and assign positions.
///
/// A box joins the current line when its top edge is within `row_tolerance`
/// of the line's first box. Lines run top-to-bottom; boxes within a line are
/// joined left-to-right with a single space.
fn order_fragments(mut observed: Vec<Observed>, row_tolerance: f32) -> Vec<TextFragment> {
    let tolerance = row_tolerance.max(1.0);
    observed.sort_by(|a, b| a.top.total_cmp(&b.top));

    let mut rows: Vec<(f32, Vec<Observed>)> = Vec::new();
    for o in observed {
        match rows.last_mut() {
            Some((anchor, row)) if o.top - *anchor <= tolerance => row.push(o),
            _ => rows.push((o.top, vec![o])),
        }
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, (_, mut row))| {
            row.sort_by(|a, b| a.left.total_cmp(&b.left));
            let line = row
                .into_iter()
                .map(|o| o.text)
                .collect::<Vec<_>>()
                .join(" ");
            TextFragment::new(line, i)
        })
        .collect()
}

/// Smallest x and y over the polygon's exterior points.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}
