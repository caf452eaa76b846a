//! Digit classifier boundary
//!
//! The neural network itself lives outside this crate. A [`ModelLoader`]
//! produces a [`Classifier`] per language; [`DigitRecognizer`] normalizes a
//! drawing, runs the cached model and interprets its probabilities.

use std::fmt;
use std::str::FromStr;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::ComputeError;
use crate::preprocess::ImageNormalizer;
use crate::types::{NormalizedTensor, Profile};

/// Confidence below which a recognition is flagged
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Number of classes a digit model scores
pub const DIGIT_CLASSES: usize = 10;

/// Digit set the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    /// Short language code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "ar" | "arabic" => Ok(Language::Arabic),
            other => Err(ComputeError::ParseError(format!("unknown language: {other}"))),
        }
    }
}

/// A trained digit model
pub trait Classifier {
    /// Class probabilities for one normalized drawing
    fn predict(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>, ComputeError>;
}

/// Source of per-language models
pub trait ModelLoader {
    type Model: Classifier;

    /// Load the model for a language
    fn load(&self, language: Language) -> Result<Self::Model, ComputeError>;
}

/// Most likely class and its probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: usize,
    pub confidence: f32,
}

impl Prediction {
    /// Pick the most probable class. Ties go to the lowest label.
    ///
    /// The model must score exactly [`DIGIT_CLASSES`] classes, each a finite
    /// value in [0, 1].
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self, ComputeError> {
        if probabilities.len() != DIGIT_CLASSES {
            return Err(ComputeError::Classifier(format!(
                "expected {} probabilities, got {}",
                DIGIT_CLASSES,
                probabilities.len()
            )));
        }
        if let Some((label, p)) = probabilities
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || !(0.0..=1.0).contains(*p))
        {
            return Err(ComputeError::Classifier(format!(
                "probability for class {label} is {p}"
            )));
        }

        let mut best: Option<Prediction> = None;
        for (label, &p) in probabilities.iter().enumerate() {
            if best.map_or(true, |b| p > b.confidence) {
                best = Some(Prediction {
                    label,
                    confidence: p,
                });
            }
        }
        best.ok_or_else(|| ComputeError::Classifier("model returned no probabilities".to_string()))
    }
}

/// Outcome of recognizing one drawing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recognition {
    pub label: usize,
    pub confidence: f32,
    /// Preprocessing profile actually applied
    pub profile: Profile,
    /// Confidence was low while an aggressive profile may have been used
    pub low_confidence: bool,
    /// What the classifier saw, when the normalizer renders previews
    #[serde(skip)]
    pub preview: Option<GrayImage>,
}

/// Normalizes drawings and classifies them with a per-language model.
///
/// Only one model is held at a time; switching language drops the cached
/// model and loads the new one.
pub struct DigitRecognizer<L: ModelLoader> {
    loader: L,
    normalizer: ImageNormalizer,
    cache: Option<(Language, L::Model)>,
}

impl<L: ModelLoader> DigitRecognizer<L> {
    /// Create a recognizer that keeps a preview of every normalized drawing
    pub fn new(loader: L) -> Self {
        Self::with_normalizer(loader, ImageNormalizer::new().with_preview(true))
    }

    /// Create a recognizer with a custom normalizer
    pub fn with_normalizer(loader: L, normalizer: ImageNormalizer) -> Self {
        Self {
            loader,
            normalizer,
            cache: None,
        }
    }

    /// Language of the cached model, if any
    pub fn loaded_language(&self) -> Option<Language> {
        self.cache.as_ref().map(|(language, _)| *language)
    }

    /// Model for `language`, loading it if needed
    pub fn model(&mut self, language: Language) -> Result<&L::Model, ComputeError> {
        if self.loaded_language() != Some(language) {
            self.cache = None;
            let model = self.loader.load(language)?;
            log::info!("{} model loaded", language.code().to_uppercase());
            self.cache = Some((language, model));
        }
        match &self.cache {
            Some((_, model)) => Ok(model),
            None => Err(ComputeError::ModelLoad(format!("no model cached for {language}"))),
        }
    }

    /// Normalize and classify an encoded drawing.
    ///
    /// # Arguments
    /// * `bytes` - Encoded drawing
    /// * `language` - Digit set to classify against
    /// * `profile` - Preprocessing profile, `None` to auto-detect
    pub fn recognize(
        &mut self,
        bytes: &[u8],
        language: Language,
        profile: Option<Profile>,
    ) -> Result<Recognition, ComputeError> {
        let normalized = self.normalizer.normalize_bytes(bytes, profile)?;
        let probabilities = self.model(language)?.predict(&normalized.tensor)?;
        let prediction = Prediction::from_probabilities(&probabilities)?;

        let low_confidence = prediction.confidence < LOW_CONFIDENCE_THRESHOLD
            && profile != Some(Profile::Standard);
        if low_confidence {
            log::warn!(
                "low confidence {:.2} for digit {}; consider less aggressive preprocessing",
                prediction.confidence,
                prediction.label
            );
        }

        Ok(Recognition {
            label: prediction.label,
            confidence: prediction.confidence,
            profile: normalized.profile,
            low_confidence,
            preview: normalized.preview,
        })
    }
}
