//! OCR boundary.
//!
//! Recognition itself is delegated to a [`TextRecognizer`]. The editor that should
//! receive recognized text is handed in as a [`TextInserter`] by whoever owns it,
//! per capture, so a late result can never land in an editor that is gone.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Language used when none is configured
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Image payload is empty")]
    EmptyImage,
    #[error("Text recognition failed: {0}")]
    Recognition(String),
}

/// Image bytes as received from paste, drop or camera capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Accept a clipboard item only when it carries an image
    pub fn from_clipboard(mime_type: &str, bytes: Vec<u8>) -> Option<Self> {
        if !mime_type.contains("image") {
            return None;
        }
        Some(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

/// OCR engine
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &ImagePayload, language: &str) -> Result<String, OcrError>;
}

/// Something that can place recognized text into an editor, at the cursor or at the end
pub trait TextInserter: Send {
    fn insert_text(&mut self, text: &str);
}

impl<F> TextInserter for F
where
    F: FnMut(&str) + Send,
{
    fn insert_text(&mut self, text: &str) {
        self(text)
    }
}

/// Outcome of one capture
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recognition {
    pub text: String,
    /// Whether the text was handed to an inserter
    pub inserted: bool,
}

/// Runs recognition for captured images. Failures are returned, never retried.
#[derive(Clone)]
pub struct OcrCapture {
    recognizer: Arc<dyn TextRecognizer>,
    language: String,
}

impl OcrCapture {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, language: impl Into<String>) -> Self {
        Self {
            recognizer,
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Recognize text in `image` and, when a target is given, insert it there
    pub async fn capture(
        &self,
        image: &ImagePayload,
        target: Option<&mut dyn TextInserter>,
    ) -> Result<Recognition, OcrError> {
        if image.bytes.is_empty() {
            return Err(OcrError::EmptyImage);
        }

        let text = self
            .recognizer
            .recognize(image, &self.language)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "text recognition failed"))?;

        tracing::info!(
            language = %self.language,
            chars = text.chars().count(),
            "recognized text from image"
        );

        let inserted = match target {
            Some(target) => deliver(&text, target),
            None => false,
        };

        Ok(Recognition { text, inserted })
    }
}

/// Hand recognized text to an editor. Blank text is not inserted.
pub fn deliver(text: &str, target: &mut dyn TextInserter) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    target.insert_text(text);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRecognizer(Result<&'static str, &'static str>);

    #[async_trait]
    impl TextRecognizer for FixedRecognizer {
        async fn recognize(&self, _image: &ImagePayload, language: &str) -> Result<String, OcrError> {
            assert_eq!(language, DEFAULT_OCR_LANGUAGE);
            self.0
                .map(str::to_string)
                .map_err(|e| OcrError::Recognition(e.to_string()))
        }
    }

    fn png() -> ImagePayload {
        ImagePayload::from_clipboard("image/png", vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn test_clipboard_filter() {
        assert!(ImagePayload::from_clipboard("image/jpeg", vec![1]).is_some());
        assert!(ImagePayload::from_clipboard("text/plain", vec![1]).is_none());
    }

    #[tokio::test]
    async fn test_capture_inserts_into_target() {
        let capture = OcrCapture::new(Arc::new(FixedRecognizer(Ok("hello"))), DEFAULT_OCR_LANGUAGE);
        let mut received = Vec::new();
        let mut sink = |text: &str| received.push(text.to_string());

        let result = capture.capture(&png(), Some(&mut sink)).await.unwrap();

        assert!(result.inserted);
        assert_eq!(result.text, "hello");
        assert_eq!(received, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_capture_without_target_only_returns_text() {
        let capture = OcrCapture::new(Arc::new(FixedRecognizer(Ok("hello"))), DEFAULT_OCR_LANGUAGE);

        let result = capture.capture(&png(), None).await.unwrap();

        assert!(!result.inserted);
        assert_eq!(result.text, "hello");
    }

    #[tokio::test]
    async fn test_blank_text_is_not_inserted() {
        let capture = OcrCapture::new(Arc::new(FixedRecognizer(Ok(" \n"))), DEFAULT_OCR_LANGUAGE);
        let mut calls = 0;
        let mut sink = |_: &str| calls += 1;

        let result = capture.capture(&png(), Some(&mut sink)).await.unwrap();

        assert!(!result.inserted);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_failures_are_reported() {
        let capture = OcrCapture::new(Arc::new(FixedRecognizer(Err("model missing"))), DEFAULT_OCR_LANGUAGE);
        assert!(matches!(
            capture.capture(&png(), None).await,
            Err(OcrError::Recognition(_))
        ));

        let empty = ImagePayload::from_clipboard("image/png", Vec::new()).unwrap();
        assert!(matches!(capture.capture(&empty, None).await, Err(OcrError::EmptyImage)));
    }
}
