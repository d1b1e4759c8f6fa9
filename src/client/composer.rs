//! Pending input for the next send. Holds at most one of text, PDF or audio.

use bytes::Bytes;

use crate::error::RelayError;
use crate::models::{FileKind, FileUpload};

#[derive(Debug, Clone, PartialEq)]
pub enum ComposerInput {
    Text(String),
    File(FileUpload),
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    input: Option<ComposerInput>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any attachment with `text`. Empty text clears the composer.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.input = if text.is_empty() {
            None
        } else {
            Some(ComposerInput::Text(text))
        };
    }

    /// Attach a PDF, clearing text and audio. Anything but `application/pdf` is refused.
    pub fn attach_pdf(
        &mut self,
        filename: impl Into<String>,
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> Result<(), RelayError> {
        if content_type != FileKind::Pdf.default_mime() {
            return Err(RelayError::validation("please select a PDF file"));
        }
        let upload = FileUpload::new(FileKind::Pdf, data)
            .with_filename(filename)
            .with_content_type(content_type);
        self.input = Some(ComposerInput::File(upload));
        Ok(())
    }

    /// Attach a recorded audio clip, clearing text and PDF
    pub fn attach_audio(&mut self, data: impl Into<Bytes>) {
        let upload = FileUpload::new(FileKind::Audio, data)
            .with_content_type(FileKind::Audio.default_mime());
        self.input = Some(ComposerInput::File(upload));
    }

    pub fn input(&self) -> Option<&ComposerInput> {
        self.input.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_none()
    }

    pub fn take(&mut self) -> Option<ComposerInput> {
        self.input.take()
    }

    pub fn clear(&mut self) {
        self.input = None;
    }
}
