//! Per-visit session state and the evaluation that decides whether an
//! analysis may start.

mod store;

pub use store::{InFlightGuard, SessionId, SessionStore, SessionSummary, Submission};

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use vista_types::models::Credential;

use crate::analysis::AnalysisInput;
use crate::builder::PromptContext;

/// Image formats the upload field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Classify by file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unsupported file type '{filename}' (expected jpg, jpeg or png)")]
    UnsupportedImageType { filename: String },

    #[error("uploaded file '{filename}' is empty")]
    EmptyUpload { filename: String },
}

/// An uploaded image, held by exactly one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    filename: String,
    kind: ImageKind,
    bytes: Bytes,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Result<Self, SessionError> {
        let filename = filename.into();
        let bytes = bytes.into();
        let kind = ImageKind::from_filename(&filename)
            .ok_or_else(|| SessionError::UnsupportedImageType { filename: filename.clone() })?;
        if bytes.is_empty() {
            return Err(SessionError::EmptyUpload { filename });
        }
        Ok(Self { filename, kind, bytes })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

/// User-visible warnings. None of them stop the page; each blocks the
/// analysis that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Warning {
    MissingImage,
    MissingCredential,
    UnsupportedImageType { filename: String },
    AnalysisInProgress,
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Self::MissingImage => "⚠️ Por favor sube una imagen antes de analizar.".to_string(),
            Self::MissingCredential => "⚠️ Ingresa tu API Key para continuar.".to_string(),
            Self::UnsupportedImageType { filename } => {
                format!("⚠️ Tipo de archivo no soportado: {}. Usa jpg, jpeg o png.", filename)
            },
            Self::AnalysisInProgress => {
                "⚠️ Ya hay un análisis en curso, espera a que termine.".to_string()
            },
        }
    }
}

impl From<SessionError> for Warning {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnsupportedImageType { filename }
            | SessionError::EmptyUpload { filename } => Self::UnsupportedImageType { filename },
        }
    }
}

/// Field changes carried by one form submission.
///
/// `None` leaves a field untouched, so a resubmission without a new file
/// keeps the previous upload.
#[derive(Debug, Clone, Default)]
pub struct FormUpdate {
    pub credential: Option<String>,
    pub image: Option<UploadedImage>,
    pub clear_image: bool,
    pub show_details: Option<bool>,
    pub details: Option<String>,
}

/// Everything one visitor has entered so far.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub credential: Credential,
    pub image: Option<UploadedImage>,
    pub details: String,
    pub show_details: bool,
    /// True only while a button press is being evaluated.
    pub analysis_requested: bool,
}

/// Outcome of evaluating the session after an interaction.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub warnings: Vec<Warning>,
    pub ready: Option<AnalysisInput>,
}

impl SessionState {
    pub fn apply(&mut self, update: FormUpdate) {
        if let Some(credential) = update.credential {
            self.credential = Credential::new(credential);
        }
        if update.clear_image {
            self.image = None;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(show) = update.show_details {
            self.show_details = show;
        }
        if let Some(details) = update.details {
            self.details = details;
        }
    }

    pub fn prompt_context(&self) -> PromptContext {
        PromptContext::new(self.show_details, self.details.clone())
    }

    /// Decide warnings and readiness.
    ///
    /// The image warning only appears for a button press; the credential
    /// warning appears on every evaluation. Both may show at once.
    pub fn evaluate(&self) -> Evaluation {
        let mut warnings = Vec::new();
        if self.analysis_requested && self.image.is_none() {
            warnings.push(Warning::MissingImage);
        }
        if !self.credential.is_present() {
            warnings.push(Warning::MissingCredential);
        }

        let ready = match &self.image {
            Some(image) if self.analysis_requested && self.credential.is_present() => {
                Some(AnalysisInput {
                    image: image.clone(),
                    credential: self.credential.clone(),
                    prompt: self.prompt_context(),
                })
            },
            _ => None,
        };

        Evaluation { warnings, ready }
    }
}
