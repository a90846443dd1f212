#![warn(missing_docs)]
//! # shutterlink-upload
//!
//! ## Purpose
//! Sends one captured asset to the media-hosting endpoint.
//!
//! ## Responsibilities
//! - Validate the upload endpoint policy (absolute HTTPS URL).
//! - Transform photos, infer filename/MIME, and build the multipart form.
//! - Execute exactly one POST through an injectable [`UploadTransport`].
//! - Parse the hosting response contract (`secure_url`).
//!
//! ## Data flow
//! [`MediaRef`] -> transform (photos only) -> [`FileMetadata`] ->
//! [`UploadForm`] -> [`UploadEnvelope`] -> transport -> [`TransportResponse`]
//! -> [`UploadReceipt`].
//!
//! ## Ownership and lifetimes
//! The form references the file by path; the transport reads the bytes only
//! when it sends, so transport doubles never touch the filesystem.
//!
//! ## Error model
//! Every failure is an [`UploadError`]; [`classify_upload_error`] folds them
//! into the categories used for logs. There is no retry.
//!
//! ## Security and privacy notes
//! The preset is a public unsigned preset; no credentials are sent.

mod http;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use shutterlink_core::{FileMetadata, MediaKind, MediaRef, infer_file_metadata};
use shutterlink_transform::{ImageTransform, TransformError, TransformOptions};
use thiserror::Error;
use url::Url;

pub use http::HttpUploadTransport;

/// Default hosting endpoint.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.cloudinary.com/v1_1/dimxrq8bs/image/upload";

/// Default unsigned upload preset.
pub const DEFAULT_UPLOAD_PRESET: &str = "unsigned";

/// Multipart field carrying the binary file.
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the upload preset.
pub const UPLOAD_PRESET_FIELD: &str = "upload_preset";

/// Binary file part of the multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Local file to stream.
    pub path: PathBuf,
    /// Filename announced in the part headers.
    pub filename: String,
    /// Content type announced in the part headers.
    pub mime_type: String,
}

/// Fully built multipart form: one file part plus the preset field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    /// The `file` part.
    pub file: FilePart,
    /// Value of the `upload_preset` field.
    pub upload_preset: String,
}

impl UploadForm {
    /// Builds the form for a (possibly transformed) asset.
    pub fn build(media: &MediaRef, metadata: FileMetadata, upload_preset: &str) -> Self {
        Self {
            file: FilePart {
                path: media.local_path(),
                filename: metadata.filename,
                mime_type: metadata.mime_type,
            },
            upload_preset: upload_preset.to_string(),
        }
    }

    /// Text fields in send order.
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![(UPLOAD_PRESET_FIELD, self.upload_preset.as_str())]
    }
}

/// One request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEnvelope {
    /// Target URL.
    pub endpoint: Url,
    /// Multipart body description.
    pub form: UploadForm,
}

/// Raw HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

/// HTTP transport capability.
pub trait UploadTransport: Send + Sync {
    /// Performs one multipart POST.
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] when no HTTP response was received.
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError>;
}

/// Lifecycle of one upload attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadStatus {
    /// Created, nothing sent.
    #[default]
    Idle,
    /// Transform or request running.
    InFlight,
    /// Endpoint returned a secure URL.
    Succeeded,
    /// Any step failed.
    Failed,
}

/// Bookkeeping for one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    /// Asset chosen by the user.
    pub source: MediaRef,
    /// Transformed copy (photos only).
    pub derived: Option<MediaRef>,
    /// Inferred file metadata.
    pub metadata: Option<FileMetadata>,
    /// Current status.
    pub status: UploadStatus,
}

impl UploadJob {
    /// Creates an idle job.
    pub fn new(source: MediaRef) -> Self {
        Self {
            source,
            derived: None,
            metadata: None,
            status: UploadStatus::Idle,
        }
    }

    /// Reference actually uploaded.
    pub fn upload_media(&self) -> &MediaRef {
        self.derived.as_ref().unwrap_or(&self.source)
    }
}

/// Successful upload result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// HTTPS location of the hosted asset.
    pub secure_url: String,
    /// Final job record.
    pub job: UploadJob,
}

#[derive(Debug, Deserialize)]
struct HostingResponse {
    secure_url: String,
}

/// Upload pipeline: transform, metadata, form, transport.
#[derive(Clone)]
pub struct UploadPipeline {
    endpoint: Url,
    upload_preset: String,
    options: TransformOptions,
    transform: Arc<dyn ImageTransform>,
    transport: Arc<dyn UploadTransport>,
}

impl UploadPipeline {
    /// Creates a validated pipeline.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] for a non-HTTPS endpoint and
    /// [`UploadError::InvalidPreset`] for a blank preset.
    pub fn new(
        endpoint: &str,
        upload_preset: impl Into<String>,
        options: TransformOptions,
        transform: Arc<dyn ImageTransform>,
        transport: Arc<dyn UploadTransport>,
    ) -> Result<Self, UploadError> {
        let endpoint = validate_upload_endpoint(endpoint)?;
        let upload_preset = upload_preset.into();
        if upload_preset.trim().is_empty() {
            return Err(UploadError::InvalidPreset);
        }

        Ok(Self {
            endpoint,
            upload_preset,
            options,
            transform,
            transport,
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Uploads one asset.
    ///
    /// Steps run strictly in order: transform (photos), metadata inference,
    /// form build, one POST, response parsing.
    ///
    /// # Errors
    /// Returns the first failing step's [`UploadError`].
    pub fn upload(&self, media: &MediaRef) -> Result<UploadReceipt, UploadError> {
        let mut job = UploadJob::new(media.clone());
        job.status = UploadStatus::InFlight;

        let result = self.run(&mut job);
        match result {
            Ok(secure_url) => {
                job.status = UploadStatus::Succeeded;
                tracing::info!(
                    stage = "upload",
                    action = "complete",
                    secure_url = %secure_url,
                    "upload succeeded"
                );
                Ok(UploadReceipt { secure_url, job })
            }
            Err(error) => {
                job.status = UploadStatus::Failed;
                tracing::error!(
                    stage = "upload",
                    action = "complete",
                    class = ?classify_upload_error(&error),
                    %error,
                    "upload failed"
                );
                Err(error)
            }
        }
    }

    fn run(&self, job: &mut UploadJob) -> Result<String, UploadError> {
        if job.source.kind() == MediaKind::Photo {
            job.derived = Some(self.transform.transform(&job.source, &self.options)?);
        }

        let upload_media = job.upload_media().clone();
        let metadata = infer_file_metadata(upload_media.uri(), upload_media.kind());
        job.metadata = Some(metadata.clone());

        let envelope = UploadEnvelope {
            endpoint: self.endpoint.clone(),
            form: UploadForm::build(&upload_media, metadata, &self.upload_preset),
        };
        tracing::info!(
            stage = "upload",
            action = "send",
            filename = %envelope.form.file.filename,
            mime = %envelope.form.file.mime_type,
            "posting multipart form"
        );

        let response = self.transport.send(&envelope)?;
        parse_upload_response(&response)
    }
}

/// Extracts the secure URL from a hosting response.
///
/// # Errors
/// Returns [`UploadError::Rejected`] for non-2xx statuses and
/// [`UploadError::MalformedResponse`] when a 2xx body lacks a non-empty
/// `secure_url` string.
pub fn parse_upload_response(response: &TransportResponse) -> Result<String, UploadError> {
    if !(200..300).contains(&response.status) {
        return Err(UploadError::Rejected {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let parsed: HostingResponse = serde_json::from_str(&response.body)
        .map_err(|error| UploadError::MalformedResponse(error.to_string()))?;
    if parsed.secure_url.trim().is_empty() {
        return Err(UploadError::MalformedResponse(
            "secure_url is empty".to_string(),
        ));
    }

    Ok(parsed.secure_url)
}

/// Validates the upload endpoint.
///
/// # Errors
/// Returns [`UploadError::InvalidEndpoint`] when the URL does not parse or
/// does not use HTTPS.
pub fn validate_upload_endpoint(endpoint: &str) -> Result<Url, UploadError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| UploadError::InvalidEndpoint(format!("invalid upload url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(UploadError::InvalidEndpoint(
            "upload endpoint must use https".to_string(),
        ));
    }

    Ok(parsed)
}

/// Log category of an upload failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Pipeline was misconfigured.
    Configuration,
    /// Photo transform failed.
    Transform,
    /// No HTTP response.
    Transport,
    /// Endpoint refused the upload or answered off-contract.
    Rejected,
}

/// Maps an upload error to its log category.
pub fn classify_upload_error(error: &UploadError) -> FailureClass {
    match error {
        UploadError::InvalidEndpoint(_) | UploadError::InvalidPreset => FailureClass::Configuration,
        UploadError::Transform(_) => FailureClass::Transform,
        UploadError::Transport(_) => FailureClass::Transport,
        UploadError::Rejected { .. } | UploadError::MalformedResponse(_) => FailureClass::Rejected,
    }
}

/// Transport double answering every request with one canned response.
#[derive(Debug)]
pub struct StaticTransport {
    answer: Result<TransportResponse, String>,
    sent: Mutex<Vec<UploadEnvelope>>,
}

impl StaticTransport {
    /// Answers every request with `status` and `body`.
    pub fn responding(status: u16, body: impl Into<String>) -> Self {
        Self {
            answer: Ok(TransportResponse {
                status,
                body: body.into(),
            }),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request before a response arrives.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            answer: Err(reason.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Envelopes received so far.
    pub fn sent(&self) -> Vec<UploadEnvelope> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl UploadTransport for StaticTransport {
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError> {
        self.sent
            .lock()
            .map_err(|_| UploadError::Transport("envelope log lock poisoned".to_string()))?
            .push(envelope.clone());

        self.answer.clone().map_err(UploadError::Transport)
    }
}

/// Upload pipeline error type.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Endpoint violates the URL policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Preset is blank.
    #[error("upload preset must be non-empty")]
    InvalidPreset,
    /// Photo transform failed.
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),
    /// Network or local read failure before a response arrived.
    #[error("upload transport failure: {0}")]
    Transport(String),
    /// Endpoint answered with a non-2xx status.
    #[error("upload rejected with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// 2xx response without a usable `secure_url`.
    #[error("malformed upload response: {0}")]
    MalformedResponse(String),
}
