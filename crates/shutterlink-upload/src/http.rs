//! `reqwest` transport for the hosting endpoint.

use std::fs::File;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};

use crate::{FILE_FIELD, TransportResponse, UPLOAD_PRESET_FIELD, UploadEnvelope, UploadError, UploadTransport};

/// Blocking HTTP transport.
///
/// Requests are never retried. The file part is streamed from disk.
#[derive(Debug, Clone)]
pub struct HttpUploadTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpUploadTransport {
    /// Creates a transport with no overall request timeout.
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] when the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, UploadError> {
        Self::with_timeout(None)
    }

    /// Creates a transport bounding each request by `timeout`; `None` waits
    /// until the endpoint answers.
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] when the TLS backend cannot be
    /// initialized.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, UploadError> {
        let client = Client::builder()
            .user_agent(concat!("shutterlink/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|error| UploadError::Transport(format!("http client init failed: {error}")))?;
        Ok(Self { client, timeout })
    }

    /// Overall request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl UploadTransport for HttpUploadTransport {
    fn send(&self, envelope: &UploadEnvelope) -> Result<TransportResponse, UploadError> {
        let file = &envelope.form.file;
        let read_error = |error: std::io::Error| {
            UploadError::Transport(format!("cannot read '{}': {error}", file.path.display()))
        };
        let source = File::open(&file.path).map_err(read_error)?;
        let length = source.metadata().map_err(read_error)?.len();

        let part = Part::reader_with_length(source, length)
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)
            .map_err(|error| UploadError::Transport(format!("invalid mime type: {error}")))?;
        let form = Form::new()
            .part(FILE_FIELD, part)
            .text(UPLOAD_PRESET_FIELD, envelope.form.upload_preset.clone());

        let response = self
            .client
            .post(envelope.endpoint.clone())
            .multipart(form)
            .send()
            .map_err(|error| UploadError::Transport(error.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|error| UploadError::Transport(format!("response body read failed: {error}")))?;

        Ok(TransportResponse { status, body })
    }
}
