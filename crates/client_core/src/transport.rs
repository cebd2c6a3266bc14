//! HTTP seam: sends one envelope as a multipart POST and hands back the raw reply.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use url::Url;

use crate::{
    envelope::{PartValue, SubmissionEnvelope},
    error::TransportError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn submit(
        &self,
        endpoint: &str,
        envelope: SubmissionEnvelope,
    ) -> Result<RawReply, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        Self::with_client(server_url, Client::new())
    }

    /// `connect_timeout` bounds connection setup only; the orchestrator owns
    /// the overall request deadline.
    pub fn with_connect_timeout(
        server_url: &str,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Self::with_client(server_url, http)
    }

    fn with_client(server_url: &str, http: Client) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(server_url).map_err(|e| TransportError::InvalidEndpoint {
            url: server_url.to_string(),
            reason: e.to_string(),
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidEndpoint {
                url: format!("{}{endpoint}", self.base_url),
                reason: e.to_string(),
            })
    }
}

fn multipart_form(envelope: SubmissionEnvelope) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in envelope.into_parts() {
        form = match part.value {
            PartValue::Text(value) => form.text(part.name, value),
            PartValue::File(file) => {
                let mut body = Part::bytes(file.bytes).file_name(file.name);
                if let Some(mime_type) = &file.mime_type {
                    body = body.mime_str(mime_type)?;
                }
                form.part(part.name, body)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn submit(
        &self,
        endpoint: &str,
        envelope: SubmissionEnvelope,
    ) -> Result<RawReply, TransportError> {
        let url = self.endpoint_url(endpoint)?;
        let form = multipart_form(envelope)?;
        let response = self.http.post(url).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawReply { status, body })
    }
}
