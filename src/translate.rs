//! Name translation through the Cloud Translation v3 API.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::TranslateError;

/// Language the orchestrator translates names into unless told otherwise.
pub const DEFAULT_TARGET_LANGUAGE: &str = "fr";

/// Location used when scoping translation requests.
pub const DEFAULT_LOCATION: &str = "global";

/// Public Cloud Translation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com";

/// Body of a `translateText` call. The parent is part of the URL, not the body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateTextRequest {
    #[serde(skip)]
    pub parent: String,
    pub contents: Vec<String>,
    pub target_language_code: String,
    pub mime_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
    #[serde(default)]
    pub detected_language_code: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TranslateTextResponse {
    #[serde(default)]
    pub translations: Vec<Translation>,
}

/// Low level translation RPC surface.
pub trait TranslationService {
    /// Builds the `projects/{project}/locations/{location}` resource path.
    fn location_path(&self, project_id: &str, location: &str) -> String {
        format!("projects/{}/locations/{}", project_id, location)
    }

    fn translate_text(
        &self,
        request: &TranslateTextRequest,
    ) -> Result<TranslateTextResponse, TranslateError>;
}

/// REST client for Cloud Translation authenticated with an OAuth access token.
pub struct CloudTranslationClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    access_token: String,
}

impl CloudTranslationClient {
    /// Creates a client for the public endpoint.
    pub fn new(access_token: impl Into<String>) -> Result<Self, TranslateError> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            access_token: access_token.into(),
        })
    }

    /// Overrides the service endpoint and returns the updated client.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn translate_url(&self, parent: &str) -> String {
        format!(
            "{}/v3/{}:translateText",
            self.endpoint.trim_end_matches('/'),
            parent
        )
    }
}

impl TranslationService for CloudTranslationClient {
    fn translate_text(
        &self,
        request: &TranslateTextRequest,
    ) -> Result<TranslateTextResponse, TranslateError> {
        let url = self.translate_url(&request.parent);
        debug!(
            "POST {} ({} item(s) -> {})",
            url,
            request.contents.len(),
            request.target_language_code
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(TranslateError::Status { status, body });
        }

        Ok(response.json()?)
    }
}

/// Capability to translate a piece of text into a target language.
pub trait Translator {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError>;
}

/// Translates Pokemon names one at a time.
///
/// Earlier versions of this pipeline always asked the service for English output,
/// whatever `target_language` said. The parameter is now what gets sent downstream.
pub struct NameTranslator<C> {
    client: C,
    project_id: String,
    location: String,
}

impl<C: TranslationService> NameTranslator<C> {
    /// Creates a translator scoped to `project_id` in the global location.
    pub fn new(client: C, project_id: impl Into<String>) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            location: DEFAULT_LOCATION.to_owned(),
        }
    }

    /// Overrides the location and returns the updated translator.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Returns the underlying service client.
    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }
}

impl<C: TranslationService> Translator for NameTranslator<C> {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
        let request = TranslateTextRequest {
            parent: self.client.location_path(&self.project_id, &self.location),
            contents: vec![text.to_owned()],
            target_language_code: target_language.to_owned(),
            mime_type: "text/plain".to_owned(),
        };

        let response = self.client.translate_text(&request)?;
        response
            .translations
            .into_iter()
            .next()
            .map(|translation| translation.translated_text)
            .ok_or(TranslateError::EmptyResponse)
    }
}
