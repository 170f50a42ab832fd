use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::wire::{
    AssessmentDto, AttemptRecordDto, Envelope, ErrorBody, MaterialDto, ProfileDto, QuizDto,
    StartAttemptDto, SubmitRequest, SubmitResponseDto,
};
use super::PortalApi;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    AssessmentSummary, AttemptId, AttemptRecord, CourseId, Material, MaterialBinary, MaterialId,
    Profile, Quiz, QuizId, SubmitReceipt, SubmittedAnswer,
};
use crate::session::Session;

/// Blocking JSON client for the portal's `api/lms/` routes.
pub struct HttpPortalApi {
    client: Client,
    api_base: Url,
    token: Option<String>,
}

impl HttpPortalApi {
    pub fn new(config: &Config, session: &Session) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("lmsquiz/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let api_base = config.base_url.join("api/lms/")?;

        Ok(Self {
            client,
            api_base,
            token: session.token().map(str::to_string),
        })
    }

    /// Builds a route below `api/lms/`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(Error::InvalidResponse(format!("unusable path segment {:?}", bad)));
        }
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be a base URL", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let request = builder.build()?;
        tracing::debug!(method = %request.method(), url = %request.url(), "sending portal request");

        let response = self.client.execute(request)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        tracing::debug!(%status, what, "portal request failed");
        Err(status_error(status, &body, what))
    }

    fn json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let text = response.text()?;
        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        Ok(envelope.into_inner())
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str], what: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, segments)?, what)?;
        self.json(response)
    }
}

fn status_error(status: StatusCode, body: &str, what: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized,
        StatusCode::NOT_FOUND => Error::NotFound(what.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| format!("the portal rejected the {}", what));
            Error::Rejected(message)
        }
        other => Error::Status(other.as_u16()),
    }
}

fn file_name_from_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    })
}

impl PortalApi for HttpPortalApi {
    fn profile(&self) -> Result<Profile> {
        let dto: ProfileDto = self.get(&["me"], "profile")?;
        Ok(dto.into())
    }

    fn assessments(&self) -> Result<Vec<AssessmentSummary>> {
        let dtos: Vec<AssessmentDto> = self.get(&["assessments"], "assessment list")?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    fn quiz(&self, id: QuizId) -> Result<Quiz> {
        let dto: QuizDto = self.get(&["assessments", &id.to_string()], "assessment")?;
        Quiz::try_from(dto)
    }

    fn start_attempt(&self, quiz: QuizId) -> Result<AttemptId> {
        let builder = self.request(Method::POST, &["assessments", &quiz.to_string(), "attempts"])?;
        let response = self.send(builder, "assessment")?;
        let dto: StartAttemptDto = self.json(response)?;
        let attempt = AttemptId::from(dto.attempt_id);
        tracing::info!(quiz, %attempt, "attempt started");
        Ok(attempt)
    }

    fn submit_attempt(
        &self,
        attempt: &AttemptId,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmitReceipt> {
        let builder = self
            .request(Method::POST, &["attempts", &attempt.0, "submit"])?
            .json(&SubmitRequest { answers });
        let response = match self.send(builder, "attempt") {
            Err(Error::Status(409)) => return Err(Error::AttemptClosed),
            other => other?,
        };
        // Some deployments answer 204 with no body.
        let text = response.text()?;
        let dto = if text.trim().is_empty() {
            SubmitResponseDto::default()
        } else {
            serde_json::from_str::<Envelope<SubmitResponseDto>>(&text)?.into_inner()
        };
        tracing::info!(%attempt, answered = answers.len(), "attempt submitted");
        Ok(dto.into())
    }

    fn attempts(&self) -> Result<Vec<AttemptRecord>> {
        let dtos: Vec<AttemptRecordDto> = self.get(&["attempts"], "results")?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    fn materials(&self, course: CourseId) -> Result<Vec<Material>> {
        let dtos: Vec<MaterialDto> =
            self.get(&["courses", &course.to_string(), "materials"], "course")?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    fn material_binary(&self, id: MaterialId) -> Result<MaterialBinary> {
        let builder = self.request(Method::GET, &["materials", &id.to_string(), "file"])?;
        let response = self.send(builder, "material")?;
        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let file_name = header(CONTENT_DISPOSITION)
            .as_deref()
            .and_then(file_name_from_disposition);
        let bytes = response.bytes()?.to_vec();
        tracing::debug!(material = id, size = bytes.len(), "material downloaded");

        Ok(MaterialBinary {
            bytes,
            content_type,
            file_name,
        })
    }
}
