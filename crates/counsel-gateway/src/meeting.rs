//! HTTP client for the video-meeting provider.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use counsel_core::error::{CounselError, CounselResult};
use counsel_core::gateway::MeetingProvider;
use counsel_core::models::session::MeetingDetails;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MeetingConfig;
use crate::error::GatewayError;

#[derive(Debug, Serialize)]
struct MeetingRequest<'a> {
    host_email: &'a str,
    topic: &'a str,
    /// RFC 3339 UTC instant.
    start_time: String,
    /// Minutes.
    duration: u32,
}

#[derive(Debug, Deserialize)]
struct MeetingResponse {
    join_url: String,
    id: MeetingId,
    #[serde(default)]
    password: String,
}

/// The provider returns numeric meeting ids; older API versions used
/// strings. Accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeetingId {
    Number(u64),
    Text(String),
}

impl MeetingId {
    fn into_string(self) -> String {
        match self {
            MeetingId::Number(n) => n.to_string(),
            MeetingId::Text(s) => s,
        }
    }
}

/// HTTP implementation of [`MeetingProvider`].
#[derive(Clone)]
pub struct HttpMeetingProvider {
    http: Client,
    config: MeetingConfig,
}

impl HttpMeetingProvider {
    /// Build the client with the configured request timeout.
    pub fn new(config: MeetingConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }
}

impl MeetingProvider for HttpMeetingProvider {
    async fn create_meeting(
        &self,
        host_email: &str,
        topic: &str,
        start_time: DateTime<Utc>,
        duration_minutes: u32,
    ) -> CounselResult<MeetingDetails> {
        let request = MeetingRequest {
            host_email,
            topic,
            start_time: start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            duration: duration_minutes,
        };

        let response = self
            .http
            .post(format!("{}/meetings", self.config.api_base))
            .bearer_auth(&self.config.api_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| CounselError::MeetingProvider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CounselError::MeetingProvider(
                GatewayError::Api {
                    status: status.as_u16(),
                    body,
                }
                .to_string(),
            ));
        }

        let meeting: MeetingResponse = response
            .json()
            .await
            .map_err(|e| CounselError::MeetingProvider(e.to_string()))?;

        debug!(topic, start_time = %request.start_time, "meeting created");

        Ok(MeetingDetails {
            join_url: meeting.join_url,
            external_id: meeting.id.into_string(),
            password: meeting.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_response_accepts_numeric_id() {
        let response: MeetingResponse = serde_json::from_str(
            r#"{"join_url": "https://meet.example.com/j/99",
                "id": 883451290, "password": "s3cret"}"#,
        )
        .unwrap();
        assert_eq!(response.id.into_string(), "883451290");
        assert_eq!(response.password, "s3cret");
    }

    #[test]
    fn meeting_response_accepts_string_id_and_missing_password() {
        let response: MeetingResponse = serde_json::from_str(
            r#"{"join_url": "https://meet.example.com/j/42", "id": "42-abc"}"#,
        )
        .unwrap();
        assert_eq!(response.id.into_string(), "42-abc");
        assert!(response.password.is_empty());
    }

    #[test]
    fn meeting_request_serializes_utc_start() {
        let start = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc();
        let request = MeetingRequest {
            host_email: "host@example.com",
            topic: "Session with Leila Haddad",
            start_time: start.to_rfc3339_opts(SecondsFormat::Secs, true),
            duration: 15,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["start_time"], "2025-06-01T10:00:00Z");
        assert_eq!(json["duration"], 15);
    }
}
