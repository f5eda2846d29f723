//! HTTP client for the card-payment processor.
//!
//! Wire shapes follow the processor's charges API: a charge carries the
//! customer snapshot, a hosted-checkout source, success/cancel redirect
//! URLs, and metadata tying it back to the session so reconciliation can
//! find the record again.

use std::time::Duration;

use counsel_core::error::{CounselError, CounselResult};
use counsel_core::gateway::{Charge, ChargeStatus, PaymentGateway};
use counsel_core::models::session::Session;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::PaymentConfig;
use crate::error::GatewayError;

#[derive(Debug, Serialize)]
struct PhonePayload<'a> {
    country_code: &'a str,
    number: &'a str,
}

#[derive(Debug, Serialize)]
struct CustomerPayload<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: PhonePayload<'a>,
}

#[derive(Debug, Serialize)]
struct SourcePayload<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct RedirectPayload<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct MetadataPayload<'a> {
    #[serde(rename = "sessionId")]
    session_id: String,
    #[serde(rename = "sessionType")]
    session_type: &'a str,
}

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    amount: f64,
    currency: &'a str,
    customer: CustomerPayload<'a>,
    source: SourcePayload<'a>,
    redirect: RedirectPayload<'a>,
    post: RedirectPayload<'a>,
    metadata: MetadataPayload<'a>,
}

#[derive(Debug, Serialize)]
struct RefundRequest<'a> {
    charge_id: &'a str,
    amount: f64,
    currency: &'a str,
    reason: &'a str,
    customer: CustomerPayload<'a>,
}

#[derive(Debug, serde::Deserialize)]
struct TransactionPayload {
    url: String,
}

#[derive(Debug, serde::Deserialize)]
struct ChargeCreated {
    id: String,
    transaction: TransactionPayload,
}

#[derive(Debug, serde::Deserialize)]
struct ChargeFetched {
    id: String,
    status: String,
    #[serde(default)]
    amount: f64,
}

/// HTTP implementation of [`PaymentGateway`].
#[derive(Clone)]
pub struct HttpPaymentGateway {
    http: Client,
    config: PaymentConfig,
}

impl HttpPaymentGateway {
    /// Build the client with the configured request timeout.
    pub fn new(config: PaymentConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn customer_payload<'a>(&'a self, session: &'a Session) -> CustomerPayload<'a> {
        CustomerPayload {
            first_name: &session.contact.first_name,
            last_name: &session.contact.last_name,
            email: &session.contact.email,
            phone: PhonePayload {
                country_code: &self.config.phone_country_code,
                number: &session.contact.phone,
            },
        }
    }

    async fn post_json<B, T>(&self, url: String, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.secret_key)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<T>().await?)
}

impl PaymentGateway for HttpPaymentGateway {
    async fn create_charge(
        &self,
        session: &Session,
        amount: f64,
        success_url: &str,
        cancel_url: &str,
    ) -> CounselResult<Charge> {
        let request = ChargeRequest {
            amount,
            currency: &self.config.currency,
            customer: self.customer_payload(session),
            source: SourcePayload { id: "src_card" },
            redirect: RedirectPayload { url: success_url },
            post: RedirectPayload { url: cancel_url },
            metadata: MetadataPayload {
                session_id: session.id.to_string(),
                session_type: session.kind.as_str(),
            },
        };

        let created: ChargeCreated = self
            .post_json(format!("{}/charges", self.config.api_base), &request)
            .await
            .map_err(|e| CounselError::PaymentGateway(e.to_string()))?;

        debug!(session_id = %session.id, charge_id = %created.id, "charge created");

        Ok(Charge {
            id: created.id,
            redirect_url: created.transaction.url,
        })
    }

    async fn fetch_charge(&self, charge_id: &str) -> CounselResult<ChargeStatus> {
        let response = self
            .http
            .get(format!("{}/charges/{charge_id}", self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| CounselError::PaymentGateway(e.to_string()))?;

        let fetched: ChargeFetched = decode(response)
            .await
            .map_err(|e| CounselError::PaymentGateway(e.to_string()))?;

        Ok(ChargeStatus {
            id: fetched.id,
            status: fetched.status,
            amount: fetched.amount,
        })
    }

    async fn refund(
        &self,
        session: &Session,
        charge_id: &str,
        amount: f64,
        reason: &str,
    ) -> CounselResult<()> {
        let request = RefundRequest {
            charge_id,
            amount,
            currency: &self.config.currency,
            reason,
            customer: self.customer_payload(session),
        };

        let _: serde_json::Value = self
            .post_json(format!("{}/refunds", self.config.api_base), &request)
            .await
            .map_err(|e| CounselError::PaymentGateway(e.to_string()))?;

        debug!(session_id = %session.id, charge_id, "refund submitted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_request_uses_processor_metadata_keys() {
        let request = ChargeRequest {
            amount: 150.0,
            currency: "SAR",
            customer: CustomerPayload {
                first_name: "Leila",
                last_name: "Haddad",
                email: "leila@example.com",
                phone: PhonePayload {
                    country_code: "+971",
                    number: "501234567",
                },
            },
            source: SourcePayload { id: "src_card" },
            redirect: RedirectPayload {
                url: "https://app.example.com/ok",
            },
            post: RedirectPayload {
                url: "https://app.example.com/cancelled",
            },
            metadata: MetadataPayload {
                session_id: "abc".into(),
                session_type: "expert-to-expert",
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["metadata"]["sessionId"], "abc");
        assert_eq!(json["metadata"]["sessionType"], "expert-to-expert");
        assert_eq!(json["source"]["id"], "src_card");
        assert_eq!(json["customer"]["phone"]["country_code"], "+971");
        assert_eq!(json["redirect"]["url"], "https://app.example.com/ok");
    }

    #[test]
    fn charge_response_parses_redirect_url() {
        let created: ChargeCreated = serde_json::from_str(
            r#"{"id": "chg_1", "status": "INITIATED",
                "transaction": {"url": "https://checkout.example.com/chg_1"}}"#,
        )
        .unwrap();
        assert_eq!(created.id, "chg_1");
        assert_eq!(created.transaction.url, "https://checkout.example.com/chg_1");
    }

    #[test]
    fn fetched_charge_defaults_missing_amount() {
        let fetched: ChargeFetched =
            serde_json::from_str(r#"{"id": "chg_2", "status": "CAPTURED"}"#).unwrap();
        assert_eq!(fetched.status, "CAPTURED");
        assert_eq!(fetched.amount, 0.0);
    }
}
