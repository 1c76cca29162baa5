use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::asaas_base_url;
use crate::crypto::{MasterKey, secrets_match};
use crate::db::{DbPool, queries};
use crate::error::{AppError, Result};
use crate::models::{AsaasSettings, Order, PaymentMethod};

use super::{PaymentVerifier, ValidatedCard, VerificationOutcome};

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 200;

/// Shown to the buyer when the processor could not be reached or answered garbage.
pub const PROCESSOR_UNAVAILABLE: &str = "Não foi possível processar o pagamento. Tente novamente.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCustomerRequest<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpf_cnpj: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_phone: Option<&'a str>,
    external_reference: &'a str,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest<'a> {
    customer: &'a str,
    billing_type: &'static str,
    value: f64,
    due_date: String,
    description: &'a str,
    external_reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    credit_card: Option<CreditCardPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credit_card_holder_info: Option<CardHolderInfo<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_ip: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreditCardPayload<'a> {
    holder_name: &'a str,
    number: &'a str,
    expiry_month: String,
    expiry_year: String,
    ccv: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardHolderInfo<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpf_cnpj: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    id: String,
    status: String,
    #[serde(default)]
    credit_card: Option<PaymentCreditCard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentCreditCard {
    #[serde(default)]
    credit_card_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixQrCodeResponse {
    encoded_image: String,
    payload: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    description: String,
}

/// Buyer details forwarded to the processor.
#[derive(Debug, Clone, Copy)]
pub struct AsaasCustomer<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub cpf: Option<&'a str>,
    pub phone: Option<&'a str>,
}

/// A charge created at the processor.
#[derive(Debug, Clone)]
pub struct AsaasCharge {
    pub payment_id: String,
    pub status: String,
    /// Reusable card token, card charges only
    pub card_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PixQrCode {
    pub payload: String,
    /// Base64 PNG
    pub encoded_image: String,
}

#[derive(Debug, Clone)]
pub struct AsaasClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AsaasClient {
    pub fn new(client: Client, settings: &AsaasSettings, base_url_override: Option<&str>) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: asaas_base_url(settings.environment.as_ref(), base_url_override),
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("access_token", &self.api_key)
            .header("Content-Type", "application/json")
            .header("User-Agent", concat!("vitrine/", env!("CARGO_PKG_VERSION")))
    }

    /// Send a request, retrying transport errors, 429 and 5xx with exponential backoff.
    async fn send_with_retry(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = self.request(build()).send().await;
            let retryable = match &outcome {
                Ok(resp) => {
                    resp.status().is_server_error() || resp.status() == StatusCode::TOO_MANY_REQUESTS
                }
                Err(e) => e.is_connect() || e.is_timeout(),
            };

            if !retryable || attempt >= MAX_ATTEMPTS {
                return outcome.map_err(transport_error);
            }

            let delay = BACKOFF_BASE_MS * 2u64.pow(attempt - 1);
            tracing::warn!(attempt, delay_ms = delay, "Asaas request failed, retrying");
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    async fn parse<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.errors.into_iter().next())
                .map(|e| e.description)
                .unwrap_or_else(|| PROCESSOR_UNAVAILABLE.to_string());
            tracing::error!(status = %status, body = %body, "Asaas API error");
            return Err(AppError::PaymentProcessor(message));
        }
        response
            .json()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Invalid Asaas response");
                AppError::PaymentProcessor(PROCESSOR_UNAVAILABLE.to_string())
            })
    }

    pub async fn create_customer(&self, customer: AsaasCustomer<'_>, order_id: &str) -> Result<String> {
        let body = CreateCustomerRequest {
            name: customer.name,
            email: customer.email,
            cpf_cnpj: customer.cpf,
            mobile_phone: customer.phone,
            external_reference: order_id,
        };
        let url = format!("{}/customers", self.base_url);
        let response = self
            .send_with_retry(|| self.client.post(&url).json(&body))
            .await?;
        let created: IdResponse = Self::parse(response).await?;
        Ok(created.id)
    }

    /// Create a charge for an order. Card data is forwarded, never stored.
    pub async fn create_payment(
        &self,
        customer_id: &str,
        customer: AsaasCustomer<'_>,
        order: &Order,
        description: &str,
        card: Option<&ValidatedCard>,
    ) -> Result<AsaasCharge> {
        let billing_type = match order.payment_method {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Cartao => "CREDIT_CARD",
            PaymentMethod::Boleto => "BOLETO",
        };
        let due_date = (Utc::now() + ChronoDuration::days(1))
            .format("%Y-%m-%d")
            .to_string();

        let body = CreatePaymentRequest {
            customer: customer_id,
            billing_type,
            value: order.amount_cents as f64 / 100.0,
            due_date,
            description,
            external_reference: &order.id,
            credit_card: card.map(|c| CreditCardPayload {
                holder_name: &c.holder_name,
                number: &c.number,
                expiry_month: format!("{:02}", c.expiry_month),
                expiry_year: c.expiry_year.to_string(),
                ccv: &c.cvv,
            }),
            credit_card_holder_info: card.map(|_| CardHolderInfo {
                name: customer.name,
                email: customer.email,
                cpf_cnpj: customer.cpf,
                phone: customer.phone,
            }),
            remote_ip: None,
        };

        let url = format!("{}/payments", self.base_url);
        // Charges are not idempotent at the processor; never retry the POST.
        let response = self
            .request(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(transport_error)?;
        let payment: PaymentResponse = Self::parse(response).await?;

        Ok(AsaasCharge {
            payment_id: payment.id,
            status: payment.status,
            card_token: payment.credit_card.and_then(|c| c.credit_card_token),
        })
    }

    pub async fn get_pix_qr_code(&self, payment_id: &str) -> Result<PixQrCode> {
        let url = format!(
            "{}/payments/{}/pixQrCode",
            self.base_url,
            urlencoding::encode(payment_id)
        );
        let response = self.send_with_retry(|| self.client.get(&url)).await?;
        let qr: PixQrCodeResponse = Self::parse(response).await?;
        Ok(PixQrCode {
            payload: qr.payload,
            encoded_image: qr.encoded_image,
        })
    }

    pub async fn get_payment_status(&self, payment_id: &str) -> Result<String> {
        let url = format!(
            "{}/payments/{}/status",
            self.base_url,
            urlencoding::encode(payment_id)
        );
        let response = self.send_with_retry(|| self.client.get(&url)).await?;
        let status: StatusResponse = Self::parse(response).await?;
        Ok(status.status)
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    tracing::error!(error = %e, "Asaas request failed");
    AppError::PaymentProcessor(PROCESSOR_UNAVAILABLE.to_string())
}

/// Map an Asaas payment status onto a verification outcome.
pub fn outcome_for_asaas_status(status: &str) -> VerificationOutcome {
    match status {
        "RECEIVED" | "CONFIRMED" | "RECEIVED_IN_CASH" => VerificationOutcome::Paid,
        "OVERDUE" | "REFUNDED" | "REFUND_REQUESTED" | "CHARGEBACK_REQUESTED"
        | "CHARGEBACK_DISPUTE" | "DELETED" => VerificationOutcome::Cancelled,
        "REPROVED_BY_RISK_ANALYSIS" | "CREDIT_CARD_CAPTURE_REFUSED" => VerificationOutcome::Failed,
        _ => VerificationOutcome::Pending,
    }
}

/// Verifier that polls the Asaas status endpoint for the order's charge.
#[derive(Clone)]
pub struct AsaasVerifier {
    db: DbPool,
    master_key: MasterKey,
    http: Client,
    base_url_override: Option<String>,
}

impl AsaasVerifier {
    pub fn new(db: DbPool, master_key: MasterKey, base_url_override: Option<String>) -> Self {
        Self {
            db,
            master_key,
            http: Client::new(),
            base_url_override,
        }
    }
}

#[async_trait]
impl PaymentVerifier for AsaasVerifier {
    async fn verify(&self, order: &Order) -> Result<VerificationOutcome> {
        let Some(payment_id) = order.processor_payment_id.as_deref() else {
            // Manual PIX (static key): only an admin or a webhook can confirm it
            return Ok(VerificationOutcome::Pending);
        };

        let settings = {
            let conn = self.db.get()?;
            queries::get_asaas_settings(&conn, &self.master_key)?
        };
        let settings = settings
            .ok_or_else(|| AppError::BadRequest("Payment processor is not configured".into()))?;

        let client = AsaasClient::new(self.http.clone(), &settings, self.base_url_override.as_deref());
        let status = client.get_payment_status(payment_id).await?;
        let outcome = outcome_for_asaas_status(&status);

        tracing::debug!(
            order_id = %order.id,
            payment_id,
            asaas_status = %status,
            ?outcome,
            "Verified payment with Asaas"
        );
        Ok(outcome)
    }
}

// ============ Webhooks ============

#[derive(Debug, Deserialize)]
pub struct AsaasWebhookEvent {
    pub id: String,
    pub event: String,
    pub payment: Option<AsaasWebhookPayment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsaasWebhookPayment {
    pub id: String,
    #[serde(default)]
    pub external_reference: Option<String>,
}

/// Map a webhook event name to an outcome. `None` means the event is ignored.
pub fn outcome_for_webhook_event(event: &str) -> Option<VerificationOutcome> {
    match event {
        "PAYMENT_RECEIVED" | "PAYMENT_CONFIRMED" => Some(VerificationOutcome::Paid),
        "PAYMENT_OVERDUE" | "PAYMENT_DELETED" | "PAYMENT_REFUNDED" => {
            Some(VerificationOutcome::Cancelled)
        }
        "PAYMENT_REPROVED_BY_RISK_ANALYSIS" | "PAYMENT_CREDIT_CARD_CAPTURE_REFUSED" => {
            Some(VerificationOutcome::Failed)
        }
        _ => None,
    }
}

/// Check the `asaas-access-token` header against the configured token.
pub fn verify_webhook_token(settings: &AsaasSettings, provided: &str) -> bool {
    settings
        .webhook_token
        .as_deref()
        .is_some_and(|expected| secrets_match(provided, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AsaasEnvironment;

    fn settings(token: Option<&str>) -> AsaasSettings {
        AsaasSettings {
            api_key: "$aact_test".into(),
            webhook_token: token.map(String::from),
            environment: AsaasEnvironment::Sandbox,
            pix_enabled: true,
            card_enabled: true,
            updated_at: 0,
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(outcome_for_asaas_status("RECEIVED"), VerificationOutcome::Paid);
        assert_eq!(outcome_for_asaas_status("CONFIRMED"), VerificationOutcome::Paid);
        assert_eq!(outcome_for_asaas_status("PENDING"), VerificationOutcome::Pending);
        assert_eq!(outcome_for_asaas_status("OVERDUE"), VerificationOutcome::Cancelled);
        assert_eq!(
            outcome_for_asaas_status("CREDIT_CARD_CAPTURE_REFUSED"),
            VerificationOutcome::Failed
        );
    }

    #[test]
    fn test_webhook_event_mapping() {
        assert_eq!(outcome_for_webhook_event("PAYMENT_RECEIVED"), Some(VerificationOutcome::Paid));
        assert_eq!(
            outcome_for_webhook_event("PAYMENT_REFUNDED"),
            Some(VerificationOutcome::Cancelled)
        );
        assert_eq!(outcome_for_webhook_event("PAYMENT_CREATED"), None);
    }

    #[test]
    fn test_webhook_token() {
        assert!(verify_webhook_token(&settings(Some("tok")), "tok"));
        assert!(!verify_webhook_token(&settings(Some("tok")), "other"));
        assert!(!verify_webhook_token(&settings(None), "tok"));
    }

    #[test]
    fn test_base_url_follows_environment() {
        let client = AsaasClient::new(Client::new(), &settings(None), None);
        assert!(client.base_url.contains("sandbox"));

        let client = AsaasClient::new(Client::new(), &settings(None), Some("http://localhost:9/"));
        assert_eq!(client.base_url, "http://localhost:9");
    }

    #[test]
    fn test_verifier_without_charge_is_pending() {
        use crate::models::{OrderStatus, PaymentMethod};

        let dir = tempfile::tempdir().unwrap();
        let pool = crate::db::create_pool(dir.path().join("v.db").to_str().unwrap()).unwrap();
        let verifier = AsaasVerifier::new(pool, MasterKey::dev(), None);
        let order = Order {
            id: "o1".into(),
            product_id: "p1".into(),
            customer_name: "Ana".into(),
            customer_email: "ana@example.com".into(),
            customer_phone: None,
            customer_cpf: None,
            amount_cents: 1000,
            payment_method: PaymentMethod::Pix,
            status: OrderStatus::Pendente,
            processor_payment_id: None,
            pix_code: None,
            pix_qr_image: None,
            pix_expires_at: None,
            created_at: 0,
            updated_at: 0,
        };

        let outcome = tokio_test::block_on(verifier.verify(&order)).unwrap();
        assert_eq!(outcome, VerificationOutcome::Pending);
    }
}
