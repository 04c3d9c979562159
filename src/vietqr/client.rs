use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::{info, warn};

use crate::vietqr::http::{ApiTransport, HttpClient};
use crate::vietqr::types::{
    Credentials, PaymentGatewayParams, QuickLinkMedia, ResponseEnvelope, TransferParameters,
    VietQrError, CREDENTIALS_MESSAGE,
};
use crate::vietqr::Endpoints;

// Characters `encodeURI` leaves untouched.
const URI_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    account_no: &'a str,
    account_name: &'a str,
    acq_id: &'a str,
    add_info: &'a str,
    amount: &'a str,
    template: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateV1Request<'a> {
    account_no: &'a str,
    account_name: &'a str,
    acq_id: &'a str,
    add_info: &'a str,
    amount: &'a str,
    format: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenRequest<'a> {
    api_key: &'a str,
    client_id: &'a str,
    #[serde(rename = "theme_slug")]
    theme_slug: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    add_info: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform: Option<&'a str>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// Typed access to the VietQR API. Every operation first checks that both
/// credentials are set and fails with [`VietQrError::MissingCredentials`]
/// without touching the network otherwise.
#[derive(Debug, Clone)]
pub struct VietQr<T = HttpClient> {
    credentials: Credentials,
    endpoints: Endpoints,
    transport: T,
}

impl VietQr<HttpClient> {
    pub fn new(credentials: Credentials, endpoints: Endpoints) -> Self {
        Self::with_transport(credentials, endpoints, HttpClient::new())
    }
}

impl<T: ApiTransport> VietQr<T> {
    pub fn with_transport(credentials: Credentials, endpoints: Endpoints, transport: T) -> Self {
        Self {
            credentials,
            endpoints,
            transport,
        }
    }

    pub fn check_credentials(&self) -> bool {
        self.credentials.is_present()
    }

    fn ensure_credentials(&self) -> Result<(), VietQrError> {
        if self.check_credentials() {
            Ok(())
        } else {
            warn!("{CREDENTIALS_MESSAGE}");
            Err(VietQrError::MissingCredentials)
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.api_url, path)
    }

    pub async fn list_banks(&self) -> Result<ResponseEnvelope, VietQrError> {
        self.ensure_credentials()?;
        Ok(self.transport.get(&self.api_url("/v2/banks")).await)
    }

    pub async fn list_templates(&self) -> Result<ResponseEnvelope, VietQrError> {
        self.ensure_credentials()?;
        Ok(self.transport.get(&self.api_url("/v2/template")).await)
    }

    pub async fn generate_qr(
        &self,
        params: &TransferParameters,
    ) -> Result<ResponseEnvelope, VietQrError> {
        self.ensure_credentials()?;
        let request = GenerateRequest {
            account_no: &params.account_number,
            account_name: &params.account_name,
            acq_id: &params.bank,
            add_info: &params.memo,
            amount: &params.amount,
            template: params.template_or_fallback(),
        };
        info!("Sending VietQR generate request: {:?}", request);

        let envelope = self
            .transport
            .post(&self.api_url("/v2/generate"), &request)
            .await;
        info!(
            code = %envelope.code,
            desc = %envelope.desc,
            has_data = envelope.data.is_some(),
            has_qr_data_url = envelope.qr_data_url().is_some(),
            "VietQR generate response received"
        );
        Ok(envelope)
    }

    /// Legacy `/v1/generate`, which names the template `format`.
    pub async fn generate_qr_v1(
        &self,
        params: &TransferParameters,
    ) -> Result<ResponseEnvelope, VietQrError> {
        self.ensure_credentials()?;
        let request = GenerateV1Request {
            account_no: &params.account_number,
            account_name: &params.account_name,
            acq_id: &params.bank,
            add_info: &params.memo,
            amount: &params.amount,
            format: params.template_or_fallback(),
        };
        Ok(self
            .transport
            .post(&self.api_url("/v1/generate"), &request)
            .await)
    }

    /// Builds an image URL the VietQR CDN renders directly. No network call.
    pub fn generate_quick_link(
        &self,
        params: &TransferParameters,
        media: QuickLinkMedia,
    ) -> Result<String, VietQrError> {
        self.ensure_credentials()?;
        let raw = format!(
            "{}/{}/{}/{}/{}/{}.{}?accountName={}",
            self.endpoints.api_url,
            params.bank,
            params.account_number,
            params.amount,
            params.memo,
            params.template_or_fallback(),
            media.extension(),
            params.account_name
        );
        Ok(utf8_percent_encode(&raw, URI_RESERVED)
            .to_string()
            .replace("%20", "+"))
    }

    pub async fn create_payment_gateway_token(
        &self,
        params: &PaymentGatewayParams,
    ) -> Result<ResponseEnvelope, VietQrError> {
        self.ensure_credentials()?;
        let request = CreateTokenRequest {
            api_key: self.credentials.api_key(),
            client_id: self.credentials.client_id(),
            theme_slug: &params.theme_slug,
            bank_id: non_empty(&params.bank_id),
            account_name: non_empty(&params.account_name),
            account_number: non_empty(&params.account_number),
            add_info: non_empty(&params.add_info),
            amount: non_empty(&params.amount),
            platform: non_empty(&params.platform),
        };
        let url = format!(
            "{}/payment-gateway/v1/createToken",
            self.endpoints.gateway_url
        );
        Ok(self.transport.post(&url, &request).await)
    }
}
