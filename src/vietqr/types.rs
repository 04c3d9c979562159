use std::fmt;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

pub const SUCCESS_CODE: &str = "00";
pub const ERROR_CODE: &str = "ERROR";
pub const FALLBACK_TEMPLATE: &str = "qr_only";
pub const CREDENTIALS_MESSAGE: &str = "Please check your API key and client key";

#[derive(Debug, Error)]
pub enum VietQrError {
    #[error("Please check your API key and client key")]
    MissingCredentials,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    api_key: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            api_key: api_key.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn is_present(&self) -> bool {
        !self.client_id.is_empty() && !self.api_key.is_empty()
    }
}

// Keeps the api key out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// Transfer fields a `/qr` command can set. All values stay strings; the
/// remote service does its own validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParameters {
    pub bank: String,
    pub account_name: String,
    pub account_number: String,
    pub amount: String,
    pub memo: String,
    pub template: String,
}

impl Default for TransferParameters {
    fn default() -> Self {
        Self {
            bank: "970415".to_string(),
            account_name: "QUY VAC XIN PHONG CHONG COVID".to_string(),
            account_number: "113366668888".to_string(),
            amount: "79000".to_string(),
            memo: "Ung Ho Quy Vac Xin".to_string(),
            template: "compact".to_string(),
        }
    }
}

impl TransferParameters {
    pub fn missing_required(&self) -> bool {
        self.bank.is_empty() || self.account_number.is_empty()
    }

    pub(crate) fn template_or_fallback(&self) -> &str {
        if self.template.is_empty() {
            FALLBACK_TEMPLATE
        } else {
            &self.template
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuickLinkMedia {
    #[default]
    Png,
    Jpg,
}

impl QuickLinkMedia {
    pub fn from_flag(value: &str) -> Self {
        match value.trim().trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" => QuickLinkMedia::Jpg,
            _ => QuickLinkMedia::Png,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            QuickLinkMedia::Png => "png",
            QuickLinkMedia::Jpg => "jpg",
        }
    }
}

/// Input for a payment-gateway token. Empty optional values are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentGatewayParams {
    pub theme_slug: String,
    pub platform: Option<String>,
    pub bank_id: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub add_info: Option<String>,
    pub amount: Option<String>,
}

/// The `{code, desc, data, error}` shape every VietQR endpoint replies with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub desc: String,
    #[serde(default)]
    pub data: Option<JsonValue>,
    #[serde(default)]
    pub error: Option<JsonValue>,
}

impl ResponseEnvelope {
    pub fn transport_error(desc: impl Into<String>, error: Option<JsonValue>) -> Self {
        Self {
            code: ERROR_CODE.to_string(),
            desc: desc.into(),
            data: None,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    pub fn qr_data_url(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.get("qrDataURL"))
            .and_then(JsonValue::as_str)
            .filter(|value| !value.is_empty())
    }

    /// `desc`, then `error`, then a generic message.
    pub fn failure_reason(&self) -> String {
        if !self.desc.trim().is_empty() {
            return self.desc.clone();
        }
        match &self.error {
            Some(JsonValue::String(text)) if !text.trim().is_empty() => text.clone(),
            Some(JsonValue::Null) | Some(JsonValue::String(_)) | None => {
                "Unknown error".to_string()
            }
            Some(other) => other.to_string(),
        }
    }

    pub fn banks(&self) -> serde_json::Result<Vec<Bank>> {
        self.data_as()
    }

    pub fn templates(&self) -> serde_json::Result<Vec<Template>> {
        self.data_as()
    }

    fn data_as<T: for<'de> Deserialize<'de>>(&self) -> serde_json::Result<Vec<T>> {
        match &self.data {
            Some(data) => Vec::<T>::deserialize(data),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bank {
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub bin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub template: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(text) => text,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_need_both_values() {
        assert!(Credentials::new("id", "key").is_present());
        assert!(!Credentials::new("", "key").is_present());
        assert!(!Credentials::new("id", "").is_present());
        assert!(!Credentials::new("", "").is_present());
    }

    #[test]
    fn credentials_debug_hides_api_key() {
        let rendered = format!("{:?}", Credentials::new("client", "secret"));
        assert!(rendered.contains("client"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn parses_remote_envelope_and_qr_data_url() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "code": "00",
            "desc": "Gen VietQR successful!",
            "data": {"qrCode": "000201", "qrDataURL": "data:image/png;base64,AAAA"}
        }))
        .unwrap();

        assert!(envelope.is_success());
        assert_eq!(envelope.qr_data_url(), Some("data:image/png;base64,AAAA"));
        assert!(envelope.error.is_none());
    }

    #[test]
    fn null_data_has_no_qr() {
        let envelope: ResponseEnvelope =
            serde_json::from_value(json!({"code": "00", "desc": "ok", "data": null})).unwrap();
        assert_eq!(envelope.qr_data_url(), None);
    }

    #[test]
    fn failure_reason_prefers_desc_then_error() {
        let with_desc = ResponseEnvelope {
            code: "21".into(),
            desc: "Invalid account".into(),
            data: None,
            error: Some(json!("ignored")),
        };
        assert_eq!(with_desc.failure_reason(), "Invalid account");

        let with_error = ResponseEnvelope::transport_error("", Some(json!("socket hang up")));
        assert_eq!(with_error.failure_reason(), "socket hang up");

        let with_object = ResponseEnvelope::transport_error("", Some(json!({"status": 500})));
        assert_eq!(with_object.failure_reason(), r#"{"status":500}"#);

        let empty = ResponseEnvelope::default();
        assert_eq!(empty.failure_reason(), "Unknown error");
    }

    #[test]
    fn null_desc_and_numeric_code_still_parse() {
        let envelope: ResponseEnvelope =
            serde_json::from_value(json!({"code": 17, "desc": null})).unwrap();
        assert_eq!(envelope.code, "17");
        assert_eq!(envelope.desc, "");
        assert!(!envelope.is_success());
    }

    #[test]
    fn transport_error_is_never_success() {
        let envelope = ResponseEnvelope::transport_error("boom", None);
        assert_eq!(envelope.code, ERROR_CODE);
        assert!(!envelope.is_success());
    }

    #[test]
    fn banks_accept_numeric_bin() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "code": "00",
            "desc": "",
            "data": [
                {"name": "VietinBank", "bin": "970415", "code": "ICB", "shortName": "VietinBank"},
                {"name": "Vietcombank", "bin": 970436}
            ]
        }))
        .unwrap();

        let banks = envelope.banks().unwrap();
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].name, "VietinBank");
        assert_eq!(banks[1].bin, "970436");
    }

    #[test]
    fn null_listing_fields_do_not_reject_the_list() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "code": "00",
            "desc": "",
            "data": [
                {"name": "VietinBank", "bin": "970415", "code": null, "shortName": null},
                {"name": null, "bin": null}
            ]
        }))
        .unwrap();

        let banks = envelope.banks().unwrap();
        assert_eq!(banks[0].bin, "970415");
        assert_eq!(banks[1].name, "");

        let templates: ResponseEnvelope = serde_json::from_value(json!({
            "code": "00",
            "data": [{"name": "Compact", "template": null}]
        }))
        .unwrap();
        assert_eq!(templates.templates().unwrap()[0].template, "");
    }

    #[test]
    fn template_fallback_applies_only_when_empty() {
        let mut params = TransferParameters::default();
        assert_eq!(params.template_or_fallback(), "compact");
        params.template.clear();
        assert_eq!(params.template_or_fallback(), FALLBACK_TEMPLATE);
    }

    #[test]
    fn quick_link_media_flag() {
        assert_eq!(QuickLinkMedia::from_flag(".jpg"), QuickLinkMedia::Jpg);
        assert_eq!(QuickLinkMedia::from_flag("JPEG"), QuickLinkMedia::Jpg);
        assert_eq!(QuickLinkMedia::from_flag("gif"), QuickLinkMedia::Png);
    }
}
