use std::collections::BTreeMap;

use tracing::debug;

use crate::vietqr::types::{QuickLinkMedia, TransferParameters};

pub const MEDIA_KEY: &str = "media";

/// Splits `key=value` tokens on whitespace and each token on its first `=`.
/// Tokens without `=` or with an empty side are dropped. Later keys win.
pub fn parse_overrides(args: &str) -> BTreeMap<String, String> {
    let mut overrides = BTreeMap::new();
    for token in args.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        overrides.insert(key.to_string(), value.to_string());
    }
    overrides
}

/// Overlays `overrides` on `defaults`. Keys are the camelCase names users type.
pub fn merge(
    defaults: &TransferParameters,
    overrides: &BTreeMap<String, String>,
) -> TransferParameters {
    let mut params = defaults.clone();
    for (key, value) in overrides {
        let slot = match key.as_str() {
            "bank" => &mut params.bank,
            "accountName" => &mut params.account_name,
            "accountNumber" => &mut params.account_number,
            "amount" => &mut params.amount,
            "memo" => &mut params.memo,
            "template" => &mut params.template,
            _ => {
                debug!("Ignoring unknown transfer parameter '{key}'");
                continue;
            }
        };
        *slot = value.clone();
    }
    params
}

pub fn quick_link_media(overrides: &BTreeMap<String, String>) -> QuickLinkMedia {
    overrides
        .get(MEDIA_KEY)
        .map(|value| QuickLinkMedia::from_flag(value))
        .unwrap_or_default()
}
