//! Telegram WebApp init-data verification.
//!
//! Every client-reachable mutating endpoint passes its `initData` blob
//! through [`verify_init_data`] before touching the ledger. Verification
//! fails closed: a missing payload, missing `hash` field, or missing bot
//! token all reject the request.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Check a Telegram `initData` payload against the bot token.
///
/// The data-check string is every field except `hash`, sorted by field
/// name and joined as `key=value` lines. The signing key is
/// `HMAC-SHA256("WebAppData", bot_token)` per the Telegram WebApp spec.
pub fn verify_init_data(init_data: &str, bot_token: &str) -> bool {
    if init_data.is_empty() || bot_token.is_empty() {
        return false;
    }

    let mut hash = None;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(init_data.as_bytes()) {
        if key == "hash" {
            hash = Some(value.into_owned());
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    let Some(hash) = hash else {
        return false;
    };

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    let data_check_string = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n");

    compute_hash(&data_check_string, bot_token) == hash.to_lowercase()
}

fn compute_hash(data_check_string: &str, bot_token: &str) -> String {
    let mut secret = HmacSha256::new_from_slice(b"WebAppData")
        .expect("HMAC can take key of any size");
    secret.update(bot_token.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret_key)
        .expect("HMAC can take key of any size");
    mac.update(data_check_string.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "12345:test-bot-token";

    /// Build a signed initData string the way a Telegram client would.
    fn signed_init_data(fields: &[(&str, &str)], token: &str) -> String {
        let mut sorted: Vec<_> = fields.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let check_string = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n");
        let hash = compute_hash(&check_string, token);

        let mut encoded = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in fields {
            encoded.append_pair(k, v);
        }
        encoded.append_pair("hash", &hash);
        encoded.finish()
    }

    #[test]
    fn accepts_valid_signature() {
        let init_data = signed_init_data(
            &[("user", r#"{"id":42,"username":"tester"}"#), ("auth_date", "1700000000")],
            TOKEN,
        );
        assert!(verify_init_data(&init_data, TOKEN));
    }

    #[test]
    fn rejects_tampered_payload() {
        let init_data = signed_init_data(&[("auth_date", "1700000000")], TOKEN);
        let tampered = init_data.replace("1700000000", "1700000001");
        assert!(!verify_init_data(&tampered, TOKEN));
    }

    #[test]
    fn rejects_wrong_token() {
        let init_data = signed_init_data(&[("auth_date", "1700000000")], TOKEN);
        assert!(!verify_init_data(&init_data, "99999:other-token"));
    }

    #[test]
    fn fails_closed_on_missing_hash() {
        assert!(!verify_init_data("auth_date=1700000000", TOKEN));
    }

    #[test]
    fn fails_closed_on_empty_inputs() {
        assert!(!verify_init_data("", TOKEN));
        let init_data = signed_init_data(&[("auth_date", "1700000000")], TOKEN);
        assert!(!verify_init_data(&init_data, ""));
    }
}
