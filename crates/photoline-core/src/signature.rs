use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a LINE webhook signature.
///
/// The platform signs the raw, unparsed request body with HMAC-SHA256 under
/// the channel secret and sends the base64 digest in the `x-line-signature`
/// header. The comparison goes through `Mac::verify_slice`, which is
/// constant-time. Malformed headers yield `false`, never an error.
pub fn verify(body: &[u8], signature_header: &str, channel_secret: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);

    let Ok(provided) = base64::engine::general_purpose::STANDARD.decode(signature_header) else {
        return false;
    };
    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature() {
        let body = br#"{"events":[]}"#;
        let signature = sign(body, "secret");
        assert!(verify(body, &signature, "secret"));
    }

    #[test]
    fn test_tampered_body() {
        let signature = sign(br#"{"events":[]}"#, "secret");
        assert!(!verify(br#"{"events":[{}]}"#, &signature, "secret"));
    }

    #[test]
    fn test_wrong_secret() {
        let body = br#"{"events":[]}"#;
        let signature = sign(body, "secret");
        assert!(!verify(body, &signature, "other-secret"));
    }

    #[test]
    fn test_malformed_header() {
        let body = br#"{"events":[]}"#;
        assert!(!verify(body, "not base64 !!!", "secret"));
        assert!(!verify(body, "", "secret"));
    }
}
