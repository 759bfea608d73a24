//! Client-side decoding of session tokens.
//!
//! The payload segment is read as-is. Nothing here verifies the signature or
//! the expiry; the backend re-validates the token on every request.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;
use tracing::debug;

use crate::claims::{claims_from_json, Claims};
use crate::error::{AuthResult, MalformedToken};

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const SEGMENT_COUNT: usize = 3;

/// Decode the claims of a `header.payload.signature` token.
pub fn decode_claims(token: &str) -> AuthResult<Claims> {
    let payload = payload_segment(token)?;
    let bytes = PAYLOAD_ENGINE
        .decode(payload)
        .map_err(|err| MalformedToken::Base64(err.to_string()))?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|err| MalformedToken::Json(err.to_string()))?;

    let claims = claims_from_json(value)?;
    debug!(
        role = claims.role.as_ref().map(|role| role.as_str()),
        branch_id = claims.branch_id.as_deref(),
        "decoded session token"
    );
    Ok(claims)
}

fn payload_segment(token: &str) -> Result<&str, MalformedToken> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(MalformedToken::SegmentCount(segments.len()));
    }
    Ok(segments[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::roles::Role;
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const HEADER: &str = "eyJhbGciOiJIUzI1NiJ9";

    fn token_with_payload(payload: &str) -> String {
        format!("{HEADER}.{payload}.sig")
    }

    fn malformed(token: &str) -> MalformedToken {
        match decode_claims(token) {
            Err(AuthError::MalformedToken(reason)) => reason,
            other => panic!("expected malformed token, got {other:?}"),
        }
    }

    #[test]
    fn decodes_unpadded_payload() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"role":"Cashier","branchid":"B1"}"#);
        let claims = decode_claims(&token_with_payload(&payload)).expect("decodes");
        assert_eq!(claims.role, Some(Role::Cashier));
        assert_eq!(claims.branch_id.as_deref(), Some("B1"));
    }

    #[test]
    fn decodes_padded_payload() {
        let payload = URL_SAFE.encode(r#"{"role":"Audit"}"#);
        assert!(payload.ends_with('='));
        let claims = decode_claims(&token_with_payload(&payload)).expect("decodes");
        assert_eq!(claims.role, Some(Role::Audit));
    }

    #[test]
    fn decodes_token_signed_by_backend_key() {
        let claims = json!({
            "role": "Super Admin",
            "branchid": null,
            "email": "owner@example.com",
            "employeeid": "E-1",
            "name": "Owner",
            "exp": 4_102_444_800_i64
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .expect("sign");

        let decoded = decode_claims(&token).expect("decodes");
        assert!(decoded.needs_branch_selection());
        assert_eq!(decoded.email.as_deref(), Some("owner@example.com"));
        assert_eq!(decoded.raw["name"], "Owner");
    }

    #[test]
    fn expired_tokens_still_decode() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"role":"Manager","exp":1}"#);
        let claims = decode_claims(&token_with_payload(&payload)).expect("decodes");
        assert_eq!(claims.expires_at.map(|at| at.timestamp()), Some(1));
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        assert_eq!(malformed("only-one"), MalformedToken::SegmentCount(1));
        assert_eq!(malformed("a.b"), MalformedToken::SegmentCount(2));
        assert_eq!(malformed("a.b.c.d"), MalformedToken::SegmentCount(4));
        assert_eq!(malformed(""), MalformedToken::SegmentCount(1));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            malformed(&token_with_payload("not*base64!")),
            MalformedToken::Base64(_)
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        let payload = URL_SAFE_NO_PAD.encode("{role: Cashier");
        assert!(matches!(
            malformed(&token_with_payload(&payload)),
            MalformedToken::Json(_)
        ));
        assert!(matches!(
            malformed(&token_with_payload("")),
            MalformedToken::Json(_)
        ));
    }

    #[test]
    fn rejects_non_object_json() {
        let payload = URL_SAFE_NO_PAD.encode("\"Cashier\"");
        assert_eq!(
            malformed(&token_with_payload(&payload)),
            MalformedToken::NotAnObject
        );
    }
}
