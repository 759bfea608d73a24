use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AuthResult, MalformedToken};
use crate::roles::Role;

/// Claims carried in the payload of a session token.
///
/// These are derived from the token without any signature or expiry check and
/// must never be treated as proof of identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    pub role: Option<Role>,
    #[serde(rename = "branchid")]
    pub branch_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "employeeid")]
    pub employee_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub raw: Value,
}

impl Claims {
    pub fn has_role(&self, role: &Role) -> bool {
        self.role.as_ref() == Some(role)
    }

    /// A super admin without an operating branch has to pick one before using
    /// branch-scoped views.
    pub fn needs_branch_selection(&self) -> bool {
        self.has_role(&Role::SuperAdmin) && self.branch_id.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    #[serde(default, deserialize_with = "lenient_string")]
    role: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    branchid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    employeeid: Option<String>,
    // Older login flows issued the camel-cased spelling.
    #[serde(default, rename = "employeeId", deserialize_with = "lenient_string")]
    employee_id_legacy: Option<String>,
    #[serde(default)]
    exp: Option<Value>,
}

/// Strings and numbers are taken as-is; null, empty strings and any other
/// JSON type count as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// `exp` is informational only. A value that is not a usable unix timestamp
/// leaves `expires_at` empty instead of rejecting the token.
fn expiry(exp: Option<Value>) -> Option<DateTime<Utc>> {
    let exp = exp?;
    let seconds = exp
        .as_i64()
        .or_else(|| exp.as_f64().filter(|secs| secs.is_finite()).map(|secs| secs as i64))?;
    Utc.timestamp_opt(seconds, 0).single()
}

impl From<ClaimsRepr> for Claims {
    fn from(value: ClaimsRepr) -> Self {
        Self {
            role: value.role.as_deref().map(Role::from),
            branch_id: value.branchid,
            name: value.name,
            email: value.email,
            employee_id: value.employeeid.or(value.employee_id_legacy),
            expires_at: expiry(value.exp),
            raw: Value::Null,
        }
    }
}

impl TryFrom<Value> for Claims {
    type Error = MalformedToken;

    fn try_from(value: Value) -> Result<Self, MalformedToken> {
        if !value.is_object() {
            return Err(MalformedToken::NotAnObject);
        }
        let repr: ClaimsRepr = serde_json::from_value(value.clone())
            .map_err(|err| MalformedToken::Json(err.to_string()))?;
        let mut claims = Claims::from(repr);
        claims.raw = value;
        Ok(claims)
    }
}

pub(crate) fn claims_from_json(value: Value) -> AuthResult<Claims> {
    Ok(Claims::try_from(value)?)
}
