//! Account identifier classification and region resolution.
//!
//! The backend is sharded by country: a small fixed set of regional
//! hostnames, with `.com` as the fallback. SMS-based login exists only on
//! the Chinese shard, so mobile-number identifiers are valid only there.
//! All validation here is local and happens before any network round trip.

use crate::error::{DysonError, Result};

/// Default backend hostname.
pub const API_HOST_DEFAULT: &str = "https://appapi.cp.dyson.com";
/// Australian backend hostname.
pub const API_HOST_AU: &str = "https://appapi.cp.dyson.au";
/// New Zealand backend hostname.
pub const API_HOST_NZ: &str = "https://appapi.cp.dyson.nz";
/// Chinese backend hostname. The only shard reachable by the mobile path.
pub const API_HOST_CN: &str = "https://appapi.cp.dyson.cn";

/// The one region whose shard supports SMS-based OTP delivery.
const SMS_REGION: &str = "CN";

/// Resolve the backend hostname for a country code.
///
/// Known regional shards get their dedicated hostname; everything else
/// falls back to the `.com` endpoint.
pub fn api_hostname(country: &str) -> &'static str {
    match country {
        "AU" => API_HOST_AU,
        "NZ" => API_HOST_NZ,
        "CN" => API_HOST_CN,
        _ => API_HOST_DEFAULT,
    }
}

/// A validated account identifier.
///
/// Classification rule: a string with no `@` and a leading `+` is a mobile
/// number; any other shape is treated as an email address. The `Mobile`
/// variant can only be constructed for the SMS-capable region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountIdentifier {
    /// Email address, valid in every region.
    Email(String),
    /// Mobile number with mandatory leading `+` country code. CN only.
    Mobile(String),
}

impl AccountIdentifier {
    /// Classify and validate `raw` for the given region.
    ///
    /// Fails with [`DysonError::InvalidIdentifier`] before any network call
    /// when the shape is malformed or the identifier kind is not available
    /// in the region.
    pub fn resolve(raw: &str, country: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DysonError::InvalidIdentifier(
                "identifier must not be empty".to_string(),
            ));
        }

        if !raw.contains('@') && raw.starts_with('+') {
            let digits = &raw[1..];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DysonError::InvalidIdentifier(format!(
                    "mobile number '{raw}' must be '+' followed by digits"
                )));
            }
            if country != SMS_REGION {
                return Err(DysonError::InvalidIdentifier(format!(
                    "mobile login is only available in {SMS_REGION}, not {country}"
                )));
            }
            return Ok(Self::Mobile(raw.to_string()));
        }

        if !is_plausible_email(raw) {
            return Err(DysonError::InvalidIdentifier(format!(
                "'{raw}' is not a valid email address"
            )));
        }
        Ok(Self::Email(raw.to_string()))
    }

    /// The identifier as entered by the user.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(s) | Self::Mobile(s) => s,
        }
    }

    /// Whether this is a mobile-number identifier.
    pub fn is_mobile(&self) -> bool {
        matches!(self, Self::Mobile(_))
    }
}

/// Lightweight email shape check: `local@domain` with a dotted domain.
///
/// The backend is the authority on whether the address exists; this only
/// rejects strings that cannot possibly be addresses.
fn is_plausible_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
