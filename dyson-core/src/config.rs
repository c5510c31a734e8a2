//! Static protocol configuration.
//!
//! The decryption key, IV and user-agent are fixed properties of the vendor
//! API rather than per-account secrets. They live in an explicit [`Config`]
//! value carried by the session instead of process-wide globals, so tests
//! and forks of the vendor firmware can swap them out.

/// AES-256 key shared by every device of this vendor family.
///
/// The key is public knowledge: it is the byte sequence `0x01..=0x20`
/// baked into the official mobile applications.
pub const LOCAL_CREDENTIALS_KEY: [u8; 32] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e,
    0x1f, 0x20,
];

/// CBC initialization vector used with [`LOCAL_CREDENTIALS_KEY`].
pub const LOCAL_CREDENTIALS_IV: [u8; 16] = [0u8; 16];

/// User-agent the backend expects from mobile clients.
pub const DEFAULT_USER_AGENT: &str = "android client";

/// Immutable configuration for a protocol session.
///
/// [`Config::default`] matches the production vendor API; individual fields
/// can be overridden for tests or firmware variants.
#[derive(Debug, Clone)]
pub struct Config {
    /// Symmetric key for local-credential decryption.
    pub local_credentials_key: [u8; 32],
    /// CBC IV for local-credential decryption.
    pub local_credentials_iv: [u8; 16],
    /// User-agent attached to every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_credentials_key: LOCAL_CREDENTIALS_KEY,
            local_credentials_iv: LOCAL_CREDENTIALS_IV,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_key_shape() {
        let config = Config::default();
        assert_eq!(config.local_credentials_key[0], 0x01);
        assert_eq!(config.local_credentials_key[31], 0x20);
        assert!(config.local_credentials_iv.iter().all(|&b| b == 0));
    }
}
