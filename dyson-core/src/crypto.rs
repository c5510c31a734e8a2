//! Local broker credential decryption.
//!
//! Devices ship the password for their on-device MQTT broker to the cloud
//! encrypted with AES-256-CBC under a fixed, publicly-known key (see
//! [`crate::config`]). The decrypted plaintext is a JSON document carrying
//! the password hash, but not always *only* that document: robot-family
//! firmware appends further JSON content and stray bytes after the first
//! document, so extraction must take the first complete JSON value and
//! discard the rest. Parsing the whole plaintext as a single document is a
//! known-insufficient strategy that fails with a trailing-data error on
//! those devices.

use aes::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use zeroize::{Zeroize, Zeroizing};

use crate::config::Config;
use crate::error::{DecryptStage, DysonError, Result};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// JSON field carrying the broker password in the credential document.
const PASSWORD_FIELD: &str = "apPasswordHash";

/// Credentials for a device's on-device MQTT broker.
///
/// Never persisted by this crate; zeroized when dropped. Ownership passes
/// to the caller on return.
#[derive(Clone, Zeroize, zeroize::ZeroizeOnDrop)]
pub struct LocalCredentials {
    /// Broker username. By convention the device serial number.
    pub username: String,
    /// Broker password recovered from the encrypted blob.
    pub password: String,
}

impl std::fmt::Debug for LocalCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decrypt a device's base64-encoded local credential blob.
///
/// `serial` becomes the username; the password is extracted from the
/// decrypted JSON document. Fails with
/// [`DysonError::Decryption`] tagged with the stage that broke. On any
/// failure past the base64 stage the full decrypted text is emitted at
/// debug log level (and only there) so that new malformed-payload shapes
/// can be identified without re-running the decryption by hand.
pub fn decrypt_local_credentials(
    config: &Config,
    encrypted: &str,
    serial: &str,
) -> Result<LocalCredentials> {
    let ciphertext = BASE64.decode(encrypted.trim()).map_err(|e| {
        log::debug!("local credential blob is not valid base64: {e}");
        DysonError::decryption(DecryptStage::Base64)
    })?;

    let plaintext = decrypt_cbc(config, &ciphertext)?;

    let text = match std::str::from_utf8(&plaintext) {
        Ok(text) => text,
        Err(_) => {
            log::debug!(
                "decrypted local credentials are not UTF-8: {:?}",
                String::from_utf8_lossy(&plaintext)
            );
            return Err(DysonError::decryption(DecryptStage::Cipher));
        }
    };

    let document = first_json_document(text).ok_or_else(|| {
        log::debug!("no JSON document at start of decrypted local credentials: {text}");
        DysonError::decryption(DecryptStage::JsonExtract)
    })?;

    let password = document
        .get(PASSWORD_FIELD)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            log::debug!("decrypted local credentials lack '{PASSWORD_FIELD}': {text}");
            DysonError::decryption(DecryptStage::FieldMissing)
        })?;

    Ok(LocalCredentials {
        username: serial.to_string(),
        password: password.to_string(),
    })
}

/// AES-256-CBC decrypt and strip trailing padding.
///
/// Device firmware is inconsistent about padding: most products emit
/// PKCS#7, some pad with NUL bytes to the block size. Both are stripped.
fn decrypt_cbc(config: &Config, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.is_empty() || ciphertext.len() % 16 != 0 {
        log::debug!(
            "local credential ciphertext has invalid length {}",
            ciphertext.len()
        );
        return Err(DysonError::decryption(DecryptStage::Cipher));
    }

    let decryptor = Aes256CbcDec::new(
        (&config.local_credentials_key).into(),
        (&config.local_credentials_iv).into(),
    );
    let mut plaintext = Zeroizing::new(
        decryptor
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(|_| DysonError::decryption(DecryptStage::Cipher))?,
    );

    strip_trailing_padding(&mut plaintext);
    Ok(plaintext)
}

/// Remove well-formed PKCS#7 padding, or failing that, trailing NULs.
///
/// JSON plaintext always ends in `}` (0x7d), which can never be mistaken
/// for a PKCS#7 pad byte.
fn strip_trailing_padding(plaintext: &mut Vec<u8>) {
    if let Some(&last) = plaintext.last() {
        let pad = last as usize;
        if (1..=16).contains(&pad)
            && plaintext.len() >= pad
            && plaintext[plaintext.len() - pad..].iter().all(|&b| b == last)
        {
            plaintext.truncate(plaintext.len() - pad);
            return;
        }
    }
    while plaintext.last() == Some(&0) {
        plaintext.pop();
    }
}

/// Parse the first complete JSON value at the start of `text`, ignoring
/// whatever follows it.
fn first_json_document(text: &str) -> Option<serde_json::Value> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<serde_json::Value>();
    match stream.next() {
        Some(Ok(value)) => Some(value),
        _ => None,
    }
}
