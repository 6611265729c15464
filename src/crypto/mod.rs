//! Symmetric encryption of robot secret values.
//!
//! [`AgeCipher`] uses age's scrypt passphrase recipient: the key is the
//! passphrase, the binary age file is base64-encoded so a ciphertext fits
//! on one line (and in one `-d` flag value).

use age::secrecy::SecretString;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::{Read, Write};
use thiserror::Error;

/// Technical failure of an encrypt/decrypt call
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("crypto key must not be empty")]
    EmptyKey,
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("encryption failed: {0}")]
    Encrypt(#[from] age::EncryptError),
    #[error("decryption failed: {0}")]
    Decrypt(#[from] age::DecryptError),
    #[error("decrypted value is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("crypto I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encrypt/decrypt contract used by the command engine.
pub trait Cipher {
    fn encrypt(&self, key: &str, plaintext: &str) -> Result<String, CryptoError>;
    fn decrypt(&self, key: &str, ciphertext: &str) -> Result<String, CryptoError>;
}

/// age passphrase cipher
#[derive(Debug, Clone, Default)]
pub struct AgeCipher {
    /// log2 of the scrypt work factor; `None` lets age pick its default
    work_factor: Option<u8>,
}

impl AgeCipher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed scrypt work factor (log2). Low values are only for tests.
    pub fn with_work_factor(log_n: u8) -> Self {
        Self {
            work_factor: Some(log_n),
        }
    }
}

fn passphrase(key: &str) -> Result<SecretString, CryptoError> {
    if key.is_empty() {
        return Err(CryptoError::EmptyKey);
    }
    Ok(SecretString::from(key.to_string()))
}

impl Cipher for AgeCipher {
    fn encrypt(&self, key: &str, plaintext: &str) -> Result<String, CryptoError> {
        let mut recipient = age::scrypt::Recipient::new(passphrase(key)?);
        if let Some(log_n) = self.work_factor {
            recipient.set_work_factor(log_n);
        }
        let encryptor =
            age::Encryptor::with_recipients(std::iter::once(&recipient as &dyn age::Recipient))?;

        let mut encrypted = Vec::new();
        {
            let mut writer = encryptor.wrap_output(&mut encrypted)?;
            writer.write_all(plaintext.as_bytes())?;
            writer.finish()?;
        }

        Ok(STANDARD.encode(encrypted))
    }

    fn decrypt(&self, key: &str, ciphertext: &str) -> Result<String, CryptoError> {
        let identity = age::scrypt::Identity::new(passphrase(key)?);
        let encrypted = STANDARD.decode(ciphertext.trim())?;

        let decryptor = age::Decryptor::new(&encrypted[..])?;
        let mut decrypted = Vec::new();
        let mut reader = decryptor.decrypt(std::iter::once(&identity as &dyn age::Identity))?;
        reader.read_to_end(&mut decrypted)?;

        Ok(String::from_utf8(decrypted)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> AgeCipher {
        AgeCipher::with_work_factor(2)
    }

    #[test]
    fn test_round_trip() {
        let cipher = cipher();
        let encrypted = cipher.encrypt("secret", "hello").unwrap();
        assert_ne!(encrypted, "hello");
        assert!(!encrypted.contains('\n'));
        assert_eq!(cipher.decrypt("secret", &encrypted).unwrap(), "hello");
    }

    #[test]
    fn test_wrong_key_never_yields_plaintext() {
        let cipher = cipher();
        let encrypted = cipher.encrypt("secret", "hello").unwrap();
        match cipher.decrypt("other", &encrypted) {
            Ok(value) => assert_ne!(value, "hello"),
            Err(e) => assert!(matches!(e, CryptoError::Decrypt(_))),
        }
    }

    #[test]
    fn test_malformed_ciphertext() {
        let cipher = cipher();
        assert!(matches!(
            cipher.decrypt("secret", "%%% not base64 %%%"),
            Err(CryptoError::Encoding(_))
        ));
        assert!(matches!(
            cipher.decrypt("secret", &STANDARD.encode(b"not an age file")),
            Err(CryptoError::Decrypt(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(cipher().encrypt("", "hello"), Err(CryptoError::EmptyKey)));
    }
}
