//! Block cipher layer: AES-256-CBC with PKCS#7 padding, keyed by the
//! client's build string.

use aes::cipher::{
  BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7,
};

use crate::error::{Error, Result};

type Decryptor = cbc::Decryptor<aes::Aes256>;
type Encryptor = cbc::Encryptor<aes::Aes256>;

const KEY_PREFIX: &str = "osu!-scoreburgr---------";
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Derives the symmetric key from the client build string (`"20210520"`).
pub(crate) struct ScoreKey(Vec<u8>);

impl ScoreKey {
  pub(crate) fn for_version(osu_version: &str) -> Result<Self> {
    let key = format!("{KEY_PREFIX}{osu_version}").into_bytes();
    if key.len() != KEY_LEN {
      return Err(Error::KeyLength(key.len(), osu_version.to_owned()));
    }
    Ok(Self(key))
  }

  pub(crate) fn decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != IV_LEN {
      return Err(Error::IvLength(iv.len()));
    }
    Decryptor::new_from_slices(&self.0, iv)
      .map_err(|_| Error::IvLength(iv.len()))?
      .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
      .map_err(|_| Error::Unpad)
  }

  pub(crate) fn encrypt(&self, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != IV_LEN {
      return Err(Error::IvLength(iv.len()));
    }
    let enc = Encryptor::new_from_slices(&self.0, iv)
      .map_err(|_| Error::IvLength(iv.len()))?;
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn key_requires_eight_char_build() {
    assert!(ScoreKey::for_version("20210520").is_ok());
    assert!(matches!(
      ScoreKey::for_version("2021052"),
      Err(Error::KeyLength(31, _))
    ));
  }

  #[test]
  fn wrong_key_fails_to_unpad_or_garbles() {
    let iv = [7u8; IV_LEN];
    let a = ScoreKey::for_version("20210520").unwrap();
    let b = ScoreKey::for_version("20990101").unwrap();
    let ct = a.encrypt(&iv, b"hello:world").unwrap();
    assert_eq!(a.decrypt(&iv, &ct).unwrap(), b"hello:world");
    match b.decrypt(&iv, &ct) {
      Err(Error::Unpad) => {}
      Ok(pt) => assert_ne!(pt, b"hello:world"),
      Err(other) => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn short_iv_is_rejected() {
    let key = ScoreKey::for_version("20210520").unwrap();
    assert!(matches!(key.decrypt(&[0u8; 8], &[0u8; 16]), Err(Error::IvLength(8))));
  }

  #[test]
  fn truncated_ciphertext_is_rejected() {
    let key = ScoreKey::for_version("20210520").unwrap();
    assert!(matches!(
      key.decrypt(&[0u8; IV_LEN], &[1u8; 15]),
      Err(Error::Unpad)
    ));
  }
}
