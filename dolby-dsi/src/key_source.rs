//! Encryption key sources for protected packaging.
//!
//! Descriptor parsing never touches keys; this module is the contract a
//! packaging pipeline uses next to it. [`FixedKeySource`] serves a single key
//! given on the command line or in a test.

use std::fmt;

use anyhow::{Result, bail};
use log::warn;

use crate::utils::errors::KeyError;

/// `edef8ba9-79d6-4ace-a3c8-27dcd51d21ed`
pub const WIDEVINE_SYSTEM_ID: [u8; 16] = [
    0xed, 0xef, 0x8b, 0xa9, 0x79, 0xd6, 0x4a, 0xce, 0xa3, 0xc8, 0x27, 0xdc, 0xd5, 0x1d, 0x21, 0xed,
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackType {
    #[default]
    Unknown,
    Unspecified,
    Sd,
    Hd,
    Audio,
}

impl From<&str> for TrackType {
    fn from(value: &str) -> Self {
        match value {
            "SD" => Self::Sd,
            "HD" => Self::Hd,
            "AUDIO" => Self::Audio,
            "UNSPECIFIED" => Self::Unspecified,
            _ => {
                warn!("Unexpected track type: {value}");
                Self::Unknown
            }
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sd => "SD",
            Self::Hd => "HD",
            Self::Audio => "AUDIO",
            Self::Unknown | Self::Unspecified => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Data for one `pssh` box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionSystemInfo {
    pub system_id: [u8; 16],
    pub key_ids: Vec<Vec<u8>>,
    pub pssh_version: u8,
    pub pssh_data: Vec<u8>,
}

impl ProtectionSystemInfo {
    fn widevine(key_id: &[u8], pssh_data: Vec<u8>) -> Self {
        Self {
            system_id: WIDEVINE_SYSTEM_ID,
            key_ids: vec![key_id.to_vec()],
            pssh_version: 0,
            pssh_data,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    pub key_id: Vec<u8>,
    pub key: Vec<u8>,
    /// Empty when the packager should generate one.
    pub iv: Vec<u8>,
    pub key_system_info: Vec<ProtectionSystemInfo>,
}

/// What a key server is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest<'a> {
    ContentId { content_id: &'a [u8], policy: &'a str },
    PsshBox(&'a [u8]),
    KeyIds(&'a [Vec<u8>]),
    AssetId(u32),
}

pub trait KeySource {
    /// Fetches keys ahead of [`KeySource::get_key`] calls.
    fn fetch_keys(&mut self, request: &FetchRequest) -> Result<()>;

    fn get_key(&self, track_type: TrackType) -> Result<EncryptionKey>;

    /// # Errors
    ///
    /// [`KeyError::KeyNotFound`] when no key carries `key_id`.
    fn get_key_by_id(&self, key_id: &[u8]) -> Result<EncryptionKey>;
}

/// Serves one key for every track.
#[derive(Debug, Clone)]
pub struct FixedKeySource {
    key: EncryptionKey,
}

impl FixedKeySource {
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    /// Builds a source from hex strings. `pssh_data_hex` and `iv_hex` may be
    /// empty, `key_id_hex` and `key_hex` may not. The key is announced under
    /// the Widevine system id.
    pub fn from_hex_strings(
        key_id_hex: &str,
        key_hex: &str,
        pssh_data_hex: &str,
        iv_hex: &str,
    ) -> Result<Self> {
        let key_id = decode_required_hex("key_id", key_id_hex)?;
        let key = decode_required_hex("key", key_hex)?;
        let pssh_data = decode_hex("pssh_data", pssh_data_hex)?;
        let iv = decode_hex("iv", iv_hex)?;

        let key_system_info = vec![ProtectionSystemInfo::widevine(&key_id, pssh_data)];

        Ok(Self::new(EncryptionKey {
            key_id,
            key,
            iv,
            key_system_info,
        }))
    }

    /// Key for `crypto_period_index`, derived by left-rotating the key id, key
    /// and pssh data by the index.
    ///
    /// Only for exercising key rotation in tests.
    #[cfg(any(test, feature = "test-key-rotation"))]
    pub fn crypto_period_key(
        &self,
        crypto_period_index: u32,
        _track_type: TrackType,
    ) -> Result<EncryptionKey> {
        warn!("This naive key rotation algorithm should not be used in production.");

        let mut key = self.key.clone();
        rotate_left(&mut key.key_id, crypto_period_index, "key_id")?;
        rotate_left(&mut key.key, crypto_period_index, "key")?;

        let mut pssh_data = self
            .key
            .key_system_info
            .first()
            .map(|info| info.pssh_data.clone())
            .unwrap_or_default();
        if !pssh_data.is_empty() {
            rotate_left(&mut pssh_data, crypto_period_index, "pssh_data")?;
        }

        key.key_system_info = vec![ProtectionSystemInfo::widevine(&key.key_id, pssh_data)];

        Ok(key)
    }
}

impl KeySource for FixedKeySource {
    fn fetch_keys(&mut self, _request: &FetchRequest) -> Result<()> {
        Ok(())
    }

    fn get_key(&self, _track_type: TrackType) -> Result<EncryptionKey> {
        Ok(self.key.clone())
    }

    fn get_key_by_id(&self, key_id: &[u8]) -> Result<EncryptionKey> {
        if key_id != self.key.key_id {
            bail!(KeyError::KeyNotFound(hex::encode_upper(key_id)));
        }

        Ok(self.key.clone())
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, KeyError> {
    hex::decode(value).map_err(|_| KeyError::InvalidHex {
        field,
        value: value.to_owned(),
    })
}

fn decode_required_hex(field: &'static str, value: &str) -> Result<Vec<u8>, KeyError> {
    let bytes = decode_hex(field, value)?;
    if bytes.is_empty() {
        return Err(KeyError::InvalidHex {
            field,
            value: value.to_owned(),
        });
    }
    Ok(bytes)
}

#[cfg(any(test, feature = "test-key-rotation"))]
fn rotate_left(bytes: &mut [u8], index: u32, field: &'static str) -> Result<(), KeyError> {
    if bytes.is_empty() {
        return Err(KeyError::EmptyRotationInput(field));
    }

    let mid = index as usize % bytes.len();
    bytes.rotate_left(mid);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ID: &str = "00112233445566778899aabbccddeeff";
    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn source(pssh_data_hex: &str, iv_hex: &str) -> Result<FixedKeySource> {
        FixedKeySource::from_hex_strings(KEY_ID, KEY, pssh_data_hex, iv_hex)
    }

    #[test]
    fn track_type_strings() {
        for (s, track_type) in [
            ("SD", TrackType::Sd),
            ("HD", TrackType::Hd),
            ("AUDIO", TrackType::Audio),
            ("UNSPECIFIED", TrackType::Unspecified),
            ("4K", TrackType::Unknown),
            ("sd", TrackType::Unknown),
        ] {
            assert_eq!(TrackType::from(s), track_type, "{s}");
        }

        assert_eq!(TrackType::Sd.to_string(), "SD");
        assert_eq!(TrackType::Hd.to_string(), "HD");
        assert_eq!(TrackType::Audio.to_string(), "AUDIO");
        assert_eq!(TrackType::Unspecified.to_string(), "UNKNOWN");
        assert_eq!(TrackType::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn fixed_key_from_hex() -> Result<()> {
        let source = source("", "")?;
        let key = source.get_key(TrackType::Audio)?;

        assert_eq!(hex::encode(&key.key_id), KEY_ID);
        assert_eq!(hex::encode(&key.key), KEY);
        assert!(key.iv.is_empty());

        let [info] = key.key_system_info.as_slice() else {
            panic!("expected one pssh entry");
        };
        assert_eq!(info.system_id, WIDEVINE_SYSTEM_ID);
        assert_eq!(info.key_ids, vec![key.key_id.clone()]);
        assert_eq!(info.pssh_version, 0);
        assert!(info.pssh_data.is_empty());

        assert_eq!(source.get_key(TrackType::Sd)?, key);

        Ok(())
    }

    #[test]
    fn optional_fields() -> Result<()> {
        let key = source("08011210", "f0f1f2f3f4f5f6f7")?.get_key(TrackType::Hd)?;

        assert_eq!(key.iv, vec![0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7]);
        assert_eq!(key.key_system_info[0].pssh_data, vec![0x08, 0x01, 0x12, 0x10]);

        Ok(())
    }

    #[test]
    fn invalid_hex() {
        let cases = [
            ("key_id", FixedKeySource::from_hex_strings("xyz", KEY, "", "")),
            ("key", FixedKeySource::from_hex_strings(KEY_ID, "012", "", "")),
            ("pssh_data", FixedKeySource::from_hex_strings(KEY_ID, KEY, "0g", "")),
            ("iv", FixedKeySource::from_hex_strings(KEY_ID, KEY, "", "iv")),
            ("key_id", FixedKeySource::from_hex_strings("", KEY, "", "")),
            ("key", FixedKeySource::from_hex_strings(KEY_ID, " ", "", "")),
            ("key", FixedKeySource::from_hex_strings(KEY_ID, "", "", "")),
        ];

        for (expected, result) in cases {
            let err = result.unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<KeyError>(),
                    Some(KeyError::InvalidHex { field, .. }) if *field == expected
                ),
                "{expected}: {err}"
            );
        }
    }

    #[test]
    fn key_lookup_by_id() -> Result<()> {
        let mut source = source("", "")?;
        source.fetch_keys(&FetchRequest::AssetId(7))?;

        let key_id = hex::decode(KEY_ID)?;
        assert_eq!(source.get_key_by_id(&key_id)?.key_id, key_id);

        let err = source.get_key_by_id(&[0xab, 0xcd]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeyError>(),
            Some(KeyError::KeyNotFound(id)) if id == "ABCD"
        ));

        Ok(())
    }

    #[test]
    fn crypto_period_rotation() -> Result<()> {
        let source = source("010203", "")?;

        let key = source.crypto_period_key(1, TrackType::Audio)?;
        assert_eq!(hex::encode(&key.key_id), "112233445566778899aabbccddeeff00");
        assert_eq!(hex::encode(&key.key), "23456789abcdef0123456789abcdef01");

        let [info] = key.key_system_info.as_slice() else {
            panic!("expected one pssh entry");
        };
        assert_eq!(info.pssh_data, vec![0x02, 0x03, 0x01]);
        assert_eq!(info.key_ids, vec![key.key_id.clone()]);
        assert_eq!(info.system_id, WIDEVINE_SYSTEM_ID);

        // whole periods wrap around
        let wrapped = source.crypto_period_key(16, TrackType::Audio)?;
        assert_eq!(hex::encode(&wrapped.key_id), KEY_ID);
        assert_eq!(wrapped.key_system_info[0].pssh_data, vec![0x02, 0x03, 0x01]);

        Ok(())
    }

    #[test]
    fn rotation_needs_key_material() -> Result<()> {
        let source = FixedKeySource::new(EncryptionKey::default());

        let err = source.crypto_period_key(3, TrackType::Sd).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeyError>(),
            Some(KeyError::EmptyRotationInput("key_id"))
        ));

        let empty_pssh = FixedKeySource::from_hex_strings(KEY_ID, KEY, "", "")?;
        let key = empty_pssh.crypto_period_key(3, TrackType::Sd)?;
        assert!(key.key_system_info[0].pssh_data.is_empty());

        Ok(())
    }
}
