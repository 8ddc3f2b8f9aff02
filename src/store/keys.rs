//! Typed key builder for the registry's store namespace.
//!
//! Every key starts with a one-byte [`KeyPrefix`]. Because the prefix enum
//! is `#[repr(u8)]`, two families sharing a discriminant is a compile error,
//! which keeps the key families disjoint. Pool ids are appended big-endian
//! so byte order matches numeric order and prefix scans come back sorted.

use std::fmt;

use crate::domain::PoolId;

/// Length of an encoded pool key: prefix byte plus a big-endian `u64`.
pub const POOL_KEY_LEN: usize = 1 + std::mem::size_of::<u64>();

/// Leading byte of every key written by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum KeyPrefix {
    /// Singleton holding the next pool id to assign.
    NextPoolNumber = 0x01,
    /// One record per pool, suffixed with the big-endian pool id.
    Pool = 0x02,
    /// Singleton holding the module [`crate::domain::Params`].
    Params = 0x03,
}

impl KeyPrefix {
    /// Returns the raw prefix byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Returns the prefix as a one-byte slice, suitable for prefix scans.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::NextPoolNumber => &[0x01],
            Self::Pool => &[0x02],
            Self::Params => &[0x03],
        }
    }

    const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::NextPoolNumber),
            0x02 => Some(Self::Pool),
            0x03 => Some(Self::Params),
            _ => None,
        }
    }
}

/// A logical key in the registry namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The global pool counter.
    NextPoolNumber,
    /// The record of a single pool.
    Pool(PoolId),
    /// The module parameters.
    Params,
}

impl StoreKey {
    /// Returns the prefix family this key belongs to.
    #[must_use]
    pub const fn prefix(&self) -> KeyPrefix {
        match self {
            Self::NextPoolNumber => KeyPrefix::NextPoolNumber,
            Self::Pool(_) => KeyPrefix::Pool,
            Self::Params => KeyPrefix::Params,
        }
    }

    /// Encodes the key into its byte form.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::NextPoolNumber | Self::Params => self.prefix().as_bytes().to_vec(),
            Self::Pool(id) => {
                let mut key = Vec::with_capacity(POOL_KEY_LEN);
                key.push(KeyPrefix::Pool.byte());
                key.extend_from_slice(&id.get().to_be_bytes());
                key
            }
        }
    }

    /// Decodes a byte key produced by [`StoreKey::encode`].
    ///
    /// Returns `None` for bytes that no registry key encodes to.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&first, rest) = bytes.split_first()?;
        match KeyPrefix::from_byte(first)? {
            KeyPrefix::NextPoolNumber if rest.is_empty() => Some(Self::NextPoolNumber),
            KeyPrefix::Params if rest.is_empty() => Some(Self::Params),
            KeyPrefix::Pool => {
                let id: [u8; 8] = rest.try_into().ok()?;
                Some(Self::Pool(PoolId::new(u64::from_be_bytes(id))))
            }
            _ => None,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.encode()))
    }
}
