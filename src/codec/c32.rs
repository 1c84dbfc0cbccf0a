//! c32check address encoding.
//!
//! Stacks addresses are `S` + c32(version) + c32(hash160 ‖ checksum),
//! where the checksum is the first 4 bytes of a double SHA-256 over
//! `version ‖ hash160`. c32 is Crockford base32 without `I L O U`.

use std::fmt;
use std::str::FromStr;

use hmac_sha256::Hash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DecodeError;

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Mainnet single-signature address version (`SP…`).
pub const MAINNET_SINGLE_SIG: u8 = 22;
/// Mainnet multi-signature address version (`SM…`).
pub const MAINNET_MULTI_SIG: u8 = 20;
/// Testnet single-signature address version (`ST…`).
pub const TESTNET_SINGLE_SIG: u8 = 26;
/// Testnet multi-signature address version (`SN…`).
pub const TESTNET_MULTI_SIG: u8 = 21;
/// Highest version with a single c32 digit.
pub const MAX_VERSION: u8 = 31;

/// A standard principal: address version plus the 20-byte key hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StandardPrincipal {
    pub version: u8,
    pub hash160: [u8; 20],
}

impl StandardPrincipal {
    pub const fn new(version: u8, hash160: [u8; 20]) -> Self {
        Self { version, hash160 }
    }

    /// Like `new`, but rejects versions that have no address form.
    pub fn checked(version: u8, hash160: [u8; 20]) -> Result<Self, DecodeError> {
        if version > MAX_VERSION {
            return Err(DecodeError::InvalidAddress(format!(
                "version {version} exceeds {MAX_VERSION}"
            )));
        }
        Ok(Self::new(version, hash160))
    }

    /// Whether the address version belongs to mainnet.
    pub const fn is_mainnet(&self) -> bool {
        matches!(self.version, MAINNET_SINGLE_SIG | MAINNET_MULTI_SIG)
    }

    /// Render as a c32check address string.
    ///
    /// A version above `MAX_VERSION` renders as `?`, which never parses back.
    pub fn to_address(&self) -> String {
        let mut payload = Vec::with_capacity(24);
        payload.extend_from_slice(&self.hash160);
        payload.extend_from_slice(&checksum(self.version, &self.hash160));

        let mut out = String::with_capacity(41);
        out.push('S');
        let version_digit = C32_ALPHABET
            .get(usize::from(self.version))
            .map_or('?', |&d| char::from(d));
        out.push(version_digit);
        out.push_str(&c32_encode(&payload));
        out
    }

    /// Parse and checksum-verify a c32check address.
    pub fn from_address(address: &str) -> Result<Self, DecodeError> {
        let invalid = || DecodeError::InvalidAddress(address.to_string());

        let rest = address.strip_prefix('S').ok_or_else(invalid)?;
        let mut chars = rest.chars();
        let version_char = chars.next().ok_or_else(invalid)?;
        let version = c32_digit(version_char).ok_or_else(invalid)?;

        let payload = c32_decode(chars.as_str()).ok_or_else(invalid)?;
        if payload.len() != 24 {
            return Err(invalid());
        }

        let (hash, sum) = payload.split_at(20);
        let mut hash160 = [0u8; 20];
        hash160.copy_from_slice(hash);

        if sum != checksum(version, &hash160) {
            return Err(DecodeError::ChecksumMismatch);
        }

        Ok(Self { version, hash160 })
    }
}

impl fmt::Display for StandardPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl FromStr for StandardPrincipal {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl Serialize for StandardPrincipal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_address())
    }
}

impl<'de> Deserialize<'de> for StandardPrincipal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_address(&s).map_err(serde::de::Error::custom)
    }
}

fn checksum(version: u8, hash160: &[u8; 20]) -> [u8; 4] {
    let mut data = Vec::with_capacity(21);
    data.push(version);
    data.extend_from_slice(hash160);
    let first = Hash::hash(&data);
    let second = Hash::hash(&first);
    [second[0], second[1], second[2], second[3]]
}

fn c32_digit(c: char) -> Option<u8> {
    // Crockford normalisation: O -> 0, I/L -> 1, case-insensitive.
    let c = match c.to_ascii_uppercase() {
        'O' => '0',
        'I' | 'L' => '1',
        other => other,
    };
    C32_ALPHABET
        .iter()
        .position(|&d| d as char == c)
        .and_then(|p| u8::try_from(p).ok())
}

/// Base32-encode bytes as a big-endian integer, keeping one `0`
/// per leading zero byte.
fn c32_encode(bytes: &[u8]) -> String {
    let leading_zeros = bytes.iter().take_while(|&&b| b == 0).count();

    let mut number: Vec<u8> = bytes[leading_zeros..].to_vec();
    let mut digits = Vec::new();
    while !number.is_empty() {
        let mut remainder = 0u32;
        let mut quotient = Vec::with_capacity(number.len());
        for &byte in &number {
            let acc = (remainder << 8) | u32::from(byte);
            let q = acc / 32;
            remainder = acc % 32;
            if !(quotient.is_empty() && q == 0) {
                quotient.push(q as u8);
            }
        }
        digits.push(C32_ALPHABET[remainder as usize]);
        number = quotient;
    }

    let mut out = String::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat_n('0', leading_zeros));
    out.extend(digits.iter().rev().map(|&d| d as char));
    out
}

fn c32_decode(input: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = input.chars().map(c32_digit).collect::<Option<_>>()?;
    let leading_zeros = digits.iter().take_while(|&&d| d == 0).count();

    // Little-endian base-256 accumulator.
    let mut number: Vec<u8> = Vec::new();
    for &digit in &digits[leading_zeros..] {
        let mut carry = u32::from(digit);
        for byte in &mut number {
            let acc = u32::from(*byte) * 32 + carry;
            *byte = (acc & 0xff) as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            number.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; leading_zeros];
    out.extend(number.iter().rev());
    Some(out)
}
