//! Dotted-quad IPv4 codec.
//!
//! Addresses are encoded as a base-256 positional integer, so integer order
//! matches the order of the dotted-quad octets.

use crate::{Error, Result};

/// Encoded IPv4 address. Ordering matches dotted-quad ordering.
pub type IpKey = u32;

/// Encode a dotted-quad address such as `192.168.1.1` into an [`IpKey`].
///
/// The input must be exactly four decimal octets in `[0, 255]` separated by
/// `.` characters. No surrounding whitespace, signs or empty octets are
/// accepted.
///
/// # Examples
/// ```
/// use fwrule::ip;
///
/// assert_eq!(ip::encode("0.0.1.0").unwrap(), 256);
/// assert!(ip::encode("10.0.0.1").unwrap() < ip::encode("10.0.0.200").unwrap());
/// assert!(ip::encode("999.1.1.1").is_err());
/// ```
pub fn encode(text: &str) -> Result<IpKey> {
    let mut key: IpKey = 0;
    let mut count = 0;

    for octet in text.split('.') {
        count += 1;
        if count > 4 {
            return Err(malformed(text));
        }
        key = (key << 8) | IpKey::from(parse_octet(octet).ok_or_else(|| malformed(text))?);
    }

    if count != 4 {
        return Err(malformed(text));
    }
    Ok(key)
}

/// Decode an [`IpKey`] back into dotted-quad text.
pub fn decode(key: IpKey) -> String {
    let [a, b, c, d] = key.to_be_bytes();
    format!("{a}.{b}.{c}.{d}")
}

fn parse_octet(octet: &str) -> Option<u8> {
    // u8::from_str accepts a leading '+', which is not a decimal octet
    if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    octet.parse().ok()
}

fn malformed(text: &str) -> Error {
    Error::MalformedAddress(text.to_string())
}
