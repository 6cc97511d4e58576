//! IPv4/IPv6 addresses with a prefix length
//!
//! A [`MaskedIp`] is both a single host (`/32`, `/128`) and a CIDR network.
//! Two values match when they agree on the leading bits covered by the
//! shorter of the two prefixes.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// An address plus prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskedIp {
    v6: bool,
    /// IPv4 addresses live in the low 32 bits
    address: u128,
    prefix: u8,
}

impl MaskedIp {
    /// Build an IPv4 network. Returns `None` if `prefix > 32`.
    pub fn v4(address: Ipv4Addr, prefix: u8) -> Option<Self> {
        (prefix <= 32).then(|| MaskedIp {
            v6: false,
            address: u128::from(u32::from(address)),
            prefix,
        })
    }

    /// Build an IPv6 network. Returns `None` if `prefix > 128`.
    pub fn v6(address: Ipv6Addr, prefix: u8) -> Option<Self> {
        (prefix <= 128).then(|| MaskedIp {
            v6: true,
            address: u128::from(address),
            prefix,
        })
    }

    /// Parse `a.b.c.d[/len]` or an IPv6 address with optional `/len`
    ///
    /// Without a suffix the prefix covers the whole address. Anything with a
    /// colon is read as IPv6.
    ///
    /// # Examples
    /// ```
    /// use iam_policy::iam::MaskedIp;
    ///
    /// let net = MaskedIp::parse("192.168.1.0/24").unwrap();
    /// let host = MaskedIp::parse("192.168.1.7").unwrap();
    /// assert!(net.matches(&host));
    /// assert!(MaskedIp::parse("192.168.1.1/33").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }

        let v6 = text.contains(':');
        let width: u32 = if v6 { 128 } else { 32 };

        let (address, prefix) = match text.split_once('/') {
            Some((address, prefix)) => {
                if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let prefix: u32 = prefix.parse().ok()?;
                if prefix > width {
                    return None;
                }
                (address, prefix as u8)
            }
            None => (text, width as u8),
        };

        if v6 {
            Self::v6(address.parse().ok()?, prefix)
        } else {
            Self::v4(address.parse().ok()?, prefix)
        }
    }

    /// Whether this is an IPv6 value
    pub fn is_v6(&self) -> bool {
        self.v6
    }

    /// Prefix length in bits
    pub fn prefix_len(&self) -> u8 {
        self.prefix
    }

    /// Raw address bits, IPv4 right-aligned
    pub fn address_bits(&self) -> u128 {
        self.address
    }

    /// Address width in bits (32 or 128)
    pub fn width(&self) -> u32 {
        if self.v6 {
            128
        } else {
            32
        }
    }

    /// Network containment test
    ///
    /// Compares the top `min(self.prefix, other.prefix)` bits. Values of
    /// different IP versions never match.
    pub fn matches(&self, other: &MaskedIp) -> bool {
        if self.v6 != other.v6 {
            return false;
        }
        let shift = self.width() - u32::from(self.prefix.min(other.prefix));
        // /0 shifts everything out
        let lhs = self.address.checked_shr(shift).unwrap_or(0);
        let rhs = other.address.checked_shr(shift).unwrap_or(0);
        lhs == rhs
    }
}

impl fmt::Display for MaskedIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.v6 {
            let segments = Ipv6Addr::from(self.address).segments();
            for (i, segment) in segments.iter().enumerate() {
                if i > 0 {
                    f.write_str(":")?;
                }
                write!(f, "{:x}", segment)?;
            }
        } else {
            write!(f, "{}", Ipv4Addr::from(self.address as u32))?;
        }
        write!(f, "/{}", self.prefix)
    }
}
