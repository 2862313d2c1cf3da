//! CIDR address filter masks in multiaddr-style textual form.
//!
//! The textual form follows the `/ip4/192.168.0.0/ipcidr/16` notation
//! (equivalent to the standard CIDR `192.168.0.0/16`); the structured form
//! is an [`IpNet`]. Conversion between the two is lossless for every mask
//! this crate writes, so persisted text and live structure always describe
//! the same range.

use std::fmt;
use std::net::{AddrParseError, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use thiserror::Error;

/// What a matching filter does to a connection attempt. Only denial is
/// modelled here; the surrounding system knows no other action for address
/// filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterAction {
    Deny,
}

#[derive(Debug, Error)]
pub enum FilterMaskError {
    #[error("invalid filter format: {0}")]
    InvalidFormat(String),
    #[error("invalid ip address in filter: {0}")]
    InvalidIp(#[from] AddrParseError),
    #[error("invalid prefix length: {0}")]
    InvalidPrefix(String),
}

/// An address-range mask. Equality and hashing are by value, so the same
/// range parsed twice compares equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterMask {
    net: IpNet,
}

impl FilterMask {
    pub fn new(net: IpNet) -> Self {
        Self { net }
    }

    /// The structured form handed to the live enforcement structure.
    pub fn ip_net(&self) -> IpNet {
        self.net
    }
}

impl From<IpNet> for FilterMask {
    fn from(net: IpNet) -> Self {
        Self::new(net)
    }
}

impl FromStr for FilterMask {
    type Err = FilterMaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('/').collect();
        let net = match segments.as_slice() {
            ["", "ip4", addr, "ipcidr", prefix] => {
                let prefix: u8 = prefix
                    .parse()
                    .map_err(|_| FilterMaskError::InvalidPrefix((*prefix).to_string()))?;
                IpNet::V4(
                    Ipv4Net::new(addr.parse::<Ipv4Addr>()?, prefix)
                        .map_err(|_| FilterMaskError::InvalidPrefix(format!("/{prefix} for ip4")))?,
                )
            }
            ["", "ip6", addr, "ipcidr", prefix] => {
                let prefix: u8 = prefix
                    .parse()
                    .map_err(|_| FilterMaskError::InvalidPrefix((*prefix).to_string()))?;
                IpNet::V6(
                    Ipv6Net::new(addr.parse::<Ipv6Addr>()?, prefix)
                        .map_err(|_| FilterMaskError::InvalidPrefix(format!("/{prefix} for ip6")))?,
                )
            }
            _ => return Err(FilterMaskError::InvalidFormat(s.to_string())),
        };
        Ok(Self { net })
    }
}

impl fmt::Display for FilterMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.net {
            IpNet::V4(net) => write!(f, "/ip4/{}/ipcidr/{}", net.addr(), net.prefix_len()),
            IpNet::V6(net) => write!(f, "/ip6/{}/ipcidr/{}", net.addr(), net.prefix_len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_round_trip_ip4() {
        let text = "/ip4/192.168.0.0/ipcidr/16";
        let mask: FilterMask = text.parse().unwrap();
        assert_eq!(mask.to_string(), text);
        assert_eq!(mask.to_string().parse::<FilterMask>().unwrap(), mask);
    }

    #[test]
    fn test_round_trip_ip6() {
        let text = "/ip6/fe80::/ipcidr/10";
        let mask: FilterMask = text.parse().unwrap();
        assert_eq!(mask.to_string(), text);
    }

    #[test]
    fn test_equality_by_value() {
        let a: FilterMask = "/ip4/10.0.0.0/ipcidr/8".parse().unwrap();
        let b: FilterMask = "/ip4/10.0.0.0/ipcidr/8".parse().unwrap();
        assert_eq!(a, b);

        let c: FilterMask = "/ip4/10.0.0.0/ipcidr/16".parse().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_rejects_plain_cidr() {
        assert_matches!(
            "192.168.0.0/16".parse::<FilterMask>(),
            Err(FilterMaskError::InvalidFormat(_))
        );
    }

    #[test]
    fn test_rejects_wrong_family() {
        assert_matches!(
            "/ip4/fe80::/ipcidr/10".parse::<FilterMask>(),
            Err(FilterMaskError::InvalidIp(_))
        );
    }

    #[test]
    fn test_rejects_oversized_prefix() {
        assert_matches!(
            "/ip4/10.0.0.0/ipcidr/33".parse::<FilterMask>(),
            Err(FilterMaskError::InvalidPrefix(_))
        );
    }

    #[test]
    fn test_rejects_missing_ipcidr_marker() {
        assert_matches!(
            "/ip4/10.0.0.0/tcp/8".parse::<FilterMask>(),
            Err(FilterMaskError::InvalidFormat(_))
        );
    }
}
