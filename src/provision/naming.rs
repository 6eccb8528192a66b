//! Local validation of resource names and address prefixes.
//!
//! These checks run before any remote call so that a malformed request never
//! reaches the provider.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv4Addr;

static RESOURCE_GROUP_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-\w\.\(\)]{1,90}$").expect("valid resource group regex")
});

static STORAGE_ACCOUNT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]{3,24}$").expect("valid storage account regex"));

static RESOURCE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\.\-]{0,79}$").expect("valid resource name regex")
});

/// Resource group: 1-90 word characters, hyphens, periods or parentheses,
/// not ending in a period.
pub fn validate_resource_group_name(name: &str) -> Result<()> {
    if !RESOURCE_GROUP_NAME.is_match(name) || name.ends_with('.') {
        return Err(Error::invalid_parameter(
            "resource_group",
            format!(
                "'{}' must be 1-90 letters, digits, '_', '-', '.', '(' or ')' and must not end with '.'",
                name
            ),
        ));
    }
    Ok(())
}

/// Storage account: 3-24 lowercase letters or digits.
pub fn validate_storage_account_name(name: &str) -> Result<()> {
    if !STORAGE_ACCOUNT_NAME.is_match(name) {
        return Err(Error::invalid_parameter(
            "name",
            format!("storage account name '{}' must be 3-24 lowercase letters or digits", name),
        ));
    }
    Ok(())
}

/// Network and compute resources: 1-80 characters, starting with a letter
/// or digit.
pub fn validate_resource_name(field: &str, name: &str) -> Result<()> {
    if !RESOURCE_NAME.is_match(name) {
        return Err(Error::invalid_parameter(
            field,
            format!(
                "'{}' must be 1-80 letters, digits, '_', '.' or '-', starting with a letter or digit",
                name
            ),
        ));
    }
    Ok(())
}

/// An IPv4 address prefix such as `10.0.0.0/16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Cidr {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
}

impl Ipv4Cidr {
    /// Parses `a.b.c.d/n` with `n <= 32`.
    pub fn parse(field: &str, input: &str) -> Result<Self> {
        let invalid = || {
            Error::invalid_parameter(
                field,
                format!("'{}' is not an IPv4 CIDR block (a.b.c.d/n)", input),
            )
        };
        let (address, prefix) = input.trim().split_once('/').ok_or_else(invalid)?;
        let address: Ipv4Addr = address.parse().map_err(|_| invalid())?;
        let prefix_len: u8 = prefix.parse().map_err(|_| invalid())?;
        if prefix_len > 32 {
            return Err(invalid());
        }
        Ok(Self {
            address,
            prefix_len,
        })
    }

    fn mask(&self) -> u32 {
        match self.prefix_len {
            0 => 0,
            n => u32::MAX << (32 - u32::from(n)),
        }
    }

    /// First address of the block.
    pub fn network(&self) -> u32 {
        u32::from(self.address) & self.mask()
    }

    /// Returns true if `other` lies entirely within this block.
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix_len >= self.prefix_len && (other.network() & self.mask()) == self.network()
    }
}

/// Validates both prefixes and checks that the subnet lies within the network.
pub fn validate_subnet_within(network_prefix: &str, subnet_prefix: &str) -> Result<()> {
    let network = Ipv4Cidr::parse("network_prefix", network_prefix)?;
    let subnet = Ipv4Cidr::parse("subnet_prefix", subnet_prefix)?;
    if !network.contains(&subnet) {
        return Err(Error::invalid_parameter(
            "subnet_prefix",
            format!(
                "subnet {} is not within network {}",
                subnet_prefix, network_prefix
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_group_names() {
        assert!(validate_resource_group_name("Test").is_ok());
        assert!(validate_resource_group_name("my-rg_(prod).1").is_ok());
        assert!(validate_resource_group_name("").is_err());
        assert!(validate_resource_group_name("ends.").is_err());
        assert!(validate_resource_group_name("has space").is_err());
        assert!(validate_resource_group_name(&"a".repeat(91)).is_err());
    }

    #[test]
    fn test_storage_account_names() {
        assert!(validate_storage_account_name("storageacc1").is_ok());
        assert!(validate_storage_account_name("abc").is_ok());
        assert!(validate_storage_account_name("ab").is_err());
        assert!(validate_storage_account_name("StorageAcc1").is_err());
        assert!(validate_storage_account_name("storage-acc").is_err());
        assert!(validate_storage_account_name(&"a".repeat(25)).is_err());
    }

    #[test]
    fn test_resource_names() {
        assert!(validate_resource_name("name", "nic1").is_ok());
        assert!(validate_resource_name("name", "web-01.prod").is_ok());
        assert!(validate_resource_name("name", "-nic").is_err());
        let err = validate_resource_name("interface_name", "").unwrap_err();
        assert!(err.to_string().contains("interface_name"));
    }

    #[test]
    fn test_cidr_parse() {
        let cidr = Ipv4Cidr::parse("prefix", "10.0.0.0/16").unwrap();
        assert_eq!(cidr.prefix_len, 16);
        assert!(Ipv4Cidr::parse("prefix", "10.0.0.0").is_err());
        assert!(Ipv4Cidr::parse("prefix", "10.0.0.0/33").is_err());
        assert!(Ipv4Cidr::parse("prefix", "10.0.0.256/24").is_err());
        assert!(Ipv4Cidr::parse("prefix", "0.0.0.0/0").is_ok());
    }

    #[test]
    fn test_subnet_within_network() {
        assert!(validate_subnet_within("10.0.0.0/16", "10.0.0.0/24").is_ok());
        assert!(validate_subnet_within("10.0.0.0/16", "10.0.255.0/24").is_ok());
        assert!(validate_subnet_within("10.0.0.0/16", "10.1.0.0/24").is_err());
        assert!(validate_subnet_within("10.0.0.0/24", "10.0.0.0/16").is_err());
        assert!(validate_subnet_within("0.0.0.0/0", "192.168.1.0/24").is_ok());
    }
}
