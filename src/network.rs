//! IPv4 address lookup for the `ip` component, via getifaddrs(3).

use crate::providers::NetworkChecker;
use log::debug;
use std::net::Ipv4Addr;

/// Shown when the interface list cannot be read at all
pub const NO_IP: &str = "No IP";

/// Shown when the interface exists but has no IPv4 address bound
pub const NO_IPV4: &str = "No IPv4";

/// Reads interface addresses from the kernel on every call
#[derive(Debug, Default, Clone, Copy)]
pub struct InterfaceAddrChecker;

impl NetworkChecker for InterfaceAddrChecker {
    fn ipv4_address(&self, interface: &str) -> String {
        match interface_entries() {
            Ok(entries) => select_ipv4(interface, entries),
            Err(err) => {
                debug!("Interface enumeration failed: {}", err);
                NO_IP.to_string()
            }
        }
    }
}

/// Pick the first IPv4 address belonging to `interface` from `(name, ipv4)` entries.
///
/// Returns `"No <interface>"` when no entry carries that name and [`NO_IPV4`]
/// when the interface is present without an IPv4 address.
pub fn select_ipv4<I, S>(interface: &str, entries: I) -> String
where
    I: IntoIterator<Item = (S, Option<Ipv4Addr>)>,
    S: AsRef<str>,
{
    let mut interface_seen = false;
    for (name, address) in entries {
        if name.as_ref() != interface {
            continue;
        }
        interface_seen = true;
        if let Some(address) = address {
            return address.to_string();
        }
    }

    if interface_seen {
        NO_IPV4.to_string()
    } else {
        format!("No {}", interface)
    }
}

#[cfg(unix)]
fn interface_entries() -> Result<Vec<(String, Option<Ipv4Addr>)>, nix::Error> {
    let entries = nix::ifaddrs::getifaddrs()?
        .map(|ifaddr| {
            let ipv4 = ifaddr
                .address
                .as_ref()
                .and_then(|address| address.as_sockaddr_in())
                .map(|sin| Ipv4Addr::from(sin.ip()));
            (ifaddr.interface_name, ipv4)
        })
        .collect();
    Ok(entries)
}

#[cfg(not(unix))]
fn interface_entries() -> Result<Vec<(String, Option<Ipv4Addr>)>, std::io::Error> {
    Err(std::io::Error::other("interface enumeration needs getifaddrs"))
}
