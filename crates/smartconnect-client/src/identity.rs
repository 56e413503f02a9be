//! Client network identity sent with every request.

use reqwest::Client;
use smartconnect_types::{Result, SmartConnectError};
use std::net::{IpAddr, UdpSocket};

/// Service that echoes the caller's public IP as plain text.
pub const PUBLIC_IP_URL: &str = "https://api.ipify.org";

/// Local IP, public IP and MAC address reported in the `X-ClientLocalIP`,
/// `X-ClientPublicIP` and `X-MACAddress` headers.
///
/// Resolved once and handed to the transport; interface changes after that
/// are not observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkIdentity {
    /// LAN address of the outbound interface.
    pub local_ip: String,
    /// Address seen by the internet.
    pub public_ip: String,
    /// Hardware address of an active interface.
    pub mac_address: String,
}

impl NetworkIdentity {
    /// Creates an identity from known values.
    #[must_use]
    pub fn new(
        local_ip: impl Into<String>,
        public_ip: impl Into<String>,
        mac_address: impl Into<String>,
    ) -> Self {
        Self {
            local_ip: local_ip.into(),
            public_ip: public_ip.into(),
            mac_address: mac_address.into(),
        }
    }

    /// Discovers the identity of this host.
    ///
    /// # Errors
    ///
    /// Returns [`SmartConnectError::Identity`] if any of the three values
    /// cannot be determined.
    pub async fn discover(client: &Client) -> Result<Self> {
        let local_ip = local_ip()?.to_string();
        let public_ip = public_ip(client).await?;
        let mac_address = hardware_address()?;

        tracing::debug!(%local_ip, %public_ip, %mac_address, "resolved network identity");

        Ok(Self {
            local_ip,
            public_ip,
            mac_address,
        })
    }
}

/// Returns the address of the interface that routes to the internet.
///
/// Connecting a UDP socket only selects a route; no packet is sent.
fn local_ip() -> Result<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))
        .map_err(|e| SmartConnectError::Identity(format!("local IP: {e}")))?;
    socket
        .connect(("8.8.8.8", 80))
        .map_err(|e| SmartConnectError::Identity(format!("local IP: {e}")))?;
    let addr = socket
        .local_addr()
        .map_err(|e| SmartConnectError::Identity(format!("local IP: {e}")))?
        .ip();

    if addr.is_loopback() || addr.is_unspecified() {
        return Err(SmartConnectError::Identity(
            "could not find local IP address".to_string(),
        ));
    }
    Ok(addr)
}

async fn public_ip(client: &Client) -> Result<String> {
    let response = client
        .get(PUBLIC_IP_URL)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| SmartConnectError::Identity(format!("public IP: {e}")))?;
    let body = response
        .text()
        .await
        .map_err(|e| SmartConnectError::Identity(format!("public IP: {e}")))?;

    let ip = body.trim();
    ip.parse::<IpAddr>()
        .map_err(|_| SmartConnectError::Identity(format!("public IP: unexpected reply '{ip}'")))?;
    Ok(ip.to_string())
}

/// Returns the first usable hardware address among the host's interfaces.
fn hardware_address() -> Result<String> {
    let candidates = ::mac_address::MacAddressIterator::new()
        .map_err(|e| SmartConnectError::Identity(format!("MAC address: {e}")))?
        .map(|mac| mac.to_string());

    first_usable_mac(candidates).ok_or_else(|| {
        SmartConnectError::Identity("no active network interface found".to_string())
    })
}

fn first_usable_mac<I>(candidates: I) -> Option<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    candidates
        .into_iter()
        .find_map(|raw| usable_mac(raw.as_ref()))
}

/// Normalizes an address to lowercase, rejecting malformed and all-zero
/// values such as the loopback's.
fn usable_mac(raw: &str) -> Option<String> {
    let mac = raw.trim().to_lowercase();
    let octets: Vec<_> = mac.split(':').collect();
    if octets.len() != 6 || octets.iter().any(|o| o.len() != 2) {
        return None;
    }
    if octets.iter().all(|o| *o == "00") {
        return None;
    }
    Some(mac)
}
