//! Device endpoint domain entity.
//!
//! A [`DeviceEndpoint`] names a remote receiver independently of how it is
//! reached.  Two transports are supported:
//!
//! - **Wireless** – a Bluetooth service on a specific radio, identified by the
//!   radio's 48-bit hardware address plus a 128-bit service UUID.  Populated by
//!   an external discovery scan; resolution never touches the radio.
//! - **Socket** – a plain host/port pair entered by the user or loaded from the
//!   config file.  It may be unbound until configured.
//!
//! Both resolve to a [`NetworkAddress`] that the transport layer connects to.
//! Resolution is pure: no DNS, no scan, no socket.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Serial Port Profile service class UUID (`00001101-0000-1000-8000-00805F9B34FB`).
///
/// Used for wireless targets whose configuration does not name a service.
pub const SERIAL_PORT_SERVICE: Uuid = Uuid::from_u128(0x0000_1101_0000_1000_8000_0080_5F9B_34FB);

/// Placeholder shown for a socket endpoint that has no address yet.
const UNBOUND_DISPLAY_NAME: &str = "(unbound)";

/// Largest value representable in 48 bits.
const HARDWARE_ADDRESS_MAX: u64 = (1 << 48) - 1;

/// Errors produced while building or resolving endpoints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// A socket endpoint was resolved before its address was configured.
    #[error("endpoint has no address configured")]
    Unbound,

    /// The service identifier is not a valid UUID.
    #[error("invalid service id: {0}")]
    InvalidServiceId(String),

    /// The hardware address is malformed or wider than 48 bits.
    #[error("invalid hardware address: {0}")]
    InvalidHardwareAddress(String),
}

// ── Hardware address ──────────────────────────────────────────────────────────

/// 48-bit radio hardware address, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HardwareAddress([u8; 6]);

impl HardwareAddress {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Builds an address from the integer form used by radio stacks.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidHardwareAddress`] if `value` does not fit
    /// in 48 bits.
    pub fn from_u64(value: u64) -> Result<Self, EndpointError> {
        if value > HARDWARE_ADDRESS_MAX {
            return Err(EndpointError::InvalidHardwareAddress(format!("{value:#x}")));
        }
        let b = value.to_be_bytes();
        Ok(Self([b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    pub fn to_u64(self) -> u64 {
        let b = self.0;
        u64::from_be_bytes([0, 0, b[0], b[1], b[2], b[3], b[4], b[5]])
    }

    pub fn octets(self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for HardwareAddress {
    type Err = EndpointError;

    /// Accepts `AA:BB:CC:DD:EE:FF`, `AA-BB-CC-DD-EE-FF`, or `AABBCCDDEEFF`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EndpointError::InvalidHardwareAddress(s.to_string());
        let trimmed = s.trim();

        let digits: String = if trimmed.contains([':', '-']) {
            let parts: Vec<&str> = trimmed.split([':', '-']).collect();
            if parts.len() != 6 || parts.iter().any(|p| p.len() != 2) {
                return Err(invalid());
            }
            parts.concat()
        } else {
            trimmed.to_string()
        };

        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u64::from_str_radix(&digits, 16).map_err(|_| invalid())?;
        Self::from_u64(value)
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl TryFrom<String> for HardwareAddress {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HardwareAddress> for String {
    fn from(addr: HardwareAddress) -> Self {
        addr.to_string()
    }
}

// ── Service class ─────────────────────────────────────────────────────────────

/// Major device class reported by a wireless discovery scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceClass {
    Miscellaneous,
    Computer,
    Phone,
    NetworkAccessPoint,
    AudioVideo,
    Peripheral,
    Imaging,
    Wearable,
    Toy,
    Health,
    #[default]
    Uncategorized,
}

impl ServiceClass {
    /// Decodes the major device class (bits 8..=12) of a class-of-device word.
    pub fn from_class_of_device(class_of_device: u32) -> Self {
        match (class_of_device >> 8) & 0x1F {
            0x00 => ServiceClass::Miscellaneous,
            0x01 => ServiceClass::Computer,
            0x02 => ServiceClass::Phone,
            0x03 => ServiceClass::NetworkAccessPoint,
            0x04 => ServiceClass::AudioVideo,
            0x05 => ServiceClass::Peripheral,
            0x06 => ServiceClass::Imaging,
            0x07 => ServiceClass::Wearable,
            0x08 => ServiceClass::Toy,
            0x09 => ServiceClass::Health,
            _ => ServiceClass::Uncategorized,
        }
    }
}

// ── Resolved addresses ────────────────────────────────────────────────────────

/// Host/port pair of a socket target.  The host is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketAddress {
    pub host: String,
    pub port: u16,
}

impl SocketAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns a [`SocketAddr`] when the host is an IP literal.
    ///
    /// Host names return `None`; name resolution belongs to the transport.
    pub fn to_socket_addr(&self) -> Option<SocketAddr> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        host.parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.port))
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Connectable form of a wireless service: radio address plus service UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WirelessAddress {
    pub hardware_address: HardwareAddress,
    pub service_id: Uuid,
}

impl fmt::Display for WirelessAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hardware_address, self.service_id)
    }
}

/// Address handed to the transport layer to open a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkAddress {
    Wireless(WirelessAddress),
    Socket(SocketAddress),
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkAddress::Wireless(addr) => write!(f, "bt://{addr}"),
            NetworkAddress::Socket(addr) => write!(f, "tcp://{addr}"),
        }
    }
}

// ── Endpoint variants ─────────────────────────────────────────────────────────

/// A Bluetooth service on a discovered radio.
///
/// Identity is the (hardware address, service id) pair; the device name and
/// class are descriptive only and do not take part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirelessEndpoint {
    device_name: String,
    #[serde(default)]
    service_class: ServiceClass,
    hardware_address: HardwareAddress,
    #[serde(default = "default_service_id")]
    service_id: Uuid,
}

fn default_service_id() -> Uuid {
    SERIAL_PORT_SERVICE
}

impl WirelessEndpoint {
    pub fn new(
        device_name: impl Into<String>,
        service_class: ServiceClass,
        hardware_address: HardwareAddress,
        service_id: Uuid,
    ) -> Self {
        Self {
            device_name: device_name.into(),
            service_class,
            hardware_address,
            service_id,
        }
    }

    /// Builds an endpoint from the raw fields a discovery scan reports.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidHardwareAddress`] or
    /// [`EndpointError::InvalidServiceId`] when either identifier is malformed.
    pub fn from_discovery(
        device_name: &str,
        class_of_device: u32,
        hardware_address: &str,
        service_id: &str,
    ) -> Result<Self, EndpointError> {
        let hardware_address: HardwareAddress = hardware_address.parse()?;
        let service_id = Uuid::parse_str(service_id.trim())
            .map_err(|_| EndpointError::InvalidServiceId(service_id.to_string()))?;
        let service_class = ServiceClass::from_class_of_device(class_of_device);
        debug!(
            %hardware_address,
            ?service_class,
            "discovered wireless endpoint {device_name}"
        );
        Ok(Self::new(device_name, service_class, hardware_address, service_id))
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn service_class(&self) -> ServiceClass {
        self.service_class
    }

    pub fn hardware_address(&self) -> HardwareAddress {
        self.hardware_address
    }

    pub fn service_id(&self) -> Uuid {
        self.service_id
    }

    pub fn address(&self) -> WirelessAddress {
        WirelessAddress {
            hardware_address: self.hardware_address,
            service_id: self.service_id,
        }
    }
}

impl PartialEq for WirelessEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.hardware_address == other.hardware_address && self.service_id == other.service_id
    }
}

impl Eq for WirelessEndpoint {}

impl Hash for WirelessEndpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hardware_address.hash(state);
        self.service_id.hash(state);
    }
}

/// A host/port target.  `address` is `None` until configured.
///
/// Hosts are stored trimmed, and an address whose host is blank leaves the
/// endpoint unbound.  Construction, `set_address` and loading from disk all
/// apply the same rule, so a saved endpoint reloads equal to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SocketEndpointRepr", into = "SocketEndpointRepr")]
pub struct SocketEndpoint {
    address: Option<SocketAddress>,
}

impl SocketEndpoint {
    /// Creates an endpoint with no address yet.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Creates an endpoint for `address`; a blank host yields an unbound one.
    pub fn bound(address: SocketAddress) -> Self {
        Self {
            address: usable_address(address),
        }
    }

    pub fn address(&self) -> Option<&SocketAddress> {
        self.address.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.address.is_some()
    }

    /// Replaces the configured address.  Only meaningful before the transport
    /// first connects; the transport decides when that is.  A blank host
    /// unbinds the endpoint.
    pub fn set_address(&mut self, address: SocketAddress) {
        self.address = usable_address(address);
    }

    pub fn unbind(&mut self) {
        self.address = None;
    }
}

/// Trims the host; `None` when nothing is left to connect to.
fn usable_address(address: SocketAddress) -> Option<SocketAddress> {
    let host = address.host.trim();
    if host.is_empty() {
        return None;
    }
    Some(SocketAddress::new(host, address.port))
}

/// On-disk shape of a [`SocketEndpoint`]: a half-filled pair loads as unbound.
#[derive(Serialize, Deserialize)]
struct SocketEndpointRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

impl From<SocketEndpointRepr> for SocketEndpoint {
    fn from(repr: SocketEndpointRepr) -> Self {
        match (repr.host, repr.port) {
            (Some(host), Some(port)) => SocketEndpoint::bound(SocketAddress::new(host, port)),
            _ => SocketEndpoint::unbound(),
        }
    }
}

impl From<SocketEndpoint> for SocketEndpointRepr {
    fn from(endpoint: SocketEndpoint) -> Self {
        match endpoint.address {
            Some(addr) => SocketEndpointRepr {
                host: Some(addr.host),
                port: Some(addr.port),
            },
            None => SocketEndpointRepr {
                host: None,
                port: None,
            },
        }
    }
}

/// A remote receiver, addressed uniformly regardless of transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceEndpoint {
    Wireless(WirelessEndpoint),
    Socket(SocketEndpoint),
}

impl DeviceEndpoint {
    /// Resolves the endpoint to the address the transport connects to.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Unbound`] for a socket endpoint whose address
    /// was never set.
    pub fn resolve_address(&self) -> Result<NetworkAddress, EndpointError> {
        match self {
            DeviceEndpoint::Wireless(w) => Ok(NetworkAddress::Wireless(w.address())),
            DeviceEndpoint::Socket(s) => s
                .address()
                .cloned()
                .map(NetworkAddress::Socket)
                .ok_or(EndpointError::Unbound),
        }
    }

    /// Human-readable label: the device name, or the textual socket address.
    pub fn display_name(&self) -> String {
        match self {
            DeviceEndpoint::Wireless(w) => w.device_name().to_string(),
            DeviceEndpoint::Socket(s) => match s.address() {
                Some(addr) => addr.to_string(),
                None => UNBOUND_DISPLAY_NAME.to_string(),
            },
        }
    }

    /// Short transport label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceEndpoint::Wireless(_) => "wireless",
            DeviceEndpoint::Socket(_) => "socket",
        }
    }
}

impl From<WirelessEndpoint> for DeviceEndpoint {
    fn from(endpoint: WirelessEndpoint) -> Self {
        DeviceEndpoint::Wireless(endpoint)
    }
}

impl From<SocketEndpoint> for DeviceEndpoint {
    fn from(endpoint: SocketEndpoint) -> Self {
        DeviceEndpoint::Socket(endpoint)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
