use serde::{Deserialize, Serialize};

/// A network-addressable IP with its owning organization, associated domain,
/// location, and open ports. Built fresh per request; never cached or shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "IP")]
    pub ip: String,
    pub org: String,
    pub domain: String,
    pub location: Location,
    #[serde(rename = "openPorts")]
    pub open_ports: Vec<OpenPort>,
}

/// Always embedded inside an [`Endpoint`], never served standalone.
///
/// The coordinate wire names are legacy misspellings; existing clients parse
/// them as-is, so they must not be corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
    #[serde(rename = "latitute")]
    pub latitude: f64,
    #[serde(rename = "longtitude")]
    pub longitude: f64,
}

/// One exposed (port number, port type) pair with its resolved service name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPort {
    pub number: u16,
    #[serde(rename = "type")]
    pub port_type: String,
    #[serde(rename = "serviceName")]
    pub service_name: String,
}

/// A domain name and every endpoint associated with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainData {
    pub name: String,
    pub endpoints: Vec<Endpoint>,
}

/// An organization name and every endpoint it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgData {
    pub name: String,
    pub endpoints: Vec<Endpoint>,
}
