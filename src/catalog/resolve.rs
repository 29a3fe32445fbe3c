//! Aggregation queries. Each resolver issues parameterized queries against
//! the catalog tables and composes the rows into one nested value.

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{CatalogError, CatalogResult};

use super::model::{DomainData, Endpoint, Location, OpenPort, OrgData};

impl Endpoint {
    /// Resolve one endpoint by IP.
    ///
    /// Two dependent queries: the identity/location/domain join first, then
    /// the open-port join for the same IP. The first join is constrained to
    /// a single row; the schema treats the ownership and location relations
    /// as 1:1 per IP, and `LIMIT 1` makes that assumption explicit. Zero
    /// rows is an [`CatalogError::EndpointNotFound`] error, never a panic.
    pub fn resolve(conn: &Connection, ip: &str) -> CatalogResult<Endpoint> {
        let identity = conn
            .query_row(
                "SELECT O.ip, O.OrgName, A.DomainName, L.city, L.country, L.latitude, L.longitude
                 FROM OwnsEndpoint O
                 JOIN LocatedIn L ON L.ip = O.ip
                 JOIN AssociatedDomain A ON A.ip = O.ip
                 WHERE O.ip = ?1
                 LIMIT 1",
                params![ip],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        Location {
                            city: row.get(3)?,
                            country: row.get(4)?,
                            latitude: row.get(5)?,
                            longitude: row.get(6)?,
                        },
                    ))
                },
            )
            .optional()?;

        let (ip, org, domain, location) = match identity {
            Some(identity) => identity,
            None => return Err(CatalogError::EndpointNotFound(ip.to_string())),
        };

        let open_ports = open_ports_for_ip(conn, &ip)?;

        Ok(Endpoint {
            ip,
            org,
            domain,
            location,
            open_ports,
        })
    }
}

/// Every (port number, port type) pair exposed by an IP, with the service
/// name joined in from the port-to-service mapping. Ordered so repeated
/// lookups against an unchanged store serialize identically.
fn open_ports_for_ip(conn: &Connection, ip: &str) -> CatalogResult<Vec<OpenPort>> {
    let mut stmt = conn.prepare(
        "SELECT Ex.PortNumber, Ex.PortType, I.ServiceName
         FROM ExposesPort Ex
         JOIN Implements I ON I.PortNumber = Ex.PortNumber AND I.PortType = Ex.PortType
         WHERE Ex.IP = ?1
         ORDER BY Ex.PortNumber, Ex.PortType",
    )?;

    let rows = stmt.query_map(params![ip], |row| {
        Ok(OpenPort {
            number: row.get(0)?,
            port_type: row.get(1)?,
            service_name: row.get(2)?,
        })
    })?;

    let mut ports = Vec::new();
    for row in rows {
        ports.push(row?);
    }
    Ok(ports)
}

impl DomainData {
    /// Resolve every endpoint associated with a domain name.
    ///
    /// A name matching no association rows yields an empty endpoint list,
    /// not an error. "No such domain" and "domain with no endpoints" are
    /// indistinguishable at this layer.
    pub fn resolve(conn: &Connection, name: &str) -> CatalogResult<DomainData> {
        let endpoints = resolve_ip_set(
            conn,
            "SELECT A.ip FROM AssociatedDomain A WHERE A.DomainName = ?1 ORDER BY A.ip",
            name,
        )?;
        Ok(DomainData {
            name: name.to_string(),
            endpoints,
        })
    }
}

impl OrgData {
    /// Resolve every endpoint owned by an organization. Same shape and
    /// empty-collection policy as [`DomainData::resolve`], with the IP set
    /// taken from the ownership relation instead of the association relation.
    pub fn resolve(conn: &Connection, name: &str) -> CatalogResult<OrgData> {
        let endpoints = resolve_ip_set(
            conn,
            "SELECT O.ip FROM OwnsEndpoint O WHERE O.OrgName = ?1 ORDER BY O.ip",
            name,
        )?;
        Ok(OrgData {
            name: name.to_string(),
            endpoints,
        })
    }
}

/// Sequential fan-out: resolve the IP set, then each endpoint in query
/// order. Every lookup after the first must succeed; an association row
/// pointing at a missing endpoint fails the whole request.
fn resolve_ip_set(conn: &Connection, ip_sql: &str, name: &str) -> CatalogResult<Vec<Endpoint>> {
    let mut stmt = conn.prepare(ip_sql)?;
    let rows = stmt.query_map(params![name], |row| row.get::<_, String>(0))?;

    let mut ips = Vec::new();
    for row in rows {
        ips.push(row?);
    }

    let mut endpoints = Vec::with_capacity(ips.len());
    for ip in &ips {
        endpoints.push(Endpoint::resolve(conn, ip)?);
    }
    Ok(endpoints)
}
