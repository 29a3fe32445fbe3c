use rusqlite::Connection;

use crate::error::CatalogResult;

/// Immutable snapshot of the distinct name/IP columns, loaded once at
/// process start and served for the process lifetime. Never refreshed; a
/// restart picks up new rows. Safe for unsynchronized concurrent reads.
#[derive(Debug, Clone, Default)]
pub struct LookupLists {
    pub domains: Vec<String>,
    pub organizations: Vec<String>,
    pub ips: Vec<String>,
}

impl LookupLists {
    /// Full scan of each backing column.
    pub fn load(conn: &Connection) -> CatalogResult<Self> {
        Ok(LookupLists {
            domains: scan_column(conn, "SELECT name FROM domain ORDER BY name")?,
            organizations: scan_column(conn, "SELECT name FROM Organization ORDER BY name")?,
            ips: scan_column(conn, "SELECT ip FROM Endpoint ORDER BY ip")?,
        })
    }
}

fn scan_column(conn: &Connection, sql: &str) -> CatalogResult<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut values = Vec::new();
    for row in rows {
        values.push(row?);
    }
    Ok(values)
}
