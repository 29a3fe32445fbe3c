use rusqlite::{Connection, OpenFlags};

use std::path::Path;

/// Cheap cloneable handle to the catalog database.
///
/// The schema is externally managed; this process only reads it. Each request
/// opens one connection through [`Database::connect`] and drops it when the
/// request finishes, on every exit path.
#[derive(Clone, Debug)]
pub struct Database {
    path: String,
}

impl Database {
    /// Build a handle from a database URL or plain path.
    ///
    /// Accepts an optional `sqlite://` prefix. Relative paths are resolved
    /// against the current working directory so later directory changes
    /// cannot redirect connections.
    pub fn new(url: &str) -> Self {
        let raw = url.strip_prefix("sqlite://").unwrap_or(url);

        let path = if raw != ":memory:" && !Path::new(raw).is_absolute() {
            match std::env::current_dir() {
                Ok(cwd) => cwd.join(raw).to_string_lossy().into_owned(),
                Err(_) => raw.to_string(),
            }
        } else {
            raw.to_string()
        };

        Database { path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Open a fresh connection for one request.
    ///
    /// Opens read-only: a wrong path fails here instead of materializing an
    /// empty database file and failing later with "no such table".
    pub fn connect(&self) -> Result<Connection, rusqlite::Error> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        // busy_timeout covers readers racing an external writer; it echoes
        // the new value back as a row, so the execute result is ignored.
        let _ = conn.execute("PRAGMA busy_timeout = 5000;", []);

        Ok(conn)
    }
}
