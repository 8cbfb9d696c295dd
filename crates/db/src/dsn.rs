//! Connection URL handling.
//!
//! Deployments hand us SQLAlchemy-style URLs (`postgresql+psycopg2://...`,
//! `sqlite:///relative.db`), which sqlx does not understand as-is.

use wsfl_models::ServiceError;

const SQLITE_MEMORY: &str = "sqlite::memory:";

/// Lowercased URL scheme with any `+driver` suffix dropped, e.g. `mssql` for
/// `mssql+pyodbc://...`.
pub fn scheme_family(raw: &str) -> Option<String> {
    let (scheme, _) = raw.trim().split_once("://")?;
    scheme
        .split('+')
        .next()
        .map(|base| base.to_ascii_lowercase())
}

pub fn is_sql_server(raw: &str) -> bool {
    matches!(scheme_family(raw).as_deref(), Some("mssql" | "sqlserver"))
}

/// Rewrites a connection URL into the form sqlx's `Any` driver expects.
/// SQL Server URLs are not sqlx URLs and are rejected here.
pub fn normalize_url(raw: &str) -> Result<String, ServiceError> {
    let raw = raw.trim();

    let Some((scheme, rest)) = raw.split_once("://") else {
        // sqlx-native sqlite forms: `sqlite::memory:`, `sqlite:data.db`
        if raw.starts_with("sqlite:") {
            return Ok(raw.to_string());
        }
        return Err(ServiceError::UnsupportedDatabase {
            scheme: String::new(),
        });
    };

    let base = scheme
        .split('+')
        .next()
        .unwrap_or(scheme)
        .to_ascii_lowercase();

    let mapped = match base.as_str() {
        "postgres" | "postgresql" => "postgres",
        "mysql" | "mariadb" => "mysql",
        "sqlite" => return Ok(sqlite_url(rest)),
        _ => return Err(ServiceError::UnsupportedDatabase { scheme: base }),
    };

    Ok(format!("{mapped}://{rest}"))
}

/// `sqlite://` is an in-memory database, `sqlite:///x` a relative path and
/// `sqlite:////x` an absolute one.
fn sqlite_url(rest: &str) -> String {
    match rest.strip_prefix('/') {
        None if rest.is_empty() => SQLITE_MEMORY.to_string(),
        None => format!("sqlite:{rest}"),
        Some(path) if path.is_empty() || path.starts_with(":memory:") => {
            SQLITE_MEMORY.to_string()
        }
        Some(path) => format!("sqlite:{path}"),
    }
}

/// Masks the password component so URLs can be logged.
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    // The password may itself contain `/` or `@`; the host follows the last `@`.
    let end = rest.find('?').unwrap_or(rest.len());
    let Some(at) = rest[..end].rfind('@') else {
        return url.to_string();
    };
    let (userinfo, host) = (&rest[..at], &rest[at + 1..]);
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}
