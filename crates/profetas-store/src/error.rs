/// Errors raised by any [`Backend`](crate::Backend) implementation.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.). The message
    /// names only the kind of failure; `url` is for logs.
    #[error("http request failed: {}", transport_kind(.source))]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The hosted store answered with a non-success status. `message` is the
    /// store's own explanation and is what the user gets to see.
    #[error("{message}")]
    Rejected {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body: {}", transport_kind(.source))]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    Poisoned,

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A row came back from the store in a shape the application cannot use.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("malformed {table} payload: {source}")]
    Json {
        table: &'static str,
        source: serde_json::Error,
    },

    #[error("unknown match status {0:?}")]
    UnknownStatus(String),

    #[error("unknown selection {0:?}")]
    UnknownSelection(String),

    #[error("match {match_id} is missing its {side} team")]
    MissingTeam { match_id: i64, side: &'static str },

    #[error("invalid timestamp {value:?}")]
    Timestamp { value: String },

    #[error("{table}.{field} out of range: {value}")]
    OutOfRange {
        table: &'static str,
        field: &'static str,
        value: i64,
    },

    #[error("invalid id {value:?} in {table}")]
    InvalidId { table: &'static str, value: String },

    #[error("insert into {table} returned no row")]
    EmptyInsert { table: &'static str },
}

pub type Result<T> = std::result::Result<T, StoreError>;

fn transport_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_builder() {
        "invalid request"
    } else if e.is_body() || e.is_decode() {
        "malformed response"
    } else {
        "request failed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_do_not_leak_the_url() {
        let url = "https://abcd1234.supabase.co/rest/v1/participaciones";
        let source = reqwest::Client::new()
            .post(url)
            .header("bad header", "x")
            .build()
            .unwrap_err();

        let err = StoreError::Http {
            url: url.to_string(),
            source,
        };
        assert_eq!(err.to_string(), "http request failed: invalid request");
        assert!(!err.to_string().contains("supabase.co"));
    }
}
