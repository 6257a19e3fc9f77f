// [libs/infra/db/src/client.rs]
//! Connection management. Mirrors the teacher's `TursoClient::connect`
//! memory-anchor pattern: local file, remote Turso, or `:memory:` for
//! tests, each bootstrapped with the schema before the client is handed
//! back.

use crate::errors::DbError;
use crate::schema::apply_full_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct DevicePoolClient {
    database: Arc<Database>,
    /// Keeps an in-memory database alive; SQLite drops `:memory:` data the
    /// moment the last connection closes.
    _memory_anchor: Option<Arc<Connection>>,
}

impl DevicePoolClient {
    #[instrument(skip(access_token))]
    pub async fn connect(connection_url: &str, access_token: Option<String>) -> Result<Self, DbError> {
        if connection_url.is_empty() {
            return Err(DbError::ConnectionError("DATABASE_URL_UNDEFINED".into()));
        }

        info!("connecting to device pool store at {connection_url}");

        let is_remote =
            connection_url.starts_with("libsql://") || connection_url.starts_with("https://");
        let is_memory = connection_url.contains(":memory:") || connection_url.contains("mode=memory");

        let database = if is_remote {
            let token = access_token
                .ok_or_else(|| DbError::ConnectionError("remote access token missing".into()))?;
            Builder::new_remote(connection_url.to_string(), token).build().await
        } else {
            Builder::new_local(connection_url).build().await
        }
        .map_err(|e| DbError::ConnectionError(format!("driver ignition failure: {e}")))?;

        let database = Arc::new(database);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = database
                .connect()
                .map_err(|e| DbError::ConnectionError(format!("anchor fault: {e}")))?;
            apply_full_schema(&anchor_conn)
                .await
                .map_err(|e| DbError::ConnectionError(format!("schema sync fault: {e}")))?;
            anchor = Some(Arc::new(anchor_conn));
        } else {
            let bootstrap_conn = database
                .connect()
                .map_err(|e| DbError::ConnectionError(format!("bootstrap link fault: {e}")))?;
            apply_full_schema(&bootstrap_conn)
                .await
                .map_err(|e| DbError::ConnectionError(format!("schema sync fault: {e}")))?;
        }

        Ok(Self {
            database,
            _memory_anchor: anchor,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, DbError> {
        self.database.connect().map_err(|e| {
            error!("connection allocation failed: {e}");
            DbError::ConnectionError(e.to_string())
        })
    }
}
