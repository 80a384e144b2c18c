//! MongoDB adapter for mongo-indexer
//!
//! [`MongoCatalog`] implements [`IndexCatalog`] on top of the official async
//! driver. It owns a current-thread tokio runtime and blocks on every driver
//! call, so callers stay synchronous.

use std::time::Duration;

use bson::{Document, doc};
use futures::TryStreamExt;
use indexer_core::{Error, IndexCatalog, IndexDescriptor, OperationKind, Result};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const APP_NAME: &str = "mongo-indexer";

/// Connection to one MongoDB database
pub struct MongoCatalog {
    runtime: Runtime,
    database: Database,
    name: String,
}

impl MongoCatalog {
    /// Connect to `uri` and verify the server answers a ping.
    ///
    /// `timeout` bounds server selection, so an unreachable server fails
    /// with [`Error::Connection`] instead of hanging.
    pub fn connect(uri: &str, database: &str, timeout: Duration) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::connection(format!("cannot start runtime: {e}")))?;

        let db = runtime.block_on(async {
            let mut options = ClientOptions::parse(uri).await.map_err(connection_error)?;
            options.server_selection_timeout = Some(timeout);
            options.connect_timeout = Some(timeout);
            options.app_name = Some(APP_NAME.to_string());

            let client = Client::with_options(options).map_err(connection_error)?;
            let db = client.database(database);
            db.run_command(doc! { "ping": 1 })
                .await
                .map_err(connection_error)?;
            Ok::<_, Error>(db)
        })?;

        debug!(database, "Connected to MongoDB");
        Ok(Self {
            runtime,
            database: db,
            name: database.to_string(),
        })
    }

    fn listing_error(&self, collection: Option<&str>, err: mongodb::error::Error) -> Error {
        if is_connection_failure(&err) {
            return connection_error(err);
        }
        match collection {
            Some(collection) => Error::listing(format!("{}.{}", self.name, collection), err),
            None => Error::listing(&self.name, err),
        }
    }

    fn operation_error(
        kind: OperationKind,
        collection: &str,
        index: &str,
        err: mongodb::error::Error,
    ) -> Error {
        if is_connection_failure(&err) {
            connection_error(err)
        } else {
            Error::operation(kind, collection, index, err)
        }
    }
}

impl IndexCatalog for MongoCatalog {
    fn database_name(&self) -> &str {
        &self.name
    }

    fn list_collection_names(&self) -> Result<Vec<String>> {
        self.runtime
            .block_on(async {
                self.database
                    .list_collection_names()
                    .filter(doc! { "type": "collection" })
                    .await
            })
            .map_err(|e| self.listing_error(None, e))
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<Document>> {
        self.runtime
            .block_on(async {
                let cursor = self
                    .database
                    .run_cursor_command(doc! { "listIndexes": collection })
                    .await?;
                cursor.try_collect::<Vec<Document>>().await
            })
            .map_err(|e| self.listing_error(Some(collection), e))
    }

    fn create_index(&self, collection: &str, index: &IndexDescriptor) -> Result<()> {
        let spec = index
            .to_create_document()
            .map_err(|e| Error::operation(OperationKind::Create, collection, &index.name, e))?;

        self.runtime
            .block_on(async {
                self.database
                    .run_command(doc! { "createIndexes": collection, "indexes": [spec] })
                    .await
            })
            .map_err(|e| {
                Self::operation_error(OperationKind::Create, collection, &index.name, e)
            })?;
        Ok(())
    }

    fn drop_index(&self, collection: &str, name: &str) -> Result<()> {
        self.runtime
            .block_on(async {
                self.database
                    .collection::<Document>(collection)
                    .drop_index(name)
                    .await
            })
            .map_err(|e| Self::operation_error(OperationKind::Drop, collection, name, e))
    }
}

fn is_connection_failure(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::Authentication { .. }
            | ErrorKind::DnsResolve { .. }
    )
}

fn connection_error(err: mongodb::error::Error) -> Error {
    Error::connection(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_uri_is_connection_error() {
        let result = MongoCatalog::connect("not-a-uri", "app", Duration::from_millis(100));

        assert!(matches!(result, Err(Error::Connection { .. })));
    }

    #[test]
    fn test_unsupported_scheme_is_connection_error() {
        let result = MongoCatalog::connect(
            "postgres://localhost:5432",
            "app",
            Duration::from_millis(100),
        );

        assert!(matches!(result, Err(Error::Connection { .. })));
    }
}
