use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use log::error;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use vtt_core::errors::{DatabaseError, Error, Result};

type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type AnyResult = Result<Box<dyn Any + Send + 'static>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job<Box<dyn Any + Send + 'static>>, oneshot::Sender<AnyResult>)>,
}

fn actor_stopped() -> Error {
    Error::Database(DatabaseError::Internal(
        "Database writer is not running".to_string(),
    ))
}

impl WriteHandle {
    /// Runs `job` on the writer's dedicated connection inside an immediate transaction.
    ///
    /// Jobs execute one at a time in submission order. If the job returns an
    /// error the transaction is rolled back and the error is returned as-is.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| actor_stopped())?;

        let boxed = ret_rx.await.map_err(|_| actor_stopped())??;
        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Unexpected result type from database writer".to_string(),
            ))
        })
    }
}

/// Spawns a background Tokio task that acts as the single writer to the database.
///
/// The actor takes one connection from the pool for its whole lifetime and
/// processes jobs serially. It stops when every `WriteHandle` is dropped.
pub fn spawn_writer(pool: Arc<DbPool>) -> WriteHandle {
    let (tx, mut rx) =
        mpsc::channel::<(Job<Box<dyn Any + Send + 'static>>, oneshot::Sender<AnyResult>)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Database writer could not acquire a connection: {}", e);
                // Dropping the receiver fails every pending and future job.
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: AnyResult = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    job(c).map_err(StorageError::from)
                })
                .map_err(Error::from);

            // The requester may have been cancelled; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
