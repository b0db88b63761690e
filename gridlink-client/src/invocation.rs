//! Request submission seam and the completion handle for non-blocking calls.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use gridlink_core::{ClientMessage, GridError, Result};
use tokio::sync::oneshot;

use crate::connection::ConnectionRef;

/// Transport seam for submitting encoded requests.
///
/// The returned future resolves once, with the decoded response message or
/// a transport failure. Retry policy, if any, belongs to implementations of
/// this trait; the routing layer never retries on its own.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Submits an encoded request on the given connection and awaits the
    /// correlated response.
    async fn invoke_on_connection(
        &self,
        request: ClientMessage,
        connection: &ConnectionRef,
    ) -> Result<ClientMessage>;
}

/// Completion handle returned by the non-blocking operation forms.
///
/// The operation runs on a spawned runtime task; the handle resolves with the
/// decoded result or the operation's failure. Dropping the handle detaches
/// the operation without cancelling it.
#[derive(Debug)]
pub struct OperationHandle<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T: Send + 'static> OperationHandle<T> {
    /// Runs the given operation on a new runtime task.
    ///
    /// Failures resolve the handle; they are never raised on the submitting
    /// task. Decoding continuations run on the spawned task, so handlers
    /// awaiting many handles must not assume any completion order.
    pub(crate) fn spawn<F>(operation: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(operation.await);
        });
        Self { rx }
    }

    /// Creates a handle already resolved with the given result.
    ///
    /// Used for argument errors detected before any network interaction.
    pub(crate) fn ready(result: Result<T>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }
}

impl<T> Future for OperationHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received
                .unwrap_or_else(|_| Err(GridError::Connection("operation abandoned".to_string())))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawned_operation_resolves() {
        let handle = OperationHandle::spawn(async { Ok(41 + 1) });
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_spawned_failure_resolves_handle() {
        let handle: OperationHandle<i32> =
            OperationHandle::spawn(async { Err(GridError::Routing("no owner".to_string())) });
        assert!(matches!(handle.await, Err(GridError::Routing(_))));
    }

    #[tokio::test]
    async fn test_ready_handle() {
        let handle: OperationHandle<&str> = OperationHandle::ready(Ok("now"));
        assert_eq!(handle.await.unwrap(), "now");

        let failed: OperationHandle<()> = OperationHandle::ready(Err(GridError::InvalidArgument(
            "empty key".to_string(),
        )));
        assert!(matches!(failed.await, Err(GridError::InvalidArgument(_))));
    }

    #[test]
    fn test_handle_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<OperationHandle<String>>();
    }
}
