//! Result types shared by every client call, and the general classification
//! rule.
//!
//! A call resolves to [`ClientResult<T>`]: the outer `Result` carries faults
//! ([`ClientError`]) and is meant to be propagated with `?`; the inner
//! [`ApiResult<T>`] carries the classified outcome callers branch on.
//!
//! ```no_run
//! # use schedlink_client::{ApiError, ClusterClient, ClientError};
//! # use schedlink_model::JobId;
//! # async fn run(client: ClusterClient) -> Result<(), ClientError> {
//! match client.get_job(&JobId::new("web")).await? {
//!     Ok(job) => println!("{} is {:?}", job.name, job.status),
//!     Err(ApiError::NotFound) => println!("gone"),
//!     Err(ApiError::Unreachable) => println!("scheduler down"),
//!     Err(other) => eprintln!("scheduler API misbehaved: {other}"),
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use http::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ClientError, RawResponse};
use crate::transport::{GetRequest, Transport};

/// Classified outcome of a call.
pub type ApiResult<T> = Result<T, ApiError>;

/// What every client operation resolves to.
pub type ClientResult<T> = Result<ApiResult<T>, ClientError>;

/// Issue one GET and fold connection failures into `Unreachable`.
///
/// Every other transport error is a fault and is returned as such.
pub(crate) async fn exchange<T: Transport>(
    transport: &T,
    request: GetRequest,
) -> ClientResult<RawResponse> {
    let url = request.url.clone();
    match transport.get(request).await {
        Ok(response) => {
            debug!(%url, status = %response.status, "response received");
            Ok(Ok(response))
        }
        Err(err) if err.is_connect() => {
            debug!(%url, error = %err, "target unreachable");
            Ok(Err(ApiError::Unreachable))
        }
        Err(err) => Err(ClientError::Transport(err)),
    }
}

/// Pass `response` through only if it carries `expected`.
pub fn expect_status(response: RawResponse, expected: StatusCode) -> ApiResult<RawResponse> {
    if response.status == expected {
        Ok(response)
    } else {
        Err(classify_failure(response))
    }
}

/// General rule for a response that is not the expected one: 404 means
/// `NotFound`, anything else is `Unexpected`.
pub fn classify_failure(response: RawResponse) -> ApiError {
    if response.status == StatusCode::NOT_FOUND {
        ApiError::NotFound
    } else {
        ApiError::Unexpected(response)
    }
}

/// Decode a JSON body. A body that does not decode is a fault, not a
/// classified outcome.
pub(crate) fn decode_json<R: DeserializeOwned>(
    response: &RawResponse,
    context: &'static str,
) -> Result<R, ClientError> {
    serde_json::from_slice(&response.body).map_err(|source| ClientError::Decode { context, source })
}

/// Log contract violations with the full response before handing the result
/// back.
pub(crate) fn report<T>(url: &Url, result: ApiResult<T>) -> ApiResult<T> {
    if let Err(ApiError::Unexpected(response)) = &result {
        warn!(
            %url,
            status = %response.status,
            body = %response.body_preview(),
            "unexpected response from scheduler API"
        );
    }
    result
}

/// Race `call` against a shutdown signal.
///
/// Resolves to `Err(ClientError::Cancelled)` as soon as `shutdown` reads
/// `true`; the in-flight request is dropped without being classified. A
/// dropped sender never cancels.
pub async fn cancellable<T, F>(shutdown: &mut watch::Receiver<bool>, call: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    if *shutdown.borrow() {
        return Err(ClientError::Cancelled);
    }

    tokio::select! {
        result = call => result,
        _ = wait_for_shutdown(shutdown) => {
            debug!("call cancelled by shutdown signal");
            Err(ClientError::Cancelled)
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
