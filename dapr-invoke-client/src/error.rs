//! Invocation error types.
//!
//! Every failure is reported as an [`InvocationError`] naming the target
//! application and method, with an [`InvocationErrorKind`] describing what
//! went wrong and the underlying transport failure kept as the source.

use dapr_invoke_core::{Code, CodecError, CompositeStatus};

use crate::response::ResponseStatus;

/// What went wrong during an invocation.
#[derive(Debug, thiserror::Error)]
pub enum InvocationErrorKind {
    /// A required argument was missing or empty. No call was made.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The requested verb or mode is not supported.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The sidecar answered with data that violates the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The payload could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The call failed without a decodable rich error detail.
    #[error("transport error: {0}")]
    Transport(#[source] tonic::Status),

    /// The call failed and the callee's status was decoded.
    #[error("remote application error: {composite}")]
    RemoteApplication {
        #[source]
        status: tonic::Status,
        composite: CompositeStatus,
    },

    /// The cancellation token fired before the call completed.
    #[error("invocation was cancelled")]
    Cancelled,

    /// The client-side timeout elapsed before the call completed.
    #[error("client timeout exceeded")]
    DeadlineExceeded,

    /// The call completed but the callee reported failure.
    #[error("unsuccessful response: {0}")]
    UnsuccessfulResponse(ResponseStatus),
}

/// A failed invocation of `method` on `app_id`.
#[derive(Debug, thiserror::Error)]
#[error("failed to invoke method {method:?} on app {app_id:?}")]
pub struct InvocationError {
    app_id: String,
    method: String,
    #[source]
    kind: InvocationErrorKind,
}

impl InvocationError {
    /// Create a new error for a call to `method` on `app_id`.
    pub fn new<A: Into<String>, M: Into<String>>(
        app_id: A,
        method: M,
        kind: InvocationErrorKind,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            method: method.into(),
            kind,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn kind(&self) -> &InvocationErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> InvocationErrorKind {
        self.kind
    }

    /// The decoded callee status, when the failure carried one.
    pub fn composite_status(&self) -> Option<&CompositeStatus> {
        match &self.kind {
            InvocationErrorKind::RemoteApplication { composite, .. } => Some(composite),
            InvocationErrorKind::UnsuccessfulResponse(ResponseStatus::Rpc(composite)) => {
                Some(composite)
            }
            _ => None,
        }
    }

    /// The underlying transport status, for transport and remote failures.
    pub fn transport_status(&self) -> Option<&tonic::Status> {
        match &self.kind {
            InvocationErrorKind::Transport(status)
            | InvocationErrorKind::RemoteApplication { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Returns true if the request was rejected before any call was made.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, InvocationErrorKind::Validation(_))
    }

    /// Returns true if the call was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, InvocationErrorKind::Cancelled)
    }

    /// Get the status code that best describes this error.
    ///
    /// Local failures map as follows:
    /// - Validation: `InvalidArgument`
    /// - UnsupportedOperation: `Unimplemented`
    /// - Protocol, Codec: `Internal`
    /// - Cancelled: `Canceled`
    /// - DeadlineExceeded: `DeadlineExceeded`
    pub fn code(&self) -> Code {
        match &self.kind {
            InvocationErrorKind::Validation(_) => Code::InvalidArgument,
            InvocationErrorKind::UnsupportedOperation(_) => Code::Unimplemented,
            InvocationErrorKind::Protocol(_) | InvocationErrorKind::Codec(_) => Code::Internal,
            InvocationErrorKind::Transport(status) => Code::from_i32(status.code() as i32),
            InvocationErrorKind::RemoteApplication { composite, .. } => composite.code(),
            InvocationErrorKind::Cancelled => Code::Canceled,
            InvocationErrorKind::DeadlineExceeded => Code::DeadlineExceeded,
            InvocationErrorKind::UnsuccessfulResponse(ResponseStatus::Rpc(composite)) => {
                composite.code()
            }
            InvocationErrorKind::UnsuccessfulResponse(ResponseStatus::Http(_)) => Code::Unknown,
        }
    }
}
