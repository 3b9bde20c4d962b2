//! Error types for MediaTailor control plane calls

use std::fmt;

use thiserror::Error;

/// A single remote control plane operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateChannel,
    DescribeChannel,
    UpdateChannel,
    DeleteChannel,
    StartChannel,
    StopChannel,
    PutChannelPolicy,
    GetChannelPolicy,
    DeleteChannelPolicy,
    TagResource,
    UntagResource,
    CreateSourceLocation,
    DescribeSourceLocation,
    UpdateSourceLocation,
    DeleteSourceLocation,
    CreateVodSource,
    DescribeVodSource,
    UpdateVodSource,
    DeleteVodSource,
    ListVodSources,
    CreateLiveSource,
    DescribeLiveSource,
    UpdateLiveSource,
    DeleteLiveSource,
    ListLiveSources,
    PutPlaybackConfiguration,
    GetPlaybackConfiguration,
    DeletePlaybackConfiguration,
}

impl Operation {
    /// The control plane's name for the operation, e.g. `StartChannel`
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateChannel => "CreateChannel",
            Operation::DescribeChannel => "DescribeChannel",
            Operation::UpdateChannel => "UpdateChannel",
            Operation::DeleteChannel => "DeleteChannel",
            Operation::StartChannel => "StartChannel",
            Operation::StopChannel => "StopChannel",
            Operation::PutChannelPolicy => "PutChannelPolicy",
            Operation::GetChannelPolicy => "GetChannelPolicy",
            Operation::DeleteChannelPolicy => "DeleteChannelPolicy",
            Operation::TagResource => "TagResource",
            Operation::UntagResource => "UntagResource",
            Operation::CreateSourceLocation => "CreateSourceLocation",
            Operation::DescribeSourceLocation => "DescribeSourceLocation",
            Operation::UpdateSourceLocation => "UpdateSourceLocation",
            Operation::DeleteSourceLocation => "DeleteSourceLocation",
            Operation::CreateVodSource => "CreateVodSource",
            Operation::DescribeVodSource => "DescribeVodSource",
            Operation::UpdateVodSource => "UpdateVodSource",
            Operation::DeleteVodSource => "DeleteVodSource",
            Operation::ListVodSources => "ListVodSources",
            Operation::CreateLiveSource => "CreateLiveSource",
            Operation::DescribeLiveSource => "DescribeLiveSource",
            Operation::UpdateLiveSource => "UpdateLiveSource",
            Operation::DeleteLiveSource => "DeleteLiveSource",
            Operation::ListLiveSources => "ListLiveSources",
            Operation::PutPlaybackConfiguration => "PutPlaybackConfiguration",
            Operation::GetPlaybackConfiguration => "GetPlaybackConfiguration",
            Operation::DeletePlaybackConfiguration => "DeletePlaybackConfiguration",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a failed control plane call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// The addressed resource (or sub-resource) does not exist
    NotFound,
    /// The resource is in a state that does not allow the operation
    Conflict,
    /// Request rejected by server-side validation
    BadRequest,
    /// Credentials missing or not authorized
    AccessDenied,
    /// Rate limited by the control plane
    Throttled,
    /// Control plane returned a 5xx
    Server,
    /// Connection, TLS or timeout failure before a response was read
    Transport,
    /// Response body could not be decoded
    Decode,
}

impl ApiErrorKind {
    /// Map an HTTP status code to an error kind
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::Conflict,
            401 | 403 => ApiErrorKind::AccessDenied,
            429 => ApiErrorKind::Throttled,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::BadRequest,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiErrorKind::NotFound => "not found",
            ApiErrorKind::Conflict => "conflict",
            ApiErrorKind::BadRequest => "bad request",
            ApiErrorKind::AccessDenied => "access denied",
            ApiErrorKind::Throttled => "throttled",
            ApiErrorKind::Server => "server error",
            ApiErrorKind::Transport => "transport error",
            ApiErrorKind::Decode => "decode error",
        };
        f.write_str(s)
    }
}

/// Failure of one control plane call
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{operation} failed ({kind}): {message}")]
pub struct ApiError {
    pub operation: Operation,
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(operation: Operation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::NotFound, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ApiErrorKind::Conflict
    }

    /// Whether a later attempt may succeed without any change on our side
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::Throttled | ApiErrorKind::Server | ApiErrorKind::Transport
        )
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
