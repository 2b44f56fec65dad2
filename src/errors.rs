//! Result-code → HTTP error mapping.
//!
//! Every non-success [`ResultCode`] maps to a log message, a message for
//! the user and an HTTP status. Wording depends on whether the caller is a
//! challenger or a leader; codes where it doesn't matter share one entry.

use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::Config;
use crate::constants::ResultCode;

/// Which side of a queue the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Challenger,
    Leader,
}

/// One row of the error tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub log_message: &'static str,
    pub user_message: Cow<'static, str>,
    pub status: StatusCode,
}

impl ErrorInfo {
    fn new(
        log_message: &'static str,
        user_message: impl Into<Cow<'static, str>>,
        status: StatusCode,
    ) -> Self {
        Self {
            log_message,
            user_message: user_message.into(),
            status,
        }
    }
}

/// Error table entry for `code`, or `None` for [`ResultCode::Success`].
pub fn lookup(
    code: ResultCode,
    audience: Audience,
    max_queues_per_challenger: u32,
) -> Option<ErrorInfo> {
    generic(code).or_else(|| match audience {
        Audience::Challenger => challenger(code, max_queues_per_challenger),
        Audience::Leader => leader(code, max_queues_per_challenger),
    })
}

fn generic(code: ResultCode) -> Option<ErrorInfo> {
    use ResultCode::*;
    let info = match code {
        DbFailure => ErrorInfo::new(
            "Unexpected database error",
            "An unexpected database error occurred, please try again.",
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        InsufficientPermissions => ErrorInfo::new(
            "Insufficient permissions",
            "This account doesn't have sufficient permissions for the requested resource.",
            StatusCode::FORBIDDEN,
        ),
        UsernameTooShort => ErrorInfo::new(
            "Username too short",
            "Usernames can't be shorter than four characters.",
            StatusCode::BAD_REQUEST,
        ),
        UsernameTooLong => ErrorInfo::new(
            "Username too long",
            "Usernames can't be longer than thirty characters.",
            StatusCode::BAD_REQUEST,
        ),
        PasswordTooShort => ErrorInfo::new(
            "Password too short",
            "Passwords can't be shorter than six characters.",
            StatusCode::BAD_REQUEST,
        ),
        UsernameTaken => ErrorInfo::new(
            "Username is already taken",
            "That username is already in use.",
            StatusCode::BAD_REQUEST,
        ),
        RegistrationFailure => ErrorInfo::new(
            "Unknown error during registration",
            "An unknown error occurred during registration, please try again later.",
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        BadCredentials => ErrorInfo::new(
            "Invalid login credentials",
            "Invalid login credentials, please try again.",
            StatusCode::UNAUTHORIZED,
        ),
        InvalidToken => ErrorInfo::new(
            "Invalid access token",
            "Your access token is invalid, please try logging out and back in.",
            StatusCode::UNAUTHORIZED,
        ),
        NotFound => ErrorInfo::new(
            "ID not found",
            "The requested resource ID couldn't be found.",
            StatusCode::NOT_FOUND,
        ),
        QueueAlreadyOpen => ErrorInfo::new(
            "Queue already open",
            "Your queue is already open.",
            StatusCode::BAD_REQUEST,
        ),
        QueueAlreadyClosed => ErrorInfo::new(
            "Queue already closed",
            "Your queue is already closed.",
            StatusCode::BAD_REQUEST,
        ),
        _ => return None,
    };
    Some(info)
}

fn challenger(code: ResultCode, max_queues: u32) -> Option<ErrorInfo> {
    use ResultCode::*;
    let info = match code {
        AlreadyInQueue => ErrorInfo::new(
            "Challenger already in queue",
            "You're already in that leader's queue.",
            StatusCode::BAD_REQUEST,
        ),
        AlreadyWon => ErrorInfo::new(
            "Challenger has already won",
            "You've already earned that leader's badge.",
            StatusCode::BAD_REQUEST,
        ),
        QueueIsFull => ErrorInfo::new(
            "Leader queue is full",
            "That leader's queue is currently full.",
            StatusCode::BAD_REQUEST,
        ),
        TooManyChallenges => ErrorInfo::new(
            "Challenger is in too many queues",
            format!("You're already in {max_queues} different leader queues."),
            StatusCode::BAD_REQUEST,
        ),
        NotInQueue => ErrorInfo::new(
            "Challenger is not in queue",
            "You aren't in that leader's queue.",
            StatusCode::BAD_REQUEST,
        ),
        QueueIsClosed => ErrorInfo::new(
            "Leader queue is closed",
            "That leader's queue is currently closed.",
            StatusCode::BAD_REQUEST,
        ),
        NotEnoughBadges => ErrorInfo::new(
            "Not enough badges to join the queue",
            "You don't have enough badges to join that leader's queue.",
            StatusCode::BAD_REQUEST,
        ),
        NotEnoughEmblems => ErrorInfo::new(
            "Not enough emblems to join the queue",
            "You don't have enough emblems to join that leader's queue.",
            StatusCode::BAD_REQUEST,
        ),
        UnsupportedDifficulty => ErrorInfo::new(
            "Unsupported battle difficulty",
            "That leader doesn't support that battle difficulty.",
            StatusCode::BAD_REQUEST,
        ),
        UnsupportedFormat => ErrorInfo::new(
            "Unsupported battle format",
            "That leader doesn't support that battle format.",
            StatusCode::BAD_REQUEST,
        ),
        QueueStateNotSupported => ErrorInfo::new(
            "Queue state not supported",
            "The current PPL event doesn't support challengers joining queues directly.",
            StatusCode::FORBIDDEN,
        ),
        _ => return None,
    };
    Some(info)
}

fn leader(code: ResultCode, max_queues: u32) -> Option<ErrorInfo> {
    use ResultCode::*;
    let info = match code {
        AlreadyInQueue => ErrorInfo::new(
            "Challenger already in queue",
            "That challenger is already in your queue.",
            StatusCode::BAD_REQUEST,
        ),
        AlreadyWon => ErrorInfo::new(
            "Challenger has already won",
            "That challenger has already earned your badge.",
            StatusCode::BAD_REQUEST,
        ),
        QueueIsFull => ErrorInfo::new(
            "Leader queue is full",
            "Your queue is currently full.",
            StatusCode::BAD_REQUEST,
        ),
        TooManyChallenges => ErrorInfo::new(
            "Challenger is in too many queues",
            format!("That challenger is already in {max_queues} different queues."),
            StatusCode::BAD_REQUEST,
        ),
        NotInQueue => ErrorInfo::new(
            "Challenger is not in queue",
            "That challenger isn't in your queue.",
            StatusCode::BAD_REQUEST,
        ),
        QueueIsClosed => ErrorInfo::new(
            "Leader queue is closed",
            "Your queue is currently closed.",
            StatusCode::BAD_REQUEST,
        ),
        NotEnoughBadges => ErrorInfo::new(
            "Not enough badges to join the queue",
            "That challenger doesn't have enough badges to join your queue.",
            StatusCode::BAD_REQUEST,
        ),
        NotEnoughEmblems => ErrorInfo::new(
            "Not enough emblems to join the queue",
            "That challenger doesn't have enough emblems to join your queue.",
            StatusCode::BAD_REQUEST,
        ),
        UnsupportedDifficulty => ErrorInfo::new(
            "Unsupported battle difficulty",
            "You don't support that battle difficulty.",
            StatusCode::BAD_REQUEST,
        ),
        UnsupportedFormat => ErrorInfo::new(
            "Unsupported battle format",
            "You don't support that battle format.",
            StatusCode::BAD_REQUEST,
        ),
        QueueStateNotSupported => ErrorInfo::new(
            "Queue state not supported",
            "The current PPL event doesn't support opening and closing queues.",
            StatusCode::FORBIDDEN,
        ),
        _ => return None,
    };
    Some(info)
}

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    #[error("api error {code:?}")]
    Api { code: ResultCode, info: ErrorInfo },
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    /// Build the response for a failed operation from the error tables.
    pub fn api(code: ResultCode, audience: Audience, config: &Config) -> Self {
        match lookup(code, audience, config.max_queues_per_challenger) {
            Some(info) => Self::Api { code, info },
            None => Self::Internal(format!("no error mapping for result code {}", code.as_u8())),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Api { code, info } => {
                warn!(
                    code = code.as_u8(),
                    status = info.status.as_u16(),
                    "{}",
                    info.log_message
                );
                let body = serde_json::json!({
                    "code":   code,
                    "error":  info.user_message,
                    "status": info.status.as_u16(),
                });
                (info.status, Json(body)).into_response()
            }
            Self::Internal(msg) => {
                error!(%msg, "internal error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = serde_json::json!({
                    "error":  msg,
                    "status": status.as_u16(),
                });
                (status, Json(body)).into_response()
            }
        }
    }
}
