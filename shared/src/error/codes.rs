//! Unified error codes for the quick-wheel core
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Messaging errors
//! - 7xxx: Notification errors
//! - 8xxx: Analytics errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that presentation code
/// written in any language can switch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Requested status is not reachable from the current status
    InvalidTransition = 4002,
    /// Transition needs a rider and none was supplied
    RiderRequired = 4003,
    /// Rider supplied conflicts with the assigned one
    RiderConflict = 4004,
    /// Order has no line items or malformed amounts
    InvalidOrderDetails = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// Payment amount invalid
    InvalidAmount = 5002,
    /// Payment already being verified
    PaymentInProgress = 5003,

    // ==================== 6xxx: Messaging ====================
    /// Thread not found
    ThreadNotFound = 6001,
    /// Sender is not a participant of the thread
    NotAParticipant = 6002,
    /// Thread needs at least two participants
    TooFewParticipants = 6003,

    // ==================== 7xxx: Notification ====================
    /// Notification not found
    NotificationNotFound = 7001,
    /// Notification preferences not found
    PreferencesNotFound = 7002,

    // ==================== 8xxx: Analytics ====================
    /// Analytics filter is malformed
    InvalidFilter = 8001,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Underlying key-value store failed
    StorageUnavailable = 9002,
    /// Stored payload could not be decoded
    StorageCorrupted = 9003,
}

/// Coarse failure taxonomy reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTransition,
    NotFound,
    StorageUnavailable,
    ValidationFailure,
    Internal,
}

impl ErrorCode {
    /// Get the numeric code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Taxonomy bucket of this code
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::InvalidTransition => ErrorKind::InvalidTransition,
            ErrorCode::NotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::PaymentNotFound
            | ErrorCode::ThreadNotFound
            | ErrorCode::NotificationNotFound
            | ErrorCode::PreferencesNotFound => ErrorKind::NotFound,
            ErrorCode::StorageUnavailable | ErrorCode::StorageCorrupted => {
                ErrorKind::StorageUnavailable
            }
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidRequest
            | ErrorCode::RiderRequired
            | ErrorCode::RiderConflict
            | ErrorCode::InvalidOrderDetails
            | ErrorCode::InvalidAmount
            | ErrorCode::PaymentInProgress
            | ErrorCode::NotAParticipant
            | ErrorCode::TooFewParticipants
            | ErrorCode::InvalidFilter => ErrorKind::ValidationFailure,
            ErrorCode::Success | ErrorCode::Unknown | ErrorCode::InternalError => {
                ErrorKind::Internal
            }
        }
    }

    /// Default message for this code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Invalid status transition",
            ErrorCode::RiderRequired => "A rider must be assigned",
            ErrorCode::RiderConflict => "Order already has a different rider",
            ErrorCode::InvalidOrderDetails => "Invalid order details",

            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::InvalidAmount => "Invalid amount",
            ErrorCode::PaymentInProgress => "Payment is already being verified",

            ErrorCode::ThreadNotFound => "Message thread not found",
            ErrorCode::NotAParticipant => "Sender is not a participant of this thread",
            ErrorCode::TooFewParticipants => "A thread needs at least two participants",

            ErrorCode::NotificationNotFound => "Notification not found",
            ErrorCode::PreferencesNotFound => "Notification preferences not found",

            ErrorCode::InvalidFilter => "Invalid analytics filter",

            ErrorCode::InternalError => "Internal error",
            ErrorCode::StorageUnavailable => "Storage unavailable",
            ErrorCode::StorageCorrupted => "Stored data is corrupted",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::RiderRequired),
            4004 => Ok(ErrorCode::RiderConflict),
            4005 => Ok(ErrorCode::InvalidOrderDetails),

            // Payment
            5001 => Ok(ErrorCode::PaymentNotFound),
            5002 => Ok(ErrorCode::InvalidAmount),
            5003 => Ok(ErrorCode::PaymentInProgress),

            // Messaging
            6001 => Ok(ErrorCode::ThreadNotFound),
            6002 => Ok(ErrorCode::NotAParticipant),
            6003 => Ok(ErrorCode::TooFewParticipants),

            // Notification
            7001 => Ok(ErrorCode::NotificationNotFound),
            7002 => Ok(ErrorCode::PreferencesNotFound),

            // Analytics
            8001 => Ok(ErrorCode::InvalidFilter),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageUnavailable),
            9003 => Ok(ErrorCode::StorageCorrupted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(4002), Ok(ErrorCode::InvalidTransition));
        assert_eq!(ErrorCode::try_from(9002), Ok(ErrorCode::StorageUnavailable));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::ThreadNotFound).unwrap();
        assert_eq!(json, "6001");
        let code: ErrorCode = serde_json::from_str("7002").unwrap();
        assert_eq!(code, ErrorCode::PreferencesNotFound);
    }

    #[test]
    fn test_kind_buckets() {
        assert_eq!(ErrorCode::OrderNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::ThreadNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::InvalidTransition.kind(), ErrorKind::InvalidTransition);
        assert_eq!(ErrorCode::RiderRequired.kind(), ErrorKind::ValidationFailure);
        assert_eq!(ErrorCode::StorageCorrupted.kind(), ErrorKind::StorageUnavailable);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::InvalidTransition.to_string(), "E4002");
        assert_eq!(ErrorCode::ValidationFailed.to_string(), "E0002");
    }
}
