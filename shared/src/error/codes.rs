//! Unified error codes for FreelanceHub
//!
//! This module defines all error codes used across hub-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Order errors
//! - 5xxx: Catalog errors
//! - 6xxx: Messaging errors
//! - 7xxx: Review errors
//! - 8xxx: Upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
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
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Requester is neither buyer nor seller of the order
    NotOrderParticipant = 2003,

    // ==================== 3xxx: Account ====================
    /// User not found
    UserNotFound = 3001,
    /// Email already registered
    EmailAlreadyRegistered = 3002,
    /// Password too short
    PasswordTooShort = 3003,
    /// Verification code expired
    VerificationCodeExpired = 3004,
    /// Verification code invalid
    VerificationCodeInvalid = 3005,
    /// Too many verification attempts
    TooManyAttempts = 3006,
    /// Field cannot be changed through profile update
    ProfileFieldLocked = 3007,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status transition not allowed
    InvalidTransition = 4002,
    /// Revision budget exhausted
    NoRevisionsLeft = 4003,
    /// Requested price plan does not exist on the gig
    PlanNotFound = 4004,
    /// Order was modified concurrently
    OrderVersionConflict = 4005,
    /// Seller cannot order own gig
    SelfOrder = 4006,

    // ==================== 5xxx: Catalog ====================
    /// Gig not found
    GigNotFound = 5001,
    /// Gig has no price plans
    GigPlansEmpty = 5002,
    /// Price plan has invalid values
    GigInvalidPlan = 5003,

    // ==================== 6xxx: Messaging ====================
    /// Message not found
    MessageNotFound = 6001,
    /// Receiver is not the other order participant
    InvalidRecipient = 6002,
    /// Message has no content
    EmptyMessage = 6003,

    // ==================== 7xxx: Review ====================
    /// Review not found
    ReviewNotFound = 7001,
    /// Order already reviewed
    ReviewAlreadyExists = 7002,
    /// Order must be completed before review
    OrderNotCompleted = 7003,
    /// Rating outside 1..=5
    InvalidRating = 7004,

    // ==================== 8xxx: Upload ====================
    /// File too large
    FileTooLarge = 8001,
    /// Unsupported file format
    UnsupportedFileFormat = 8002,
    /// Invalid/corrupted image file
    InvalidImageFile = 8003,
    /// No file provided in request
    NoFileProvided = 8004,
    /// Empty file provided
    EmptyFile = 8005,
    /// No filename provided
    NoFilename = 8006,
    /// Invalid file extension
    InvalidFileExtension = 8007,
    /// File storage failed
    FileStorageFailed = 8008,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Mail could not be delivered
    MailDeliveryFailed = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::NotOrderParticipant => "Not a participant of this order",

            // Account
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::VerificationCodeExpired => "Verification code has expired",
            ErrorCode::VerificationCodeInvalid => "Invalid verification code",
            ErrorCode::TooManyAttempts => "Too many attempts",
            ErrorCode::ProfileFieldLocked => "Field cannot be changed here",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Order status transition not allowed",
            ErrorCode::NoRevisionsLeft => "No revisions left",
            ErrorCode::PlanNotFound => "Price plan not found",
            ErrorCode::OrderVersionConflict => "Order was modified concurrently",
            ErrorCode::SelfOrder => "Cannot order your own gig",

            // Catalog
            ErrorCode::GigNotFound => "Gig not found",
            ErrorCode::GigPlansEmpty => "Gig must have at least one price plan",
            ErrorCode::GigInvalidPlan => "Price plan is invalid",

            // Messaging
            ErrorCode::MessageNotFound => "Message not found",
            ErrorCode::InvalidRecipient => "Receiver is not a participant of this order",
            ErrorCode::EmptyMessage => "Message content is empty",

            // Review
            ErrorCode::ReviewNotFound => "Review not found",
            ErrorCode::ReviewAlreadyExists => "Order has already been reviewed",
            ErrorCode::OrderNotCompleted => "Order is not completed",
            ErrorCode::InvalidRating => "Rating must be between 1 and 5",

            // Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::InvalidFileExtension => "Invalid file extension",
            ErrorCode::FileStorageFailed => "File storage failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::MailDeliveryFailed => "Mail delivery failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
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
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::NotOrderParticipant),

            // Account
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::EmailAlreadyRegistered),
            3003 => Ok(ErrorCode::PasswordTooShort),
            3004 => Ok(ErrorCode::VerificationCodeExpired),
            3005 => Ok(ErrorCode::VerificationCodeInvalid),
            3006 => Ok(ErrorCode::TooManyAttempts),
            3007 => Ok(ErrorCode::ProfileFieldLocked),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::NoRevisionsLeft),
            4004 => Ok(ErrorCode::PlanNotFound),
            4005 => Ok(ErrorCode::OrderVersionConflict),
            4006 => Ok(ErrorCode::SelfOrder),

            // Catalog
            5001 => Ok(ErrorCode::GigNotFound),
            5002 => Ok(ErrorCode::GigPlansEmpty),
            5003 => Ok(ErrorCode::GigInvalidPlan),

            // Messaging
            6001 => Ok(ErrorCode::MessageNotFound),
            6002 => Ok(ErrorCode::InvalidRecipient),
            6003 => Ok(ErrorCode::EmptyMessage),

            // Review
            7001 => Ok(ErrorCode::ReviewNotFound),
            7002 => Ok(ErrorCode::ReviewAlreadyExists),
            7003 => Ok(ErrorCode::OrderNotCompleted),
            7004 => Ok(ErrorCode::InvalidRating),

            // Upload
            8001 => Ok(ErrorCode::FileTooLarge),
            8002 => Ok(ErrorCode::UnsupportedFileFormat),
            8003 => Ok(ErrorCode::InvalidImageFile),
            8004 => Ok(ErrorCode::NoFileProvided),
            8005 => Ok(ErrorCode::EmptyFile),
            8006 => Ok(ErrorCode::NoFilename),
            8007 => Ok(ErrorCode::InvalidFileExtension),
            8008 => Ok(ErrorCode::FileStorageFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::MailDeliveryFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
