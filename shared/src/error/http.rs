//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::UserNotFound
            | Self::OrderNotFound
            | Self::GigNotFound
            | Self::MessageNotFound
            | Self::ReviewNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmailAlreadyRegistered
            | Self::ReviewAlreadyExists
            | Self::OrderVersionConflict => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::NotOrderParticipant
            | Self::InvalidRecipient
            | Self::SelfOrder => StatusCode::FORBIDDEN,

            // 422 Unprocessable: state machine violations
            Self::InvalidTransition | Self::NoRevisionsLeft | Self::OrderNotCompleted => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 415 Unsupported Media Type
            Self::UnsupportedFileFormat | Self::InvalidFileExtension => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }

            // 429 Too Many Requests
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway: external collaborator failed
            Self::MailDeliveryFailed => StatusCode::BAD_GATEWAY,

            // 504 Gateway Timeout
            Self::TimeoutError => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::NetworkError
            | Self::ConfigError
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::PasswordTooShort
            | Self::VerificationCodeExpired
            | Self::VerificationCodeInvalid
            | Self::ProfileFieldLocked
            | Self::PlanNotFound
            | Self::GigPlansEmpty
            | Self::GigInvalidPlan
            | Self::EmptyMessage
            | Self::InvalidRating
            | Self::InvalidImageFile
            | Self::NoFileProvided
            | Self::EmptyFile
            | Self::NoFilename => StatusCode::BAD_REQUEST,
        }
    }
}
