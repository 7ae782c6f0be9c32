//! Outbound collaborators
//!
//! - [`Mailer`] - one-time code delivery (log or SES)
//! - [`FileStore`] - content-addressed upload storage

pub mod file_store;
pub mod mailer;

pub use file_store::{FileStore, FileStoreError, LocalFileStore, StoredFile, UploadKind};
pub use mailer::{LogMailer, MailError, Mailer, SesMailer};
