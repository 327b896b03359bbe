//! Attachment path normalisation and transfer.

pub mod paths;
pub mod transfer;

pub use paths::{ensure_allowed_length, ensure_unique_name, AttachmentPathError, MAX_PATH_LENGTH};
pub use transfer::{AttachmentTransfer, TransferReport};
