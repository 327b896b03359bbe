//! Local file paths for downloaded attachments.
//!
//! Paths are capped at [`MAX_PATH_LENGTH`] characters so the attachment
//! folders stay usable on hosts with a classic 260-character path limit.

use std::path::{Path, PathBuf};

use wimigrate_types::attachment::Attachment;

/// Longest allowed fully-qualified attachment path, in characters.
pub const MAX_PATH_LENGTH: usize = 259;

#[derive(Debug, thiserror::Error)]
pub enum AttachmentPathError {
    #[error("cannot resolve attachment directory {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("attachment name {name:?} has no usable file name")]
    InvalidName { name: String },
    #[error("{path} exceeds {max} characters by {overflow} and its file stem is too short to shorten")]
    CannotShorten {
        path: PathBuf,
        overflow: usize,
        max: usize,
    },
}

fn char_len(path: &Path) -> usize {
    path.as_os_str().to_string_lossy().chars().count()
}

/// Last component of a service-supplied attachment name, splitting on either
/// separator.
fn leaf_name(file_name: &str) -> Result<&str, AttachmentPathError> {
    let leaf = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    if leaf.is_empty() || leaf == "." || leaf == ".." {
        return Err(AttachmentPathError::InvalidName {
            name: file_name.to_string(),
        });
    }
    Ok(leaf)
}

/// Join the last component of `file_name` onto the absolute form of
/// `directory`, trimming the end of the file stem until the whole path fits
/// in [`MAX_PATH_LENGTH`].
///
/// The extension is never altered.
///
/// # Errors
///
/// [`AttachmentPathError::InvalidName`] if `file_name` ends in an empty, `.`
/// or `..` component,
/// [`AttachmentPathError::Resolve`] if the directory cannot be made absolute,
/// [`AttachmentPathError::CannotShorten`] if trimming would consume the
/// entire stem.
pub fn ensure_allowed_length(
    directory: &Path,
    file_name: &str,
) -> Result<PathBuf, AttachmentPathError> {
    let file_name = leaf_name(file_name)?;
    let directory = std::path::absolute(directory).map_err(|source| AttachmentPathError::Resolve {
        path: directory.to_path_buf(),
        source,
    })?;

    let full = directory.join(file_name);
    let length = char_len(&full);
    if length <= MAX_PATH_LENGTH {
        return Ok(full);
    }
    let overflow = length - MAX_PATH_LENGTH;

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let stem_len = stem.chars().count();
    if overflow >= stem_len {
        return Err(AttachmentPathError::CannotShorten {
            path: full,
            overflow,
            max: MAX_PATH_LENGTH,
        });
    }

    let shortened: String = stem.chars().take(stem_len - overflow).collect();
    Ok(directory.join(format!("{shortened}{extension}")))
}

/// Prefix the file name of `file_path` with `<attachment_id>_`, keeping its
/// directory.
///
/// The result is not length-checked; run it back through
/// [`ensure_allowed_length`].
#[must_use]
pub fn ensure_unique_name(attachment_id: u32, file_path: &Path) -> PathBuf {
    let name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_path.with_file_name(format!("{attachment_id}_{name}"))
}

/// Whether another attachment on the same record shares this display name
/// (case-insensitive) under a different id.
#[must_use]
pub fn collides(attachment: &Attachment, siblings: &[Attachment]) -> bool {
    siblings
        .iter()
        .any(|other| other.id != attachment.id && other.name.eq_ignore_ascii_case(&attachment.name))
}

/// Download target for `attachment` inside `directory`.
///
/// # Errors
///
/// Propagates [`AttachmentPathError`] from length normalisation.
pub fn download_path(
    directory: &Path,
    attachment: &Attachment,
    siblings: &[Attachment],
) -> Result<PathBuf, AttachmentPathError> {
    let path = ensure_allowed_length(directory, &attachment.name)?;
    if !collides(attachment, siblings) {
        return Ok(path);
    }
    unique_path(directory, attachment)
}

/// Id-prefixed variant of the attachment's path, length-normalised.
///
/// # Errors
///
/// Propagates [`AttachmentPathError`] from length normalisation.
pub fn unique_path(directory: &Path, attachment: &Attachment) -> Result<PathBuf, AttachmentPathError> {
    let plain = ensure_allowed_length(directory, &attachment.name)?;
    let unique = ensure_unique_name(attachment.id, &plain);
    let unique_name = unique
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ensure_allowed_length(directory, &unique_name)
}
