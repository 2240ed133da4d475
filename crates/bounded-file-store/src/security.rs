//! Name validation and directory permissions.

use crate::error::{BoundedStoreError, Result};
use std::path::{Component, Path};

/// Sets a newly created managed directory to `rwxr-xr-x` (Unix only) so a static file
/// server running as another user can read committed files.
pub async fn set_directory_permissions(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o755);
        tokio::fs::set_permissions(path, perms).await?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

/// Validates that `name` is a single plain file name.
///
/// The store is flat: names with separators, parent references or NUL
/// bytes would let a caller register files outside the managed directory.
pub fn validate_file_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| BoundedStoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }

    if name.contains('\0') {
        return Err(invalid("name contains null bytes"));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(invalid("name must not contain path components")),
    }
}
