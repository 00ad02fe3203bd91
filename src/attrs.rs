//! Extended attribute (xattr) access.
//!
//! Extended attributes are the second place metadata hides: macOS Finder
//! tags, quarantine records, and `user.*` entries on Linux all travel with
//! the file without being part of its bytes. On Unix targets this module
//! wraps the `xattr` crate; everywhere else every query reports "no
//! attributes" and removal succeeds without doing anything, so callers
//! never need platform checks of their own.

use std::ffi::OsString;
use std::path::Path;

use anyhow::Result;

#[cfg(unix)]
mod imp {
    use std::ffi::OsString;
    use std::path::Path;

    use anyhow::{Context, Result};

    pub(super) const SUPPORTED: bool = xattr::SUPPORTED_PLATFORM;

    pub(super) fn names(path: &Path) -> Vec<OsString> {
        match xattr::list(path) {
            Ok(names) => names.collect(),
            Err(e) => {
                // Filesystems without xattr support report an error here,
                // which counts as "no attributes".
                log::debug!(
                    "Could not list extended attributes on {}: {e}",
                    path.display()
                );
                Vec::new()
            }
        }
    }

    pub(super) fn clear(path: &Path) -> Result<()> {
        for name in names(path) {
            xattr::remove(path, &name).with_context(|| {
                format!(
                    "Failed to remove extended attribute {:?} from {}",
                    name,
                    path.display()
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod imp {
    use std::ffi::OsString;
    use std::path::Path;

    use anyhow::Result;

    pub(super) const SUPPORTED: bool = false;

    pub(super) fn names(_path: &Path) -> Vec<OsString> {
        Vec::new()
    }

    pub(super) fn clear(_path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Whether this build can read and remove extended attributes at all.
pub fn supported() -> bool {
    imp::SUPPORTED
}

/// List the extended attribute names on a file.
///
/// Returns an empty list when the platform or filesystem has no extended
/// attribute support, or when the file cannot be queried.
pub fn names(path: &Path) -> Vec<OsString> {
    imp::names(path)
}

/// Remove every extended attribute from a file.
///
/// A listing failure means there is nothing to remove. Failing to remove an
/// attribute that was listed is a real error and propagates.
pub fn clear(path: &Path) -> Result<()> {
    imp::clear(path)
}
