//! Single-entry mutations: rename, delete, create.

use rfe_core::{Entry, RemoteFs, path};
use tracing::info;

use crate::error::{OpsError, OpsResult};

/// Rename `entry` in place.
///
/// Returns `Ok(false)` without a call when the new name is blank or equal to
/// the current one.
pub async fn rename(remote: &dyn RemoteFs, entry: &Entry, new_name: &str) -> OpsResult<bool> {
    let new_name = new_name.trim();
    if new_name.is_empty() || entry.name == new_name {
        return Ok(false);
    }
    remote.rename(&entry.path, new_name).await?;
    info!(from = %entry.path, to = new_name, "Renamed");
    Ok(true)
}

/// Delete `entry`.
pub async fn delete(remote: &dyn RemoteFs, entry: &Entry) -> OpsResult<()> {
    remote.delete(&entry.path).await?;
    info!(path = %entry.path, "Deleted");
    Ok(())
}

/// Create directory `name` inside `dir`. Returns the new path.
pub async fn create_directory(remote: &dyn RemoteFs, dir: &str, name: &str) -> OpsResult<String> {
    let target = child_path(dir, name)?;
    remote.mkdir(&target).await?;
    info!(path = %target, "Created directory");
    Ok(target)
}

/// Create empty file `name` inside `dir`. Returns the new path.
pub async fn create_file(remote: &dyn RemoteFs, dir: &str, name: &str) -> OpsResult<String> {
    let target = child_path(dir, name)?;
    remote.save(&target, "").await?;
    info!(path = %target, "Created file");
    Ok(target)
}

fn child_path(dir: &str, name: &str) -> OpsResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OpsError::EmptyName);
    }
    Ok(path::join(dir, name))
}
