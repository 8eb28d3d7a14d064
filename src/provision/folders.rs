//! Folder-tree materialization under a root container.

use std::collections::BTreeMap;

use crate::gateway::PlatformGateway;
use crate::models::{join_path, split_path, EntityDraft, EntityId, EntityType, FolderEntry};

use super::error::ProvisionError;
use super::resolver;

/// Materialize a folder spec under `root`, returning the path-to-ID mapping.
///
/// The mapping is seeded with `"."` at the root. Each entry's directory is
/// resolved (find-or-create) if not already mapped, then each subdirectory is
/// resolved beneath it. Re-running against an already-materialized root
/// creates nothing new and returns the same mapping.
pub async fn materialize(
    gateway: &dyn PlatformGateway,
    root: &EntityId,
    spec: &[FolderEntry],
) -> Result<BTreeMap<String, EntityId>, ProvisionError> {
    let mut lookup: BTreeMap<String, EntityId> = BTreeMap::new();
    lookup.insert(".".to_string(), root.clone());

    for entry in spec {
        let dir_id = match lookup.get(&entry.path) {
            Some(id) => id.clone(),
            None => {
                let (parent_path, name) = split_path(&entry.path);
                let parent = lookup
                    .get(parent_path)
                    .ok_or_else(|| ProvisionError::UnrootedFolder {
                        path: entry.path.clone(),
                    })?
                    .clone();
                let folder = resolver::find_or_create(
                    gateway,
                    &EntityDraft::new(name, EntityType::Folder).with_parent(parent),
                )
                .await?;
                lookup.insert(entry.path.clone(), folder.id.clone());
                folder.id
            }
        };

        for name in &entry.subfolders {
            let path = join_path(&entry.path, name);
            if lookup.contains_key(&path) {
                continue;
            }
            let folder = resolver::find_or_create(
                gateway,
                &EntityDraft::new(name, EntityType::Folder).with_parent(dir_id.clone()),
            )
            .await?;
            lookup.insert(path, folder.id);
        }
    }

    Ok(lookup)
}
