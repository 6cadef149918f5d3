use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{CoreError, CoreResult},
    store::{ROLES_KEY, Store},
};

/// Fixed permission set. Serialized with capitalized names to stay
/// wire-compatible with existing `roles` records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Permission {
    Read,
    Write,
    Delete,
}

impl Permission {
    pub fn all() -> [Permission; 3] {
        [Permission::Read, Permission::Write, Permission::Delete]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "Read",
            Permission::Write => "Write",
            Permission::Delete => "Delete",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "delete" => Ok(Permission::Delete),
            _ => Err(format!(
                "Invalid permission: {}. Choose from read, write, delete",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: u64,
    pub name: String,
    pub permissions: Vec<Permission>,
}

/// Owns the role collection. Every mutation persists the full collection.
pub struct RoleRegistry<S: Store> {
    store: S,
    roles: Vec<Role>,
}

impl<S: Store> RoleRegistry<S> {
    pub fn open(store: S) -> Self {
        let roles = store.load(ROLES_KEY);
        Self { store, roles }
    }

    /// Insertion-ordered view of the collection.
    pub fn list(&self) -> &[Role] {
        &self.roles
    }

    pub fn get(&self, id: u64) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn create(&mut self, name: &str, permissions: Vec<Permission>) -> CoreResult<Role> {
        self.validate(name, &permissions, None)?;

        let role = Role {
            id: next_id(self.roles.iter().map(|r| r.id)),
            name: name.to_string(),
            permissions,
        };
        self.roles.push(role.clone());
        self.persist()?;

        info!("Role added: {}", role.name);
        Ok(role)
    }

    pub fn update(
        &mut self,
        id: u64,
        name: &str,
        permissions: Vec<Permission>,
    ) -> CoreResult<Role> {
        self.validate(name, &permissions, Some(id))?;

        let role = self
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("No role with id {id}")))?;
        role.name = name.to_string();
        role.permissions = permissions;
        let updated = role.clone();
        self.persist()?;

        info!("Role updated: {}", updated.name);
        Ok(updated)
    }

    /// Removes the role with `id`, if present. Never cascades to users that
    /// reference the role by name; those references are left dangling.
    pub fn delete(&mut self, id: u64) -> CoreResult<()> {
        let before = self.roles.len();
        self.roles.retain(|r| r.id != id);

        if self.roles.len() == before {
            debug!("Delete of unknown role id {id} ignored");
            return Ok(());
        }

        self.persist()?;
        info!("Role deleted: id {id}");
        Ok(())
    }

    fn validate(
        &self,
        name: &str,
        permissions: &[Permission],
        updating: Option<u64>,
    ) -> CoreResult<()> {
        if name.is_empty() || permissions.is_empty() {
            return Err(CoreError::validation(
                "Role name and at least one permission are required",
            ));
        }

        let taken = self
            .roles
            .iter()
            .any(|r| r.name == name && Some(r.id) != updating);
        if taken {
            return Err(CoreError::Validation(format!(
                "A role named \"{name}\" already exists"
            )));
        }

        Ok(())
    }

    fn persist(&self) -> CoreResult<()> {
        self.store.save(ROLES_KEY, &self.roles)
    }
}

pub(crate) fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registry() -> RoleRegistry<MemoryStore> {
        RoleRegistry::open(MemoryStore::new())
    }

    #[test]
    fn test_create_and_list() {
        let mut roles = registry();
        let role = roles
            .create("Editor", vec![Permission::Read, Permission::Write])
            .unwrap();

        assert_eq!(roles.list().len(), 1);
        assert_eq!(roles.list()[0], role);
        assert_eq!(role.name, "Editor");
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let mut roles = registry();
        let err = roles.create("", vec![Permission::Read]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(roles.list().is_empty());
    }

    #[test]
    fn test_create_rejects_empty_permissions() {
        let mut roles = registry();
        let err = roles.create("Editor", vec![]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(roles.list().is_empty());
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let mut roles = registry();
        roles.create("Editor", vec![Permission::Read]).unwrap();

        let err = roles.create("Editor", vec![Permission::Write]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(roles.list().len(), 1);
    }

    #[test]
    fn test_update_preserves_id_and_length() {
        let mut roles = registry();
        let created = roles.create("Editor", vec![Permission::Read]).unwrap();

        let updated = roles
            .update(created.id, "Reviewer", vec![Permission::Read, Permission::Delete])
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Reviewer");
        assert_eq!(roles.list().len(), 1);
    }

    #[test]
    fn test_update_allows_keeping_own_name() {
        let mut roles = registry();
        let created = roles.create("Editor", vec![Permission::Read]).unwrap();

        let updated = roles
            .update(created.id, "Editor", vec![Permission::Write])
            .unwrap();
        assert_eq!(updated.permissions, vec![Permission::Write]);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut roles = registry();
        let err = roles.update(42, "Editor", vec![Permission::Read]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut roles = registry();
        let created = roles.create("Editor", vec![Permission::Read]).unwrap();

        roles.delete(created.id).unwrap();
        assert!(roles.list().is_empty());

        roles.delete(created.id).unwrap();
        assert!(roles.list().is_empty());
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut roles = registry();
        let a = roles.create("Viewer", vec![Permission::Read]).unwrap();
        let b = roles.create("Editor", vec![Permission::Write]).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_collection_survives_reopen() {
        let store = MemoryStore::new();
        {
            let mut roles = RoleRegistry::open(&store);
            roles.create("Editor", vec![Permission::Read]).unwrap();
        }

        let roles = RoleRegistry::open(&store);
        assert_eq!(roles.list().len(), 1);
        assert_eq!(roles.list()[0].name, "Editor");
    }

    #[test]
    fn test_permission_from_str() {
        assert_eq!(Permission::from_str("read").unwrap(), Permission::Read);
        assert_eq!(Permission::from_str("Write").unwrap(), Permission::Write);
        assert!(Permission::from_str("admin").is_err());
    }

    #[test]
    fn test_permission_serializes_capitalized() {
        let json = serde_json::to_string(&vec![Permission::Read, Permission::Delete]).unwrap();
        assert_eq!(json, r#"["Read","Delete"]"#);
    }
}
