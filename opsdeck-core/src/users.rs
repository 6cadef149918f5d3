use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{CoreError, CoreResult},
    roles::next_id,
    store::{Store, USERS_KEY},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// Weak reference to a role's name. Not kept consistent when the role is
    /// renamed or deleted; a dangling value is permitted.
    pub role: String,
    pub active: bool,
}

/// Owns the user collection. Every mutation persists the full collection.
pub struct UserRegistry<S: Store> {
    store: S,
    users: Vec<User>,
}

impl<S: Store> UserRegistry<S> {
    pub fn open(store: S) -> Self {
        let users = store.load(USERS_KEY);
        Self { store, users }
    }

    /// Insertion-ordered view of the collection.
    pub fn list(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn create(&mut self, name: &str, email: &str, role: &str, active: bool) -> CoreResult<User> {
        validate(name, email, role)?;

        let user = User {
            id: next_id(self.users.iter().map(|u| u.id)),
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            active,
        };
        self.users.push(user.clone());
        self.persist()?;

        info!("User created: {}", user.name);
        Ok(user)
    }

    pub fn update(
        &mut self,
        id: u64,
        name: &str,
        email: &str,
        role: &str,
        active: bool,
    ) -> CoreResult<User> {
        validate(name, email, role)?;

        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("No user with id {id}")))?;
        user.name = name.to_string();
        user.email = email.to_string();
        user.role = role.to_string();
        user.active = active;
        let updated = user.clone();
        self.persist()?;

        info!("User updated: {}", updated.name);
        Ok(updated)
    }

    pub fn delete(&mut self, id: u64) -> CoreResult<()> {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);

        if self.users.len() == before {
            debug!("Delete of unknown user id {id} ignored");
            return Ok(());
        }

        self.persist()?;
        info!("User deleted: id {id}");
        Ok(())
    }

    fn persist(&self) -> CoreResult<()> {
        self.store.save(USERS_KEY, &self.users)
    }
}

fn validate(name: &str, email: &str, role: &str) -> CoreResult<()> {
    if name.is_empty() || email.is_empty() || role.is_empty() {
        return Err(CoreError::validation("Please fill in all fields"));
    }

    if !valid_email(email) {
        return Err(CoreError::validation("Please enter a valid email address"));
    }

    // Role existence is deliberately not checked here; the presentation layer
    // offers existing role names and stale references stay readable.
    Ok(())
}

/// Matches `local@domain.tld`: no whitespace, a single `@`, and a dot inside
/// the domain with characters on both sides.
pub fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let clean = |s: &str| !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == '@');

    clean(local)
        && clean(domain)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
