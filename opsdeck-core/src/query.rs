use serde::{Deserialize, Serialize};

use crate::users::User;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Email,
    Role,
    Active,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// View state for the user table. `apply` derives a fresh projection from the
/// registry's collection; nothing here mutates or caches registry state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    pub search: String,
    pub status: StatusFilter,
    pub sort: Option<SortSpec>,
}

impl UserQuery {
    /// Selecting the current sort key flips the direction; selecting a new
    /// key resets to ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        let direction = match self.sort {
            Some(spec) if spec.key == key => spec.direction.flipped(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortSpec { key, direction });
    }

    /// Pipeline order: search, then status filter, then stable sort.
    pub fn apply(&self, users: &[User]) -> Vec<User> {
        let needle = self.search.to_lowercase();

        let mut out: Vec<User> = users
            .iter()
            .filter(|u| needle.is_empty() || matches_search(u, &needle))
            .filter(|u| match self.status {
                StatusFilter::All => true,
                StatusFilter::Active => u.active,
                StatusFilter::Inactive => !u.active,
            })
            .cloned()
            .collect();

        if let Some(spec) = self.sort {
            // Vec::sort_by is stable: equal keys keep their input order.
            out.sort_by(|a, b| {
                let ord = match spec.key {
                    SortKey::Name => a.name.cmp(&b.name),
                    SortKey::Email => a.email.cmp(&b.email),
                    SortKey::Role => a.role.cmp(&b.role),
                    SortKey::Active => a.active.cmp(&b.active),
                };
                match spec.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        out
    }
}

fn matches_search(user: &User, needle: &str) -> bool {
    user.name.to_lowercase().contains(needle)
        || user.email.to_lowercase().contains(needle)
        || user.role.to_lowercase().contains(needle)
}
