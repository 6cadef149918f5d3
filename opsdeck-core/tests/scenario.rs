use std::time::Duration;

use opsdeck_core::{
    confirm::{ConfirmationFlow, Outcome},
    query::{StatusFilter, UserQuery},
    roles::{Permission, RoleRegistry},
    store::MemoryStore,
    users::UserRegistry,
};

#[test]
fn editor_role_with_one_user() {
    let store = MemoryStore::new();
    let mut roles = RoleRegistry::open(&store);
    let mut users = UserRegistry::open(&store);

    roles
        .create("Editor", vec![Permission::Read, Permission::Write])
        .unwrap();
    users
        .create("Jane Doe", "jane@example.com", "Editor", true)
        .unwrap();

    assert_eq!(users.list().len(), 1);
    assert_eq!(users.list()[0].role, "Editor");

    let mut query = UserQuery::default();

    query.status = StatusFilter::Inactive;
    assert!(query.apply(users.list()).is_empty());

    query.status = StatusFilter::All;
    query.search = "jane".to_string();
    assert_eq!(query.apply(users.list()).len(), 1);

    query.search = "admin".to_string();
    assert!(query.apply(users.list()).is_empty());
}

#[test]
fn deleting_a_role_leaves_user_references_dangling() {
    let store = MemoryStore::new();
    let mut roles = RoleRegistry::open(&store);
    let mut users = UserRegistry::open(&store);

    let editor = roles
        .create("Editor", vec![Permission::Read, Permission::Write])
        .unwrap();
    users
        .create("Jane Doe", "jane@example.com", "Editor", true)
        .unwrap();

    roles.delete(editor.id).unwrap();

    assert!(roles.list().is_empty());
    assert_eq!(users.list().len(), 1);
    assert_eq!(users.list()[0].role, "Editor");
}

#[test]
fn registries_share_one_store_without_clobbering_each_other() {
    let store = MemoryStore::new();

    {
        let mut roles = RoleRegistry::open(&store);
        let mut users = UserRegistry::open(&store);
        roles.create("Viewer", vec![Permission::Read]).unwrap();
        users
            .create("Bob Stone", "bob@example.com", "Viewer", false)
            .unwrap();
    }

    let roles = RoleRegistry::open(&store);
    let users = UserRegistry::open(&store);
    assert_eq!(roles.list().len(), 1);
    assert_eq!(users.list().len(), 1);
    assert_eq!(users.list()[0].name, "Bob Stone");
}

#[tokio::test]
async fn confirmed_delete_goes_through_the_gate() {
    let store = MemoryStore::new();
    let mut users = UserRegistry::open(&store);
    let jane = users
        .create("Jane Doe", "jane@example.com", "Editor", true)
        .unwrap();

    let mut flow = ConfirmationFlow::new(Duration::from_millis(10));
    flow.arm().unwrap();
    let outcome = flow.resolve(|| users.delete(jane.id)).await.unwrap();

    assert!(matches!(outcome, Outcome::Confirmed(Ok(()))));
    assert!(users.list().is_empty());
}

#[tokio::test]
async fn cancelled_delete_leaves_the_registry_untouched() {
    let store = MemoryStore::new();
    let mut users = UserRegistry::open(&store);
    let jane = users
        .create("Jane Doe", "jane@example.com", "Editor", true)
        .unwrap();

    let mut flow = ConfirmationFlow::new(Duration::from_millis(200));
    let token = flow.arm().unwrap();
    token.cancel();

    let outcome = flow.resolve(|| users.delete(jane.id)).await.unwrap();
    assert!(matches!(outcome, Outcome::Cancelled));
    assert_eq!(users.list().len(), 1);
}
