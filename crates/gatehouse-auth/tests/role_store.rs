use gatehouse_auth::store::RoleStore;
use gatehouse_auth::{AuthError, PermissionSet, SqliteRoleStore};

async fn store() -> SqliteRoleStore {
    let store = SqliteRoleStore::open_in_memory().expect("open store");
    store.migrate().await.expect("migrate");
    store
}

fn set(perms: &[&str]) -> PermissionSet {
    perms.iter().copied().collect()
}

#[tokio::test]
async fn seeding_is_idempotent_and_keeps_edits() {
    let store = store().await;
    store.seed_defaults().await.unwrap();
    let roles = store.list_roles().await.unwrap();
    let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(roles.len(), 3);
    assert!(names.contains(&"viewer") && names.contains(&"editor") && names.contains(&"admin"));
    assert!(roles.iter().all(|r| r.is_system));

    let editor = store.get_role_by_name("editor").await.unwrap();
    store.toggle_role_permission(&editor.id, "contacts.delete").await.unwrap();

    store.seed_defaults().await.unwrap();
    assert_eq!(store.list_roles().await.unwrap().len(), 3);
    let editor = store.get_role_by_name("editor").await.unwrap();
    assert!(editor.permissions.contains("contacts.delete"));
}

#[tokio::test]
async fn create_and_fetch_role() {
    let store = store().await;
    let role = store
        .create_role("support", "Answers contact submissions", false, &set(&["contacts.*"]))
        .await
        .unwrap();
    assert_eq!(role.name, "support");
    assert!(!role.is_system);
    assert_eq!(role.permissions, set(&["contacts.*"]));

    let fetched = store.get_role(&role.id).await.unwrap();
    assert_eq!(fetched, role);
}

#[tokio::test]
async fn duplicate_role_name_is_rejected() {
    let store = store().await;
    store.create_role("support", "", false, &PermissionSet::new()).await.unwrap();
    let err = store
        .create_role("support", "", false, &PermissionSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Duplicate(_)));
}

#[tokio::test]
async fn malformed_permissions_are_not_stored() {
    let store = store().await;
    let err = store
        .create_role("broken", "", false, &set(&["content..view"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidPermission { .. }));
    assert!(matches!(
        store.get_role_by_name("broken").await,
        Err(AuthError::NotFound(_))
    ));
}

#[tokio::test]
async fn toggle_twice_restores_stored_set() {
    let store = store().await;
    let role = store
        .create_role("author", "", false, &set(&["content.view"]))
        .await
        .unwrap();
    let on = store.toggle_role_permission(&role.id, "content.*").await.unwrap();
    assert_eq!(on.permissions, set(&["content.*", "content.view"]));
    let off = store.toggle_role_permission(&role.id, "content.*").await.unwrap();
    assert_eq!(off.permissions, role.permissions);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_toggles_on_one_role_all_land() {
    let store = std::sync::Arc::new(store().await);
    let role = store.create_role("busy", "", false, &PermissionSet::new()).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..200 {
        let store = store.clone();
        let id = role.id.clone();
        handles.push(tokio::spawn(async move {
            store.toggle_role_permission(&id, &format!("m{i}.view")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let held = store.get_role(&role.id).await.unwrap().permissions;
    assert_eq!(held.len(), 200);
    assert!(held.contains("m0.view") && held.contains("m199.view"));
}

#[tokio::test]
async fn toggle_rejects_malformed_and_unknown() {
    let store = store().await;
    let role = store.create_role("author", "", false, &set(&["content.view"])).await.unwrap();
    let err = store
        .toggle_role_permission(&role.id, "content.*.view")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidPermission { .. }));
    assert_eq!(store.get_role(&role.id).await.unwrap().permissions, role.permissions);

    let err = store.toggle_role_permission("missing", "content.view").await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound(_)));
}

#[tokio::test]
async fn system_roles_cannot_be_deleted() {
    let store = store().await;
    store.seed_defaults().await.unwrap();
    let admin = store.get_role_by_name("admin").await.unwrap();
    assert!(matches!(
        store.delete_role(&admin.id).await,
        Err(AuthError::Forbidden(_))
    ));

    let temp = store.create_role("temp", "", false, &PermissionSet::new()).await.unwrap();
    store.delete_role(&temp.id).await.unwrap();
    assert!(matches!(store.get_role(&temp.id).await, Err(AuthError::NotFound(_))));
}

#[tokio::test]
async fn user_permissions_union_assigned_roles() {
    let store = store().await;
    let media = store
        .create_role("media", "", false, &set(&["content.media.*", "profile.view"]))
        .await
        .unwrap();
    let support = store
        .create_role("support", "", false, &set(&["contacts.view", "profile.view"]))
        .await
        .unwrap();
    let user = store.create_user("dana", Some("dana@example.com")).await.unwrap();

    store.assign_role(&user.id, &media.id).await.unwrap();
    store.assign_role(&user.id, &support.id).await.unwrap();
    // Assigning twice is a no-op.
    store.assign_role(&user.id, &support.id).await.unwrap();

    let perms = store.get_user_permissions(&user.id).await.unwrap();
    assert_eq!(perms, set(&["contacts.view", "content.media.*", "profile.view"]));

    let subject = store.subject(&user.id).await.unwrap();
    assert_eq!(subject.name, "dana");
    assert_eq!(subject.roles, vec!["media", "support"]);
    assert!(gatehouse_auth::require_permission(&subject, "content.media.delete").is_ok());
    assert!(gatehouse_auth::require_permission(&subject, "content.view").is_err());

    store.unassign_role(&user.id, &media.id).await.unwrap();
    let perms = store.get_user_permissions(&user.id).await.unwrap();
    assert_eq!(perms, set(&["contacts.view", "profile.view"]));
    assert!(matches!(
        store.unassign_role(&user.id, &media.id).await,
        Err(AuthError::NotFound(_))
    ));
}

#[tokio::test]
async fn assigning_unknown_role_is_not_found() {
    let store = store().await;
    let user = store.create_user("erin", None).await.unwrap();
    assert!(matches!(
        store.assign_role(&user.id, "missing").await,
        Err(AuthError::NotFound(_))
    ));
    assert!(matches!(
        store.create_user("erin", None).await,
        Err(AuthError::Duplicate(_))
    ));
}

#[tokio::test]
async fn on_disk_store_survives_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("gatehouse.db");
    let path = path.to_str().unwrap();
    {
        let store = SqliteRoleStore::open(path).unwrap();
        store.migrate().await.unwrap();
        store.create_role("ops", "", false, &set(&["dashboard.*"])).await.unwrap();
    }
    let store = SqliteRoleStore::open(path).unwrap();
    store.migrate().await.unwrap();
    let ops = store.get_role_by_name("ops").await.unwrap();
    assert!(ops.permissions.allows("dashboard.view"));
}
