use gatehouse_auth::catalog::{DEFAULT_ROLES, builtin_matrix};
use gatehouse_auth::matrix::module_wildcard;
use gatehouse_auth::{
    CheckState, ModuleGrid, PermissionMatrix, PermissionSet, has_all_permissions,
    has_any_permission, has_permission,
};

fn content_matrix() -> PermissionMatrix {
    PermissionMatrix::from_json(
        r#"{"modules":["content"],"actions":["view","edit"],
            "permissions":["content.view","content.edit","content.media.view"]}"#,
    )
    .unwrap()
}

#[test]
fn content_media_end_to_end() {
    let matrix = content_matrix();
    let held: PermissionSet = ["content.media.*"].into_iter().collect();

    assert!(has_permission(&held, "content.media.view"));
    assert!(!has_permission(&held, "content.view"));

    let grid = ModuleGrid::build(&matrix, &held, "content");
    let media = &grid.sections[0];
    assert_eq!(media.submodule, "media");
    assert!(media.rows.iter().all(|r| r.state.is_locked()));
    assert!(grid.direct.iter().all(|r| r.state == CheckState::Unchecked));

    let next = held.toggled(&module_wildcard("content"));
    assert!(has_permission(&next, "content.edit"));
    let grid = ModuleGrid::build(&matrix, &next, "content");
    assert!(grid.wildcard_held);
    assert!(grid.rows().all(|r| r.state == CheckState::ModuleWildcard));
    // The submodule wildcard is still stored underneath.
    assert!(next.contains("content.media.*"));
}

#[test]
fn editor_role_against_builtin_matrix() {
    let matrix = builtin_matrix();
    let editor = DEFAULT_ROLES.iter().find(|r| r.name == "editor").unwrap();
    let held: PermissionSet = editor.permissions.iter().copied().collect();

    assert!(has_all_permissions(&held, &matrix.covered_by("content.*")));
    assert!(!has_any_permission(&held, &["users.view", "roles.edit"]));
    assert!(has_any_permission(&held, &["users.view", "contacts.view"]));
    assert!(matrix.orphaned(&held).is_empty());
}

#[test]
fn stale_permissions_are_inert() {
    let matrix = builtin_matrix();
    let held: PermissionSet = ["legacy.export", "legacy.*"].into_iter().collect();
    assert!(has_permission(&held, "legacy.export"));
    assert!(has_permission(&held, "legacy.import"));
    assert_eq!(matrix.orphaned(&held), vec!["legacy.*", "legacy.export"]);
    for view in matrix.module_views() {
        let grid = ModuleGrid::from_view(&view, &held);
        assert_eq!(grid.checked_count(), 0, "module {}", view.module);
    }
}
