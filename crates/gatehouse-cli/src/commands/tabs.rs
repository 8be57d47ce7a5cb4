use anyhow::Result;
use std::path::Path;

use gatehouse_auth::catalog::DASHBOARD_TABS;
use gatehouse_auth::visible_tabs;

use super::HeldSource;

pub async fn run(base_dir: &Path, source: &HeldSource, json: bool) -> Result<()> {
    let held = super::resolve_held(base_dir, source).await?;
    let tabs = visible_tabs(&held, DASHBOARD_TABS);

    if json {
        let keys: Vec<_> = tabs
            .iter()
            .map(|t| serde_json::json!({ "key": t.key, "title": t.title }))
            .collect();
        return super::print_json(&keys);
    }
    for tab in &tabs {
        println!("{:<12} {}", tab.key, tab.title);
    }
    Ok(())
}
