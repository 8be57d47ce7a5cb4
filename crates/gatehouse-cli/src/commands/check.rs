use anyhow::Result;
use std::path::Path;

use gatehouse_auth::{has_all_permissions, has_any_permission, has_permission};

use super::HeldSource;

/// Returns whether the held set satisfies `required`.
pub async fn run(
    base_dir: &Path,
    required: &[String],
    source: &HeldSource,
    all: bool,
    json: bool,
) -> Result<bool> {
    let held = super::resolve_held(base_dir, source).await?;
    let allowed = if all {
        has_all_permissions(&held, required)
    } else {
        has_any_permission(&held, required)
    };
    tracing::debug!(held = held.len(), required = required.len(), all, allowed, "evaluated");

    if json {
        let results: Vec<_> = required
            .iter()
            .map(|r| serde_json::json!({ "permission": r, "granted": has_permission(&held, r) }))
            .collect();
        let mode = if all { "all" } else { "any" };
        super::print_json(&serde_json::json!({
            "mode": mode,
            "allowed": allowed,
            "results": results,
        }))?;
    } else {
        for r in required {
            let mark = if has_permission(&held, r) { "yes" } else { "no" };
            println!("{:<32} {mark}", r);
        }
        println!("{}", if allowed { "allowed" } else { "denied" });
    }

    Ok(allowed)
}
