use anyhow::Result;

use gatehouse_auth::catalog::describe;
use gatehouse_auth::permission_label;

pub fn run(permissions: &[String], json: bool) -> Result<()> {
    if json {
        let labels: Vec<_> = permissions
            .iter()
            .map(|p| {
                serde_json::json!({
                    "permission": p,
                    "label": permission_label(p),
                    "description": describe(p),
                })
            })
            .collect();
        return super::print_json(&labels);
    }
    for p in permissions {
        println!(
            "{:<32} {:<24} {}",
            p,
            permission_label(p),
            describe(p).unwrap_or("")
        );
    }
    Ok(())
}
