use anyhow::Result;
use std::path::Path;

use gatehouse_auth::{GatehouseConfig, catalog, expand_wildcard};

pub fn run(
    base_dir: &Path,
    wildcard: &str,
    actions: &[String],
    within_matrix: bool,
    json: bool,
) -> Result<()> {
    // Expansion works without a config; fall back to the built-in catalog.
    let config = GatehouseConfig::load(&GatehouseConfig::default_path(base_dir)).ok();

    let expanded = if within_matrix {
        let matrix = match config {
            Some(ref c) => c.matrix()?,
            None => catalog::builtin_matrix(),
        };
        matrix.covered_by(wildcard)
    } else if !actions.is_empty() {
        expand_wildcard(wildcard, actions)
    } else {
        match config {
            Some(ref c) => expand_wildcard(wildcard, &c.gatehouse.default_actions),
            None => gatehouse_auth::expand_wildcard_default(wildcard),
        }
    };

    if json {
        return super::print_json(&expanded);
    }
    for p in &expanded {
        println!("{p}");
    }
    Ok(())
}
