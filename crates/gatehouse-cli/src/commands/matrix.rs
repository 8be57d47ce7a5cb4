use anyhow::{Result, bail};
use std::path::Path;

use gatehouse_auth::editor::{CheckState, GridRow};
use gatehouse_auth::{ModuleGrid, PermissionSet};

use super::Context;

fn mark(state: CheckState) -> &'static str {
    match state {
        CheckState::Unchecked => "[ ]",
        CheckState::Granted => "[x]",
        CheckState::SubmoduleWildcard | CheckState::ModuleWildcard => "[*]",
    }
}

fn print_row(indent: &str, row: &GridRow) {
    let lock = if row.state.is_locked() { " (locked)" } else { "" };
    println!(
        "{indent}{} {:<32} {}{lock}",
        mark(row.state),
        row.permission,
        row.label
    );
}

fn print_grid(grid: &ModuleGrid) {
    let all = if grid.wildcard_held { "[*]" } else { "[ ]" };
    println!("{} {}", all, grid.wildcard);
    for row in &grid.direct {
        print_row("    ", row);
    }
    for section in &grid.sections {
        let all = if section.wildcard_held { "[*]" } else { "[ ]" };
        println!("    {} {}", all, section.wildcard);
        for row in &section.rows {
            print_row("        ", row);
        }
    }
}

pub async fn run(
    base_dir: &Path,
    role: Option<&str>,
    module: Option<&str>,
    json: bool,
) -> Result<()> {
    let ctx = Context::open(base_dir).await?;
    let matrix = ctx.config.matrix()?;
    let held = match role {
        Some(role) => ctx.role_permissions(role).await?,
        None => PermissionSet::new(),
    };

    let modules: Vec<&str> = match module {
        Some(m) if matrix.modules.iter().any(|known| known == m) => vec![m],
        Some(m) => bail!("unknown module '{m}'"),
        None => matrix.modules.iter().map(String::as_str).collect(),
    };
    let grids: Vec<ModuleGrid> = modules
        .iter()
        .map(|m| ModuleGrid::build(&matrix, &held, m))
        .collect();

    if json {
        return super::print_json(&grids);
    }
    for grid in &grids {
        print_grid(grid);
        println!();
    }

    let orphans = matrix.orphaned(&held);
    if !orphans.is_empty() {
        println!("Not in matrix: {}", orphans.join(", "));
    }
    Ok(())
}
