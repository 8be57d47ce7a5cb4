use anyhow::Result;

use gatehouse_auth::group_by_module;

pub fn run(permissions: &[String], json: bool) -> Result<()> {
    let groups = group_by_module(permissions);
    if json {
        return super::print_json(&groups);
    }
    for (module, perms) in groups.iter() {
        println!("{module} ({})", perms.len());
        for p in perms {
            println!("  {p}");
        }
    }
    Ok(())
}
