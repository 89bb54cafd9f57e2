//! `infratest catalogs` – list built-in catalogs.

use anyhow::Result;
use infratest_core::catalogs;

pub fn run_catalogs(json: bool) -> Result<()> {
    let summaries = catalogs::summaries();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for c in summaries {
        println!("{} ({} entries)", c.name, c.entries.len());
        for e in c.entries {
            println!("  {:<24} {}", e.id, e.note);
        }
    }
    Ok(())
}
