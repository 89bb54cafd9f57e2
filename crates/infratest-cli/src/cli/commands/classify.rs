//! `infratest classify` – show how an error text would be classified.

use anyhow::Result;
use infratest_core::config::InfratestConfig;
use infratest_core::retry::Classifier;

pub fn run_classify(cfg: &InfratestConfig, catalog_names: &[String], text: &str) -> Result<()> {
    let catalogs = cfg.effective_catalogs(catalog_names)?;
    let classifier = Classifier::new(&catalogs);
    println!("{}", classifier.classify_text(text));
    Ok(())
}
