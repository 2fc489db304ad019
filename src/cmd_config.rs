//! `vaultlink check-config`.

use std::path::Path;

use anyhow::bail;

use vaultlink_config::{ConfigLoader, ConfigValidator};

pub(crate) fn check(path: &Path) -> anyhow::Result<()> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config);

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        bail!(
            "{} has {} error(s)",
            path.display(),
            result.errors.len()
        );
    }
    println!("{} is valid", path.display());
    Ok(())
}
