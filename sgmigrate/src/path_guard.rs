use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse to write `output` over one of the `inputs`, or over an existing file
/// unless `force` is set.
pub fn ensure_writable(output: &Path, inputs: &[PathBuf], force: bool) -> Result<()> {
    ensure_output_not_same(output, inputs)?;
    if output.exists() && !force {
        bail!(
            "refusing to overwrite existing file {} (use --force)",
            output.display()
        );
    }
    Ok(())
}

pub fn ensure_output_not_same(output: &Path, inputs: &[PathBuf]) -> Result<()> {
    let out_norm = normalize_for_compare(output)
        .with_context(|| format!("failed to normalize output path {}", output.display()))?;

    for input in inputs {
        let in_norm = normalize_for_compare(input)
            .with_context(|| format!("failed to normalize input path {}", input.display()))?;
        if out_norm == in_norm {
            bail!(
                "refusing to overwrite source file: output {} matches input {}",
                output.display(),
                input.display()
            );
        }
    }
    Ok(())
}

fn normalize_for_compare(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    // Not on disk yet: join with cwd. `..` segments are left as they are.
    let base = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().context("current_dir")?
    };

    Ok(base.join(path))
}
