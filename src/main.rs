use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use scribble::session::SessionOutcome;

fn main() -> Result<()> {
    let mut args = std::env::args_os().skip(1);
    let Some(script_path) = args.next().map(PathBuf::from) else {
        bail!("usage: scribble <script.json>");
    };

    let report = scribble::run(&script_path)
        .with_context(|| format!("failed to replay {}", script_path.display()))?;

    for outcome in &report.outcomes {
        if let SessionOutcome::Exported(path) = outcome {
            println!("{}", path.display());
        }
    }
    Ok(())
}
