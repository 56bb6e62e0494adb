use std::io::{self, Write};

use anyhow::Result;
use sonarpipe_core::{SonarError, Stage};

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// `<stage> failed: <message>`, the form every fatal error is reported in.
pub(super) fn stage_failure(err: SonarError) -> anyhow::Error {
    anyhow::anyhow!("{} failed: {err}", err.stage())
}

/// Like [`stage_failure`], for errors whose kind does not identify the stage
/// they were raised in (HTTP client setup, for instance).
pub(super) fn failure_at(stage: Stage) -> impl FnOnce(SonarError) -> anyhow::Error {
    move |err| anyhow::anyhow!("{stage} failed: {err}")
}
