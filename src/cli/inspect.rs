//! Single-identifier commands: `transform`, `directives`, `variants`.

use anyhow::Result;
use std::io::Write;

use crate::pipeline::{Claim, ImagePipeline};

/// Print the generated module for `id`, or report why nothing was generated.
pub async fn transform(pipeline: &ImagePipeline, id: &str, out: &mut impl Write) -> Result<()> {
    match pipeline.process(id).await? {
        Some(module) => out.write_all(module.code.as_bytes())?,
        None => {
            let reason = match pipeline.classify(id) {
                Claim::Ignored => "pipeline disabled for this build mode",
                _ => "not claimed: missing `jsx` marker or unsupported extension",
            };
            writeln!(out, "// {id}: {reason}")?;
        }
    }
    Ok(())
}

/// Print the resolved directive set in query-string form.
pub fn directives(pipeline: &ImagePipeline, id: &str, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", pipeline.directives(id))?;
    Ok(())
}

/// Print the engine-emitted module for a request without the marker.
pub async fn variants(pipeline: &ImagePipeline, id: &str, out: &mut impl Write) -> Result<()> {
    out.write_all(pipeline.variants(id).await?.as_bytes())?;
    Ok(())
}
