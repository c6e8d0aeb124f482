// src/bin/cubeforge.rs
// Host wiring for the edge-fix pass: load a cube DDS, re-render every mip
// level through the edge-resample kernel, save the result.

use anyhow::{bail, Context, Result};
use log::{error, info};

use cubeforge::{formats, CubeFaceMipRenderer, EdgeResampleKernel, GpuContext};

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (input, output),
        _ => bail!("usage: cubeforge <input.dds> <output.dds>"),
    };

    let source = formats::load_dds(&input).with_context(|| format!("loading '{input}'"))?;

    let gpu = GpuContext::new().context("acquiring GPU device")?;
    let renderer = CubeFaceMipRenderer::new(&gpu, &EdgeResampleKernel)
        .context("initializing cube renderer")?;

    let fixed = renderer.render(&gpu, &source).context("rendering cube mip chain")?;
    formats::save_dds(&fixed, &output).with_context(|| format!("saving '{output}'"))?;

    info!("done: '{input}' -> '{output}'");
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        error!("{err:#}");
        std::process::exit(1);
    }
}
