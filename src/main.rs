use anyhow::{Context, Result};

mod demo;

const DEFAULT_FRAMES: u64 = 120;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let frames = match std::env::var("SCENECORE_FRAMES") {
        Ok(value) => value
            .parse()
            .with_context(|| format!("Invalid SCENECORE_FRAMES: {}", value))?,
        Err(_) => DEFAULT_FRAMES,
    };

    let mut demo = demo::DemoState::new(0x5ce7e)?;
    let summary = demo.run(frames)?;

    log::info!(
        "{} frames: {} draws, {} culled, {} instanced, {} collisions, {} failures",
        summary.frames,
        summary.draws,
        summary.culled,
        summary.instanced_draws,
        summary.collisions,
        summary.failures
    );

    Ok(())
}
