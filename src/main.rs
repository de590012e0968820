use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = audio_sketches::config::Config::parse();
    if cfg.list_devices {
        audio_sketches::audio::list_input_devices()?;
        return Ok(());
    }

    audio_sketches::app::run(cfg)
}
