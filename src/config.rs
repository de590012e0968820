use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "audio-sketches", version, about = "Audio-reactive circle sketches for the terminal")]
pub struct Config {
    /// Substring match against input device names; default input device otherwise.
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    /// Sketch to start on: an index or a case-insensitive name fragment.
    #[arg(long)]
    pub sketch: Option<String>,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Number of spectrum chunks driving the circle grid.
    #[arg(long, default_value_t = 10)]
    pub chunks: usize,

    /// Upper bound on live circles; oldest are evicted beyond this.
    #[arg(long, default_value_t = 1024)]
    pub max_circles: usize,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
}
