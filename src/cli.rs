// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::core::Layout;

#[derive(Parser, Debug, Clone)]
#[command(name = "model-viewer")]
#[command(about = "Interactive glTF model viewer", long_about = None)]
pub struct Cli {
    /// glTF or GLB model to display
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Equirectangular HDR image used for reflections
    #[arg(long)]
    pub environment: Option<PathBuf>,

    /// Skip loading the reflection environment
    #[arg(long = "no-environment", conflicts_with = "environment")]
    pub no_environment: bool,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Which views to show
    #[arg(long, value_enum)]
    pub layout: Option<Layout>,

    /// Disable UI elements
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Load and normalize the model, print a summary and exit without opening a window
    #[arg(long)]
    pub inspect: bool,

    /// Spin ticks to simulate after loading in inspect mode
    #[arg(long, requires = "inspect")]
    pub frames: Option<u64>,
}
