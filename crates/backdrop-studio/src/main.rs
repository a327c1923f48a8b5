mod settings;
mod studio;

use anyhow::Result;
use backdrop_engine::device::GpuInit;
use backdrop_engine::logging::{init_logging, LoggingConfig};
use backdrop_engine::window::{Runtime, RuntimeConfig};

use settings::StudioSettings;
use studio::Studio;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let settings = StudioSettings::from_env();
    log::info!("backdrop studio: 1 dots, 2 distortion, 3 both, space remount, esc quit");

    Runtime::run(
        RuntimeConfig::default()
            .with_title("backdrop studio")
            .with_size(1200.0, 800.0),
        GpuInit::default(),
        Studio::new(settings),
    )
}
