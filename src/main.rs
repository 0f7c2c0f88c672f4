mod app;
mod cli;

use app::App;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let app = App::new(Cli::parse());
    app.run()?;

    Ok(())
}
