use anyhow::Result;
use tracing::error;
use vanity_pages::build::build_pages;
use vanity_pages::cli::Args;
use vanity_pages::config::Config;
use vanity_pages::logging;
use vanity_pages::render::Renderer;

fn main() {
    if let Err(err) = logging::init_logging() {
        eprintln!("failed to initialize logging: {}", err);
    }

    if let Err(err) = run(Args::from_env()) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::embedded()?,
    };
    let renderer = match &args.template {
        Some(path) => Renderer::from_file(path)?,
        None => Renderer::embedded()?,
    };
    build_pages(&config, &renderer, &args.options())?;
    Ok(())
}
