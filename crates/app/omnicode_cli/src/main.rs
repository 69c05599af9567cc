// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::Cli;

mod cli;
mod handlers;
mod logging;
mod prompt;
mod source;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = Cli::parse();
    logging::init(args.verbose)?;
    dotenvy::dotenv().ok();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(handlers::execute(args.command))
}
