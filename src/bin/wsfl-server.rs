use anyhow::Result;
use clap::Parser;
use wsfl::Cli;

fn main() -> Result<()> {
    // A missing .env is fine; production sets the environment directly.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    wsfl::run(cli)
}
