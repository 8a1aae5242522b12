//! Terminal crypto dashboard
//!
//! Live coin prices, portfolio and market statistics from CoinGecko.
//! Logs go to a file so they do not tear the terminal UI.

use coin_pulse::app::App;
use coin_pulse::config::LOG_FILE;
use color_eyre::Result;
use env_logger::{Env, Target};
use std::fs::OpenOptions;
use std::io::Write;

fn init_logging() -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} {}: {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
    Ok(())
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging()?;

    let app = App::from_env();
    app.run().await
}
