use std::process::ExitCode;
use std::sync::Arc;
use termite::{PluckSynth, Result, TerminalDisplay, TerminalGuard, TerminalKeys, TermiteBuilder};
use tracing_subscriber::EnvFilter;

fn run() -> Result<()> {
    let synth = PluckSynth::new();
    let display = Arc::new(TerminalDisplay::for_engine(&synth));
    let termite = TermiteBuilder::new().build(synth, display)?;

    let _guard = TerminalGuard::enter()?;
    termite.run(&mut TerminalKeys::new())
}

fn main() -> ExitCode {
    // Logs go to stderr; redirect it (`termite 2> termite.log`) to keep the screen clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
