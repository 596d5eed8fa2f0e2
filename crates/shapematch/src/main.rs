use anyhow::Context;
use clap::Parser;
use shapematch::cli::Cli;
use shapematch::output::Output;
use tracing_subscriber::EnvFilter;

fn main() {
    // Reset SIGPIPE handler to default (terminate) so piping to head/tail works correctly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(matched) => std::process::exit(if matched { 0 } else { 1 }),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let options = cli.resolve_options()?;
    let (data, pattern) = cli.load_inputs()?;

    let outcome = shapematch::compare(&data, &pattern, &options);
    tracing::debug!(matched = outcome.matched, "comparison finished");

    let use_color = !cli.no_color && atty::is(atty::Stream::Stdout);
    let mut output = Output::new(use_color);
    if cli.json {
        output.print_json(&outcome)
    } else {
        output.print_outcome(&outcome)
    }
    .context("Failed to write result")?;

    Ok(outcome.matched)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
