mod cli;
mod config;
mod core;
mod error;
mod models;
mod sources;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::UsageError;

fn main() {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli::run(cli) {
        eprintln!("오류: {:#}", e);
        let code = if e.downcast_ref::<UsageError>().is_some() {
            2
        } else {
            1
        };
        std::process::exit(code);
    }
}

/// 대화형 입력을 가리지 않도록 기본은 경고 이상만 stderr로 출력한다.
fn init_logging(verbose: bool) {
    let default = if verbose { "mp3ident=debug" } else { "mp3ident=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
