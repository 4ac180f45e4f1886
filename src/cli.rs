use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::Input;

use crate::config::{self, AcoustIdConfig, LastFmConfig};
use crate::core::batch::{BatchRunner, RunConfig};
use crate::core::pipeline::ResolutionPipeline;
use crate::core::prompt::TerminalPrompter;
use crate::core::rate_limiter::RateLimiter;
use crate::core::tagger::Id3TagWriter;
use crate::error::UsageError;
use crate::sources::acoustid::AcoustIdClient;
use crate::sources::lastfm::LastFmClient;

const USAGE: &str = "사용법: mp3ident [--no-recurse] <파일|디렉토리>";

#[derive(Parser)]
#[command(
    name = "mp3ident",
    about = "음원 인식으로 MP3 태그와 파일명을 정리하는 도구",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 처리할 MP3 파일 또는 디렉토리
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// 하위 디렉토리를 탐색하지 않음
    #[arg(long)]
    pub no_recurse: bool,

    /// 디버그 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// AcoustID / Last.fm API 키 설정
    Config,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Config) => cmd_config(),
        None => match cli.path {
            Some(path) => cmd_resolve(&path, !cli.no_recurse),
            None => Err(UsageError(USAGE.to_string()).into()),
        },
    }
}

fn cmd_resolve(path: &Path, recurse: bool) -> Result<()> {
    if !path.exists() {
        return Err(UsageError(format!("경로를 찾을 수 없습니다: {}\n{}", path.display(), USAGE)).into());
    }

    // 경로 검사는 API 키 확인보다 먼저 한다
    let run_config = RunConfig {
        root: path.to_path_buf(),
        recurse,
    };
    let items = run_config
        .discover()
        .map_err(|e| UsageError(format!("{:#}\n{}", e, USAGE)))?;

    let cfg = config::load_config();
    if !cfg.is_configured() {
        println!("API 키가 설정되지 않았습니다. 먼저 'mp3ident config'를 실행하세요.");
        return Ok(());
    }

    if items.is_empty() {
        println!("{}에서 MP3 파일을 찾을 수 없습니다", path.display());
        return Ok(());
    }

    let fingerprint = AcoustIdClient::new(&cfg.acoustid)?;
    let metadata = LastFmClient::new(&cfg.lastfm)?;
    let writer = Id3TagWriter;

    println!("{}", run_config.header());
    println!();

    let runner = BatchRunner::new(
        run_config,
        ResolutionPipeline::new(&fingerprint, &metadata, &writer),
    );

    let mut limiter = RateLimiter::from_config(&cfg.rate_limit);
    let summary = runner.run(&items, &mut limiter, &mut TerminalPrompter);

    println!("{}", summary.table());
    Ok(())
}

fn cmd_config() -> Result<()> {
    let mut cfg = config::load_config();

    println!("API 설정");
    println!("(AcoustID 키: https://acoustid.org/new-application)");
    println!("(Last.fm 키: https://www.last.fm/api/account/create)\n");

    let acoustid_key: String = Input::new()
        .with_prompt("AcoustID API Key")
        .with_initial_text(cfg.acoustid.api_key.clone().unwrap_or_default())
        .interact_text()?;

    let lastfm_key: String = Input::new()
        .with_prompt("Last.fm API Key")
        .with_initial_text(cfg.lastfm.api_key.clone().unwrap_or_default())
        .interact_text()?;

    cfg.acoustid = AcoustIdConfig {
        api_key: Some(acoustid_key),
        ..cfg.acoustid
    };
    cfg.lastfm = LastFmConfig {
        api_key: Some(lastfm_key),
    };

    config::save_config(&cfg)?;
    println!("\n설정이 저장되었습니다!");
    Ok(())
}
