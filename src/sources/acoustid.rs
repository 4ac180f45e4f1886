//! AcoustID 음원 인식 클라이언트.
//!
//! Chromaprint의 `fpcalc`로 지문을 계산한 뒤 AcoustID lookup API에 조회한다.
//! 첫 번째 결과의 첫 번째 녹음만 사용한다.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::config::AcoustIdConfig;
use crate::models::TrackRecord;
use crate::sources::FingerprintSource;

const LOOKUP_URL: &str = "https://api.acoustid.org/v2/lookup";

pub struct AcoustIdClient {
    client: reqwest::blocking::Client,
    api_key: String,
    fpcalc: String,
}

#[derive(Debug, Deserialize)]
struct FpcalcOutput {
    fingerprint: String,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: String,
    #[serde(default)]
    results: Vec<LookupResult>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    #[serde(default)]
    recordings: Vec<Recording>,
}

#[derive(Debug, Deserialize)]
struct Recording {
    title: Option<String>,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

impl AcoustIdClient {
    pub fn new(config: &AcoustIdConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .context("AcoustID api_key가 설정되지 않았습니다")?
            .clone();

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("AcoustID HTTP 클라이언트 생성에 실패했습니다")?;

        Ok(Self {
            client,
            api_key,
            fpcalc: config.fpcalc.clone(),
        })
    }

    /// `fpcalc -json`을 실행해 지문과 재생 시간(초)을 얻는다.
    fn fingerprint(&self, path: &Path) -> Result<(String, u32)> {
        let output = Command::new(&self.fpcalc)
            .arg("-json")
            .arg(path)
            .output()
            .with_context(|| format!("{} 실행에 실패했습니다", self.fpcalc))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("fpcalc 실패: {}", stderr.trim());
        }

        parse_fpcalc_json(&String::from_utf8_lossy(&output.stdout))
    }

    fn lookup(&self, fingerprint: &str, duration: u32) -> Result<LookupResponse> {
        let url = lookup_url(&self.api_key, fingerprint, duration);

        self.client
            .get(&url)
            .send()
            .context("AcoustID 조회에 실패했습니다")?
            .error_for_status()
            .context("AcoustID 조회 요청이 실패했습니다")?
            .json()
            .context("AcoustID 응답 파싱에 실패했습니다")
    }
}

impl FingerprintSource for AcoustIdClient {
    fn identify(&self, path: &Path) -> Result<Option<TrackRecord>> {
        let (fingerprint, duration) = self.fingerprint(path)?;
        tracing::debug!(path = %path.display(), duration, "fingerprint computed");

        let response = self.lookup(&fingerprint, duration)?;
        first_match(response)
    }
}

fn parse_fpcalc_json(json: &str) -> Result<(String, u32)> {
    let parsed: FpcalcOutput =
        serde_json::from_str(json).context("fpcalc 출력 파싱에 실패했습니다")?;
    Ok((parsed.fingerprint, parsed.duration.round() as u32))
}

/// `meta`의 `+`가 `%2B`로 인코딩되지 않도록 URL을 직접 만든다.
fn lookup_url(api_key: &str, fingerprint: &str, duration: u32) -> String {
    format!(
        "{}?client={}&duration={}&fingerprint={}&meta=recordings+compress",
        LOOKUP_URL,
        urlencoding::encode(api_key),
        duration,
        urlencoding::encode(fingerprint)
    )
}

fn first_match(response: LookupResponse) -> Result<Option<TrackRecord>> {
    if response.status != "ok" {
        let message = response
            .error
            .map(|e| e.message)
            .unwrap_or_else(|| response.status.clone());
        bail!("AcoustID 오류: {}", message);
    }

    let recording = response
        .results
        .into_iter()
        .flat_map(|r| r.recordings)
        .find(|r| r.title.is_some() && !r.artists.is_empty());

    Ok(recording.and_then(|r| {
        let artist = r.artists.into_iter().next()?.name;
        Some(TrackRecord::new(r.title?, artist))
    }))
}
