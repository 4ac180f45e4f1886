use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::config::LastFmConfig;
use crate::models::{AlbumInfo, AlbumRecord, TrackRecord};
use crate::sources::MetadataSource;

const API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Last.fm 메타데이터 클라이언트.
/// `method` 쿼리 파라미터로 track.search, track.getInfo, album.getInfo를 호출한다.
pub struct LastFmClient {
    client: reqwest::blocking::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    trackmatches: TrackMatches,
}

#[derive(Debug, Deserialize)]
struct TrackMatches {
    #[serde(default, deserialize_with = "one_or_many")]
    track: Vec<SearchTrack>,
}

#[derive(Debug, Deserialize)]
struct SearchTrack {
    name: String,
    artist: String,
}

#[derive(Debug, Deserialize)]
struct TrackInfoResponse {
    track: TrackInfo,
}

#[derive(Debug, Deserialize)]
struct TrackInfo {
    album: Option<TrackAlbum>,
}

#[derive(Debug, Deserialize)]
struct TrackAlbum {
    title: Option<String>,
    artist: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumInfoResponse {
    album: Album,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    tags: Tags,
    #[serde(default, deserialize_with = "one_or_many")]
    image: Vec<Image>,
}

/// 태그가 없으면 Last.fm은 `"tags": ""`를 돌려준다.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tags {
    List {
        #[serde(default, deserialize_with = "one_or_many")]
        tag: Vec<Tag>,
    },
    Absent(serde_json::Value),
}

impl Default for Tags {
    fn default() -> Self {
        Tags::Absent(serde_json::Value::Null)
    }
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Image {
    #[serde(rename = "#text")]
    url: String,
}

/// 원소가 하나뿐이면 배열 대신 객체로 오는 경우를 함께 받는다.
fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
        Neither(serde_json::Value),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(v) => v,
        OneOrMany::One(v) => vec![v],
        OneOrMany::Neither(_) => Vec::new(),
    })
}

impl LastFmClient {
    pub fn new(config: &LastFmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .context("Last.fm api_key가 설정되지 않았습니다")?
            .clone();

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Last.fm HTTP 클라이언트 생성에 실패했습니다")?;

        Ok(Self { client, api_key })
    }

    /// 메서드를 호출해 JSON 본문을 가져온다.
    /// Last.fm은 HTTP 200과 함께 `{"error": N}`을 돌려주기도 하므로 `Option`으로 구분한다.
    fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<Option<T>> {
        let url = method_url(method, params, &self.api_key);
        tracing::debug!(method, "last.fm request");

        let body = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Last.fm {} 호출에 실패했습니다", method))?
            .text()
            .with_context(|| format!("Last.fm {} 응답 읽기에 실패했습니다", method))?;

        parse_body(method, &body)
    }
}

fn parse_body<T: DeserializeOwned>(method: &str, body: &str) -> Result<Option<T>> {
    if let Ok(err) = serde_json::from_str::<ApiError>(body) {
        // 6: 트랙/앨범을 찾을 수 없음
        if err.error == 6 {
            return Ok(None);
        }
        bail!("Last.fm {} 오류 {}: {}", method, err.error, err.message);
    }
    let parsed = serde_json::from_str(body)
        .with_context(|| format!("Last.fm {} 응답 파싱에 실패했습니다", method))?;
    Ok(Some(parsed))
}

/// 모든 문자열 파라미터를 퍼센트 인코딩해 요청 URL을 만든다.
fn method_url(method: &str, params: &[(&str, &str)], api_key: &str) -> String {
    let mut url = format!("{}?method={}", API_URL, method);
    for (key, value) in params {
        url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
    }
    url.push_str(&format!("&api_key={}&format=json", urlencoding::encode(api_key)));
    url
}

fn first_search_match(response: SearchResponse) -> Option<TrackRecord> {
    response
        .results
        .trackmatches
        .track
        .into_iter()
        .next()
        .map(|t| TrackRecord::new(t.name, t.artist))
}

fn album_of(response: TrackInfoResponse) -> Option<AlbumRecord> {
    let album = response.track.album?;
    let record = AlbumRecord::new(album.title?, album.artist?);
    record.is_complete().then_some(record)
}

/// 장르는 첫 번째 태그, 이미지는 오름차순 목록의 마지막(가장 큰) 항목이다.
fn album_info_of(response: AlbumInfoResponse) -> AlbumInfo {
    let genre = match response.album.tags {
        Tags::List { tag } => tag.into_iter().next().map(|t| title_case(&t.name)),
        Tags::Absent(_) => None,
    }
    .filter(|g| !g.is_empty());

    let image_url = response
        .album
        .image
        .into_iter()
        .last()
        .map(|i| i.url)
        .filter(|u| !u.trim().is_empty());

    AlbumInfo { genre, image_url }
}

/// 단어마다 첫 글자를 대문자로 바꾼다. `"hip hop"` → `"Hip Hop"`.
/// 알파벳이 아닌 문자 뒤의 첫 글자만 대문자로 바꾼다 ("k-pop" → "K-Pop").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.trim().chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

impl MetadataSource for LastFmClient {
    fn search_track(&self, title: &str, artist: &str, page: u32) -> Result<Option<TrackRecord>> {
        let page = page.to_string();
        let response: Option<SearchResponse> = self.call(
            "track.search",
            &[("track", title), ("artist", artist), ("page", page.as_str()), ("limit", "1")],
        )?;
        Ok(response.and_then(first_search_match))
    }

    fn album_for_track(&self, track: &TrackRecord) -> Result<Option<AlbumRecord>> {
        let response: Option<TrackInfoResponse> = self.call(
            "track.getInfo",
            &[("track", track.title.as_str()), ("artist", track.artist.as_str())],
        )?;
        Ok(response.and_then(album_of))
    }

    fn album_info(&self, album: &AlbumRecord) -> Result<AlbumInfo> {
        let response: Option<AlbumInfoResponse> = self.call(
            "album.getInfo",
            &[("album", album.album.as_str()), ("artist", album.album_artist.as_str())],
        )?;
        Ok(response.map(album_info_of).unwrap_or_default())
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let data = self
            .client
            .get(url)
            .send()
            .context("앨범 아트 다운로드에 실패했습니다")?
            .error_for_status()?
            .bytes()?
            .to_vec();

        Ok(data)
    }
}
