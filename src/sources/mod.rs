pub mod acoustid;
pub mod lastfm;

use std::path::Path;

use anyhow::Result;

use crate::models::{AlbumInfo, AlbumRecord, TrackRecord};

/// 음원 지문으로 트랙을 식별하는 소스.
pub trait FingerprintSource {
    /// 파일을 식별해 첫 번째 후보를 반환한다. 일치 항목이 없으면 `Ok(None)`.
    fn identify(&self, path: &Path) -> Result<Option<TrackRecord>>;
}

/// 트랙/앨범 메타데이터 디렉토리 서비스.
pub trait MetadataSource {
    /// 페이지당 한 건씩 트랙을 검색한다. 더 이상 결과가 없으면 `Ok(None)`.
    fn search_track(&self, title: &str, artist: &str, page: u32) -> Result<Option<TrackRecord>>;
    /// 트랙이 속한 앨범을 조회한다. 연결된 앨범이 없으면 `Ok(None)`.
    fn album_for_track(&self, track: &TrackRecord) -> Result<Option<AlbumRecord>>;
    /// 앨범의 장르와 가장 큰 커버 이미지 URL을 조회한다.
    fn album_info(&self, album: &AlbumRecord) -> Result<AlbumInfo>;
    /// 이미지 URL에서 바이너리를 내려받는다.
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
