use std::path::{Path, PathBuf};

/// 처리 대상 MP3 파일 하나.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioItem {
    pub path: PathBuf,
}

impl AudioItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("알 수 없음")
    }

    /// 진행 표시용 파일명. 55자를 넘으면 잘라서 `...`을 붙인다.
    pub fn display_name(&self) -> String {
        let name = self.filename();
        if name.chars().count() > 55 {
            let head: String = name.chars().take(55).collect();
            format!("{}...", head)
        } else {
            name.to_string()
        }
    }
}

/// 항목의 현재 트랙 정보 (제목, 아티스트).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackRecord {
    pub title: String,
    pub artist: String,
}

impl TrackRecord {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.artist.trim().is_empty()
    }

    pub fn summary(&self) -> String {
        format!("{} - {}", display(&self.artist), display(&self.title))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumRecord {
    pub album: String,
    pub album_artist: String,
}

impl AlbumRecord {
    pub fn new(album: impl Into<String>, album_artist: impl Into<String>) -> Self {
        Self {
            album: album.into(),
            album_artist: album_artist.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.album.trim().is_empty() && !self.album_artist.trim().is_empty()
    }
}

/// album.getInfo 조회 결과. 두 필드 모두 없을 수 있다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumInfo {
    pub genre: Option<String>,
    pub image_url: Option<String>,
}

/// 장르와 커버 이미지. 없어도 실패가 아니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub genre: Option<String>,
    pub cover_image: Option<Vec<u8>>,
}

/// 텍스트 태그 필드 이름.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
}

impl TextField {
    pub fn key(&self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Artist => "artist",
            TextField::Album => "album",
            TextField::AlbumArtist => "album_artist",
            TextField::Genre => "genre",
        }
    }
}

/// TagWriter가 일관되게 소비하는 태그 필드.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagField {
    Text(TextField, String),
    Image { data: Vec<u8>, mime_type: String },
}

/// 파일에 기록할 최종 태그 집합.
/// 필수 필드(title, artist, album, album_artist)는 항상 비어있지 않다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub genre: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl TagSet {
    /// 트랙, 앨범, 보강 정보를 합쳐 TagSet을 만든다.
    /// 필수 필드가 하나라도 비어 있으면 그 필드 이름을 에러로 돌려준다.
    pub fn assemble(
        track: &TrackRecord,
        album: &AlbumRecord,
        enrichment: Enrichment,
    ) -> Result<Self, &'static str> {
        let required = [
            (TextField::Title, &track.title),
            (TextField::Artist, &track.artist),
            (TextField::Album, &album.album),
            (TextField::AlbumArtist, &album.album_artist),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(field.key());
        }

        Ok(Self {
            title: track.title.trim().to_string(),
            artist: track.artist.trim().to_string(),
            album: album.album.trim().to_string(),
            album_artist: album.album_artist.trim().to_string(),
            genre: enrichment.genre.filter(|g| !g.trim().is_empty()),
            image: enrichment.cover_image.filter(|d| !d.is_empty()),
        })
    }

    pub fn track(&self) -> TrackRecord {
        TrackRecord::new(&self.title, &self.artist)
    }

    pub fn fields(&self) -> Vec<TagField> {
        let mut fields = vec![
            TagField::Text(TextField::Title, self.title.clone()),
            TagField::Text(TextField::Artist, self.artist.clone()),
            TagField::Text(TextField::Album, self.album.clone()),
            TagField::Text(TextField::AlbumArtist, self.album_artist.clone()),
        ];
        if let Some(ref genre) = self.genre {
            fields.push(TagField::Text(TextField::Genre, genre.clone()));
        }
        if let Some(ref data) = self.image {
            fields.push(TagField::Image {
                data: data.clone(),
                mime_type: detect_mime_type(data),
            });
        }
        fields
    }
}

/// 이미지 바이너리의 매직 바이트로 MIME 타입을 판별한다.
/// JPEG가 아니면 서비스 기본값인 PNG로 본다.
pub fn detect_mime_type(data: &[u8]) -> String {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg".to_string()
    } else {
        "image/png".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Tagged,
    Skipped,
    Failed,
}

impl ProcessingOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingOutcome::Tagged => "OK",
            ProcessingOutcome::Skipped => "건너뜀",
            ProcessingOutcome::Failed => "실패",
        }
    }
}

fn display(s: &str) -> &str {
    if s.trim().is_empty() {
        "알 수 없음"
    } else {
        s
    }
}
