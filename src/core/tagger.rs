use std::path::Path;

use anyhow::{Context, Result};
use id3::{Tag, TagLike, Version};

use crate::models::{TagField, TagSet, TextField};

/// 파일의 메타데이터 컨테이너에 TagSet을 기록하는 쓰기 도구.
pub trait TagWriter {
    /// 태그를 적용하고 파일에 저장한다. 반환 시점에 기록이 끝나 있어야 한다.
    fn apply(&self, path: &Path, tags: &TagSet) -> Result<()>;
}

/// ID3v2.4 태그 쓰기 도구.
pub struct Id3TagWriter;

impl TagWriter for Id3TagWriter {
    /// 기존 태그가 있으면 지정된 필드만 덮어쓴다.
    fn apply(&self, path: &Path, tags: &TagSet) -> Result<()> {
        let mut tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(id3::Error {
                kind: id3::ErrorKind::NoTag,
                ..
            }) => Tag::new(),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "unreadable tag, starting fresh");
                Tag::new()
            }
        };

        for field in tags.fields() {
            apply_field(&mut tag, field);
        }

        tag.write_to_path(path, Version::Id3v24)
            .with_context(|| format!("{}에 태그를 기록할 수 없습니다", path.display()))?;
        Ok(())
    }
}

fn apply_field(tag: &mut Tag, field: TagField) {
    match field {
        TagField::Text(TextField::Title, value) => tag.set_title(value),
        TagField::Text(TextField::Artist, value) => tag.set_artist(value),
        TagField::Text(TextField::Album, value) => tag.set_album(value),
        TagField::Text(TextField::AlbumArtist, value) => tag.set_album_artist(value),
        TagField::Text(TextField::Genre, value) => tag.set_genre(value),
        TagField::Image { data, mime_type } => {
            tag.remove_all_pictures();
            tag.add_frame(id3::frame::Picture {
                mime_type,
                picture_type: id3::frame::PictureType::CoverFront,
                description: String::new(),
                data,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlbumRecord, Enrichment, TrackRecord};

    fn sample_tags(image: Option<Vec<u8>>) -> TagSet {
        TagSet::assemble(
            &TrackRecord::new("Track A", "Artist X"),
            &AlbumRecord::new("Album Y", "Artist X"),
            Enrichment {
                genre: Some("Rock".to_string()),
                cover_image: image,
            },
        )
        .unwrap()
    }

    fn audio_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("song.mp3");
        std::fs::write(&path, b"not really audio").unwrap();
        path
    }

    #[test]
    fn test_apply_writes_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(dir.path());
        let png = vec![0x89, 0x50, 0x4E, 0x47, 1, 2, 3];

        Id3TagWriter.apply(&path, &sample_tags(Some(png.clone()))).unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Track A"));
        assert_eq!(tag.artist(), Some("Artist X"));
        assert_eq!(tag.album(), Some("Album Y"));
        assert_eq!(tag.album_artist(), Some("Artist X"));
        assert_eq!(tag.genre(), Some("Rock"));

        let pictures: Vec<_> = tag.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].mime_type, "image/png");
        assert_eq!(pictures[0].description, "");
        assert_eq!(pictures[0].data, png);
    }

    #[test]
    fn test_apply_twice_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(dir.path());
        let tags = sample_tags(Some(vec![9, 9, 9]));

        Id3TagWriter.apply(&path, &tags).unwrap();
        Id3TagWriter.apply(&path, &tags).unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Track A"));
        assert_eq!(tag.pictures().count(), 1);
    }

    #[test]
    fn test_apply_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Id3TagWriter.apply(&dir.path().join("missing.mp3"), &sample_tags(None));
        assert!(result.is_err());
    }
}
