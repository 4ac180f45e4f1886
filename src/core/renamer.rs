use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::models::TrackRecord;

/// 파일명에 사용할 수 없는 문자를 `_`로 치환한다.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c == '/' || c == '\0' {
                return '_';
            }
            if cfg!(target_os = "windows") {
                if matches!(c, '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                    return '_';
                }
                if c.is_ascii_control() {
                    return '_';
                }
            }
            if cfg!(target_os = "macos") && c == ':' {
                return '_';
            }
            c
        })
        .collect()
}

/// `"{artist} - {title}.mp3"` 형식의 파일명을 만든다.
pub fn build_filename(track: &TrackRecord) -> Option<String> {
    let artist = track.artist.trim();
    let title = track.title.trim();
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some(format!(
        "{} - {}.mp3",
        sanitize_filename(artist),
        sanitize_filename(title)
    ))
}

/// 원래 디렉토리 안에서의 목적지 경로.
pub fn destination(old_path: &Path, track: &TrackRecord) -> Option<PathBuf> {
    let name = build_filename(track)?;
    let dir = old_path.parent().unwrap_or_else(|| Path::new("."));
    Some(dir.join(name))
}

/// 파일명을 `"{artist} - {title}.mp3"` 형식으로 변경한다.
/// 이미 같은 이름이면 아무것도 하지 않고 현재 경로를 반환한다.
/// 동일 디렉토리에 같은 이름의 다른 파일이 있으면 에러를 반환한다.
pub fn rename_file(old_path: &Path, track: &TrackRecord) -> Result<PathBuf> {
    let new_path = match destination(old_path, track) {
        Some(path) => path,
        None => bail!("아티스트와 제목이 모두 필요합니다"),
    };

    if old_path == new_path {
        return Ok(new_path);
    }

    if new_path.exists() {
        bail!("파일이 이미 존재합니다: {}", new_path.display());
    }

    std::fs::rename(old_path, &new_path)
        .with_context(|| format!("{} → {}", old_path.display(), new_path.display()))?;
    Ok(new_path)
}
