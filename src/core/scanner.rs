use std::path::Path;

use anyhow::{Context, Result};

use crate::models::AudioItem;

/// 디렉토리에서 MP3 파일을 찾는다. `recurse`가 false면 하위 디렉토리는 보지 않는다.
pub fn scan_directory(dir: &Path, recurse: bool) -> Result<Vec<AudioItem>> {
    let mut items = Vec::new();
    collect_mp3_files(dir, recurse, &mut items)?;
    items.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(items)
}

fn collect_mp3_files(dir: &Path, recurse: bool, items: &mut Vec<AudioItem>) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("{}은(는) 디렉토리가 아닙니다", dir.display());
    }

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("{}을(를) 읽을 수 없습니다", dir.display()))?;

    for entry in entries {
        let path = entry?.path();

        if path.is_dir() {
            if recurse {
                collect_mp3_files(&path, recurse, items)?;
            }
        } else if is_mp3(&path) {
            items.push(AudioItem::new(path));
        }
    }

    Ok(())
}

/// 확장자가 .mp3인지 확인한다 (대소문자 무시).
pub fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}

/// 단일 MP3 파일을 불러온다. 파일이 없거나 MP3가 아니면 에러.
pub fn load_single_file(path: &Path) -> Result<AudioItem> {
    if !path.is_file() {
        anyhow::bail!("파일을 찾을 수 없습니다: {}", path.display());
    }
    if !is_mp3(path) {
        anyhow::bail!("MP3 파일이 아닙니다: {}", path.display());
    }
    Ok(AudioItem::new(path))
}

/// 경로가 디렉토리면 스캔하고, 파일이면 단일 항목으로 불러온다.
pub fn scan_path(path: &Path, recurse: bool) -> Result<Vec<AudioItem>> {
    if path.is_dir() {
        scan_directory(path, recurse)
    } else {
        Ok(vec![load_single_file(path)?])
    }
}
