//! 테스트용 대역: 서비스, 태그 쓰기 도구, 스크립트 입력.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::prompt::Prompter;
use crate::core::tagger::TagWriter;
use crate::models::{AlbumInfo, AlbumRecord, TagSet, TrackRecord};
use crate::sources::{FingerprintSource, MetadataSource};

#[derive(Default)]
pub struct FakeFingerprint {
    result: Option<TrackRecord>,
    fail: bool,
    calls: Cell<usize>,
}

impl FakeFingerprint {
    pub fn matching(track: TrackRecord) -> Self {
        Self {
            result: Some(track),
            ..Default::default()
        }
    }

    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl FingerprintSource for FakeFingerprint {
    fn identify(&self, _path: &Path) -> Result<Option<TrackRecord>> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            bail!("network unreachable");
        }
        Ok(self.result.clone())
    }
}

#[derive(Default)]
pub struct FakeMetadata {
    search_results: Vec<TrackRecord>,
    albums: Vec<(TrackRecord, AlbumRecord)>,
    info: AlbumInfo,
    info_fails: bool,
    images: Vec<(String, Vec<u8>)>,
    searches: RefCell<Vec<(String, String, u32)>>,
    album_lookups: Cell<usize>,
}

impl FakeMetadata {
    /// `page` n은 n번째 결과를 돌려준다.
    pub fn with_search_results(mut self, results: Vec<TrackRecord>) -> Self {
        self.search_results = results;
        self
    }

    pub fn with_album(mut self, track: TrackRecord, album: AlbumRecord) -> Self {
        self.albums.push((track, album));
        self
    }

    pub fn with_info(mut self, info: AlbumInfo) -> Self {
        self.info = info;
        self
    }

    pub fn with_failing_info(mut self) -> Self {
        self.info_fails = true;
        self
    }

    pub fn with_image(mut self, url: &str, data: Vec<u8>) -> Self {
        self.images.push((url.to_string(), data));
        self
    }

    pub fn searches(&self) -> Vec<(String, String, u32)> {
        self.searches.borrow().clone()
    }

    pub fn album_lookups(&self) -> usize {
        self.album_lookups.get()
    }
}

impl MetadataSource for FakeMetadata {
    fn search_track(&self, title: &str, artist: &str, page: u32) -> Result<Option<TrackRecord>> {
        self.searches
            .borrow_mut()
            .push((title.to_string(), artist.to_string(), page));
        let index = (page as usize).saturating_sub(1);
        Ok(self.search_results.get(index).cloned())
    }

    fn album_for_track(&self, track: &TrackRecord) -> Result<Option<AlbumRecord>> {
        self.album_lookups.set(self.album_lookups.get() + 1);
        Ok(self
            .albums
            .iter()
            .find(|(t, _)| t == track)
            .map(|(_, a)| a.clone()))
    }

    fn album_info(&self, _album: &AlbumRecord) -> Result<AlbumInfo> {
        if self.info_fails {
            bail!("album.getInfo timed out");
        }
        Ok(self.info.clone())
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        match self.images.iter().find(|(u, _)| u == url) {
            Some((_, data)) => Ok(data.clone()),
            None => bail!("404 Not Found: {}", url),
        }
    }
}

#[derive(Default)]
pub struct RecordingWriter {
    fail: bool,
    writes: RefCell<Vec<(PathBuf, TagSet)>>,
}

impl RecordingWriter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn writes(&self) -> Vec<(PathBuf, TagSet)> {
        self.writes.borrow().clone()
    }
}

impl TagWriter for RecordingWriter {
    fn apply(&self, path: &Path, tags: &TagSet) -> Result<()> {
        if self.fail {
            bail!("unsupported file");
        }
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), tags.clone()));
        Ok(())
    }
}

/// 미리 정한 답을 순서대로 돌려준다. 답이 떨어지면 에러.
/// `confirm`은 `"y"`/`"n"`, 빈 문자열이면 기본값.
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("no scripted answer for {:?}", prompt),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn choice(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn text(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let answer = self.next(prompt)?;
        Ok(match answer.trim() {
            "y" | "Y" => true,
            "n" | "N" => false,
            _ => default,
        })
    }
}
