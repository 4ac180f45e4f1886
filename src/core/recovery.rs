use anyhow::Result;

use crate::core::prompt::Prompter;
use crate::models::{AlbumRecord, TrackRecord};
use crate::sources::MetadataSource;

/// 복구가 시작된 조회 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    Fingerprint,
    Album,
}

impl RecoveryStage {
    pub fn name(&self) -> &'static str {
        match self {
            RecoveryStage::Fingerprint => "fingerprint",
            RecoveryStage::Album => "album",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            RecoveryStage::Fingerprint => "음원을 인식하지 못했습니다.",
            RecoveryStage::Album => "선택한 트랙의 앨범을 찾을 수 없습니다.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Resolved { track: TrackRecord, album: AlbumRecord },
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Search,
    Manual,
    Skip,
}

const MENU: [(&str, MenuChoice); 3] = [
    ("트랙 검색", MenuChoice::Search),
    ("직접 입력 후 계속 진행", MenuChoice::Manual),
    ("이 파일 건너뛰기", MenuChoice::Skip),
];

enum State {
    AwaitingChoice,
    Searching,
    ManualEntry,
}

enum SearchResult {
    Accepted(TrackRecord, Option<AlbumRecord>),
    FallThrough,
}

/// 조회 실패 시 사용자와 함께 트랙/앨범 정보를 복구하는 대화형 세션.
pub struct RecoverySession<'a> {
    stage: RecoveryStage,
    track: TrackRecord,
    metadata: &'a dyn MetadataSource,
    prompter: &'a mut dyn Prompter,
}

impl<'a> RecoverySession<'a> {
    pub fn new(
        stage: RecoveryStage,
        track: TrackRecord,
        metadata: &'a dyn MetadataSource,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            stage,
            track,
            metadata,
            prompter,
        }
    }

    /// `Resolved` 또는 `Skipped`에 도달할 때까지 진행한다.
    /// 입력 장치 오류만 `Err`로 전달된다.
    pub fn run(mut self) -> Result<RecoveryOutcome> {
        tracing::info!(stage = self.stage.name(), track = %self.track.summary(), "recovery started");
        println!();
        println!("오류: {}", self.stage.message());

        let mut state = State::AwaitingChoice;
        loop {
            state = match state {
                State::AwaitingChoice => match self.await_choice()? {
                    MenuChoice::Search => State::Searching,
                    MenuChoice::Manual => State::ManualEntry,
                    MenuChoice::Skip => return Ok(RecoveryOutcome::Skipped),
                },
                State::Searching => match self.search()? {
                    SearchResult::Accepted(track, Some(album)) => {
                        return Ok(RecoveryOutcome::Resolved { track, album });
                    }
                    SearchResult::Accepted(track, None) => {
                        self.track = track;
                        self.stage = RecoveryStage::Album;
                        println!();
                        println!("오류: {}", self.stage.message());
                        State::AwaitingChoice
                    }
                    SearchResult::FallThrough => State::ManualEntry,
                },
                State::ManualEntry => {
                    let (track, album) = self.manual()?;
                    return Ok(RecoveryOutcome::Resolved { track, album });
                }
            };
        }
    }

    /// 올바른 번호가 입력될 때까지 같은 메뉴를 다시 묻는다.
    fn await_choice(&mut self) -> Result<MenuChoice> {
        loop {
            for (i, (label, _)) in MENU.iter().enumerate() {
                println!("[{}]: {}", i + 1, label);
            }
            println!();

            let raw = self.prompter.choice("[?]")?;
            match raw.trim().parse::<usize>() {
                Ok(n) if (1..=MENU.len()).contains(&n) => return Ok(MENU[n - 1].1),
                Ok(_) => println!("오류: 선택 범위를 벗어났습니다\n"),
                Err(_) => println!("오류: 숫자를 입력하세요\n"),
            }
        }
    }

    fn search(&mut self) -> Result<SearchResult> {
        println!();
        println!("<--트랙 검색-->");

        let title = prompt_required(&mut *self.prompter, "트랙 제목", &self.track.title)?;
        let artist = match self.stage {
            RecoveryStage::Fingerprint => {
                prompt_required(&mut *self.prompter, "아티스트", &self.track.artist)?
            }
            RecoveryStage::Album => self.track.artist.clone(),
        };
        self.track = TrackRecord::new(title, artist);

        let mut page = 1;
        loop {
            let found = self
                .metadata
                .search_track(&self.track.title, &self.track.artist, page);
            let candidate = match found {
                Ok(Some(candidate)) => candidate,
                Ok(None) => {
                    println!("  더 이상 검색 결과가 없습니다. 직접 입력으로 전환합니다.");
                    return Ok(SearchResult::FallThrough);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "track search failed");
                    println!("  검색 실패: {:#}. 직접 입력으로 전환합니다.", e);
                    return Ok(SearchResult::FallThrough);
                }
            };

            let album = self.metadata.album_for_track(&candidate).ok().flatten();

            println!();
            println!("  제목: {}", candidate.title);
            println!("  아티스트: {}", candidate.artist);
            println!();
            match &album {
                Some(a) => {
                    println!("  앨범: {}", a.album);
                    println!("  앨범 아티스트: {}", a.album_artist);
                }
                None => println!("  앨범: -"),
            }
            println!();

            if self.prompter.confirm("이 정보가 맞습니까?", true)? {
                println!("<------------->");
                return Ok(SearchResult::Accepted(candidate, album));
            }
            if self.prompter.confirm("직접 입력으로 전환할까요?", false)? {
                return Ok(SearchResult::FallThrough);
            }
            page += 1;
        }
    }

    /// 비워 둔 항목은 이전 값을 그대로 사용한다.
    fn manual(&mut self) -> Result<(TrackRecord, AlbumRecord)> {
        println!();
        println!("<--직접 입력-->");

        let title = prompt_required(&mut *self.prompter, "트랙 제목", &self.track.title)?;
        let artist = prompt_required(&mut *self.prompter, "아티스트", &self.track.artist)?;
        let track = TrackRecord::new(title, artist);

        let known = self
            .metadata
            .album_for_track(&track)
            .ok()
            .flatten()
            .unwrap_or_default();
        let album = prompt_required(&mut *self.prompter, "앨범", &known.album)?;
        let album_artist =
            prompt_required(&mut *self.prompter, "앨범 아티스트", &known.album_artist)?;

        println!("<------------->");
        Ok((track, AlbumRecord::new(album, album_artist)))
    }
}

/// 값을 입력받는다. 비워 두면 `default`를 쓰고, `default`도 비어 있으면 다시 묻는다.
fn prompt_required(prompter: &mut dyn Prompter, label: &str, default: &str) -> Result<String> {
    let default = default.trim();
    let prompt = if default.is_empty() {
        label.to_string()
    } else {
        format!("{} ({})", label, default)
    };

    loop {
        let value = prompter.text(&prompt)?;
        let value = value.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
        if !default.is_empty() {
            return Ok(default.to_string());
        }
        println!("  {}은(는) 비워 둘 수 없습니다", label);
    }
}
