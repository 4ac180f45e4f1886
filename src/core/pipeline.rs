use std::path::PathBuf;

use anyhow::Result;

use crate::core::parser;
use crate::core::prompt::Prompter;
use crate::core::rate_limiter::RateLimiter;
use crate::core::recovery::{RecoveryOutcome, RecoverySession, RecoveryStage};
use crate::core::renamer;
use crate::core::tagger::TagWriter;
use crate::error::{ErrorQueue, ItemIssue};
use crate::models::{AlbumRecord, AudioItem, Enrichment, ProcessingOutcome, TagSet, TrackRecord};
use crate::sources::{FingerprintSource, MetadataSource};

/// 항목 하나가 거치는 단계. 앞 단계가 성공해야 다음 단계로 넘어간다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Fingerprinting,
    TrackIdentified,
    AlbumResolved,
    Enriched,
    Tagged,
    Renamed,
    Done,
}

const STAGES: [Stage; 6] = [
    Stage::TrackIdentified,
    Stage::AlbumResolved,
    Stage::Enriched,
    Stage::Tagged,
    Stage::Renamed,
    Stage::Done,
];

/// 항목 하나의 처리 결과.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub outcome: ProcessingOutcome,
    pub reached: Stage,
    pub destination: Option<PathBuf>,
    pub issues: ErrorQueue,
    pub recoveries: Vec<RecoveryStage>,
}

impl ItemReport {
    fn new() -> Self {
        Self {
            outcome: ProcessingOutcome::Failed,
            reached: Stage::Fingerprinting,
            destination: None,
            issues: ErrorQueue::default(),
            recoveries: Vec::new(),
        }
    }

    /// `[####--] OK (복구: album) → Artist - Title.mp3 | 경고: ...` 형식의 보고 줄.
    pub fn summary_line(&self) -> String {
        let progress: String = STAGES
            .iter()
            .map(|s| if *s <= self.reached { '#' } else { '-' })
            .collect();

        let mut line = format!("[{}] {}", progress, self.outcome.label());
        if !self.recoveries.is_empty() {
            let stages: Vec<&str> = self.recoveries.iter().map(|s| s.name()).collect();
            line.push_str(&format!(" (복구: {})", stages.join(", ")));
        }
        if let Some(name) = self
            .destination
            .as_ref()
            .and_then(|d| d.file_name())
            .and_then(|n| n.to_str())
        {
            line.push_str(&format!(" → {}", name));
        }
        if !self.issues.is_empty() {
            line.push_str(&format!(" | {}", self.issues));
        }
        line
    }
}

/// 파일 하나를 음원 인식 → 앨범 → 보강 → 태그 기록 → 이름 변경 순으로 처리한다.
pub struct ResolutionPipeline<'a> {
    fingerprint: &'a dyn FingerprintSource,
    metadata: &'a dyn MetadataSource,
    writer: &'a dyn TagWriter,
}

impl<'a> ResolutionPipeline<'a> {
    pub fn new(
        fingerprint: &'a dyn FingerprintSource,
        metadata: &'a dyn MetadataSource,
        writer: &'a dyn TagWriter,
    ) -> Self {
        Self {
            fingerprint,
            metadata,
            writer,
        }
    }

    /// 항목을 끝까지 처리한다. 어떤 실패도 이 항목 밖으로 전파되지 않는다.
    pub fn process(
        &self,
        item: &AudioItem,
        limiter: &mut RateLimiter,
        prompter: &mut dyn Prompter,
    ) -> ItemReport {
        let mut report = ItemReport::new();
        let outcome = match self.resolve(item, limiter, prompter, &mut report) {
            Ok(outcome) => outcome,
            Err(e) => {
                report.issues.push(ItemIssue::InputUnavailable(format!("{:#}", e)));
                ProcessingOutcome::Failed
            }
        };
        report.outcome = outcome;
        tracing::info!(
            file = %item.path.display(),
            outcome = ?report.outcome,
            issues = report.issues.len(),
            "item processed"
        );
        report
    }

    fn resolve(
        &self,
        item: &AudioItem,
        limiter: &mut RateLimiter,
        prompter: &mut dyn Prompter,
        report: &mut ItemReport,
    ) -> Result<ProcessingOutcome> {
        limiter.permit();
        let identified = match self.fingerprint.identify(item.path()) {
            Ok(Some(track)) if track.is_complete() => Some(track),
            Ok(_) => {
                report
                    .issues
                    .push(ItemIssue::FingerprintNotFound("일치하는 결과 없음".to_string()));
                None
            }
            Err(e) => {
                tracing::warn!(file = %item.path.display(), error = %e, "fingerprint lookup failed");
                report
                    .issues
                    .push(ItemIssue::FingerprintNotFound(format!("{:#}", e)));
                None
            }
        };

        let (track, recovered_album) = match identified {
            Some(track) => (track, None),
            None => {
                let seed = parser::parse_filename(item.path());
                match self.recover(RecoveryStage::Fingerprint, seed, prompter, report)? {
                    Some((track, album)) => (track, Some(album)),
                    None => return Ok(ProcessingOutcome::Skipped),
                }
            }
        };
        report.reached = Stage::TrackIdentified;

        let (track, album) = match recovered_album {
            Some(album) => (track, album),
            None => match self.resolve_album(&track) {
                Some(album) => (track, album),
                None => {
                    report.issues.push(ItemIssue::AlbumNotFound {
                        title: track.title.clone(),
                        artist: track.artist.clone(),
                    });
                    match self.recover(RecoveryStage::Album, track, prompter, report)? {
                        Some(resolved) => resolved,
                        None => return Ok(ProcessingOutcome::Skipped),
                    }
                }
            },
        };
        report.reached = Stage::AlbumResolved;

        let enrichment = self.enrich(&album, &mut report.issues);
        report.reached = Stage::Enriched;

        let tags = match TagSet::assemble(&track, &album, enrichment) {
            Ok(tags) => tags,
            Err(field) => {
                report.issues.push(ItemIssue::IncompleteTags(field));
                return Ok(ProcessingOutcome::Failed);
            }
        };

        // 이름 변경 전의 경로로 기록해야 한다
        if let Err(e) = self.writer.apply(item.path(), &tags) {
            report
                .issues
                .push(ItemIssue::TagWriteFailure(format!("{:#}", e)));
            return Ok(ProcessingOutcome::Failed);
        }
        report.reached = Stage::Tagged;

        match renamer::rename_file(item.path(), &tags.track()) {
            Ok(destination) => {
                report.destination = Some(destination);
                report.reached = Stage::Done;
            }
            // 태그는 기록되었으므로 진행 표시는 Tagged에서 멈춘다
            Err(e) => {
                tracing::warn!(file = %item.path.display(), error = %e, "rename failed");
                report.issues.push(ItemIssue::RenameFailure(format!("{:#}", e)));
            }
        }

        Ok(ProcessingOutcome::Tagged)
    }

    /// 조회 에러도 "앨범 없음"으로 취급해 복구로 넘긴다.
    fn resolve_album(&self, track: &TrackRecord) -> Option<AlbumRecord> {
        match self.metadata.album_for_track(track) {
            Ok(Some(album)) if album.is_complete() => Some(album),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(track = %track.summary(), error = %e, "album lookup failed");
                None
            }
        }
    }

    fn recover(
        &self,
        stage: RecoveryStage,
        track: TrackRecord,
        prompter: &mut dyn Prompter,
        report: &mut ItemReport,
    ) -> Result<Option<(TrackRecord, AlbumRecord)>> {
        report.recoveries.push(stage);
        match RecoverySession::new(stage, track, self.metadata, prompter).run()? {
            RecoveryOutcome::Resolved { track, album } => Ok(Some((track, album))),
            RecoveryOutcome::Skipped => {
                report.issues.push(ItemIssue::UserSkip);
                Ok(None)
            }
        }
    }

    /// 장르와 커버 이미지는 없어도 경고만 남기고 계속 진행한다.
    fn enrich(&self, album: &AlbumRecord, issues: &mut ErrorQueue) -> Enrichment {
        let info = match self.metadata.album_info(album) {
            Ok(info) => info,
            Err(e) => {
                issues.push(ItemIssue::AlbumInfoUnavailable(format!("{:#}", e)));
                return Enrichment::default();
            }
        };

        if info.genre.is_none() {
            issues.push(ItemIssue::GenreUnavailable);
        }

        let cover_image = match info.image_url {
            None => {
                issues.push(ItemIssue::CoverArtUnavailable("이미지 없음".to_string()));
                None
            }
            Some(url) => match self.metadata.fetch_image(&url) {
                Ok(data) if !data.is_empty() => Some(data),
                Ok(_) => {
                    issues.push(ItemIssue::CoverArtUnavailable("빈 이미지".to_string()));
                    None
                }
                Err(e) => {
                    issues.push(ItemIssue::CoverArtUnavailable(format!("{:#}", e)));
                    None
                }
            },
        };

        Enrichment {
            genre: info.genre,
            cover_image,
        }
    }
}
