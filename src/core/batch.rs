use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crate::core::pipeline::ResolutionPipeline;
use crate::core::prompt::Prompter;
use crate::core::rate_limiter::RateLimiter;
use crate::core::scanner;
use crate::models::{AudioItem, ProcessingOutcome};

/// 실행 설정. 실행 중에는 바뀌지 않는다.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root: PathBuf,
    pub recurse: bool,
}

impl RunConfig {
    pub fn header(&self) -> String {
        if self.root.is_dir() {
            format!("루트 디렉토리: {}", self.root.display())
        } else {
            format!("선택한 파일: {}", self.root.display())
        }
    }

    /// 처리할 MP3 목록. 경로가 디렉토리도 MP3도 아니면 에러.
    pub fn discover(&self) -> Result<Vec<AudioItem>> {
        scanner::scan_path(&self.root, self.recurse)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub tagged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Tagged => self.tagged += 1,
            ProcessingOutcome::Skipped => self.skipped += 1,
            ProcessingOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tagged + self.skipped + self.failed
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["완료", "건너뜀", "실패", "전체"]);
        table.add_row(vec![
            Cell::new(self.tagged),
            Cell::new(self.skipped),
            Cell::new(self.failed),
            Cell::new(self.total()),
        ]);
        table
    }
}

/// 파일을 하나씩 순서대로 처리한다. 한 파일의 실패가 나머지를 멈추지 않는다.
pub struct BatchRunner<'a> {
    config: RunConfig,
    pipeline: ResolutionPipeline<'a>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: RunConfig, pipeline: ResolutionPipeline<'a>) -> Self {
        Self { config, pipeline }
    }

    pub fn run(
        &self,
        items: &[AudioItem],
        limiter: &mut RateLimiter,
        prompter: &mut dyn Prompter,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for item in items {
            println!("({})", item.display_name());
            let report = self.pipeline.process(item, limiter, prompter);
            println!("{}", report.summary_line());
            summary.record(report.outcome);
        }
        println!();

        tracing::info!(
            root = %self.config.root.display(),
            tagged = summary.tagged,
            skipped = summary.skipped,
            failed = summary.failed,
            "batch finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::fakes::{FakeFingerprint, FakeMetadata, RecordingWriter, ScriptedPrompter};
    use crate::models::{AlbumInfo, AlbumRecord, TrackRecord};

    fn limiter() -> RateLimiter {
        RateLimiter::new(100, Duration::from_millis(1))
    }

    #[test]
    fn test_run_continues_after_item_problems() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.mp3", "b.mp3"] {
            std::fs::write(dir.path().join(name), b"audio").unwrap();
        }

        let fingerprint = FakeFingerprint::matching(TrackRecord::new("Track A", "Artist X"));
        let metadata = FakeMetadata::default()
            .with_album(
                TrackRecord::new("Track A", "Artist X"),
                AlbumRecord::new("Album Y", "Artist X"),
            )
            .with_info(AlbumInfo::default());
        let writer = RecordingWriter::default();
        let config = RunConfig {
            root: dir.path().to_path_buf(),
            recurse: true,
        };
        let items = config.discover().unwrap();
        let runner = BatchRunner::new(config, ResolutionPipeline::new(&fingerprint, &metadata, &writer));

        let summary = runner.run(&items, &mut limiter(), &mut ScriptedPrompter::new(&[]));

        // 두 번째 파일은 이름이 겹쳐 변경되지 않지만 태그는 기록된다
        assert_eq!(summary.tagged, 2);
        assert_eq!(summary.total(), 2);
        assert_eq!(writer.writes().len(), 2);
        assert!(dir.path().join("Artist X - Track A.mp3").exists());
        assert!(dir.path().join("b.mp3").exists());
    }

    #[test]
    fn test_run_counts_skips_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<AudioItem> = ["a.mp3", "b.mp3", "c.mp3"]
            .iter()
            .map(|n| AudioItem::new(dir.path().join(n)))
            .collect();

        let fingerprint = FakeFingerprint::no_match();
        let metadata = FakeMetadata::default();
        let writer = RecordingWriter::default();
        let runner = BatchRunner::new(
            RunConfig {
                root: dir.path().to_path_buf(),
                recurse: false,
            },
            ResolutionPipeline::new(&fingerprint, &metadata, &writer),
        );

        // 세 번째 파일에서 입력이 끊긴다
        let mut prompter = ScriptedPrompter::new(&["3", "3"]);
        let summary = runner.run(&items, &mut limiter(), &mut prompter);

        assert_eq!(
            summary,
            BatchSummary {
                tagged: 0,
                skipped: 2,
                failed: 1
            }
        );
        assert_eq!(fingerprint.calls(), 3);
    }

    #[test]
    fn test_header() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            root: dir.path().to_path_buf(),
            recurse: true,
        };
        assert!(config.header().starts_with("루트 디렉토리"));

        let file = RunConfig {
            root: dir.path().join("x.mp3"),
            recurse: true,
        };
        assert!(file.header().starts_with("선택한 파일"));
    }

    #[test]
    fn test_summary_table() {
        let summary = BatchSummary {
            tagged: 3,
            skipped: 1,
            failed: 0,
        };
        let rendered = summary.table().to_string();
        assert!(rendered.contains("완료"));
        assert!(rendered.contains('4'));
    }
}
