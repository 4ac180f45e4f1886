use std::fmt;

/// 파일 하나를 처리하는 동안 발생한 문제.
/// 경고는 처리를 계속하고, 에러는 해당 파일만 중단시킨다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemIssue {
    #[error("음원 인식 실패: {0}")]
    FingerprintNotFound(String),

    #[error("앨범을 찾을 수 없습니다: {artist} - {title}")]
    AlbumNotFound { title: String, artist: String },

    #[error("앨범 정보 조회 실패: {0}")]
    AlbumInfoUnavailable(String),

    #[error("장르 정보가 없습니다")]
    GenreUnavailable,

    #[error("앨범 아트를 가져올 수 없습니다: {0}")]
    CoverArtUnavailable(String),

    #[error("필수 태그가 비어 있습니다: {0}")]
    IncompleteTags(&'static str),

    #[error("태그 기록 실패: {0}")]
    TagWriteFailure(String),

    #[error("파일명 변경 실패: {0}")]
    RenameFailure(String),

    #[error("사용자가 건너뛰었습니다")]
    UserSkip,

    #[error("입력을 받을 수 없습니다: {0}")]
    InputUnavailable(String),
}

impl ItemIssue {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ItemIssue::FingerprintNotFound(_)
                | ItemIssue::AlbumNotFound { .. }
                | ItemIssue::AlbumInfoUnavailable(_)
                | ItemIssue::GenreUnavailable
                | ItemIssue::CoverArtUnavailable(_)
                | ItemIssue::RenameFailure(_)
        )
    }

    /// 보고 줄의 접두어. 사용자가 고른 건너뛰기는 문제가 아니므로 접두어가 없다.
    pub fn level(&self) -> Option<&'static str> {
        match self {
            ItemIssue::UserSkip => None,
            issue if issue.is_warning() => Some("경고"),
            _ => Some("오류"),
        }
    }
}

/// 항목별 경고/에러 목록. 추가만 가능하며 보고 줄에 한 번에 출력된다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorQueue {
    issues: Vec<ItemIssue>,
}

impl ErrorQueue {
    pub fn push(&mut self, issue: ItemIssue) {
        tracing::debug!(%issue, "issue recorded");
        self.issues.push(issue);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemIssue> {
        self.issues.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }
}

impl fmt::Display for ErrorQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            match issue.level() {
                Some(level) => write!(f, "{}: {}", level, issue)?,
                None => write!(f, "{}", issue)?,
            }
        }
        Ok(())
    }
}

/// 명령행 인자가 잘못되었음을 나타낸다. 종료 코드 2로 이어진다.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UsageError(pub String);
