use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// AcoustID 호출 횟수 제한기.
/// 최근 `max_calls`번의 허가 시각을 기억하고, 어떤 `window` 구간에도
/// `max_calls`번을 넘는 호출이 들어가지 않도록 호출 스레드를 재운다.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    recent: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            max_calls,
            window,
            recent: VecDeque::with_capacity(max_calls),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_calls, config.window())
    }

    /// 호출을 허가하고 허가 시각을 돌려준다.
    /// 창이 가득 찼으면 가장 오래된 허가가 창 밖으로 밀려날 때까지 잔다.
    pub fn permit(&mut self) -> Instant {
        if self.recent.len() >= self.max_calls {
            if let Some(oldest) = self.recent.pop_front() {
                let elapsed = oldest.elapsed();
                if elapsed < self.window {
                    let wait = self.window - elapsed;
                    tracing::debug!(?wait, "rate limit reached, sleeping");
                    std::thread::sleep(wait);
                }
            }
        }
        let now = Instant::now();
        self.recent.push_back(now);
        now
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
