use std::time::{Duration, Instant};

/// 显式的帧定时器，由宿主在挂载时启动、卸载时停止
///
/// `poll` reports at most one due frame per call; missed frames are not
/// replayed.
#[derive(Debug, Clone)]
pub struct FrameTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl FrameTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 到期返回 true，并把下一次到期时间排在 now 之后
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// 距离下一帧的时间，停止时为 None
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_ticker_never_fires() {
        let mut ticker = FrameTicker::new(Duration::from_millis(16));
        let now = Instant::now();
        assert!(!ticker.poll(now + Duration::from_secs(1)));
        assert_eq!(ticker.time_until_next(now), None);
    }

    #[test]
    fn test_fires_once_per_interval() {
        let mut ticker = FrameTicker::new(Duration::from_millis(16));
        let start = Instant::now();
        ticker.start(start);

        assert!(!ticker.poll(start + Duration::from_millis(10)));
        assert!(ticker.poll(start + Duration::from_millis(16)));
        assert!(!ticker.poll(start + Duration::from_millis(20)));
        assert!(ticker.poll(start + Duration::from_millis(32)));
    }

    #[test]
    fn test_late_poll_does_not_replay_missed_frames() {
        let mut ticker = FrameTicker::new(Duration::from_millis(10));
        let start = Instant::now();
        ticker.start(start);

        let late = start + Duration::from_millis(105);
        assert!(ticker.poll(late));
        assert!(!ticker.poll(late));
        assert_eq!(ticker.time_until_next(late), Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let mut ticker = FrameTicker::new(Duration::from_millis(16));
        let start = Instant::now();
        ticker.start(start);
        ticker.stop();
        assert!(!ticker.is_running());
        assert!(!ticker.poll(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_start_twice_keeps_schedule() {
        let mut ticker = FrameTicker::new(Duration::from_millis(16));
        let start = Instant::now();
        ticker.start(start);
        ticker.start(start + Duration::from_millis(8));
        assert!(ticker.poll(start + Duration::from_millis(16)));
    }
}
