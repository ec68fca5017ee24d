//! Status panel: what the top of the screen says right now.

use crate::session::Job;
use std::time::{Duration, Instant};

pub const LOADING_BASE_LABEL: &str = "Dreaming up your future job";
pub const LOADING_TICK: Duration = Duration::from_millis(350);
pub const LOADING_MAX_DOTS: usize = 3;
pub const PLACEHOLDER_TEXT: &str = "Press START to find out what you'll be when you grow up!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusView {
    Generating { label: String },
    Error { message: String },
    Job { title: String, description: String },
    Placeholder { message: &'static str },
}

/// Picks the render state. Loading beats error beats job beats placeholder.
pub fn status_view(
    job: Option<&Job>,
    loading: bool,
    error: Option<&str>,
    indicator: &LoadingIndicator,
) -> StatusView {
    if loading {
        return StatusView::Generating {
            label: indicator.label(),
        };
    }
    if let Some(message) = error {
        return StatusView::Error {
            message: message.to_string(),
        };
    }
    if let Some(job) = job {
        return StatusView::Job {
            title: job.title.clone(),
            description: job.description.clone(),
        };
    }
    StatusView::Placeholder {
        message: PLACEHOLDER_TEXT,
    }
}

/// Interval timer that only exists while it is held. Dropping it is the
/// only way to stop it.
#[derive(Debug)]
pub struct TickTimer {
    started: Instant,
    interval: Duration,
    fired: u64,
}

impl TickTimer {
    pub fn start(now: Instant, interval: Duration) -> Self {
        Self {
            started: now,
            interval,
            fired: 0,
        }
    }

    /// Number of ticks that became due since the previous call.
    pub fn take_due(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started);
        let total = (elapsed.as_nanos() / self.interval.as_nanos().max(1)) as u64;
        let due = total.saturating_sub(self.fired);
        self.fired = total.max(self.fired);
        due
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        let ticks = u32::try_from(self.fired.saturating_add(1)).unwrap_or(u32::MAX);
        match self.started.checked_add(self.interval.saturating_mul(ticks)) {
            Some(next) => next.saturating_duration_since(now),
            None => Duration::MAX,
        }
    }
}

/// The growing "..." next to the generating label.
#[derive(Debug, Default)]
pub struct LoadingIndicator {
    timer: Option<TickTimer>,
    dots: usize,
}

impl LoadingIndicator {
    /// Acquires the timer when loading starts and releases it (resetting the
    /// label) when loading stops.
    pub fn sync(&mut self, loading: bool, now: Instant) {
        match (loading, self.timer.is_some()) {
            (true, false) => {
                self.timer = Some(TickTimer::start(now, LOADING_TICK));
                self.dots = 0;
            }
            (false, true) => {
                self.timer = None;
                self.dots = 0;
            }
            _ => {}
        }
    }

    pub fn advance(&mut self, now: Instant) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        for _ in 0..timer.take_due(now) {
            self.dots = if self.dots >= LOADING_MAX_DOTS {
                0
            } else {
                self.dots + 1
            };
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.timer.as_ref().map(|t| t.until_next(now))
    }

    pub fn dots(&self) -> usize {
        self.dots
    }

    pub fn label(&self) -> String {
        format!("{LOADING_BASE_LABEL}{}", ".".repeat(self.dots))
    }
}

/// Owns the indicator and turns session inputs into a [`StatusView`].
#[derive(Debug, Default)]
pub struct StatusDisplay {
    indicator: LoadingIndicator,
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(
        &mut self,
        job: Option<&Job>,
        loading: bool,
        error: Option<&str>,
        now: Instant,
    ) -> StatusView {
        self.indicator.sync(loading, now);
        self.indicator.advance(now);
        status_view(job, loading, error, &self.indicator)
    }

    pub fn indicator(&self) -> &LoadingIndicator {
        &self.indicator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job {
            title: "Sky Gardener".into(),
            description: "Tends floating gardens.".into(),
        }
    }

    #[test]
    fn loading_takes_priority_over_everything() {
        let indicator = LoadingIndicator::default();
        let view = status_view(Some(&job()), true, Some("boom"), &indicator);
        assert_eq!(
            view,
            StatusView::Generating {
                label: LOADING_BASE_LABEL.to_string()
            }
        );
    }

    #[test]
    fn error_beats_job() {
        let indicator = LoadingIndicator::default();
        let view = status_view(Some(&job()), false, Some("boom"), &indicator);
        assert_eq!(
            view,
            StatusView::Error {
                message: "boom".into()
            }
        );
    }

    #[test]
    fn job_is_shown_verbatim() {
        let indicator = LoadingIndicator::default();
        let view = status_view(Some(&job()), false, None, &indicator);
        assert_eq!(
            view,
            StatusView::Job {
                title: "Sky Gardener".into(),
                description: "Tends floating gardens.".into()
            }
        );
    }

    #[test]
    fn placeholder_on_first_run() {
        let indicator = LoadingIndicator::default();
        assert_eq!(
            status_view(None, false, None, &indicator),
            StatusView::Placeholder {
                message: PLACEHOLDER_TEXT
            }
        );
    }

    #[test]
    fn indicator_grows_then_wraps() {
        let start = Instant::now();
        let mut indicator = LoadingIndicator::default();
        indicator.sync(true, start);

        let mut seen = Vec::new();
        for step in 1..=5u32 {
            indicator.advance(start + LOADING_TICK * step);
            seen.push(indicator.dots());
        }
        assert_eq!(seen, vec![1, 2, 3, 0, 1]);
    }

    #[test]
    fn missed_ticks_are_caught_up_in_one_advance() {
        let start = Instant::now();
        let mut indicator = LoadingIndicator::default();
        indicator.sync(true, start);
        indicator.advance(start + LOADING_TICK * 2);
        assert_eq!(indicator.dots(), 2);
        assert_eq!(indicator.label(), format!("{LOADING_BASE_LABEL}.."));
    }

    #[test]
    fn no_tick_after_loading_stops() {
        let start = Instant::now();
        let mut indicator = LoadingIndicator::default();
        indicator.sync(true, start);
        indicator.advance(start + LOADING_TICK);
        assert_eq!(indicator.dots(), 1);

        indicator.sync(false, start + LOADING_TICK);
        assert!(!indicator.is_running());
        assert_eq!(indicator.until_next_tick(start), None);

        indicator.advance(start + LOADING_TICK * 10);
        assert_eq!(indicator.dots(), 0);
        assert_eq!(indicator.label(), LOADING_BASE_LABEL);
    }

    #[test]
    fn restarting_loading_starts_from_base_label() {
        let start = Instant::now();
        let mut display = StatusDisplay::new();
        display.view(None, true, None, start);
        display.view(None, true, None, start + LOADING_TICK * 2);
        display.view(None, false, None, start + LOADING_TICK * 3);

        let restart = start + LOADING_TICK * 4;
        let view = display.view(None, true, None, restart);
        assert_eq!(
            view,
            StatusView::Generating {
                label: LOADING_BASE_LABEL.to_string()
            }
        );
        assert!(display.indicator().is_running());
    }

    #[test]
    fn timer_reports_time_until_next_tick() {
        let start = Instant::now();
        let mut timer = TickTimer::start(start, Duration::from_millis(100));
        assert_eq!(timer.until_next(start), Duration::from_millis(100));
        assert_eq!(timer.take_due(start + Duration::from_millis(250)), 2);
        assert_eq!(
            timer.until_next(start + Duration::from_millis(250)),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn tick_counts_beyond_u32_do_not_wrap() {
        let start = Instant::now();
        let timer = TickTimer {
            started: start,
            interval: Duration::from_millis(100),
            fired: u64::from(u32::MAX) + 5,
        };
        // A wrapping count would put the next tick 600ms out.
        assert!(timer.until_next(start) > Duration::from_secs(3600));
    }
}
