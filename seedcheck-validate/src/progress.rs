use std::sync::Mutex;
use std::time::{Duration, Instant};

use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::info;

///
/// Estimated time remaining after a unit of work finished.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eta {
    pub completed: usize,
    pub per_item: Duration,
    pub remaining: Duration,
}

///
/// Running-total progress over a fixed number of work units, shared by all workers.
///
pub struct ProgressTracker {
    total: usize,
    start: Instant,
    completed: Mutex<usize>,
    bar: ProgressBar,
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl ProgressTracker {
    pub fn new(total: usize, show_progress: bool) -> Self {
        let bar = if show_progress {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} subsystems ({eta})")
        {
            bar.set_style(style.progress_chars("##-"));
        }

        ProgressTracker {
            total,
            start: Instant::now(),
            completed: Mutex::new(0),
            bar,
        }
    }

    ///
    /// Record one finished unit and estimate the time left.
    ///
    /// The count is incremented before the average is taken, under one lock, so the divisor is
    /// never zero.
    ///
    pub fn complete_one(&self) -> Eta {
        let eta = {
            let mut completed = match self.completed.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *completed += 1;
            let per_item = self.start.elapsed() / saturating_u32(*completed);
            let remaining = per_item * saturating_u32(self.total.saturating_sub(*completed));
            Eta {
                completed: *completed,
                per_item,
                remaining,
            }
        };
        self.bar.inc(1);
        info!(
            "{} subsystems completed.  {} per subsystem, {} time remaining.",
            eta.completed,
            HumanDuration(eta.per_item),
            HumanDuration(eta.remaining)
        );
        eta
    }

    pub fn completed(&self) -> usize {
        match self.completed.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
