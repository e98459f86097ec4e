use {
    prometheus::{Histogram, HistogramTimer},
    std::{fmt, sync::Arc, time::Duration},
};

/// Named duration histogram handed out by a [`MetricsRegistry`].
///
/// Clones share the same underlying histogram, so a sample recorded through
/// one clone is visible through all of them.
///
/// [`MetricsRegistry`]: crate::metrics::MetricsRegistry
#[derive(Clone)]
pub struct Timer {
    name: Arc<str>,
    // None only when the histogram could not be built; such a timer drops samples.
    histogram: Option<Histogram>,
}

impl Timer {
    pub(crate) fn new(name: &str, histogram: Histogram) -> Self {
        Timer {
            name: Arc::from(name),
            histogram: Some(histogram),
        }
    }

    pub(crate) fn detached(name: &str) -> Self {
        Timer {
            name: Arc::from(name),
            histogram: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts timing. The elapsed time is recorded when the guard is dropped
    /// or finished, whichever comes first.
    pub fn start(&self) -> TimerGuard {
        TimerGuard {
            inner: self.histogram.as_ref().map(Histogram::start_timer),
        }
    }

    /// Runs `f` and records how long it took.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        f()
    }

    pub fn observe(&self, elapsed: Duration) {
        if let Some(histogram) = &self.histogram {
            histogram.observe(elapsed.as_secs_f64());
        }
    }

    pub fn sample_count(&self) -> u64 {
        self.histogram
            .as_ref()
            .map_or(0, Histogram::get_sample_count)
    }

    pub fn total_duration(&self) -> Duration {
        let seconds = self.histogram.as_ref().map_or(0.0, Histogram::get_sample_sum);
        Duration::from_secs_f64(seconds.max(0.0))
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("name", &self.name)
            .field("samples", &self.sample_count())
            .finish()
    }
}

/// Records one sample on drop.
#[must_use = "the sample is recorded as soon as the guard is dropped"]
pub struct TimerGuard {
    inner: Option<HistogramTimer>,
}

impl TimerGuard {
    /// Records the sample now and returns the elapsed time.
    pub fn finish(mut self) -> Duration {
        self.inner
            .take()
            .map_or(Duration::ZERO, |timer| {
                Duration::from_secs_f64(timer.stop_and_record())
            })
    }
}
