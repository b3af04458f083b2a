use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ncikit::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const SPINNER_TICK_MS: u64 = 80;

#[derive(Debug, Default)]
struct PhaseLog {
    current: Option<(&'static str, Instant)>,
    finished: Vec<(&'static str, Duration)>,
}

/// Shows each pipeline phase as a spinner on stderr and records how long it took.
#[derive(Clone)]
pub struct PhaseSpinner {
    pb: ProgressBar,
    log: Arc<Mutex<PhaseLog>>,
}

impl PhaseSpinner {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(None, target).with_style(spinner_style());
        Self {
            pb,
            log: Arc::new(Mutex::new(PhaseLog::default())),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let spinner = self.clone();
        Box::new(move |event| spinner.handle(event))
    }

    /// Finished phases with their wall-clock duration, in completion order.
    pub fn timings(&self) -> Vec<(&'static str, Duration)> {
        self.log
            .lock()
            .map(|log| log.finished.clone())
            .unwrap_or_default()
    }

    fn handle(&self, event: Progress) {
        let Ok(mut log) = self.log.lock() else {
            warn!("Phase log mutex was poisoned. Cannot update progress.");
            return;
        };
        match event {
            Progress::PhaseStart { name } => {
                log.current = Some((name, Instant::now()));
                self.pb.set_message(name);
                self.pb
                    .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::PhaseFinish => {
                self.pb.disable_steady_tick();
                if let Some((name, started)) = log.current.take() {
                    let elapsed = started.elapsed();
                    debug!(phase = name, elapsed_ms = elapsed.as_millis() as u64, "Phase finished.");
                    self.pb.set_message(format!("✓ {name} ({elapsed:.1?})"));
                    log.finished.push((name, elapsed));
                }
                self.pb.tick();
            }
            Progress::Message(text) => self.pb.println(format!("  {text}")),
        }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for PhaseSpinner {
    fn default() -> Self {
        Self::new()
    }
}

pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn new_spinner_has_no_timings() {
        assert!(PhaseSpinner::hidden().timings().is_empty());
    }

    #[test]
    fn finished_phases_are_timed_in_order() {
        let spinner = PhaseSpinner::hidden();
        let callback = spinner.callback();

        callback(Progress::PhaseStart {
            name: "Extracting features",
        });
        assert_eq!(spinner.pb.message(), "Extracting features");
        callback(Progress::PhaseFinish);
        callback(Progress::PhaseStart {
            name: "Detecting contacts",
        });
        callback(Progress::Message("3 contacts".to_string()));
        callback(Progress::PhaseFinish);

        let names: Vec<&str> = spinner.timings().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Extracting features", "Detecting contacts"]);
        assert!(spinner.pb.message().starts_with("✓ Detecting contacts"));
    }

    #[test]
    fn finish_without_start_records_nothing() {
        let spinner = PhaseSpinner::hidden();
        (spinner.callback())(Progress::PhaseFinish);
        assert!(spinner.timings().is_empty());
    }

    #[test]
    fn callback_is_usable_from_another_thread() {
        let spinner = PhaseSpinner::hidden();
        let callback = spinner.callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Refining contacts",
            });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert_eq!(spinner.timings().len(), 1);
        spinner.finish();
        assert!(spinner.pb.is_finished());
    }
}
