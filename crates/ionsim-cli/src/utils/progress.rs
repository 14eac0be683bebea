use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use ionsim::engine::progress::{Progress, ProgressCallback};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders engine progress events on stderr: a spinner per simulation stage
/// and a bar for the per-site collision loop.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    phases_started: Arc<AtomicUsize>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that draws nowhere, for tests and `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(Self::spinner_style());
        pb.finish_and_clear();
        Self {
            pb: Arc::new(Mutex::new(pb)),
            phases_started: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn phases_started(&self) -> usize {
        self.phases_started.load(Ordering::Relaxed)
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let handler = self.clone();
        Box::new(move |progress: Progress| handler.handle(progress))
    }

    fn handle(&self, progress: Progress) {
        let Ok(pb) = self.pb.lock() else {
            warn!("Progress bar mutex was poisoned. Cannot update progress.");
            return;
        };

        match progress {
            Progress::PhaseStart { name } => {
                let index = self.phases_started.fetch_add(1, Ordering::Relaxed) + 1;
                pb.reset();
                pb.set_length(0);
                pb.set_style(Self::spinner_style());
                pb.set_prefix(format!("[{index}]"));
                pb.set_message(name);
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::PhaseFinish => {
                pb.disable_steady_tick();
                let name = pb.message();
                pb.finish_with_message(format!("{name} ✓"));
            }
            Progress::TaskStart { total_steps } => {
                pb.disable_steady_tick();
                pb.reset();
                pb.set_length(total_steps);
                pb.set_position(0);
                pb.set_style(Self::bar_style());
            }
            Progress::TaskIncrement => pb.inc(1),
            Progress::TaskFinish => {
                let length = pb.length().unwrap_or(0);
                pb.set_position(length);
            }
            Progress::Message(msg) => pb.println(format!("  {msg}")),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{prefix:.bold.dim} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix:.bold.dim} {msg:<20} [{bar:40.cyan/blue}] {pos}/{len} sites ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = CliProgressHandler::hidden();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
        assert_eq!(handler.phases_started(), 0);
    }

    #[test]
    fn stages_are_numbered_and_marked_done() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Generating Lattice" });
        callback(Progress::PhaseFinish);
        callback(Progress::PhaseStart { name: "Collisions" });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.prefix(), "[2]");
            assert_eq!(pb.message(), "Collisions");
            assert!(!pb.is_finished());
        }

        callback(Progress::PhaseFinish);
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.message(), "Collisions ✓");
        assert!(pb.is_finished());
        assert_eq!(handler.phases_started(), 2);
    }

    #[test]
    fn collision_task_fills_the_bar() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Collisions" });
        callback(Progress::TaskStart { total_steps: 128 });
        for _ in 0..3 {
            callback(Progress::TaskIncrement);
        }
        assert_eq!(handler.pb.lock().unwrap().position(), 3);

        callback(Progress::TaskFinish);
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(128));
        assert_eq!(pb.position(), 128);
    }

    #[test]
    fn callback_can_be_driven_from_worker_threads() {
        let handler = CliProgressHandler::hidden();
        let callback = Arc::new(handler.get_callback());
        callback(Progress::TaskStart { total_steps: 8 });

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let callback = Arc::clone(&callback);
                thread::spawn(move || {
                    callback(Progress::TaskIncrement);
                    callback(Progress::TaskIncrement);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(handler.pb.lock().unwrap().position(), 8);
    }
}
