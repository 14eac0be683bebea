//! Progress events emitted by a simulation run.
//!
//! The engine never renders progress itself. Front ends install a callback on
//! a [`ProgressReporter`] and translate the events into whatever display they
//! use; a reporter without a callback discards every event.

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A named stage of the run begins.
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A countable task (e.g. the per-site collision loop) begins.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `stage` between a `PhaseStart` / `PhaseFinish` pair.
    ///
    /// The finish event is emitted only when the stage succeeds; a failing
    /// stage ends the run, and front ends abandon their display on error.
    pub fn phase<T, E>(
        &self,
        name: &'static str,
        stage: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.report(Progress::PhaseStart { name });
        let value = stage()?;
        self.report(Progress::PhaseFinish);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
        let value: Result<u8, ()> = reporter.phase("Noop", || Ok(3));
        assert_eq!(value, Ok(3));
    }

    #[test]
    fn phase_wraps_successful_stage_in_start_and_finish() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            events.lock().unwrap().push(e);
        }));

        let ok: Result<(), ()> = reporter.phase("Lattice", || Ok(()));
        assert!(ok.is_ok());
        let failed: Result<(), &str> = reporter.phase("Thermal", || Err("boom"));
        assert_eq!(failed, Err("boom"));
        drop(reporter);

        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::PhaseStart { name: "Lattice" },
                Progress::PhaseFinish,
                Progress::PhaseStart { name: "Thermal" },
            ]
        );
    }
}
