use super::error::EngineError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
            cancel_flag: None,
        }
    }

    /// Attaches a flag that another thread may set to abort the running computation.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// A reporter without a callback that still observes this reporter's cancel flag.
    pub fn silent(&self) -> ProgressReporter<'static> {
        ProgressReporter {
            callback: None,
            cancel_flag: self.cancel_flag.clone(),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn check_cancelled(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
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
        assert!(!reporter.is_cancelled());
        assert!(reporter.check_cancelled().is_ok());
    }

    #[test]
    fn callback_receives_every_event_in_order() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(format!("{event:?}"));
        }));

        reporter.report(Progress::TaskStart { total_steps: 2 });
        reporter.report(Progress::TaskIncrement);
        reporter.report(Progress::TaskFinish);
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(
            events,
            vec!["TaskStart { total_steps: 2 }", "TaskIncrement", "TaskFinish"]
        );
    }

    #[test]
    fn cancel_flag_is_observed_by_reporter_and_its_silent_copy() {
        let flag = Arc::new(AtomicBool::new(false));
        let reporter = ProgressReporter::new().with_cancel_flag(flag.clone());
        let silent = reporter.silent();
        assert!(!silent.is_cancelled());

        flag.store(true, Ordering::Relaxed);

        assert!(reporter.is_cancelled());
        assert!(matches!(
            silent.check_cancelled(),
            Err(EngineError::Cancelled)
        ));
    }

    #[test]
    fn silent_copy_does_not_forward_events() {
        let count = Mutex::new(0usize);
        let reporter = ProgressReporter::with_callback(Box::new(|_| {
            *count.lock().unwrap() += 1;
        }));
        reporter.silent().report(Progress::TaskIncrement);
        reporter.report(Progress::TaskIncrement);
        drop(reporter);
        assert_eq!(count.into_inner().unwrap(), 1);
    }
}
