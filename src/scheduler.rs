//! The Scheduler: a bounded-parallelism driver that dispatches a
//! phase's tasks without unbounded thread fan-out, built on
//! `scoped_threadpool::Pool` with the pool size fixed to the engine-wide
//! concurrency budget `P`.

use std::sync::Mutex;

use scoped_threadpool::Pool;

use crate::error::EngineError;

pub struct Scheduler {
    pool: Pool,
}

impl Scheduler {
    pub fn new(p: usize) -> Scheduler {
        Scheduler {
            pool: Pool::new(p.max(1) as u32),
        }
    }

    /// Dispatches every item in `tasks` to `f`, running up to `P` of them
    /// concurrently, and blocks until the whole phase has completed.
    /// Every task runs even after one fails; the first error encountered
    /// is returned.
    pub fn run_phase<T, F>(&mut self, tasks: Vec<T>, f: F) -> Result<(), EngineError>
    where
        T: Send,
        F: Fn(T) -> Result<(), EngineError> + Sync,
    {
        let errors: Mutex<Vec<EngineError>> = Mutex::new(Vec::new());
        let f = &f;
        let errors_ref = &errors;

        self.pool.scoped(|scope| {
            for task in tasks {
                scope.execute(move || {
                    if let Err(e) = f(task) {
                        errors_ref.lock().unwrap().push(e);
                    }
                });
            }
        });

        let mut errs = errors.into_inner().unwrap();
        if errs.is_empty() {
            Ok(())
        } else {
            Err(errs.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_all_tasks_and_reports_first_error() {
        let mut sched = Scheduler::new(2);
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = ran.clone();
        let result = sched.run_phase(vec![1, 2, 3, 4], move |n| {
            ran2.fetch_add(1, Ordering::SeqCst);
            if n == 3 {
                Err(EngineError::Split("boom".into()))
            } else {
                Ok(())
            }
        });
        assert_eq!(ran.load(Ordering::SeqCst), 4);
        assert!(result.is_err());
    }

    #[test]
    fn never_exceeds_concurrency_cap() {
        let mut sched = Scheduler::new(2);
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));
        let a1 = active.clone();
        let m1 = max_active.clone();
        sched
            .run_phase((0..10).collect(), move |_| {
                let now = a1.fetch_add(1, Ordering::SeqCst) + 1;
                m1.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(5));
                a1.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert!(max_active.load(Ordering::SeqCst) <= 2);
    }
}
