#[cfg(test)]
mod tests {
    use crate::engine::SweepSummary;
    use crate::poller::{start_reminder_polling, SweepTask};
    use shabbat_common::services::BoxFuture;
    use shabbat_common::ShabbatError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSweep {
        runs: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        work: Duration,
    }

    impl CountingSweep {
        fn taking(work: Duration) -> Arc<Self> {
            Arc::new(Self {
                work,
                ..Self::default()
            })
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    impl SweepTask for CountingSweep {
        fn run_sweep(&self) -> BoxFuture<'_, SweepSummary, ShabbatError> {
            Box::pin(async move {
                let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(running, Ordering::SeqCst);
                if !self.work.is_zero() {
                    tokio::time::sleep(self.work).await;
                }
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                self.runs.fetch_add(1, Ordering::SeqCst);
                Ok(SweepSummary::default())
            })
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_once_per_interval() {
        let sweep = CountingSweep::taking(Duration::ZERO);
        let handle = start_reminder_polling(sweep.clone(), Duration::from_secs(60));

        settle().await;
        assert_eq!(sweep.runs(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(sweep.runs(), 2);

        tokio::time::sleep(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(sweep.runs(), 4);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_future_ticks() {
        let sweep = CountingSweep::taking(Duration::ZERO);
        let handle = start_reminder_polling(sweep.clone(), Duration::from_secs(60));
        settle().await;

        handle.stop();
        settle().await;
        assert!(handle.is_finished());

        tokio::time::sleep(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(sweep.runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_sweeps_never_overlap() {
        // each sweep outlasts two intervals
        let sweep = CountingSweep::taking(Duration::from_secs(150));
        let handle = start_reminder_polling(sweep.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(1_000)).await;
        settle().await;
        assert_eq!(sweep.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(sweep.runs() >= 4);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_the_running_sweep_finish() {
        let sweep = CountingSweep::taking(Duration::from_secs(30));
        let handle = start_reminder_polling(sweep.clone(), Duration::from_secs(60));
        settle().await;
        assert_eq!(sweep.in_flight.load(Ordering::SeqCst), 1);

        handle.shutdown().await;
        assert_eq!(sweep.runs(), 1);
        assert_eq!(sweep.in_flight.load(Ordering::SeqCst), 0);
    }
}
