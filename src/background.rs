//! Running a scan on a worker thread while another thread watches progress.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::error::FilterResult;
use crate::image_arithmetic::ChannelSink;
use crate::laplace::LaplaceFilter;
use crate::options::CancellationToken;

/// A scan running on its own thread.
pub struct FilterJob {
    progress: Receiver<f32>,
    cancellation: CancellationToken,
    handle: JoinHandle<FilterResult<Vec<u8>>>,
}

impl FilterJob {
    /// Progress values in row order; the channel closes when the scan ends.
    pub fn progress(&self) -> &Receiver<f32> {
        &self.progress
    }

    /// Asks the scan to stop before its next row.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Waits for the scan; a panic on the worker is resumed here.
    pub fn join(self) -> FilterResult<Vec<u8>> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Moves `source` to a new thread and filters it there.
///
/// A cancellation token already attached to `filter` is reused, otherwise a
/// fresh one is attached so that [`FilterJob::cancel`] always works.
pub fn run_in_background(
    filter: LaplaceFilter, source: Vec<u8>, width: u32, height: u32,
) -> FilterResult<FilterJob> {
    let cancellation = filter.cancellation().cloned().unwrap_or_default();
    let filter = filter.with_cancellation(cancellation.clone());
    let (sender, progress) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("laplace-scan".to_string())
        .spawn(move || filter.apply(&source, width, height, ChannelSink(sender)))?;
    return Ok(FilterJob { progress, cancellation, handle });
}

/// Decides which progress values are worth showing, one per `step` crossed.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    step: f32,
    last_bucket: Option<u32>,
}

impl ProgressThrottle {
    pub fn new(step: f32) -> Self {
        return Self { step: step.max(f32::EPSILON), last_bucket: None };
    }

    pub fn should_report(&mut self, progress: f32) -> bool {
        let bucket = (progress / self.step).floor() as u32;
        let crossed = match self.last_bucket {
            Some(last) => bucket > last,
            None => true,
        };
        if crossed {
            self.last_bucket = Some(bucket);
        }
        return crossed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::image_arithmetic::{IDENTITY_KERNEL, STRAIGHT_LAPLACE_KERNEL};

    #[test]
    fn background_job_matches_direct_call() {
        let source: Vec<u8> = (0..9 * 7 * 4).map(|i| (i * 31 % 256) as u8).collect();
        let direct =
            LaplaceFilter::new(STRAIGHT_LAPLACE_KERNEL).apply(&source, 9, 7, |_: f32| {}).unwrap();

        let job = run_in_background(LaplaceFilter::new(STRAIGHT_LAPLACE_KERNEL), source, 9, 7)
            .unwrap();
        let progress: Vec<f32> = job.progress().iter().collect();
        assert_eq!(progress.len(), 5);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(job.join().unwrap(), direct);
    }

    #[test]
    fn cancelled_job_reports_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let filter = LaplaceFilter::new(IDENTITY_KERNEL).with_cancellation(token);
        let job = run_in_background(filter, vec![0; 5 * 5 * 4], 5, 5).unwrap();
        assert!(matches!(job.join(), Err(FilterError::Cancelled { rows_done: 0 })));
    }

    #[test]
    fn running_job_stops_after_cancel() {
        let (width, height) = (400, 3000);
        let job = run_in_background(
            LaplaceFilter::new(STRAIGHT_LAPLACE_KERNEL),
            vec![90; (width * height * 4) as usize],
            width,
            height,
        )
        .unwrap();
        let first = job.progress().recv().unwrap();
        assert!(first > 0.0);
        job.cancel();

        match job.join() {
            Err(FilterError::Cancelled { rows_done }) => {
                assert!(rows_done >= 1);
                assert!(rows_done < (height - 2) as usize);
            }
            other => panic!("expected cancellation, got {:?}", other.map(|out| out.len())),
        }
    }

    #[test]
    fn invalid_input_surfaces_from_join() {
        let job = run_in_background(LaplaceFilter::new(IDENTITY_KERNEL), vec![0; 7], 5, 5).unwrap();
        assert!(matches!(job.join(), Err(FilterError::BufferSizeMismatch { .. })));
    }

    #[test]
    fn throttle_reports_each_step_once() {
        let mut throttle = ProgressThrottle::new(0.1);
        let reported: Vec<f32> = [0.0, 0.02, 0.1, 0.15, 0.35, 0.36, 1.0]
            .into_iter()
            .filter(|&p| throttle.should_report(p))
            .collect();
        assert_eq!(reported, vec![0.0, 0.1, 0.35, 1.0]);
    }
}
