//! Off-thread frame extraction with last-request-wins delivery.
//!
//! Every submission gets a generation number. The worker skips queued jobs that
//! were superseded before it got to them, but a job already in flight runs to
//! completion; its result is dropped by the receiver when its generation is no
//! longer the latest.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, warn};

use crate::media::{Frame, FrameExtractor, MediaError};
use crate::preview::frame_cache::FrameCache;
use crate::preview::resolver::PreviewRequest;

#[derive(Debug)]
struct PreviewJob {
    generation: u64,
    request: PreviewRequest,
}

/// Outcome of one extraction, delivered back to the editing thread.
#[derive(Debug)]
pub struct PreviewResult {
    pub generation: u64,
    pub request: PreviewRequest,
    pub frame: Result<Frame, MediaError>,
}

pub struct PreviewWorker {
    job_tx: Option<Sender<PreviewJob>>,
    result_rx: Receiver<PreviewResult>,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl PreviewWorker {
    /// Start the extraction thread.
    pub fn spawn<E>(extractor: E, cache_capacity: usize) -> std::io::Result<Self>
    where
        E: FrameExtractor + 'static,
    {
        let (job_tx, job_rx) = channel::unbounded();
        let (result_tx, result_rx) = channel::unbounded();

        let handle = thread::Builder::new()
            .name("preview-worker".into())
            .spawn(move || run(extractor, job_rx, result_tx, cache_capacity))?;

        Ok(Self {
            job_tx: Some(job_tx),
            result_rx,
            generation: 0,
            handle: Some(handle),
        })
    }

    /// Queue an extraction and return its generation.
    pub fn submit(&mut self, request: PreviewRequest) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        if let Some(tx) = &self.job_tx {
            if tx.send(PreviewJob { generation, request }).is_err() {
                warn!("preview worker is gone; request dropped");
            }
        }
        generation
    }

    /// Results channel, for use in `select!`.
    pub fn results(&self) -> &Receiver<PreviewResult> {
        &self.result_rx
    }

    /// `true` if `result` answers the most recent submission.
    pub fn is_current(&self, result: &PreviewResult) -> bool {
        result.generation == self.generation
    }

    /// Make every in-flight result stale without submitting anything new.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop
        self.job_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("preview worker panicked");
            }
        }
    }
}

fn run<E: FrameExtractor>(
    extractor: E,
    jobs: Receiver<PreviewJob>,
    results: Sender<PreviewResult>,
    cache_capacity: usize,
) {
    let mut cache = FrameCache::new(cache_capacity);

    while let Ok(mut job) = jobs.recv() {
        while let Ok(newer) = jobs.try_recv() {
            job = newer;
        }

        let request = &job.request;
        let cached = cache.get(&request.source_path, request.source_time).cloned();
        let frame = match cached {
            Some(frame) => Ok(frame),
            None => extract(&extractor, request).map(|frame| {
                cache.insert(frame.clone());
                frame
            }),
        };

        debug!(
            generation = job.generation,
            path = %request.source_path.display(),
            source_time = request.source_time,
            ok = frame.is_ok(),
            "preview extraction finished"
        );

        let result = PreviewResult {
            generation: job.generation,
            request: job.request,
            frame,
        };
        if results.send(result).is_err() {
            break;
        }
    }
    debug!("preview worker exiting");
}

/// Run one extraction. A panicking extractor becomes an error result so the
/// worker keeps serving later requests.
fn extract<E: FrameExtractor>(extractor: &E, request: &PreviewRequest) -> Result<Frame, MediaError> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        extractor.extract_frame(&request.source_path, request.source_time)
    }))
    .unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        warn!(path = %request.source_path.display(), %message, "frame extractor panicked");
        Err(MediaError::ExtractorPanicked(message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::core::time::Seconds;

    #[derive(Default)]
    struct CountingExtractor {
        calls: AtomicUsize,
    }

    impl FrameExtractor for CountingExtractor {
        fn extract_frame(&self, path: &Path, source_time: Seconds) -> Result<Frame, MediaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path.ends_with("missing.mp4") {
                return Err(MediaError::Unavailable(path.to_path_buf()));
            }
            Ok(Frame::new(path, source_time, vec![1, 2, 3]))
        }
    }

    fn request(path: &str, source_time: Seconds) -> PreviewRequest {
        PreviewRequest {
            clip: 1,
            source_path: PathBuf::from(path),
            source_time,
            time_in_clip: source_time,
        }
    }

    #[test]
    fn test_result_delivered() {
        let mut worker = PreviewWorker::spawn(CountingExtractor::default(), 4).unwrap();
        let generation = worker.submit(request("a.mp4", 2.0));

        let result = worker.results().recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.generation, generation);
        assert!(worker.is_current(&result));
        assert_eq!(result.frame.unwrap().source_time, 2.0);
    }

    #[test]
    fn test_extraction_error_reported() {
        let mut worker = PreviewWorker::spawn(CountingExtractor::default(), 4).unwrap();
        worker.submit(request("missing.mp4", 1.0));

        let result = worker.results().recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result.frame, Err(MediaError::Unavailable(_))));
    }

    #[test]
    fn test_superseded_result_is_stale() {
        let mut worker = PreviewWorker::spawn(CountingExtractor::default(), 4).unwrap();
        worker.submit(request("a.mp4", 1.0));
        let latest = worker.submit(request("a.mp4", 2.0));

        // Keep reading until the latest generation arrives; anything earlier is stale
        loop {
            let result = worker.results().recv_timeout(Duration::from_secs(5)).unwrap();
            if result.generation == latest {
                assert!(worker.is_current(&result));
                break;
            }
            assert!(!worker.is_current(&result));
        }
    }

    #[test]
    fn test_invalidate_marks_in_flight_stale() {
        let mut worker = PreviewWorker::spawn(CountingExtractor::default(), 4).unwrap();
        worker.submit(request("a.mp4", 1.0));
        worker.invalidate();

        let result = worker.results().recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!worker.is_current(&result));
    }

    struct FlakyExtractor;

    impl FrameExtractor for FlakyExtractor {
        fn extract_frame(&self, path: &Path, source_time: Seconds) -> Result<Frame, MediaError> {
            if path.ends_with("corrupt.mp4") {
                panic!("decoder blew up on {}", path.display());
            }
            Ok(Frame::new(path, source_time, vec![7]))
        }
    }

    #[test]
    fn test_extractor_panic_becomes_error_and_worker_survives() {
        let mut worker = PreviewWorker::spawn(FlakyExtractor, 4).unwrap();

        worker.submit(request("corrupt.mp4", 1.0));
        let result = worker.results().recv_timeout(Duration::from_secs(5)).unwrap();
        match result.frame {
            Err(MediaError::ExtractorPanicked(message)) => assert!(message.contains("corrupt.mp4")),
            other => panic!("expected a panic error, got {other:?}"),
        }

        worker.submit(request("a.mp4", 2.0));
        let result = worker.results().recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.frame.unwrap().source_time, 2.0);
    }

    #[test]
    fn test_cache_hit_skips_extractor() {
        let extractor = Arc::new(CountingExtractor::default());
        let mut worker = PreviewWorker::spawn(Arc::clone(&extractor), 4).unwrap();

        worker.submit(request("a.mp4", 3.0));
        worker.results().recv_timeout(Duration::from_secs(5)).unwrap();
        worker.submit(request("a.mp4", 3.0));
        let result = worker.results().recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(result.frame.is_ok());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }
}
