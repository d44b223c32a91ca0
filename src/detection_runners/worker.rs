//! Dedicated detection thread.
//!
//! The session is driven from one OS thread; async callers hand it jobs over a
//! bounded channel and await the answer on a one-shot reply.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::annotate;
use crate::common::{DetectImage, Detection};
use crate::detection_runners::inference_process::InferenceProcess;

#[derive(Debug)]
pub struct DetectJob {
    pub image: DetectImage,
    pub return_image: bool,
    pub reply: oneshot::Sender<anyhow::Result<DetectOutcome>>,
}

#[derive(Debug, Clone, Default)]
pub struct DetectOutcome {
    pub detections: Vec<Detection>,
    /// Model run time, excluding overlay rendering.
    pub elapsed: Duration,
    /// JPEG data URL, present when the job asked for it.
    pub image_b64: Option<String>,
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("detector busy, try again")]
    Busy,
    #[error("detector stopped")]
    Stopped,
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Cloneable handle used by request handlers.
#[derive(Debug, Clone)]
pub struct DetectorHandle {
    job_tx: Sender<DetectJob>,
}

impl DetectorHandle {
    /// Queues `image` without blocking; a full queue yields [`DetectError::Busy`].
    pub async fn detect(&self, image: DetectImage, return_image: bool) -> Result<DetectOutcome, DetectError> {
        let (reply, rx) = oneshot::channel();
        let job = DetectJob { image, return_image, reply };
        match self.job_tx.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => return Err(DetectError::Busy),
            Err(TrySendError::Disconnected(_)) => return Err(DetectError::Stopped),
        }
        match rx.await {
            Ok(outcome) => Ok(outcome?),
            Err(_) => Err(DetectError::Stopped),
        }
    }
}

pub struct DetectionWorker;

impl DetectionWorker {
    /// Moves `detector` onto a new thread accepting up to `queue` pending jobs.
    /// The thread exits once every handle is dropped.
    pub fn spawn<P>(detector: P, queue: usize) -> anyhow::Result<DetectorHandle>
    where
        P: InferenceProcess + 'static,
    {
        let (job_tx, job_rx) = bounded(queue.max(1));
        thread::Builder::new()
            .name("detection".to_string())
            .spawn(move || Self::detection_loop(detector, job_rx))?;
        Ok(DetectorHandle { job_tx })
    }

    fn detection_loop<P: InferenceProcess>(mut detector: P, job_rx: Receiver<DetectJob>) {
        log::info!("Detection worker started");
        for job in job_rx.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                Self::process(&mut detector, &job.image, job.return_image)
            }))
            .unwrap_or_else(|payload| Err(anyhow::anyhow!("detector panicked: {}", panic_message(&*payload))));
            if let Err(err) = &outcome {
                log::error!("Detection failed: {err:#}");
            }
            if job.reply.send(outcome).is_err() {
                log::debug!("Detection caller went away before the reply");
            }
        }
        log::info!("Detection worker stopped");
    }

    fn process<P: InferenceProcess>(detector: &mut P, image: &DetectImage, return_image: bool) -> anyhow::Result<DetectOutcome> {
        let now = Instant::now();
        let detections = crate::run_detection(detector, image)?;
        let elapsed = now.elapsed();
        log::debug!("{} detections", detections.len());

        let image_b64 = if return_image {
            Some(annotate::render_data_url(&image.image, &detections)?)
        } else {
            None
        };

        Ok(DetectOutcome { detections, elapsed, image_b64 })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
