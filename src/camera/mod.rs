//! Scoped access to a capture device.
//!
//! A [`CameraSession`] owns an exclusive [`MediaStream`] and stops it exactly
//! once: after a capture, on [`CameraSession::cancel`], or when dropped.

mod command;

use anyhow::{Result, bail};
use bytes::Bytes;
use std::future::Future;
use tracing::debug;

use crate::session::ImageSource;

pub use command::CommandStream;

/// An exclusive handle to a capture device.
pub trait MediaStream: Send {
    /// Reads one encoded frame from the device.
    fn read_frame(&mut self) -> impl Future<Output = Result<Bytes>> + Send;

    /// Stops every track of the stream and releases the device.
    fn stop(&mut self);

    /// Label used as the display URL of captured frames.
    fn label(&self) -> String;
}

/// Holds a media stream until it is captured from, cancelled or dropped.
pub struct CameraSession<M: MediaStream> {
    stream: Option<M>,
}

impl<M: MediaStream> CameraSession<M> {
    pub fn acquire(stream: M) -> Self {
        debug!(label = %stream.label(), "camera stream acquired");
        Self {
            stream: Some(stream),
        }
    }

    pub const fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Captures one frame and releases the stream, whether or not the read succeeded.
    pub async fn capture(&mut self) -> Result<ImageSource> {
        let Some(stream) = self.stream.as_mut() else {
            bail!("Camera stream was already released");
        };

        let label = stream.label();
        let frame = stream.read_frame().await;
        self.release();

        Ok(ImageSource::from_capture(frame?, &label)?)
    }

    pub fn cancel(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!(label = %stream.label(), "camera stream released");
        }
    }
}

impl<M: MediaStream> Drop for CameraSession<M> {
    fn drop(&mut self) {
        self.release();
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fake::FakeStream;
    use super::*;
    use crate::session::SourceKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_capture_releases_stream_once() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut camera = CameraSession::acquire(FakeStream::jpeg(&stops));

        let image = camera.capture().await.unwrap();

        assert_eq!(image.kind(), SourceKind::Camera);
        assert_eq!(image.mime_type(), "image/jpeg");
        assert!(!camera.is_active());
        drop(camera);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_capture_still_releases() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut camera = CameraSession::acquire(FakeStream::broken(&stops));

        let err = camera.capture().await.unwrap_err();

        assert!(err.to_string().contains("device disconnected"));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_capture_after_release_fails() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut camera = CameraSession::acquire(FakeStream::jpeg(&stops));
        camera.cancel();

        assert!(camera.capture().await.is_err());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut camera = CameraSession::acquire(FakeStream::jpeg(&stops));

        camera.cancel();
        camera.cancel();
        drop(camera);

        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_stream() {
        let stops = Arc::new(AtomicUsize::new(0));
        {
            let _camera = CameraSession::acquire(FakeStream::jpeg(&stops));
        }
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
