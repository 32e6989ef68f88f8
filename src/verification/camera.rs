//! Camera device abstraction and the scoped stream lease.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ResourceError;

/// A device that can open a video stream.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Open a stream. Fails when permission is denied or no device exists.
    async fn open(&self) -> Result<Box<dyn CameraStream>, ResourceError>;
}

/// An open video stream.
#[async_trait]
pub trait CameraStream: Send {
    /// Grab the current frame, JPEG-encoded.
    async fn capture_frame(&mut self) -> Result<Vec<u8>, ResourceError>;

    /// Stop every track of the stream. Called exactly once.
    fn stop(&mut self);
}

/// Exclusive hold on an open stream. Dropping the lease stops the stream.
pub struct CameraLease {
    stream: Option<Box<dyn CameraStream>>,
}

impl CameraLease {
    pub async fn acquire(device: &dyn CameraDevice) -> Result<Self, ResourceError> {
        let stream = device.open().await?;
        debug!("Camera stream acquired");
        Ok(Self {
            stream: Some(stream),
        })
    }

    pub async fn capture(&mut self) -> Result<Vec<u8>, ResourceError> {
        match self.stream.as_mut() {
            Some(stream) => stream.capture_frame().await,
            None => Err(ResourceError::NotReady),
        }
    }

    /// Stop the stream now rather than at drop.
    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Camera stream released");
        }
    }
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CameraLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraLease")
            .field("active", &self.stream.is_some())
            .finish()
    }
}

/// Stand-in for hosts without a camera.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCamera;

#[async_trait]
impl CameraDevice for UnavailableCamera {
    async fn open(&self) -> Result<Box<dyn CameraStream>, ResourceError> {
        Err(ResourceError::Unavailable("no camera attached".to_string()))
    }
}
