//! # Frame Hand-off
//!
//! Double-buffered delivery of completed frames from the generator to the
//! transmission side.
//!
//! The generator owns the "next" frame exclusively while it is being filled.
//! Only when a frame is complete is it wrapped in an `Arc` and sent through a
//! bounded channel; from then on it is immutable and any number of readers
//! (e.g. per-connection sender threads) can hold the same snapshot.
//!
//! ## Threading Model
//!
//! - **Generator thread**: `FramePublisher::publish` blocks while the channel is
//!   full, so a slow consumer throttles frame production instead of queuing
//!   unbounded work
//! - **Consumer thread**: `FrameSubscriber::recv` / `refresh` advance the
//!   "current" snapshot; `current()` hands out cheap clones of it
//!
//! A channel depth of 0 makes every publish a rendezvous with the consumer.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use crate::core::frame::VectorFrame;
use crate::error::{BeamError, BeamResult};

/// Create a connected publisher/subscriber pair with `depth` frames of buffering.
pub fn handoff(depth: usize) -> (FramePublisher, FrameSubscriber) {
    let (tx, rx) = bounded(depth);
    (
        FramePublisher { tx },
        FrameSubscriber { rx, current: None },
    )
}

/// Write side of the hand-off. Cloneable.
#[derive(Clone, Debug)]
pub struct FramePublisher {
    tx: Sender<Arc<VectorFrame>>,
}

impl FramePublisher {
    /// Publish a completed frame, blocking until the consumer has room for it.
    pub fn publish(&self, frame: Arc<VectorFrame>) -> BeamResult<()> {
        self.tx
            .send(frame)
            .map_err(|_| BeamError::handoff("subscriber disconnected"))
    }

    /// Publish without blocking. Returns the frame back if the channel is full.
    pub fn try_publish(&self, frame: Arc<VectorFrame>) -> BeamResult<Option<Arc<VectorFrame>>> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(None),
            Err(TrySendError::Full(frame)) => Ok(Some(frame)),
            Err(TrySendError::Disconnected(_)) => {
                Err(BeamError::handoff("subscriber disconnected"))
            }
        }
    }

    /// Number of frames waiting for the consumer.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// Read side of the hand-off.
#[derive(Debug)]
pub struct FrameSubscriber {
    rx: Receiver<Arc<VectorFrame>>,
    current: Option<Arc<VectorFrame>>,
}

impl FrameSubscriber {
    /// Block until the next frame arrives and make it current.
    pub fn recv(&mut self) -> BeamResult<Arc<VectorFrame>> {
        let frame = self
            .rx
            .recv()
            .map_err(|_| BeamError::handoff("publisher disconnected"))?;
        self.current = Some(Arc::clone(&frame));
        Ok(frame)
    }

    /// Like [`recv`](Self::recv) but gives up after `timeout`, returning `None`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> BeamResult<Option<Arc<VectorFrame>>> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => {
                self.current = Some(Arc::clone(&frame));
                Ok(Some(frame))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(BeamError::handoff("publisher disconnected"))
            }
        }
    }

    /// Drain everything pending and keep only the newest frame as current.
    /// Returns how many frames were drained.
    pub fn refresh(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(frame) = self.rx.try_recv() {
            self.current = Some(frame);
            drained += 1;
        }
        drained
    }

    /// The latest completed frame, if any has arrived.
    pub fn current(&self) -> Option<Arc<VectorFrame>> {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sample::Sample;
    use crate::path::FrameReport;

    fn frame(tag: u8) -> Arc<VectorFrame> {
        Arc::new(VectorFrame {
            samples: vec![Sample::on(tag, tag)],
            width: 1,
            height: 1,
            pts_ns: None,
            report: FrameReport::default(),
        })
    }

    #[test]
    fn test_refresh_keeps_newest() {
        let (publisher, mut subscriber) = handoff(4);
        for tag in 1..=3 {
            publisher.publish(frame(tag)).unwrap();
        }
        assert_eq!(subscriber.refresh(), 3);
        assert_eq!(subscriber.current().unwrap().samples[0].x, 3);
    }

    #[test]
    fn test_try_publish_returns_frame_when_full() {
        let (publisher, mut subscriber) = handoff(1);
        assert!(publisher.try_publish(frame(1)).unwrap().is_none());
        let back = publisher.try_publish(frame(2)).unwrap();
        assert_eq!(back.unwrap().samples[0].x, 2);
        assert_eq!(publisher.pending(), 1);

        assert_eq!(subscriber.recv().unwrap().samples[0].x, 1);
    }

    #[test]
    fn test_readers_share_snapshot() {
        let (publisher, mut subscriber) = handoff(1);
        publisher.publish(frame(7)).unwrap();
        subscriber.recv().unwrap();

        let a = subscriber.current().unwrap();
        let b = subscriber.current().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_disconnect_is_reported() {
        let (publisher, subscriber) = handoff(1);
        drop(subscriber);
        assert_eq!(publisher.publish(frame(1)).unwrap_err().category(), "handoff");

        let (publisher, mut subscriber) = handoff(1);
        drop(publisher);
        assert!(subscriber.recv().is_err());
        assert!(subscriber.recv_timeout(Duration::from_millis(1)).is_err());
    }

    #[test]
    fn test_rendezvous_across_threads() {
        let (publisher, mut subscriber) = handoff(0);
        let producer = std::thread::spawn(move || {
            for tag in 0..5 {
                publisher.publish(frame(tag)).unwrap();
            }
        });
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(subscriber.recv().unwrap().samples[0].x);
        }
        producer.join().unwrap();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }
}
