use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::AssetError;

/// A load running on a background thread, delivered back through a channel.
///
/// [`Pending::poll`] yields the result at most once; after that the pending
/// value is spent and every later poll returns `None`.
#[derive(Debug)]
pub struct Pending<T> {
    label: String,
    receiver: Option<Receiver<Result<T, AssetError>>>,
}

impl<T: Send + 'static> Pending<T> {
    /// Run `load` on a named worker thread.
    pub fn spawn<F>(label: impl Into<String>, load: F) -> Self
    where
        F: FnOnce() -> Result<T, AssetError> + Send + 'static,
    {
        let label = label.into();
        let (tx, rx) = mpsc::channel();
        let fallback = tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("load:{label}"))
            .spawn(move || {
                // The receiver may have been dropped during shutdown.
                let _ = tx.send(load());
            });
        if let Err(e) = spawned {
            tracing::error!(%label, "failed to start loader thread: {e}");
            let _ = fallback.send(Err(AssetError::Io(e)));
        }

        Self {
            label,
            receiver: Some(rx),
        }
    }
}

impl<T> Pending<T> {
    /// A pending value whose result is already known. Useful for headless runs.
    pub fn ready(label: impl Into<String>, result: Result<T, AssetError>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self {
            label: label.into(),
            receiver: Some(rx),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// True once the result has been handed out.
    pub fn is_done(&self) -> bool {
        self.receiver.is_none()
    }

    /// Non-blocking check for the result.
    pub fn poll(&mut self) -> Option<Result<T, AssetError>> {
        let rx = self.receiver.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.receiver = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                Some(Err(AssetError::Disconnected(self.label.clone())))
            }
        }
    }

    /// Block until the result arrives.
    pub fn wait(&mut self) -> Option<Result<T, AssetError>> {
        let rx = self.receiver.take()?;
        Some(
            rx.recv()
                .unwrap_or_else(|_| Err(AssetError::Disconnected(self.label.clone()))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_result_is_delivered_once() {
        let mut pending = Pending::spawn("answer", || Ok(42));
        assert_eq!(pending.wait().unwrap().unwrap(), 42);
        assert!(pending.is_done());
        assert!(pending.poll().is_none());
        assert!(pending.wait().is_none());
    }

    #[test]
    fn poll_eventually_yields() {
        let mut pending = Pending::spawn("slow", || {
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok("done")
        });
        let mut result = None;
        for _ in 0..1000 {
            if let Some(r) = pending.poll() {
                result = Some(r);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert_eq!(result.unwrap().unwrap(), "done");
        assert!(pending.poll().is_none());
    }

    #[test]
    fn errors_are_forwarded() {
        let mut pending: Pending<()> =
            Pending::spawn("missing", || Err(AssetError::ObjectNotFound("baked".into())));
        let err = pending.wait().unwrap().unwrap_err();
        assert!(matches!(err, AssetError::ObjectNotFound(_)));
    }

    #[test]
    fn panicking_loader_reports_disconnect() {
        let mut pending: Pending<()> = Pending::spawn("boom", || panic!("loader failed"));
        let err = pending.wait().unwrap().unwrap_err();
        assert!(matches!(err, AssetError::Disconnected(label) if label == "boom"));
    }

    #[test]
    fn ready_is_immediately_available() {
        let mut pending = Pending::ready("now", Ok(7u8));
        assert_eq!(pending.label(), "now");
        assert!(!pending.is_done());
        assert_eq!(pending.poll().unwrap().unwrap(), 7);
        assert!(pending.is_done());
    }
}
