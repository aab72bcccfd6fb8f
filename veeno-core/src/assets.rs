/// One-shot handles for assets that resolve after scene setup
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::task::Poll;

use crate::error::{Error, Result};

/// Receiving half of a pending asset.
///
/// `poll` yields `Poll::Ready` exactly once; afterwards the handle stays
/// `Pending` forever.
#[derive(Debug)]
pub struct Loading<T> {
    name: &'static str,
    receiver: Option<Receiver<Result<T>>>,
}

/// Sending half, moved to whoever produces the asset
#[derive(Debug)]
pub struct Resolver<T> {
    sender: Sender<Result<T>>,
}

impl<T> Loading<T> {
    /// A pending handle and the resolver that completes it
    pub fn pending(name: &'static str) -> (Self, Resolver<T>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                name,
                receiver: Some(receiver),
            },
            Resolver { sender },
        )
    }

    /// A handle that is already resolved
    pub fn ready(name: &'static str, value: Result<T>) -> Self {
        let (loading, resolver) = Self::pending(name);
        resolver.resolve(value);
        loading
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the result has already been taken
    pub fn is_finished(&self) -> bool {
        self.receiver.is_none()
    }

    pub fn poll(&mut self) -> Poll<Result<T>> {
        let Some(receiver) = &self.receiver else {
            return Poll::Pending;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return Poll::Pending,
            Err(TryRecvError::Disconnected) => Err(Error::AssetDropped(self.name)),
        };
        self.receiver = None;
        Poll::Ready(result)
    }
}

impl<T> Resolver<T> {
    /// Complete the paired handle. A handle that was already dropped is
    /// ignored.
    pub fn resolve(self, value: Result<T>) {
        let _ = self.sender.send(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_pending_until_resolved() {
        let (mut loading, resolver) = Loading::<u32>::pending("number");
        assert!(loading.poll().is_pending());
        resolver.resolve(Ok(7));
        assert!(matches!(loading.poll(), Poll::Ready(Ok(7))));
        assert!(loading.is_finished());
        assert!(loading.poll().is_pending());
    }

    #[test]
    fn test_dropped_resolver_reports_error() {
        let (mut loading, resolver) = Loading::<u32>::pending("font");
        drop(resolver);
        assert!(matches!(loading.poll(), Poll::Ready(Err(Error::AssetDropped("font")))));
    }

    #[test]
    fn test_resolves_from_another_thread() {
        let (mut loading, resolver) = Loading::<String>::pending("text");
        thread::spawn(move || resolver.resolve(Ok("done".to_string())))
            .join()
            .unwrap();
        match loading.poll() {
            Poll::Ready(Ok(value)) => assert_eq!(value, "done"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ready_handle() {
        let mut loading = Loading::ready("value", Ok(1u8));
        assert_eq!(loading.name(), "value");
        assert!(matches!(loading.poll(), Poll::Ready(Ok(1))));
    }
}
