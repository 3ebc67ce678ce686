//! Single-resolution asynchronous values.
//!
//! A [`Loading`] is the receiving end of a load started elsewhere (a worker
//! thread on native targets, a fetch future on the web). The frame loop polls
//! it between frames, so the continuation that consumes the value always runs
//! on the thread that owns the scene.

use crate::error::LoadError;

/// The sending half of a [`Loading`]. Resolving consumes it, so a load
/// settles at most once.
pub struct Resolver<T> {
    sender: oneshot::Sender<Result<T, LoadError>>,
}

impl<T> Resolver<T> {
    /// Delivers the outcome of the load.
    ///
    /// Nothing happens if the [`Loading`] was dropped in the meantime.
    pub fn resolve(self, result: Result<T, LoadError>) {
        if self.sender.send(result).is_err() {
            log::debug!("load finished after its receiver was dropped");
        }
    }
}

/// A value that becomes available once, some frames from now.
pub struct Loading<T> {
    receiver: Option<oneshot::Receiver<Result<T, LoadError>>>,
}

/// Creates a connected resolver and loading value.
pub fn loading_channel<T>() -> (Resolver<T>, Loading<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Resolver { sender },
        Loading {
            receiver: Some(receiver),
        },
    )
}

impl<T> Loading<T> {
    /// A load that already finished with `result`.
    pub fn settled(result: Result<T, LoadError>) -> Self {
        let (resolver, loading) = loading_channel();
        resolver.resolve(result);
        loading
    }

    /// Checks whether the load finished, without blocking.
    ///
    /// Returns the outcome exactly once. Before that, and on every call
    /// after, it returns `None`. A resolver dropped without resolving
    /// yields [`LoadError::Abandoned`].
    pub fn poll(&mut self) -> Option<Result<T, LoadError>> {
        let outcome = match self.receiver.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(oneshot::TryRecvError::Empty) => return None,
            Err(oneshot::TryRecvError::Disconnected) => Err(LoadError::Abandoned),
        };

        self.receiver = None;
        Some(outcome)
    }

    /// Whether the outcome was already handed out by [`poll`](Self::poll).
    pub fn is_settled(&self) -> bool {
        self.receiver.is_none()
    }
}

/// An optional value that is set exactly once and never cleared.
#[derive(Debug)]
pub struct PendingAsset<T> {
    value: Option<T>,
}

impl<T> Default for PendingAsset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PendingAsset<T> {
    /// An empty reference.
    pub fn new() -> Self {
        PendingAsset { value: None }
    }

    /// Stores the value.
    ///
    /// Fails and gives the value back if the reference was already set.
    pub fn settle(&mut self, value: T) -> Result<&mut T, T> {
        if self.value.is_some() {
            return Err(value);
        }
        Ok(self.value.insert(value))
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// Tracks a group of loads and reports when all of them succeeded.
///
/// Failed items never count as loaded, so a group with a failure never
/// completes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadingManager {
    total: usize,
    loaded: usize,
    failed: usize,
    completed: bool,
}

impl LoadingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more item to wait for.
    pub fn item_start(&mut self) {
        self.total += 1;
    }

    /// Records the end of one item.
    ///
    /// Returns `true` exactly once: on the call that makes every registered
    /// item loaded.
    pub fn item_end(&mut self, success: bool) -> bool {
        if success {
            self.loaded += 1;
        } else {
            self.failed += 1;
        }

        if !self.completed && self.total > 0 && self.loaded == self.total {
            self.completed = true;
            return true;
        }
        false
    }

    /// Whether every registered item loaded.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// `(loaded, failed, total)` item counts.
    pub fn progress(&self) -> (usize, usize, usize) {
        (self.loaded, self.failed, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_yields_its_value_once() {
        let (resolver, mut loading) = loading_channel::<u32>();
        assert!(loading.poll().is_none());
        assert!(!loading.is_settled());

        resolver.resolve(Ok(7));
        assert_eq!(loading.poll().unwrap().unwrap(), 7);
        assert!(loading.is_settled());
        assert!(loading.poll().is_none());
    }

    #[test]
    fn dropped_resolvers_abandon_the_load() {
        let (resolver, mut loading) = loading_channel::<u32>();
        drop(resolver);
        assert!(matches!(loading.poll(), Some(Err(LoadError::Abandoned))));
    }

    #[test]
    fn pending_assets_settle_once() {
        let mut asset = PendingAsset::new();
        assert!(!asset.is_present());

        *asset.settle(1).unwrap() += 1;
        assert_eq!(asset.get(), Some(&2));
        assert_eq!(asset.settle(5), Err(5));
        assert_eq!(asset.get(), Some(&2));
    }

    #[test]
    fn manager_completes_after_the_last_success() {
        let mut manager = LoadingManager::new();
        manager.item_start();
        manager.item_start();

        assert!(!manager.item_end(true));
        assert!(!manager.is_complete());
        assert!(manager.item_end(true));
        assert!(manager.is_complete());
        assert_eq!(manager.progress(), (2, 0, 2));
    }

    #[test]
    fn manager_never_completes_after_a_failure() {
        let mut manager = LoadingManager::new();
        manager.item_start();
        manager.item_start();

        assert!(!manager.item_end(false));
        assert!(!manager.item_end(true));
        assert!(!manager.is_complete());
    }
}
