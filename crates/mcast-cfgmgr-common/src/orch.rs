//! Base Orch trait.

use async_trait::async_trait;

/// Base trait for serialized task processors.
///
/// A manager implements this trait to participate in the daemon event
/// loop. Work is queued by the daemon and drained by `do_task()` one item
/// at a time, so no two tasks for the same manager ever run concurrently.
///
/// # Lifecycle
///
/// 1. Construction: manager is created with its datastore
/// 2. Queueing: the daemon pushes requests onto the manager
/// 3. Event Loop: `do_task()` is called while `has_pending_tasks()` holds
/// 4. Shutdown: manager is dropped
#[async_trait]
pub trait Orch: Send + Sync {
    /// Returns the name of this Orch (for logging and debugging).
    fn name(&self) -> &str;

    /// Processes pending tasks.
    ///
    /// Implementations should drain their queue in FIFO order and run
    /// each task to completion before starting the next.
    async fn do_task(&mut self);

    /// Returns true if this Orch has pending work.
    ///
    /// Used by the daemon to determine if `do_task()` should be called.
    fn has_pending_tasks(&self) -> bool {
        false
    }

    /// Dumps pending tasks for debugging.
    ///
    /// Returns a list of human-readable strings describing pending work.
    fn dump_pending_tasks(&self) -> Vec<String> {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestOrch {
        name: String,
        queue: Vec<String>,
        done: Vec<String>,
    }

    #[async_trait]
    impl Orch for TestOrch {
        fn name(&self) -> &str {
            &self.name
        }

        async fn do_task(&mut self) {
            let drained: Vec<String> = self.queue.drain(..).collect();
            self.done.extend(drained);
        }

        fn has_pending_tasks(&self) -> bool {
            !self.queue.is_empty()
        }

        fn dump_pending_tasks(&self) -> Vec<String> {
            self.queue.clone()
        }
    }

    #[tokio::test]
    async fn test_orch_trait() {
        let mut orch = TestOrch {
            name: "test".to_string(),
            queue: vec!["a".to_string(), "b".to_string()],
            done: vec![],
        };

        assert_eq!(orch.name(), "test");
        assert!(orch.has_pending_tasks());
        assert_eq!(orch.dump_pending_tasks(), vec!["a", "b"]);

        orch.do_task().await;
        assert!(!orch.has_pending_tasks());
        assert_eq!(orch.done, vec!["a", "b"]);
    }
}
