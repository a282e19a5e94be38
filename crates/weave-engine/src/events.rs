/// Lifecycle events an execution emits, for observability hookups
/// (dashboards, audit logs). Includes `Suspended`/`Cancelled` alongside
/// the usual started/completed/failed triad, matching the engine's full
/// state machine (§4.4).
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
  ExecutionStarted {
    execution_id: String,
    workflow_id: String,
  },
  NodeStarted {
    execution_id: String,
    node_id: String,
  },
  NodeCompleted {
    execution_id: String,
    node_id: String,
    success: bool,
  },
  ExecutionCompleted {
    execution_id: String,
  },
  ExecutionFailed {
    execution_id: String,
    error: String,
  },
  ExecutionSuspended {
    execution_id: String,
    continuation_id: String,
  },
  ExecutionCancelled {
    execution_id: String,
  },
}

/// Observer hook the engine calls at each lifecycle point. `notify` is
/// synchronous and must not block — implementations that need to do I/O
/// should forward onto a channel, as `ChannelNotifier` does.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Default notifier: discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Forwards events onto an unbounded channel so a caller can observe a
/// running execution without the engine blocking on a slow subscriber.
#[derive(Clone)]
pub struct ChannelNotifier {
  sender: tokio::sync::mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<ExecutionEvent>) {
    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    (Self { sender }, receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // A closed receiver just means nobody is listening; dropping the
    // event is the correct behavior, not a reportable error.
    let _ = self.sender.send(event);
  }
}

