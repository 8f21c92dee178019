use crate::error::AppResult;
use crate::session::{Task, TaskContext, TaskOutput};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// Message sent back by a spawned task
#[derive(Debug)]
pub enum TaskEvent {
    Finished {
        label: String,
        result: AppResult<TaskOutput>,
    },
}

struct InFlight {
    label: String,
    cancel: CancellationToken,
}

/// Runs at most one [`Task`] at a time off the UI loop
pub struct Worker {
    ctx: TaskContext,
    tx: UnboundedSender<TaskEvent>,
    rx: UnboundedReceiver<TaskEvent>,
    in_flight: Option<InFlight>,
}

impl Worker {
    pub fn new(ctx: TaskContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            tx,
            rx,
            in_flight: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Label of the running task
    pub fn current_label(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|f| f.label.as_str())
    }

    /// Start `task`. Returns false, without starting anything, when busy.
    pub fn spawn(&mut self, task: Task) -> bool {
        if self.is_busy() {
            log::debug!("ignoring '{}' while '{}' runs", task.label(), self.current_label().unwrap_or(""));
            return false;
        }

        let label = task.label();
        let cancel = CancellationToken::new();
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        let token = cancel.clone();
        let task_label = label.clone();

        tokio::spawn(async move {
            let result = task.execute(&ctx, &token).await;
            if let Err(ref e) = result {
                log::warn!("{} failed: {}", task_label, e);
            }
            // Receiver only goes away on shutdown
            let _ = tx.send(TaskEvent::Finished {
                label: task_label,
                result,
            });
        });

        log::debug!("started '{}'", label);
        self.in_flight = Some(InFlight { label, cancel });
        true
    }

    /// Ask the running task to stop. Its `Finished` event still arrives.
    pub fn cancel(&self) -> bool {
        match self.in_flight {
            Some(ref flight) => {
                log::info!("cancelling '{}'", flight.label);
                flight.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Next finished task, if any, without waiting
    pub fn try_recv(&mut self) -> Option<TaskEvent> {
        let event = self.rx.try_recv().ok()?;
        self.in_flight = None;
        Some(event)
    }

    /// Wait for the running task to finish
    pub async fn recv(&mut self) -> Option<TaskEvent> {
        let event = self.rx.recv().await?;
        self.in_flight = None;
        Some(event)
    }
}
