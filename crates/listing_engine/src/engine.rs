use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use listing_logging::listing_warn;

use crate::service::{RemoteService, ReqwestService, ServiceSettings};
use crate::{ServiceCall, ServiceError, ServiceEvent, ServiceOutcome};

/// Runs service calls on a background tokio runtime and reports completions.
///
/// Calls run concurrently and complete in any order; each completion carries
/// the id of the call it answers. There is no cancellation: a call that has
/// been enqueued runs to success or failure.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<ServiceCall>,
    event_rx: Mutex<Option<mpsc::Receiver<ServiceEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let service = ReqwestService::new(settings)?;
        Self::with_service(Arc::new(service))
            .map_err(|err| ServiceError::new(crate::FailureKind::Network, err.to_string()))
    }

    pub fn with_service(service: Arc<dyn RemoteService>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<ServiceCall>();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(call) = cmd_rx.recv() {
                let service = service.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let id = call.id();
                    let outcome = execute(service.as_ref(), call).await;
                    let _ = event_tx.send(ServiceEvent::Completed { id, outcome });
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(Some(event_rx)),
        })
    }

    pub fn enqueue(&self, call: ServiceCall) {
        if self.cmd_tx.send(call).is_err() {
            listing_warn!("Engine worker is gone; call dropped");
        }
    }

    pub fn try_recv(&self) -> Option<ServiceEvent> {
        self.event_rx.lock().ok()?.as_ref()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ServiceEvent> {
        self.event_rx.lock().ok()?.as_ref()?.recv_timeout(timeout).ok()
    }

    /// Hands the completion stream to a dedicated consumer. Afterwards
    /// `try_recv` and `recv_timeout` always return `None`. The stream
    /// disconnects once this handle is dropped and in-flight calls finish.
    pub fn take_events(&self) -> Option<mpsc::Receiver<ServiceEvent>> {
        self.event_rx.lock().ok()?.take()
    }
}

async fn execute(service: &dyn RemoteService, call: ServiceCall) -> ServiceOutcome {
    let outcome = match &call {
        ServiceCall::AskSuggestion { url, body, .. } => {
            ServiceOutcome::Suggestion(service.ask_suggestion(url, body).await)
        }
        ServiceCall::Submit { url, body, .. } => {
            ServiceOutcome::Submitted(service.submit(url, body).await)
        }
        ServiceCall::Decline { url, body, .. } => {
            ServiceOutcome::Declined(service.decline(url, body).await)
        }
        ServiceCall::History { url, body, .. } => {
            ServiceOutcome::History(service.history(url, body).await)
        }
    };
    if let Some(err) = outcome.error() {
        listing_warn!("Call {} failed: {}", call.id(), err);
    }
    outcome
}

impl ServiceOutcome {
    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            ServiceOutcome::Suggestion(Err(err))
            | ServiceOutcome::Submitted(Err(err))
            | ServiceOutcome::Declined(Err(err))
            | ServiceOutcome::History(Err(err)) => Some(err),
            _ => None,
        }
    }
}
