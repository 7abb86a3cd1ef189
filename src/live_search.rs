//! Search-as-you-type: input changes go through a [`SearchTrigger`] and the searches it fires
//! are sent to a [`SearchBackend`], at most one at a time.

use std::sync::Arc;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    domain::{
        entities::content_item::ContentMetadata,
        services::search_trigger::{SearchTicket, SearchTrigger, TriggerPolicy},
    },
    search_client::{SearchBackend, SearchClientError},
};

/// What a search box displays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    /// A search is in flight
    pub loading: bool,
    pub results: Vec<ContentMetadata>,
    pub error: Option<String>,
    /// Sequence number of the last issued search, 0 before any search
    pub sequence: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum LiveSearchError {
    #[error("The live search is stopped")]
    Stopped,
}

type Completion = (u64, Result<Vec<ContentMetadata>, SearchClientError>);

/// Handle on a running live search.
///
/// The driving task stops when the handle is dropped.
pub struct LiveSearch {
    input_sender: mpsc::UnboundedSender<String>,
    view_receiver: watch::Receiver<SearchView>,
    task: JoinHandle<()>,
}

impl LiveSearch {
    /// Spawns the driving task on the current tokio runtime
    pub fn spawn(policy: TriggerPolicy, top_k: usize, backend: Arc<dyn SearchBackend>) -> Self {
        let (input_sender, input_receiver) = mpsc::unbounded_channel();
        let (view_sender, view_receiver) = watch::channel(SearchView::default());

        let driver = Driver {
            trigger: SearchTrigger::new(policy),
            top_k,
            backend,
            view_sender,
            in_flight: None,
        };
        let task = tokio::spawn(driver.run(input_receiver));

        info!(?policy, top_k, "Live search started");
        Self {
            input_sender,
            view_receiver,
            task,
        }
    }

    /// Sends the full current text of the search box, after a change
    pub fn input(&self, text: impl Into<String>) -> Result<(), LiveSearchError> {
        self.input_sender
            .send(text.into())
            .map_err(|_| LiveSearchError::Stopped)
    }

    /// A receiver notified on every view change
    pub fn view(&self) -> watch::Receiver<SearchView> {
        self.view_receiver.clone()
    }

    pub fn current(&self) -> SearchView {
        self.view_receiver.borrow().clone()
    }
}

impl Drop for LiveSearch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Driver {
    trigger: SearchTrigger,
    top_k: usize,
    backend: Arc<dyn SearchBackend>,
    view_sender: watch::Sender<SearchView>,
    in_flight: Option<JoinHandle<()>>,
}

impl Driver {
    async fn run(mut self, mut input_receiver: mpsc::UnboundedReceiver<String>) {
        let (completion_sender, mut completion_receiver) = mpsc::unbounded_channel::<Completion>();

        loop {
            let deadline = self.trigger.deadline();

            tokio::select! {
                input = input_receiver.recv() => match input {
                    Some(text) => {
                        if let Some(ticket) = self.trigger.on_input(&text, Instant::now()) {
                            self.start(ticket, &completion_sender);
                        }
                    }
                    // Every handle is gone
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(ticket) = self.trigger.poll(Instant::now()) {
                        self.start(ticket, &completion_sender);
                    }
                }
                Some((sequence, outcome)) = completion_receiver.recv() => {
                    self.complete(sequence, outcome);
                }
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort();
        }
        debug!("Live search stopped");
    }

    fn start(&mut self, ticket: SearchTicket, completion_sender: &mpsc::UnboundedSender<Completion>) {
        if let Some(superseded) = self.in_flight.take() {
            superseded.abort();
        }

        debug!(sequence = ticket.sequence, query = %ticket.query, "Search fired");
        self.view_sender.send_modify(|view| {
            view.loading = true;
            view.sequence = ticket.sequence;
        });

        let backend = self.backend.clone();
        let completion_sender = completion_sender.clone();
        let top_k = self.top_k;

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = backend.search(&ticket.query, top_k).await;
            // The driver may be gone
            let _ = completion_sender.send((ticket.sequence, outcome));
        }));
    }

    fn complete(&mut self, sequence: u64, outcome: Result<Vec<ContentMetadata>, SearchClientError>) {
        if !self.trigger.is_current(sequence) {
            debug!(sequence, "Dropping the response of a superseded search");
            return;
        }
        self.in_flight = None;

        self.view_sender.send_modify(|view| {
            view.loading = false;
            match outcome {
                Ok(results) => {
                    view.results = results;
                    view.error = None;
                }
                Err(error) => {
                    warn!(?error, sequence, "Live search failed");
                    view.results = vec![];
                    view.error = Some(error.to_string());
                }
            }
        });
    }
}
