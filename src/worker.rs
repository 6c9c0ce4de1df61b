use anyhow::Result;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::controller::{Outcome, Request};
use crate::error::GatewayResult;
use crate::hn_client::HackerNewsClient;
use crate::models::ItemLookup;

/// A finished background fetch, delivered to the UI thread.
#[derive(Debug)]
pub enum WorkerEvent {
    Search(Outcome),
    Item {
        id: String,
        result: GatewayResult<ItemLookup>,
    },
}

/// Runs API calls on a small tokio runtime and queues their results for the
/// UI thread, which drains them with [`Worker::try_recv`] once per frame.
pub struct Worker {
    runtime: Runtime,
    client: HackerNewsClient,
    tx: UnboundedSender<WorkerEvent>,
    rx: UnboundedReceiver<WorkerEvent>,
    repaint: Option<egui::Context>,
}

impl Worker {
    pub fn new(client: HackerNewsClient) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("hn-search-io")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            runtime,
            client,
            tx,
            rx,
            repaint: None,
        })
    }

    /// Wakes the UI whenever a result is queued.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    pub fn dispatch(&self, request: Request) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();

        self.runtime.spawn(async move {
            let outcome = match request {
                Request::Search { generation, query } => {
                    let result = client.search(&query, None).await;
                    Outcome::Search {
                        generation,
                        query,
                        result,
                    }
                }
                Request::Page {
                    generation,
                    query,
                    page,
                } => {
                    let result = client.search(&query, Some(page)).await;
                    Outcome::Page { generation, result }
                }
            };
            deliver(&tx, repaint.as_ref(), WorkerEvent::Search(outcome));
        });
    }

    pub fn load_item(&self, id: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();

        self.runtime.spawn(async move {
            let result = client.item(&id).await;
            deliver(&tx, repaint.as_ref(), WorkerEvent::Item { id, result });
        });
    }

    pub fn try_recv(&mut self) -> Option<WorkerEvent> {
        self.rx.try_recv().ok()
    }
}

fn deliver(tx: &UnboundedSender<WorkerEvent>, repaint: Option<&egui::Context>, event: WorkerEvent) {
    if tx.send(event).is_err() {
        debug!("worker receiver dropped, discarding result");
        return;
    }
    if let Some(ctx) = repaint {
        ctx.request_repaint();
    }
}
