//! Dispatch engine
//!
//! Consumes decoded PUBLISH packets, looks up the handlers for each topic
//! and runs them under one of two disciplines:
//!
//! - ordered: one worker runs every handler of a message in route order,
//!   acks, and only then looks at the next message. Handler invocation and
//!   acknowledgments follow arrival order across all topics.
//! - concurrent: every matched handler runs as its own task and acks as
//!   soon as it returns. Acknowledgments are relayed to the output in
//!   completion order.
//!
//! Messages matching no route while no default handler is set are dropped
//! without an acknowledgment; for qos > 0 the broker redelivers them.
//!
//! Concurrent shutdown runs in a fixed order once the input ends:
//! 1. the dispatch loop signals the relay to stop
//! 2. the relay hands back the output sender and starts discarding late acks
//! 3. the dispatch loop drops the output sender, closing the output
//! 4. a waiter task sees every handler task finish and tells the relay,
//!    which closes its input and exits
//!
//! Every task the engine spawns is counted in [`Dispatch::outstanding`] and
//! runs inside the span the [`Router`] was built with.

use std::sync::Arc;

use futures_util::stream::{Stream, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task;
use tracing::{Instrument, Span, debug, debug_span, warn};

use crate::packets::PublishPacket;
use crate::router::message::{AckSink, Message, PacketAndToken};
use crate::router::routes::{Handler, RouteTable};
use crate::router::wait_group::WaitGroup;

#[derive(Debug, Clone)]
pub struct Router {
    routes: Arc<RouteTable>,
    span: Span,
}

/// Output side of a running dispatcher.
#[derive(Debug)]
pub struct Dispatch {
    acks: UnboundedReceiver<PacketAndToken>,
    tasks: WaitGroup,
}

impl Dispatch {
    /// Next acknowledgment, or `None` once the engine closed the output.
    pub async fn recv(&mut self) -> Option<PacketAndToken> {
        self.acks.recv().await
    }

    /// Engine tasks still running: dispatch loop, relay, handler tasks and
    /// the shutdown waiter.
    pub fn outstanding(&self) -> usize {
        self.tasks.count()
    }

    /// Resolves once every engine task has finished.
    pub async fn idle(&self) {
        self.tasks.wait().await
    }

    pub fn into_parts(self) -> (UnboundedReceiver<PacketAndToken>, WaitGroup) {
        (self.acks, self.tasks)
    }
}

impl Router {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self::with_span(routes, debug_span!("router"))
    }

    /// Builds a router whose log events are emitted inside `span`.
    pub fn with_span(routes: Arc<RouteTable>, span: Span) -> Self {
        Self { routes, span }
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Starts dispatching `messages`. Must be called inside a tokio runtime.
    ///
    /// The returned output closes exactly once, after `messages` ends.
    pub fn match_and_dispatch<S>(&self, messages: S, ordered: bool) -> Dispatch
    where
        S: Stream<Item = PublishPacket> + Send + Unpin + 'static,
    {
        let (ack_tx, ack_rx) = mpsc::unbounded_channel();
        let tasks = WaitGroup::new();
        let routes = Arc::clone(&self.routes);

        if ordered {
            let guard = tasks.enter();
            tokio::spawn(
                async move {
                    let _guard = guard;
                    dispatch_ordered(routes, messages, AckSink::new(ack_tx)).await;
                }
                .instrument(self.span.clone()),
            );
        } else {
            let (relay_tx, relay_rx) = mpsc::unbounded_channel();
            let relay = AckSink::new(relay_tx);
            let (stop_tx, stop_rx) = oneshot::channel();
            let (stopped_tx, stopped_rx) = oneshot::channel();
            let (done_tx, done_rx) = oneshot::channel();

            let guard = tasks.enter();
            let relay_sink = relay.clone();
            tokio::spawn(
                async move {
                    let _guard = guard;
                    relay_acks(relay_rx, ack_tx, stop_rx, stopped_tx, done_rx, relay_sink).await;
                }
                .instrument(self.span.clone()),
            );

            let guard = tasks.enter();
            let shutdown = Shutdown {
                stop: stop_tx,
                stopped: stopped_rx,
                workers_done: done_tx,
            };
            let engine_tasks = tasks.clone();
            tokio::spawn(
                async move {
                    let _guard = guard;
                    dispatch_concurrent(routes, messages, relay, shutdown, engine_tasks).await;
                }
                .instrument(self.span.clone()),
            );
        }

        Dispatch {
            acks: ack_rx,
            tasks,
        }
    }
}

async fn dispatch_ordered<S>(routes: Arc<RouteTable>, mut messages: S, out: AckSink)
where
    S: Stream<Item = PublishPacket> + Unpin,
{
    while let Some(publish) = messages.next().await {
        let handlers = routes.handlers_for(&publish.topic_name);
        if handlers.is_empty() {
            debug!(
                topic = %publish.topic_name,
                message_id = publish.message_id,
                "no handler available; message will not be acknowledged"
            );
            continue;
        }

        let message = Message::from_publish(publish, out.clone());
        let span = Span::current();
        let result = task::spawn_blocking(move || {
            let _entered = span.enter();
            for handler in &handlers {
                handler.handle(&message);
            }
            message.ack();
        })
        .await;
        if let Err(err) = result {
            warn!(error = %err, "handler failed; message not acknowledged");
        }
    }

    out.close();
    debug!("ordered dispatch exiting");
}

struct Shutdown {
    stop: oneshot::Sender<()>,
    stopped: oneshot::Receiver<UnboundedSender<PacketAndToken>>,
    workers_done: oneshot::Sender<()>,
}

async fn dispatch_concurrent<S>(
    routes: Arc<RouteTable>,
    mut messages: S,
    relay: AckSink,
    shutdown: Shutdown,
    tasks: WaitGroup,
) where
    S: Stream<Item = PublishPacket> + Unpin,
{
    let workers = WaitGroup::new();

    while let Some(publish) = messages.next().await {
        let handlers = routes.handlers_for(&publish.topic_name);
        if handlers.is_empty() {
            debug!(
                topic = %publish.topic_name,
                message_id = publish.message_id,
                "no handler available; message will not be acknowledged"
            );
            continue;
        }

        let message = Message::from_publish(publish, relay.clone());
        for handler in handlers {
            spawn_handler(handler, message.clone(), &workers, &tasks);
        }
    }

    let _ = shutdown.stop.send(());
    // the relay gives the output sender back once it can no longer write to it
    if let Ok(out) = shutdown.stopped.await {
        drop(out);
    }
    debug!("output closed; waiting for handler tasks");

    let guard = tasks.enter();
    let workers_done = shutdown.workers_done;
    tokio::spawn(
        async move {
            let _guard = guard;
            // never resolves if a handler never returns
            workers.wait().await;
            let _ = workers_done.send(());
        }
        .instrument(Span::current()),
    );
}

fn spawn_handler(handler: Handler, message: Message, workers: &WaitGroup, tasks: &WaitGroup) {
    let worker = workers.enter();
    let task = tasks.enter();
    let span = Span::current();
    task::spawn_blocking(move || {
        let _task = task;
        let _worker = worker;
        let _entered = span.enter();
        handler.handle(&message);
        message.ack();
    });
}

async fn relay_acks(
    mut relay_rx: UnboundedReceiver<PacketAndToken>,
    out: UnboundedSender<PacketAndToken>,
    mut stop: oneshot::Receiver<()>,
    stopped: oneshot::Sender<UnboundedSender<PacketAndToken>>,
    mut workers_done: oneshot::Receiver<()>,
    relay: AckSink,
) {
    loop {
        tokio::select! {
            biased;
            ack = relay_rx.recv() => match ack {
                Some(ack) => {
                    if out.send(ack).is_err() {
                        warn!("acknowledgment consumer has gone away; acknowledgment dropped");
                    }
                }
                None => break,
            },
            _ = &mut stop => break,
        }
    }

    let _ = stopped.send(out);

    loop {
        tokio::select! {
            ack = relay_rx.recv() => match ack {
                Some(ack) => debug!(
                    message_id = ack.token.details.message_id,
                    "acknowledgment received after dispatch stopped (dropped)"
                ),
                None => break,
            },
            _ = &mut workers_done => break,
        }
    }

    relay.close();
    debug!("acknowledgment relay exiting");
}
