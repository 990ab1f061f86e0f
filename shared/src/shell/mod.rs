//! Async shell: hosts the `crux_core` runtime on a single-threaded executor.
//!
//! HTTP effects become futures in a `FuturesUnordered`, so independent
//! requests (the two listings) are outstanding at once while their
//! completions are resolved back into the core strictly one at a time.

mod client;
mod transport;

use std::sync::Arc;

use crux_core::{Core, Request};
use crux_http::protocol::{HttpRequest, HttpResult};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, trace};

pub use self::client::ApiClient;
pub use self::transport::{ReqwestTransport, Transport};

use crate::app::App;
use crate::capabilities::{Capabilities, Effect};
use crate::event::Event;
use crate::model::ToastMessage;
use crate::view::ViewModel;

type Completion = (Request<HttpRequest>, HttpResult);

pub struct Shell<T> {
    core: Core<Effect, App>,
    transport: Arc<T>,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
    notifications: mpsc::UnboundedSender<ToastMessage>,
    needs_render: bool,
}

impl<T: Transport + 'static> Shell<T> {
    /// Builds a shell and the receiving end of its notification channel.
    pub fn new(transport: T) -> (Self, mpsc::UnboundedReceiver<ToastMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shell = Self {
            core: Core::new::<Capabilities>(),
            transport: Arc::new(transport),
            in_flight: FuturesUnordered::new(),
            notifications: tx,
            needs_render: false,
        };
        (shell, rx)
    }

    pub fn dispatch(&mut self, event: Event) {
        let effects = self.core.process_event(event);
        self.process(effects);
    }

    fn process(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Http(request) => self.spawn(request),
                Effect::Render(_) => self.needs_render = true,
                Effect::Notify(request) => {
                    if self.notifications.send(request.operation.toast).is_err() {
                        trace!("notification dropped, no subscriber");
                    }
                }
            }
        }
    }

    fn spawn(&mut self, request: Request<HttpRequest>) {
        let transport = Arc::clone(&self.transport);
        debug!(method = %request.operation.method, url = %request.operation.url, "queueing request");

        self.in_flight.push(
            async move {
                let result = transport.execute(request.operation.clone()).await;
                (request, result)
            }
            .boxed(),
        );
    }

    /// Waits for the next outstanding request and resolves it in the core.
    /// Returns false when nothing was in flight.
    pub async fn next_completion(&mut self) -> bool {
        match self.in_flight.next().await {
            Some((mut request, result)) => {
                let effects = self.core.resolve(&mut request, result);
                self.process(effects);
                true
            }
            None => false,
        }
    }

    /// Drives every outstanding request, including ones started by the
    /// completions themselves, to the end.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    /// Returns whether a render was requested since the last call.
    pub fn take_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }
}
