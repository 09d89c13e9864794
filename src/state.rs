use crate::{routes::sse::SseEvent, service::StudentService};
use maud::{DOCTYPE, Markup, html};
use std::{future::Future, ops::Deref, sync::Arc};
use tokio::sync::{
    broadcast::{Receiver, Sender, channel},
    watch,
};

#[derive(Clone, Debug)]
pub struct RosterState {
    service: StudentService,
    sse_events_sender: Sender<SseEvent>,
    shutdown_sender: Arc<watch::Sender<bool>>,
}

impl RosterState {
    pub fn new(service: StudentService) -> Self {
        let (tx, _rx) = channel(16);
        let (shutdown_sender, _shutdown_rx) = watch::channel(false);

        Self {
            service,
            sse_events_sender: tx,
            shutdown_sender: Arc::new(shutdown_sender),
        }
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :), and to allow direct html! usage
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-sse@2.2.3" integrity="sha384-Y4gc0CK6Kg+hmulDc6rZPJu0tqvk7EWlih0Oh+2OkAi1ZDlCbBDCQEE2uVk472Ky" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-json-enc@2.0.2" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Roster" }
                }
                body hx-ext="sse" class="bg-gray-900 min-h-screen flex flex-col items-center justify-center text-white" {
                    (markup)
                }
            }
        }
    }

    pub fn subscribe_to_sse_feed(&self) -> Receiver<SseEvent> {
        self.sse_events_sender.subscribe()
    }

    pub fn send_sse_event(&self, event: SseEvent) {
        //no subscribers just means no open pages
        let _ = self.sse_events_sender.send(event);
    }

    /// Ends every long-lived response (the SSE feeds), so graceful shutdown has nothing left to wait on.
    pub fn begin_shutdown(&self) {
        self.shutdown_sender.send_replace(true);
    }

    /// Resolves once [`Self::begin_shutdown`] has been called, including if that happened before this was called.
    pub fn shutdown_started(&self) -> impl Future<Output = ()> + Send + 'static + use<> {
        let mut rx = self.shutdown_sender.subscribe();
        async move {
            //the sender lives in the state, so an error here means nobody is left to serve anyway
            let _ = rx.wait_for(|stopping| *stopping).await;
        }
    }

    pub async fn sensible_shutdown(&self) {
        info!("Closing student store");
        self.service.close().await;
    }
}

impl Deref for RosterState {
    type Target = StudentService;

    fn deref(&self) -> &Self::Target {
        &self.service
    }
}
