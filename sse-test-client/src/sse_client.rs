use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    Data(String),
    Comment(String),
    /// The server closed the stream.
    Ended,
}

pub struct Connection {
    pub label: String,
    event_rx: mpsc::UnboundedReceiver<Received>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    /// Opens `path` on the server without automatic reconnects, so the end of
    /// a bounded stream is observable.
    pub async fn open(base_url: &str, path: &str, label: String) -> Result<Self> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?
            .reconnect(es::ReconnectOptions::reconnect(false).build())
            .build();

        let stream_label = label.clone();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                let received = match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => Received::Data(event.data),
                    Some(Ok(es::SSE::Comment(comment))) => Received::Comment(comment),
                    Some(Err(e)) => {
                        debug!("SSE stream for {} stopped: {:?}", stream_label, e);
                        Received::Ended
                    }
                    None => Received::Ended,
                };

                let ended = received == Received::Ended;
                if tx.send(received).is_err() {
                    debug!("SSE receiver dropped for {}", stream_label);
                    break;
                }
                if ended {
                    break;
                }
            }
        });

        Ok(Self {
            label,
            event_rx: rx,
            _handle: handle,
        })
    }

    pub async fn next(&mut self, timeout: Duration) -> Result<Received> {
        match tokio::time::timeout(timeout, self.event_rx.recv()).await {
            Ok(Some(received)) => Ok(received),
            Ok(None) => Ok(Received::Ended),
            Err(_) => anyhow::bail!("Timeout waiting for an event on {}", self.label),
        }
    }

    /// Next data payload, skipping comments. `None` once the stream has ended.
    pub async fn next_data(&mut self, timeout: Duration) -> Result<Option<String>> {
        loop {
            match self.next(timeout).await? {
                Received::Data(data) => return Ok(Some(data)),
                Received::Comment(comment) => trace!("{}: comment {}", self.label, comment),
                Received::Ended => return Ok(None),
            }
        }
    }
}
