use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures_util::{FutureExt, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info};

use crate::types::ClientFrame;

use super::{FeedClient, FeedInner, LoadMode};

impl FeedClient {
    /// Open the persistent event-stream connection.
    ///
    /// Idempotent: a call while a socket is open or opening is a no-op, and
    /// a call while the session is parked in the reconnect delay folds into
    /// an immediate attempt instead of waiting the delay out. Each attempt
    /// concurrently seeds both trade buffers over REST so consumers have
    /// data before the first push arrives.
    ///
    /// On open the session re-issues its channel subscriptions and, when an
    /// identity is registered, binds the user. After any close the session
    /// reconnects on a fixed delay until [`disconnect`](Self::disconnect)
    /// is called.
    pub async fn connect(&self) {
        let inner = &self.inner;
        inner.manual_disconnect.store(false, Ordering::SeqCst);
        inner.shutdown_tx.send_replace(false);

        if inner.running.swap(true, Ordering::SeqCst) {
            // Session task already alive; short-circuit a pending delay.
            inner.connect_now.notify_one();
            return;
        }

        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            run_session(inner).await;
        });
    }

    /// Tear the connection down.
    ///
    /// Terminal, user-initiated: the pending reconnect (if any) is
    /// cancelled, the socket is closed, and the close this produces does
    /// not schedule a new attempt. A later [`connect`](Self::connect)
    /// starts the session again.
    pub async fn disconnect(&self) {
        let inner = &self.inner;
        inner.manual_disconnect.store(true, Ordering::SeqCst);
        inner.shutdown_tx.send_replace(true);
        *inner.outbound.write().await = None;
        inner.connected_tx.send_replace(false);
    }
}

async fn run_session(inner: Arc<FeedInner>) {
    let mut shutdown_rx = inner.shutdown_tx.subscribe();

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // Seed both feeds alongside the handshake so the stream only has to
        // catch up from there.
        let seed = Arc::clone(&inner);
        tokio::spawn(async move {
            seed.load_initial_trades(LoadMode::Expanded, None).await;
        });
        let seed = Arc::clone(&inner);
        tokio::spawn(async move {
            seed.load_initial_trades(LoadMode::Preview, None).await;
        });

        match connect_async(&inner.config.ws_url).await {
            Ok((stream, _)) => {
                info!(url = %inner.config.ws_url, "event stream connected");
                // Drain a stale connect() wake-up so it cannot skip a later
                // reconnect delay.
                let _ = inner.connect_now.notified().now_or_never();
                let (mut write, mut read) = stream.split();

                let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientFrame>();
                *inner.outbound.write().await = Some(outbound_tx);
                inner.connected_tx.send_replace(true);

                inner.subscribe_to_channels(None).await;
                if let Some(user_id) = inner.user_id.read().await.clone() {
                    inner.send_frame(ClientFrame::SetUser { user_id }).await;
                }

                loop {
                    tokio::select! {
                        message = read.next() => match message {
                            Some(Ok(Message::Text(text))) => inner.dispatch_text(&text).await,
                            Some(Ok(Message::Close(frame))) => {
                                info!(?frame, "server closed the stream");
                                break;
                            }
                            // Protocol-level ping/pong and binary frames are
                            // handled by the transport.
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                error!(%err, "event stream error");
                                break;
                            }
                            None => {
                                info!("event stream ended");
                                break;
                            }
                        },
                        frame = outbound_rx.recv() => match frame {
                            Some(frame) => match serde_json::to_string(&frame) {
                                Ok(text) => {
                                    if let Err(err) = write.send(Message::Text(text)).await {
                                        error!(%err, "failed to send frame");
                                        break;
                                    }
                                }
                                Err(err) => error!(%err, "failed to serialize outbound frame"),
                            },
                            None => break,
                        },
                        _ = async { let _ = shutdown_rx.wait_for(|stop| *stop).await; } => break,
                    }
                }

                let _ = write.close().await;
                *inner.outbound.write().await = None;
                inner.connected_tx.send_replace(false);
            }
            Err(err) => {
                error!(%err, "failed to connect event stream");
                inner.connected_tx.send_replace(false);
            }
        }

        if inner.manual_disconnect.load(Ordering::SeqCst) {
            break;
        }

        debug!(
            delay_ms = inner.config.reconnect_delay.as_millis() as u64,
            "scheduling reconnect"
        );
        tokio::select! {
            _ = sleep(inner.config.reconnect_delay) => {}
            _ = inner.connect_now.notified() => {
                debug!("reconnect delay short-circuited by connect()");
            }
            _ = async { let _ = shutdown_rx.wait_for(|stop| *stop).await; } => break,
        }
    }

    inner.running.store(false, Ordering::SeqCst);
    inner.connected_tx.send_replace(false);
    debug!("event stream session ended");
}
