//! X11 event source for the main loop.
//!
//! qtwm handles events in batches: `drain` hands over everything that has
//! arrived, the window manager dispatches the whole batch, runs at most one
//! tiling pass and flushes once. Only when a drain comes back empty does the
//! loop park on `wait_readable`, which a mio poll thread on the X socket
//! completes. Events x11rb queued while waiting for a reply (geometry
//! queries during placement, for instance) are picked up by the next drain
//! without a socket wake-up.

use anyhow::{Context, Result};
use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, oneshot};
use tracing::{info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

const X11_TOKEN: mio::Token = mio::Token(0);

/// How often the poll thread checks whether the stream was dropped
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct X11EventStream {
    conn: Arc<RustConnection>,
    readable: Arc<Notify>,
    /// Dropping this stops the poll thread
    _alive: oneshot::Receiver<()>,
}

impl X11EventStream {
    pub fn new(conn: Arc<RustConnection>) -> Result<Self> {
        let fd = conn.stream().as_raw_fd();
        let readable = Arc::new(Notify::new());
        let waker = Arc::clone(&readable);
        let (alive_tx, alive_rx) = oneshot::channel::<()>();

        let mut poll = mio::Poll::new().context("Failed to create mio poll")?;
        poll.registry()
            .register(&mut mio::unix::SourceFd(&fd), X11_TOKEN, mio::Interest::READABLE)
            .context("Failed to register the X11 socket with mio")?;

        tokio::task::spawn_blocking(move || {
            let mut events = mio::Events::with_capacity(1);
            while !alive_tx.is_closed() {
                if let Err(e) = poll.poll(&mut events, Some(POLL_INTERVAL)) {
                    warn!("X11 socket poll failed: {}", e);
                    continue;
                }
                if events.iter().any(|event| event.token() == X11_TOKEN) {
                    waker.notify_one();
                }
            }
            info!("X11 socket poll thread stopped");
        });

        Ok(Self {
            conn,
            readable,
            _alive: alive_rx,
        })
    }

    /// Next buffered or already-received event, without blocking. An error
    /// means the connection is gone.
    fn poll_next_event(&self) -> Result<Option<Event>> {
        let event = self
            .conn
            .poll_for_event()
            .context("X11 connection lost")?;
        Ok(event)
    }

    /// The next batch: everything available right now, in arrival order.
    /// Empty when the loop should wait.
    pub fn drain(&self) -> Result<Vec<Event>> {
        let mut batch = Vec::new();
        while let Some(event) = self.poll_next_event()? {
            batch.push(event);
        }
        Ok(batch)
    }

    /// Park the loop until the socket has new data
    pub async fn wait_readable(&self) {
        self.readable.notified().await;
    }
}
