//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::RequestHandler;
use crate::server::response::{HttpResponse, StatusCode};

/// How long in-flight connections may run once shutdown has been requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A static-file HTTP server.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The request handler shared by all connections.
    pub handler: Arc<RequestHandler>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the configured root directory cannot be served or a limit is
    /// out of range.
    pub fn new(config: ServerConfig) -> Result<Self, Error> {
        config.validate()?;
        let handler = RequestHandler::new(&config.root_dir)?;
        Ok(Self {
            config,
            handler: Arc::new(handler),
        })
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(self.config.addr()).await?;
        info!("Server listening on http://{addr}", addr = listener.local_addr()?);
        info!("Serving files from {root}", root = self.handler.root().display());
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>, tasks: &mut JoinSet<()>) {
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Hand a freshly accepted connection to its own task.
    ///
    /// Never waits on the peer, so the accept loop is only ever blocked on
    /// `accept` itself.
    fn handle_new_connection(
        &self,
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        debug!("Connection from {addr}");

        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                tasks.spawn(async move {
                    let response = HttpResponse::new(StatusCode::ServiceUnavailable);
                    let _ = socket.write_all(&response.to_bytes()).await;
                    let _ = socket.shutdown().await;
                });
                return;
            }
        };

        let handler = self.handler.clone();
        let read_buffer_size = self.config.read_buffer_size;
        let read_timeout = self.config.read_timeout;

        tasks.spawn(async move {
            // Held for the lifetime of the connection
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, &handler, read_buffer_size, read_timeout).await {
                match e {
                    Error::Timeout(_) | Error::RequestLineTooLong(_) => warn!("Closing connection from {addr}: {e}"),
                    _ => error!("Error handling connection from {addr}: {e}"),
                }
            }
        });
    }

    /// Log an accept failure and back off briefly.
    async fn handle_accept_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown grace period elapsed, aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }
        info!("Server shutdown complete");
    }

    /// Bind the configured address and serve until Ctrl+C.
    pub async fn start(&self) -> Result<(), Error> {
        let listener = self.setup_listener().await?;
        self.run(listener).await
    }

    /// Serve connections from an already bound listener until Ctrl+C.
    pub async fn run(&self, listener: TcpListener) -> Result<(), Error> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let mut tasks = JoinSet::new();
        Self::setup_ctrl_c_handler(shutdown_tx, &mut tasks);

        loop {
            // Reap finished connections so the set only tracks live ones
            while tasks.try_join_next().is_some() {}

            tokio::select! {
                Some(()) = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            self.handle_new_connection(socket, addr, &semaphore, &mut tasks);
                        }
                        Err(e) => Self::handle_accept_error(e).await,
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;

        Ok(())
    }

    /// Serve exactly one request on `socket` and close it.
    ///
    /// Reads the request line (at most `read_buffer_size` bytes, within
    /// `read_timeout`), writes the header block and the body, flushing after
    /// each, and shuts the stream down. A peer that closes without sending
    /// anything gets no response.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        handler: &RequestHandler,
        read_buffer_size: usize,
        read_timeout: Option<Duration>,
    ) -> Result<(), Error> {
        let line = {
            let mut reader = BufReader::with_capacity(read_buffer_size, &mut *socket);
            let read = read_request_line(&mut reader, read_buffer_size);
            match read_timeout {
                Some(limit) => tokio::time::timeout(limit, read)
                    .await
                    .map_err(|_| Error::Timeout(limit))??,
                None => read.await?,
            }
        };

        let line = match line {
            Some(line) => line,
            None => {
                debug!("Peer closed the connection without sending a request");
                return Ok(());
            }
        };

        let response = handler.respond(&line).await;
        info!(
            "\"{request}\" {status} {length}",
            request = line.trim_end(),
            status = response.status().as_u16(),
            length = response.content_length()
        );

        socket.write_all(response.serialize_headers().as_bytes()).await?;
        socket.flush().await?;
        socket.write_all(response.serialize_body()).await?;
        socket.flush().await?;
        socket.shutdown().await?;

        Ok(())
    }
}

/// Read one line, up to and including `\n`, of at most `limit` bytes.
///
/// Returns `None` when the stream ends before any byte arrives. A last line
/// without `\n` is accepted when the stream ends right after it. Invalid UTF-8
/// is replaced rather than rejected.
async fn read_request_line(
    reader: &mut (impl AsyncBufRead + Unpin),
    limit: usize,
) -> Result<Option<String>, Error> {
    let mut buf = Vec::new();
    let n = (&mut *reader).take(limit as u64).read_until(b'\n', &mut buf).await?;

    if n == 0 {
        return Ok(None);
    }
    if !buf.ends_with(b"\n") && n >= limit && !reader.fill_buf().await?.is_empty() {
        return Err(Error::RequestLineTooLong(limit));
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
