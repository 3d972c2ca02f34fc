//! Persistent session to the key-value service
//!
//! A [`Connection`] is owned by exactly one client worker and carries at most
//! one in-flight command. State machine:
//!
//! ```text
//! Disconnected --open()--> Connected --peer close--> Disconnected
//!      ^                                               |
//!      +---- ConnectionLost <-- reopen + resend -------+--> Connected
//! ```
//!
//! A zero-byte read is answered with exactly one reopen and one verbatim
//! resend; a second failure surfaces as [`ConnectionError::ConnectionLost`].

use async_trait::async_trait;
use kvload_config::TargetConfig;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ConnectionError;
use crate::protocol::{classify, OpKind, Operation};

/// Endpoint and deadlines for one connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl ConnectionConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::from(&TargetConfig::default())
    }
}

impl From<&TargetConfig> for ConnectionConfig {
    fn from(target: &TargetConfig) -> Self {
        Self {
            host: target.host.clone(),
            port: target.port,
            connect_timeout: target.connect_timeout,
            request_timeout: target.request_timeout,
        }
    }
}

/// Liveness of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Command channel used by a client worker
#[async_trait]
pub trait KvTransport: Send {
    /// Send one command line and wait for its response line
    async fn issue(&mut self, command: &str) -> Result<String, ConnectionError>;

    /// Release the session; safe to call more than once
    async fn close(&mut self);

    /// Reconnects performed so far
    fn reconnects(&self) -> u64 {
        0
    }
}

type Session = BufReader<TcpStream>;

/// Outcome of one write + read attempt on a live session
enum Exchange {
    Line(String),
    /// The peer closed the session before a full response line arrived
    PeerClosed,
}

/// One persistent session to the service
pub struct Connection {
    config: ConnectionConfig,
    session: Option<Session>,
    reconnects: u64,
}

impl Connection {
    /// Create a disconnected connection
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            session: None,
            reconnects: 0,
        }
    }

    /// Create and open in one step
    pub async fn connect(config: ConnectionConfig) -> Result<Self, ConnectionError> {
        let mut connection = Self::new(config);
        connection.open().await?;
        Ok(connection)
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        if self.session.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Establish the session, replacing any existing one
    pub async fn open(&mut self) -> Result<(), ConnectionError> {
        let session = self.establish().await?;
        self.session = Some(session);
        Ok(())
    }

    async fn establish(&self) -> Result<Session, ConnectionError> {
        let addr = self.config.address();
        let connect = TcpStream::connect((self.config.host.as_str(), self.config.port));

        let stream = match timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(ConnectionError::Connect { addr, source }),
            Err(_) => {
                return Err(ConnectionError::ConnectTimeout {
                    addr,
                    timeout: self.config.connect_timeout,
                })
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not disable Nagle on {}: {}", addr, e);
        }

        Ok(BufReader::new(stream))
    }

    /// Write one command and read one response line.
    ///
    /// A disconnected connection is reopened first. A peer close during the
    /// exchange triggers one reopen and one resend of the same command.
    pub async fn issue(&mut self, command: &str) -> Result<String, ConnectionError> {
        let mut session = match self.session.take() {
            Some(session) => session,
            None => self.establish().await?,
        };

        match exchange(&mut session, command, self.config.request_timeout).await? {
            Exchange::Line(line) => {
                self.session = Some(session);
                return Ok(line);
            }
            Exchange::PeerClosed => drop(session),
        }

        debug!(
            "Session to {} closed by peer, reconnecting once",
            self.config.address()
        );
        self.reconnects += 1;

        let mut session = self
            .establish()
            .await
            .map_err(|e| self.lost(format!("reconnect failed: {}", e)))?;

        match exchange(&mut session, command, self.config.request_timeout).await? {
            Exchange::Line(line) => {
                self.session = Some(session);
                Ok(line)
            }
            Exchange::PeerClosed => {
                warn!(
                    "Session to {} closed again after resend",
                    self.config.address()
                );
                Err(self.lost("closed again after resend".to_string()))
            }
        }
    }

    /// Release the session; idempotent
    pub async fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            let _ = session.get_mut().shutdown().await;
        }
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Initial connectivity check: open, store a marker key, close
    pub async fn probe(config: ConnectionConfig) -> Result<(), ConnectionError> {
        let mut connection = Self::connect(config).await?;
        let operation = Operation::set("connection_test", "test");
        let result = connection.issue(&operation.command_line()).await;
        connection.close().await;

        let line = result?;
        if classify(OpKind::Set, &line).is_success_for(OpKind::Set) {
            Ok(())
        } else {
            Err(ConnectionError::Protocol(format!(
                "probe SET answered {:?}",
                line
            )))
        }
    }

    fn lost(&self, reason: String) -> ConnectionError {
        ConnectionError::ConnectionLost {
            addr: self.config.address(),
            reason,
        }
    }
}

#[async_trait]
impl KvTransport for Connection {
    async fn issue(&mut self, command: &str) -> Result<String, ConnectionError> {
        Connection::issue(self, command).await
    }

    async fn close(&mut self) {
        Connection::close(self).await
    }

    fn reconnects(&self) -> u64 {
        self.reconnects
    }
}

fn is_peer_close(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
    )
}

async fn exchange(
    session: &mut Session,
    command: &str,
    request_timeout: Duration,
) -> Result<Exchange, ConnectionError> {
    let mut payload = String::with_capacity(command.len() + 1);
    payload.push_str(command);
    payload.push('\n');

    let attempt = async {
        session.get_mut().write_all(payload.as_bytes()).await?;
        let mut line = String::new();
        let read = session.read_line(&mut line).await?;
        Ok::<_, std::io::Error>((read, line))
    };

    match timeout(request_timeout, attempt).await {
        Err(_) => Err(ConnectionError::Timeout(request_timeout)),
        Ok(Err(e)) if e.kind() == ErrorKind::InvalidData => Err(ConnectionError::Protocol(
            "response is not valid UTF-8".to_string(),
        )),
        Ok(Err(e)) if is_peer_close(e.kind()) => Ok(Exchange::PeerClosed),
        Ok(Err(e)) => Err(ConnectionError::Io(e)),
        Ok(Ok((0, _))) => Ok(Exchange::PeerClosed),
        Ok(Ok((_, line))) if !line.ends_with('\n') => {
            debug!("Discarding partial response {:?} cut off by peer close", line);
            Ok(Exchange::PeerClosed)
        }
        Ok(Ok((_, line))) => Ok(Exchange::Line(
            line.trim_end_matches(['\r', '\n']).to_string(),
        )),
    }
}
