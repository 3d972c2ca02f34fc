use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::connection::ConnectionConfig;

#[derive(Default)]
struct MockState {
    store: Mutex<HashMap<String, String>>,
    commands: Mutex<Vec<String>>,
    sessions_accepted: AtomicUsize,
    /// The next N sessions are closed on their first command, without a reply
    doomed_sessions: AtomicUsize,
    /// Every session is closed after this many replies
    close_after_replies: Option<usize>,
    delays: Vec<(String, Duration)>,
    error_prefixes: Vec<String>,
}

/// Builder for [`MockKvServer`]
#[derive(Default)]
pub struct MockKvServerBuilder {
    state: MockState,
}

impl MockKvServerBuilder {
    /// Close the next `count` sessions as soon as they send their first command
    pub fn drop_sessions_on_first_command(self, count: usize) -> Self {
        self.state.doomed_sessions.store(count, Ordering::SeqCst);
        self
    }

    /// Close every session after it has been sent `replies` responses
    pub fn close_after_replies(mut self, replies: usize) -> Self {
        self.state.close_after_replies = Some(replies);
        self
    }

    /// Sleep before answering the exact command line `command`
    pub fn delay_command(mut self, command: impl Into<String>, delay: Duration) -> Self {
        self.state.delays.push((command.into(), delay));
        self
    }

    /// Answer `ERROR: injected failure` to commands starting with `prefix`
    pub fn reply_error_to(mut self, prefix: impl Into<String>) -> Self {
        self.state.error_prefixes.push(prefix.into());
        self
    }

    /// Pre-populate a key
    pub fn seed(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.store.lock().insert(key.into(), value.into());
        self
    }

    /// Bind to an ephemeral loopback port and start accepting sessions
    pub async fn start(self) -> std::io::Result<MockKvServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(self.state);

        let accept_state = state.clone();
        let handle = tokio::spawn(async move {
            while let Ok((socket, peer)) = listener.accept().await {
                debug!("Mock server accepted {}", peer);
                let session_state = accept_state.clone();
                tokio::spawn(async move {
                    handle_session(session_state, socket).await;
                });
            }
        });

        Ok(MockKvServer {
            addr,
            state,
            handle,
        })
    }
}

/// In-process key-value server speaking the line protocol
pub struct MockKvServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockKvServer {
    pub fn builder() -> MockKvServerBuilder {
        MockKvServerBuilder::default()
    }

    /// Start a server without any fault injection
    pub async fn start() -> std::io::Result<Self> {
        Self::builder().start().await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Connection settings pointing at this server with short timeouts
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(2),
        }
    }

    /// Every command line received, in arrival order
    pub fn commands(&self) -> Vec<String> {
        self.state.commands.lock().clone()
    }

    /// Number of sessions accepted so far
    pub fn sessions_accepted(&self) -> usize {
        self.state.sessions_accepted.load(Ordering::SeqCst)
    }

    /// Current value stored under `key`
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.store.lock().get(key).cloned()
    }
}

impl Drop for MockKvServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_session(state: Arc<MockState>, socket: TcpStream) {
    state.sessions_accepted.fetch_add(1, Ordering::SeqCst);
    let doomed = state
        .doomed_sessions
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();

    let mut reader = BufReader::new(socket);
    let mut line = String::new();
    let mut replies = 0usize;

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let command = line.trim_end_matches(['\r', '\n']).to_string();
        state.commands.lock().push(command.clone());

        if doomed {
            break;
        }

        if let Some((_, delay)) = state.delays.iter().find(|(c, _)| *c == command) {
            tokio::time::sleep(*delay).await;
        }

        let mut response = respond(&state, &command);
        response.push('\n');
        if reader.get_mut().write_all(response.as_bytes()).await.is_err() {
            break;
        }

        replies += 1;
        if state.close_after_replies == Some(replies) {
            break;
        }
    }

    let _ = reader.get_mut().shutdown().await;
}

fn respond(state: &MockState, command: &str) -> String {
    if state
        .error_prefixes
        .iter()
        .any(|prefix| command.starts_with(prefix.as_str()))
    {
        return "ERROR: injected failure".to_string();
    }

    let mut parts = command.splitn(3, ' ');
    let verb = parts.next().unwrap_or("");
    let key = parts.next();
    let value = parts.next();

    let mut store = state.store.lock();
    match (verb, key, value) {
        ("SET", Some(key), Some(value)) => {
            store.insert(key.to_string(), value.to_string());
            "OK".to_string()
        }
        ("GET", Some(key), None) => store
            .get(key)
            .cloned()
            .unwrap_or_else(|| "NOT_FOUND".to_string()),
        ("DEL", Some(key), None) => {
            if store.remove(key).is_some() {
                "DELETED".to_string()
            } else {
                "NOT_FOUND".to_string()
            }
        }
        ("", _, _) => "ERROR: empty command".to_string(),
        _ => format!("ERROR: cannot parse {:?}", command),
    }
}
