// Vaultline — TCP Server
//
// Listens on a TCP socket for pipe-delimited vault commands. Each accepted
// connection is handled in its own tokio task that owns the connection's
// Session; command execution (Argon2 + SQLite) runs on the blocking pool.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpListener;
use zeroize::Zeroizing;

use super::dispatcher::Dispatcher;
use super::protocol::{finish_reply, trim_line_ending, ProtocolError, EXIT_COMMAND, MAX_MESSAGE_LEN};
use super::session::Session;

/// TCP server for Vaultline.
pub struct TcpServer {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl TcpServer {
    /// Bind the listening socket. Port 0 picks a free port.
    pub async fn bind(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> io::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Accept connections until `shutdown` completes. Connections already
    /// accepted keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(addr = %self.local_addr()?, "Vaultline server listening");
        tokio::pin!(shutdown);

        let mut next_session: u64 = 0;
        loop {
            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = &mut shutdown => {
                    tracing::info!("Shutting down listener");
                    return Ok(());
                }
            };
            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    continue;
                }
            };

            next_session += 1;
            let session_id = next_session;
            let dispatcher = self.dispatcher.clone();
            tracing::info!(session = session_id, peer = %peer, "Client connected");

            tokio::spawn(async move {
                match handle_connection(stream, dispatcher, session_id).await {
                    Ok(()) => tracing::info!(session = session_id, "Client disconnected"),
                    Err(e) => {
                        tracing::error!(session = session_id, error = %e, "Connection handler error")
                    }
                }
            });
        }
    }
}

/// Serve one connection: read a command, write exactly one reply, repeat
/// until the peer disconnects or sends EXIT.
pub async fn handle_connection<S>(
    mut stream: S,
    dispatcher: Arc<Dispatcher>,
    session_id: u64,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut session = Session::new(session_id);
    // One spare byte detects overflow.
    let mut buf = Zeroizing::new(vec![0u8; MAX_MESSAGE_LEN + 1]);

    loop {
        let n = stream.read(&mut buf[..]).await?;
        if n == 0 {
            return Ok(());
        }

        if n > MAX_MESSAGE_LEN {
            tracing::warn!(session = session_id, "Oversized message discarded");
            drain_oversized(&mut stream, &mut buf[..], n).await?;
            write_reply(&mut stream, &ProtocolError::TooLong.to_string()).await?;
            continue;
        }

        let message = match std::str::from_utf8(&buf[..n]) {
            Ok(text) => Zeroizing::new(text.to_string()),
            Err(_) => {
                write_reply(&mut stream, &ProtocolError::Encoding.to_string()).await?;
                continue;
            }
        };

        if trim_line_ending(&message) == EXIT_COMMAND {
            tracing::debug!(session = session_id, "Client sent EXIT");
            return Ok(());
        }

        let dispatcher = dispatcher.clone();
        let (returned, reply) = tokio::task::spawn_blocking(move || {
            let mut session = session;
            let reply = Zeroizing::new(dispatcher.dispatch(&mut session, &message));
            (session, reply)
        })
        .await
        .map_err(io::Error::other)?;
        session = returned;

        stream.write_all(reply.as_bytes()).await?;
        stream.flush().await?;
    }
}

/// Discard the rest of an oversized message. Only bytes already available are
/// consumed: the drain stops at a line terminator, a short read, or as soon as
/// a read would block.
async fn drain_oversized<S>(stream: &mut S, buf: &mut [u8], mut last: usize) -> io::Result<()>
where
    S: AsyncRead + Unpin,
{
    while last == buf.len() && !buf[..last].ends_with(b"\n") {
        match read_available(stream, buf).await? {
            Some(n) if n > 0 => last = n,
            _ => break,
        }
    }
    Ok(())
}

/// Read whatever is ready right now. `None` when the read would block.
async fn read_available<S>(stream: &mut S, buf: &mut [u8]) -> io::Result<Option<usize>>
where
    S: AsyncRead + Unpin,
{
    std::future::poll_fn(|cx| {
        let mut read_buf = ReadBuf::new(&mut *buf);
        match Pin::new(&mut *stream).poll_read(cx, &mut read_buf) {
            Poll::Ready(Ok(())) => Poll::Ready(Ok(Some(read_buf.filled().len()))),
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Ready(Ok(None)),
        }
    })
    .await
}

async fn write_reply<S>(stream: &mut S, body: &str) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(finish_reply(body.to_string()).as_bytes()).await?;
    stream.flush().await
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2Verifier, HashCost};
    use crate::store::{Database, SqliteVaultStore};
    use std::time::Duration;
    use tokio::io::DuplexStream;
    use tokio::task::JoinHandle;

    fn dispatcher() -> Arc<Dispatcher> {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let verifier = Argon2Verifier::new(HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        Arc::new(Dispatcher::new(
            Arc::new(SqliteVaultStore::new(db)),
            Arc::new(verifier),
        ))
    }

    fn connect(dispatcher: Arc<Dispatcher>) -> (DuplexStream, JoinHandle<io::Result<()>>) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let handle = tokio::spawn(handle_connection(server, dispatcher, 1));
        (client, handle)
    }

    async fn send(client: &mut DuplexStream, message: &[u8]) -> String {
        client.write_all(message).await.unwrap();
        let mut reply = Vec::new();
        let mut chunk = [0u8; 1024];
        while !reply.ends_with(b"\n") {
            let n = client.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before reply");
            reply.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8(reply).unwrap()
    }

    #[tokio::test]
    async fn test_one_reply_per_command() {
        let (mut client, _handle) = connect(dispatcher());

        assert_eq!(
            send(&mut client, b"REGISTER|alice|Str0ng!Pw\n").await,
            "Password strength: Strong\nRegistration successful.\n"
        );
        assert_eq!(
            send(&mut client, b"LOGIN|alice|Str0ng!Pw\n").await,
            "Login successful: alice\n"
        );
        assert_eq!(send(&mut client, b"NEW_CAT|Work\n").await, "Category added.\n");
    }

    #[tokio::test]
    async fn test_session_survives_across_commands() {
        let (mut client, _handle) = connect(dispatcher());
        send(&mut client, b"REGISTER|alice|Str0ng!Pw").await;
        send(&mut client, b"LOGIN|alice|Str0ng!Pw").await;
        assert_eq!(send(&mut client, b"LIST_CATS").await, "No categories found.\n");
        assert_eq!(send(&mut client, b"LOGOUT").await, "Logged out.\n");
        assert_eq!(send(&mut client, b"LIST_CATS").await, "Login required.\n");
    }

    #[tokio::test]
    async fn test_oversized_message_keeps_connection_open() {
        let (mut client, _handle) = connect(dispatcher());

        let mut big = vec![b'A'; MAX_MESSAGE_LEN + 500];
        big.push(b'\n');
        assert_eq!(send(&mut client, &big).await, "Command too long.\n");

        assert_eq!(send(&mut client, b"LOGOUT\n").await, "Not logged in.\n");
    }

    #[tokio::test]
    async fn test_unterminated_oversized_message_gets_reply() {
        let (mut client, _handle) = connect(dispatcher());

        let big = vec![b'A'; MAX_MESSAGE_LEN + 1];
        let reply = tokio::time::timeout(Duration::from_secs(5), send(&mut client, &big))
            .await
            .expect("no reply to oversized message");
        assert_eq!(reply, "Command too long.\n");

        assert_eq!(send(&mut client, b"LOGOUT").await, "Not logged in.\n");
    }

    #[tokio::test]
    async fn test_oversized_message_spanning_full_buffers_gets_reply() {
        let (mut client, _handle) = connect(dispatcher());

        let big = vec![b'B'; (MAX_MESSAGE_LEN + 1) * 2];
        let reply = tokio::time::timeout(Duration::from_secs(5), send(&mut client, &big))
            .await
            .expect("no reply to oversized message");
        assert_eq!(reply, "Command too long.\n");

        assert_eq!(send(&mut client, b"LIST_CATS").await, "Login required.\n");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_rejected() {
        let (mut client, _handle) = connect(dispatcher());
        assert_eq!(
            send(&mut client, &[0xff, 0xfe, b'\n']).await,
            "Malformed command encoding.\n"
        );
        assert_eq!(send(&mut client, b"\n").await, "Empty command.\n");
    }

    #[tokio::test]
    async fn test_exit_closes_without_reply() {
        let (mut client, handle) = connect(dispatcher());
        client.write_all(b"EXIT\n").await.unwrap();

        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_peer_disconnect_ends_handler() {
        let (client, handle) = connect(dispatcher());
        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }
}
