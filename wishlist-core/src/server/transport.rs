use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Stdin, StdinLock, Stdout, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};

use log::{info, warn};

/// A strictly alternating request/reply channel carrying one JSON document
/// per line.
pub trait Transport {
    /// Blocks until the next request arrives. `Ok(None)` means the channel is
    /// closed for good. A request that arrived but is not UTF-8 is reported as
    /// `ErrorKind::InvalidData` and still expects a reply.
    fn recv(&mut self) -> io::Result<Option<String>>;

    fn send(&mut self, reply: &str) -> io::Result<()>;
}

/// Newline-delimited requests on any reader, replies on any writer.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        LineTransport { reader, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: BufRead, W: Write> Transport for LineTransport<R, W> {
    fn recv(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(None);
            }

            let line = String::from_utf8(std::mem::take(&mut buf))
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            if !line.trim().is_empty() {
                return Ok(Some(line.trim().to_string()));
            }
        }
    }

    fn send(&mut self, reply: &str) -> io::Result<()> {
        writeln!(self.writer, "{reply}")?;
        self.writer.flush()
    }
}

pub type StdioTransport = LineTransport<StdinLock<'static>, Stdout>;

impl StdioTransport {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        LineTransport::new(stdin.lock(), io::stdout())
    }
}

/// Serves one TCP client at a time. A disconnect goes back to accepting.
pub struct TcpTransport {
    listener: TcpListener,
    conn: Option<LineTransport<BufReader<TcpStream>, TcpStream>>,
}

impl TcpTransport {
    pub fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        Ok(TcpTransport {
            listener: TcpListener::bind(addr)?,
            conn: None,
        })
    }

    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    fn recv(&mut self) -> io::Result<Option<String>> {
        loop {
            if self.conn.is_none() {
                let (stream, peer) = self.listener.accept()?;
                info!("client connected from {peer}");
                let reader = BufReader::new(stream.try_clone()?);
                self.conn = Some(LineTransport::new(reader, stream));
            }

            let Some(conn) = self.conn.as_mut() else {
                continue;
            };

            match conn.recv() {
                Ok(Some(line)) => return Ok(Some(line)),
                Err(e) if e.kind() == io::ErrorKind::InvalidData => return Err(e),
                Ok(None) => info!("client disconnected"),
                Err(e) => warn!("dropping client connection: {e}"),
            }
            self.conn = None;
        }
    }

    fn send(&mut self, reply: &str) -> io::Result<()> {
        let Some(conn) = self.conn.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "no client connected"));
        };

        if let Err(e) = conn.send(reply) {
            warn!("failed to reply, dropping client connection: {e}");
            self.conn = None;
        }
        Ok(())
    }
}

/// Scripted requests in, recorded replies out.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    incoming: VecDeque<String>,
    replies: Vec<String>,
}

impl MemoryTransport {
    pub fn new<I, S>(requests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemoryTransport {
            incoming: requests.into_iter().map(Into::into).collect(),
            replies: Vec::new(),
        }
    }

    pub fn push(&mut self, request: impl Into<String>) {
        self.incoming.push_back(request.into());
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }
}

impl Transport for MemoryTransport {
    fn recv(&mut self) -> io::Result<Option<String>> {
        Ok(self.incoming.pop_front())
    }

    fn send(&mut self, reply: &str) -> io::Result<()> {
        self.replies.push(reply.to_string());
        Ok(())
    }
}
