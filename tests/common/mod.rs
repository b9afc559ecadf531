#![allow(dead_code)]

use pollftpd::config::Config;
use pollftpd::context::Context;
use pollftpd::core_fs::LocalFileSystem;
use pollftpd::core_log::clock::SystemClock;
use pollftpd::server::Server;
use socket2::SockRef;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// A server ticking on a background thread over a temporary root.
pub struct TestServer {
    pub addr: SocketAddrV4,
    pub root: TempDir,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start() -> Self {
        let root = TempDir::new().unwrap();
        let config = Config::default();
        let fs = Arc::new(LocalFileSystem::new(root.path()));
        let context = Arc::new(Context::new(&config, fs, Arc::new(SystemClock)));

        let mut server =
            Server::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0), context).unwrap();
        let addr = server.local_addr();

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                server.tick();
                thread::sleep(Duration::from_millis(1));
            }
        });

        Self {
            addr,
            root,
            stop,
            handle: Some(handle),
        }
    }

    pub fn path(&self, relative: &str) -> std::path::PathBuf {
        self.root.path().join(relative)
    }

    pub fn write_file(&self, relative: &str, contents: &[u8]) {
        std::fs::write(self.path(relative), contents).unwrap();
    }

    pub fn mkdir(&self, relative: &str) {
        std::fs::create_dir_all(self.path(relative)).unwrap();
    }

    pub fn read_file(&self, relative: &str) -> Vec<u8> {
        std::fs::read(self.path(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        Path::new(&self.path(relative)).exists()
    }

    /// Connects a client and consumes the greeting.
    pub fn client(&self) -> Client {
        let mut client = Client::connect(self.addr);
        let greeting = client.read_reply();
        assert_eq!(greeting, "220 Hello!");
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub struct Client {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Client {
    pub fn connect(addr: SocketAddrV4) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(IO_TIMEOUT)).unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        Self {
            writer: stream,
            reader,
        }
    }

    pub fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .unwrap();
    }

    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).unwrap();
    }

    /// Sends `byte` as TCP urgent data.
    pub fn send_urgent(&mut self, byte: u8) {
        SockRef::from(&self.writer)
            .send_out_of_band(&[byte])
            .unwrap();
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string()
    }

    /// Reads one reply. Multi-line replies come back joined with `\n`.
    pub fn read_reply(&mut self) -> String {
        let first = self.read_line();
        assert!(first.len() >= 3, "short reply {:?}", first);
        if first.as_bytes().get(3) != Some(&b'-') {
            return first;
        }

        let terminator = format!("{} ", &first[..3]);
        let mut lines = vec![first];
        loop {
            let line = self.read_line();
            let done = line.starts_with(&terminator);
            lines.push(line);
            if done {
                return lines.join("\n");
            }
        }
    }

    pub fn cmd(&mut self, line: &str) -> String {
        self.send(line);
        self.read_reply()
    }

    /// True once the server has closed the control connection.
    pub fn is_closed(&mut self) -> bool {
        let mut buf = [0u8; 1];
        match self.reader.read(&mut buf) {
            Ok(0) => true,
            Ok(_) => false,
            Err(e) => !matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
        }
    }

    /// Issues PASV and connects to the announced address.
    pub fn pasv(&mut self) -> TcpStream {
        let reply = self.cmd("PASV");
        assert!(reply.starts_with("227 "), "unexpected {:?}", reply);
        let data = TcpStream::connect(parse_pasv(&reply)).unwrap();
        data.set_read_timeout(Some(IO_TIMEOUT)).unwrap();
        data
    }

    /// Opens a local listener and announces it with PORT.
    pub fn port(&mut self) -> TcpListener {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let reply = self.cmd(&format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff));
        assert_eq!(reply, "200 OK");
        listener
    }
}

pub fn parse_pasv(reply: &str) -> SocketAddr {
    let fields: Vec<u16> = reply[4..]
        .trim()
        .split(',')
        .map(|field| field.parse().unwrap())
        .collect();
    assert_eq!(fields.len(), 6, "bad PASV reply {:?}", reply);
    let ip = Ipv4Addr::new(
        fields[0] as u8,
        fields[1] as u8,
        fields[2] as u8,
        fields[3] as u8,
    );
    SocketAddr::from((ip, (fields[4] << 8) | fields[5]))
}

/// Reads a data connection to the end, then drops it.
pub fn drain(mut data: TcpStream) -> Vec<u8> {
    let mut received = Vec::new();
    data.read_to_end(&mut received).unwrap();
    received
}
