mod common;

use common::{drain, TestServer};
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

fn lines(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.is_empty() || text.ends_with("\r\n"), "{:?}", text);
    text.split("\r\n")
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[test]
fn pasv_list() {
    let server = TestServer::start();
    server.write_file("a.txt", b"abc");
    server.mkdir("sub");
    let mut client = server.client();

    let data = client.pasv();
    client.send("LIST");
    assert_eq!(client.read_reply(), "150 Ready");
    let listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");

    assert_eq!(listing.len(), 2, "{:?}", listing);
    let file = listing.iter().find(|l| l.ends_with(" a.txt")).unwrap();
    assert!(file.starts_with("-rw"), "{:?}", file);
    assert!(file.contains(" 1 ftp ftp 3 "), "{:?}", file);
    let dir = listing.iter().find(|l| l.ends_with(" sub")).unwrap();
    assert!(dir.starts_with('d'), "{:?}", dir);
}

#[test]
fn pasv_announces_an_ephemeral_port() {
    let server = TestServer::start();
    let mut client = server.client();

    let reply = client.cmd("PASV");
    let addr = common::parse_pasv(&reply);
    assert_eq!(addr.ip().to_string(), "127.0.0.1");
    assert_ne!(addr.port(), 0);
    assert_ne!(addr.port(), server.addr.port());
}

#[test]
fn list_tolerates_ls_flags() {
    let server = TestServer::start();
    server.mkdir("sub");
    server.write_file("sub/inner.txt", b"");
    let mut client = server.client();

    let data = client.pasv();
    client.send("LIST -al sub");
    assert_eq!(client.read_reply(), "150 Ready");
    let listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(listing.len(), 1);
    assert!(listing[0].ends_with(" inner.txt"));

    let data = client.pasv();
    client.send("LIST -a");
    assert_eq!(client.read_reply(), "150 Ready");
    let listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");
    assert!(listing[0].ends_with(" sub"));
}

#[test]
fn port_retr_delivers_exact_bytes() {
    let server = TestServer::start();
    server.write_file("file.txt", b"0123456789");
    let mut client = server.client();

    let listener = client.port();
    client.send("RETR file.txt");
    let (data, _) = listener.accept().unwrap();
    assert_eq!(client.read_reply(), "150 Ready");
    assert_eq!(drain(data), b"0123456789");
    assert_eq!(client.read_reply(), "226 OK");
}

#[test]
fn pasv_retr_large_file() {
    let server = TestServer::start();
    let contents: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    server.write_file("big.bin", &contents);
    let mut client = server.client();

    let data = client.pasv();
    client.send("RETR big.bin");
    assert_eq!(client.read_reply(), "150 Ready");
    assert_eq!(drain(data), contents);
    assert_eq!(client.read_reply(), "226 OK");
}

#[test]
fn rest_offsets_the_next_retr_only() {
    let server = TestServer::start();
    server.write_file("file.txt", b"0123456789");
    let mut client = server.client();

    assert_eq!(client.cmd("REST 4"), "200 OK");
    let data = client.pasv();
    client.send("RETR file.txt");
    assert_eq!(client.read_reply(), "150 Ready");
    assert_eq!(drain(data), b"456789");
    assert_eq!(client.read_reply(), "226 OK");

    let data = client.pasv();
    client.send("RETR file.txt");
    assert_eq!(client.read_reply(), "150 Ready");
    assert_eq!(drain(data), b"0123456789");
    assert_eq!(client.read_reply(), "226 OK");
}

#[test]
fn stat_counts_bytes_moved_after_the_restart_offset() {
    let server = TestServer::start();
    let mut client = server.client();

    assert_eq!(client.cmd("REST 4"), "200 OK");
    let mut data = client.pasv();
    client.send("STOR part.bin");
    assert_eq!(client.read_reply(), "150 Ready");
    data.write_all(b"ab").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while server.read_file("part.bin").len() < 6 {
        assert!(Instant::now() < deadline, "upload never reached the file");
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(
        client.cmd("STAT"),
        "211-FTP server status\n Transferred 2 bytes\n211 End"
    );

    drop(data);
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(server.read_file("part.bin"), b"\0\0\0\0ab");
}

#[test]
fn stor_creates_and_truncates() {
    let server = TestServer::start();
    server.write_file("up.txt", b"old contents that are long");
    let mut client = server.client();

    let mut data = client.pasv();
    client.send("STOR up.txt");
    assert_eq!(client.read_reply(), "150 Ready");
    data.write_all(b"hello").unwrap();
    drop(data);
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(server.read_file("up.txt"), b"hello");

    let mut data = client.pasv();
    client.send("STOR /new.bin");
    assert_eq!(client.read_reply(), "150 Ready");
    let payload = vec![7u8; 100_000];
    data.write_all(&payload).unwrap();
    drop(data);
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(server.read_file("new.bin"), payload);
}

#[test]
fn appe_and_rest_stor_keep_existing_bytes() {
    let server = TestServer::start();
    server.write_file("log.bin", b"abc");
    let mut client = server.client();

    let mut data = client.pasv();
    client.send("APPE log.bin");
    assert_eq!(client.read_reply(), "150 Ready");
    data.write_all(b"def").unwrap();
    drop(data);
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(server.read_file("log.bin"), b"abcdef");

    assert_eq!(client.cmd("REST 2"), "200 OK");
    let mut data = client.pasv();
    client.send("STOR log.bin");
    assert_eq!(client.read_reply(), "150 Ready");
    data.write_all(b"XY").unwrap();
    drop(data);
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(server.read_file("log.bin"), b"abXYef");
}

#[test]
fn port_stor() {
    let server = TestServer::start();
    let mut client = server.client();

    let listener = client.port();
    client.send("STOR pushed.txt");
    let (mut data, _) = listener.accept().unwrap();
    assert_eq!(client.read_reply(), "150 Ready");
    data.write_all(b"via port").unwrap();
    drop(data);
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(server.read_file("pushed.txt"), b"via port");
}

#[test]
fn transfers_need_pasv_or_port() {
    let server = TestServer::start();
    server.write_file("file.txt", b"x");
    let mut client = server.client();

    assert_eq!(client.cmd("RETR file.txt"), "503 Bad sequence of commands");
    assert_eq!(client.cmd("LIST"), "503 Bad sequence of commands");

    // Each PASV covers a single transfer.
    let data = client.pasv();
    client.send("RETR file.txt");
    assert_eq!(client.read_reply(), "150 Ready");
    drain(data);
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(client.cmd("NLST"), "503 Bad sequence of commands");
}

#[test]
fn open_failures() {
    let server = TestServer::start();
    server.mkdir("dir");
    let mut client = server.client();

    client.cmd("PASV");
    assert_eq!(client.cmd("RETR missing.txt"), "450 failed to open file");
    assert_eq!(client.cmd("RETR dir"), "450 failed to open file");
    assert_eq!(client.cmd("RETR ../x"), "553 Invalid argument");
}

#[test]
fn reserved_path_is_never_opened() {
    let server = TestServer::start();
    server.write_file("log.txt", b"server log");
    let mut client = server.client();

    client.cmd("PASV");
    assert_eq!(client.cmd("RETR log.txt"), "450 failed to open file");
    assert_eq!(client.cmd("STOR /log.txt"), "450 failed to open file");
    assert_eq!(client.cmd("APPE log.txt"), "450 failed to open file");
    assert_eq!(server.read_file("log.txt"), b"server log");
}

#[test]
fn abor_tears_down_a_pending_transfer() {
    let server = TestServer::start();
    server.write_file("file.txt", b"0123456789");
    let mut client = server.client();

    assert_eq!(client.cmd("ABOR"), "225 No transfer to abort");

    client.cmd("PASV");
    client.send("RETR file.txt");
    assert_eq!(client.cmd("ABOR"), "225 Aborted");
    assert_eq!(client.read_reply(), "425 Transfer aborted");
    assert_eq!(client.cmd("NOOP"), "200 OK");
    assert_eq!(client.cmd("RETR file.txt"), "503 Bad sequence of commands");
}

#[test]
fn urgent_abor_cancels_a_pending_transfer() {
    let server = TestServer::start();
    server.write_file("file.txt", b"0123456789");
    let mut client = server.client();

    client.cmd("PASV");
    client.send("RETR file.txt");
    assert_eq!(
        client.cmd("STAT"),
        "211-FTP server status\n Waiting for data connection\n211 End"
    );

    // Telnet IP and IAC in-band, then the data mark as urgent data.
    client.send_raw(&[0xFF, 0xF4, 0xFF]);
    client.send_urgent(0xF2);
    client.send("ABOR");
    assert_eq!(client.read_reply(), "225 Aborted");
    assert_eq!(client.read_reply(), "425 Transfer aborted");
    assert_eq!(client.cmd("NOOP"), "200 OK");
}

#[test]
fn urgent_data_drops_a_partial_command() {
    let server = TestServer::start();
    let mut client = server.client();

    client.send_raw(b"MKD half");
    client.send_urgent(0xF2);
    assert_eq!(client.cmd("PWD"), "257 \"/\"");
    assert!(!server.exists("half"));
    assert!(!server.exists("halfPWD"));
}

#[test]
fn failed_transfer_commands_release_the_passive_listener() {
    let server = TestServer::start();
    server.write_file("file.txt", b"0123456789");
    let mut client = server.client();

    let _data = client.pasv();
    assert_eq!(client.cmd("RETR missing.txt"), "450 failed to open file");
    assert_eq!(client.cmd("RETR file.txt"), "503 Bad sequence of commands");

    let _data = client.pasv();
    assert_eq!(client.cmd("LIST nope"), "550 No such file or directory");
    assert_eq!(client.cmd("LIST"), "503 Bad sequence of commands");

    let _data = client.pasv();
    assert_eq!(client.cmd("MLSD file.txt"), "501 Invalid argument");
    assert_eq!(client.cmd("MLSD"), "503 Bad sequence of commands");

    let data = client.pasv();
    client.send("RETR file.txt");
    assert_eq!(client.read_reply(), "150 Ready");
    assert_eq!(drain(data), b"0123456789");
    assert_eq!(client.read_reply(), "226 OK");
}

#[test]
fn list_includes_dangling_symlinks() {
    let server = TestServer::start();
    server.write_file("a.txt", b"abc");
    std::os::unix::fs::symlink("/nonexistent/target", server.path("broken")).unwrap();
    let mut client = server.client();

    let data = client.pasv();
    client.send("LIST");
    assert_eq!(client.read_reply(), "150 Ready");
    let listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(listing.len(), 2, "{:?}", listing);
    assert!(listing.iter().any(|l| l.ends_with(" a.txt")));
    assert!(listing.iter().any(|l| l.ends_with(" broken")));

    let data = client.pasv();
    client.send("MLSD");
    assert_eq!(client.read_reply(), "150 Ready");
    let listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");
    assert!(listing.iter().any(|l| l.ends_with(" broken")), "{:?}", listing);
}

#[test]
fn other_commands_are_refused_during_a_transfer() {
    let server = TestServer::start();
    server.write_file("file.txt", b"0123456789");
    let mut client = server.client();

    client.cmd("PASV");
    client.send("RETR file.txt");
    assert_eq!(client.cmd("CWD /"), "503 Bad sequence of commands");
    assert_eq!(client.cmd("NOOP"), "200 OK");
}

#[test]
fn stat_while_waiting_for_data_connection() {
    let server = TestServer::start();
    server.write_file("file.txt", b"0123456789");
    let mut client = server.client();

    client.cmd("PASV");
    client.send("RETR file.txt");
    assert_eq!(
        client.cmd("STAT"),
        "211-FTP server status\n Waiting for data connection\n211 End"
    );
    assert_eq!(client.cmd("ABOR"), "225 Aborted");
    assert_eq!(client.read_reply(), "425 Transfer aborted");
}

#[test]
fn quit_during_a_transfer() {
    let server = TestServer::start();
    server.write_file("file.txt", b"0123456789");
    let mut client = server.client();

    client.cmd("PASV");
    client.send("RETR file.txt");
    assert_eq!(client.cmd("QUIT"), "221 disconnecting");
    assert!(client.is_closed());
}

#[test]
fn mlsd_starts_with_cdir() {
    let server = TestServer::start();
    server.mkdir("sub");
    server.write_file("sub/a.txt", b"abc");
    server.mkdir("sub/inner");
    let mut client = server.client();

    let data = client.pasv();
    client.send("MLSD sub");
    assert_eq!(client.read_reply(), "150 Ready");
    let listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");

    assert_eq!(listing.len(), 3, "{:?}", listing);
    assert!(listing[0].starts_with("type=cdir;"), "{:?}", listing[0]);
    assert!(listing[0].ends_with(" /sub"));
    assert!(listing
        .iter()
        .any(|l| l.starts_with("type=file;size=3;") && l.ends_with(" a.txt")));
    assert!(listing
        .iter()
        .any(|l| l.starts_with("type=dir;") && l.ends_with(" inner")));
}

#[test]
fn mlsd_without_type_fact_skips_cdir() {
    let server = TestServer::start();
    server.write_file("a.txt", b"abc");
    let mut client = server.client();

    client.cmd("OPTS MLST Size;");
    let data = client.pasv();
    client.send("MLSD");
    assert_eq!(client.read_reply(), "150 Ready");
    let listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(listing, vec!["size=3; a.txt".to_string()]);
}

#[test]
fn mlsd_rejects_files() {
    let server = TestServer::start();
    server.write_file("a.txt", b"abc");
    let mut client = server.client();

    client.cmd("PASV");
    assert_eq!(client.cmd("MLSD a.txt"), "501 Invalid argument");
}

#[test]
fn nlst_sends_full_paths() {
    let server = TestServer::start();
    server.mkdir("sub");
    server.write_file("sub/x.txt", b"");
    server.write_file("sub/y.txt", b"");
    let mut client = server.client();

    assert_eq!(client.cmd("CWD sub"), "200 OK");
    let data = client.pasv();
    client.send("NLST");
    assert_eq!(client.read_reply(), "150 Ready");
    let mut listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");
    listing.sort();
    assert_eq!(listing, vec!["/sub/x.txt", "/sub/y.txt"]);

    let data = client.pasv();
    client.send("NLST x.txt");
    assert_eq!(client.read_reply(), "150 Ready");
    assert_eq!(lines(&drain(data)), vec!["/sub/x.txt"]);
    assert_eq!(client.read_reply(), "226 OK");
}

#[test]
fn list_of_a_single_file() {
    let server = TestServer::start();
    server.mkdir("sub");
    server.write_file("sub/x.txt", b"12");
    let mut client = server.client();

    let data = client.pasv();
    client.send("LIST sub/x.txt");
    assert_eq!(client.read_reply(), "150 Ready");
    let listing = lines(&drain(data));
    assert_eq!(client.read_reply(), "226 OK");
    assert_eq!(listing.len(), 1);
    assert!(listing[0].contains(" 1 ftp ftp 2 "));
    assert!(listing[0].ends_with(" x.txt"));
}

#[test]
fn stat_with_a_path_lists_over_control() {
    let server = TestServer::start();
    server.write_file("a.txt", b"abc");
    let mut client = server.client();

    let reply = client.cmd("STAT /");
    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines.len(), 3, "{:?}", reply);
    assert_eq!(lines[0], "213-Status");
    assert!(lines[1].starts_with(" -rw"), "{:?}", lines[1]);
    assert!(lines[1].ends_with(" a.txt"));
    assert_eq!(lines[2], "213 OK");

    assert_eq!(client.cmd("STAT missing"), "550 No such file or directory");
    assert_eq!(client.cmd("NOOP"), "200 OK");
}

#[test]
fn list_of_missing_path() {
    let server = TestServer::start();
    let mut client = server.client();

    client.cmd("PASV");
    assert_eq!(client.cmd("LIST nope"), "550 No such file or directory");
    assert_eq!(client.cmd("LIST ../"), "550 Invalid argument");
}

#[test]
fn sessions_are_independent() {
    let server = TestServer::start();
    server.mkdir("one");
    let mut first = server.client();
    let mut second = server.client();

    assert_eq!(first.cmd("CWD one"), "200 OK");
    assert_eq!(second.cmd("PWD"), "257 \"/\"");
    assert_eq!(first.cmd("PWD"), "257 \"/one\"");
}
