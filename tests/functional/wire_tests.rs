//! The fred-backed client against minimal RESP servers on loopback.
//!
//! Each `FakeServer` answers through a handler function and records every
//! command it receives, so tests can assert on exactly what went over the
//! wire without a real Sentinel or Redis.

use std::error::Error as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use daisy::client::{ReplicaAddress, ValkeyClientConfig};
use daisy::pool::{OutcomeStatus, SyncPolicy};
use daisy::{Error, RunContext, run_create};

type Handler = Arc<dyn Fn(&[String]) -> Vec<u8> + Send + Sync>;
type CommandLog = Arc<Mutex<Vec<Vec<String>>>>;

/// Loopback server speaking just enough RESP for the client.
struct FakeServer {
    address: ReplicaAddress,
    commands: CommandLog,
}

impl FakeServer {
    async fn start(handler: impl Fn(&[String]) -> Vec<u8> + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let commands: CommandLog = Arc::default();

        let handler: Handler = Arc::new(handler);
        let log = commands.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, handler.clone(), log.clone()));
            }
        });

        Self {
            address: ReplicaAddress::new("127.0.0.1", port),
            commands,
        }
    }

    /// Received commands named `name`, with their arguments.
    fn received(&self, name: &str) -> Vec<Vec<String>> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c[0].eq_ignore_ascii_case(name))
            .cloned()
            .collect()
    }
}

async fn serve(stream: TcpStream, handler: Handler, log: CommandLog) {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    while let Some(command) = read_command(&mut reader).await {
        let Some(name) = command.first().map(|n| n.to_ascii_uppercase()) else {
            continue;
        };
        let reply = match name.as_str() {
            "QUIT" => b"+OK\r\n".to_vec(),
            "PING" => b"+PONG\r\n".to_vec(),
            _ => handler(&command),
        };
        log.lock().unwrap().push(command);

        if write.write_all(&reply).await.is_err() || name == "QUIT" {
            break;
        }
    }
}

async fn read_command<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<Vec<String>> {
    let count: usize = read_line(reader).await?.strip_prefix('*')?.parse().ok()?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        let len: usize = read_line(reader).await?.strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    Some(args)
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end().to_string()),
    }
}

fn bulk_array(items: &[&str]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", items.len());
    for item in items {
        out.push_str(&format!("${}\r\n{}\r\n", item.len(), item));
    }
    out.into_bytes()
}

/// Sentinel predating 5.0: knows `slaves` but not `replicas`.
fn sentinel(master_known: bool) -> impl Fn(&[String]) -> Vec<u8> + Send + Sync + 'static {
    move |command| {
        let sub = command.get(1).map(|s| s.to_ascii_lowercase()).unwrap_or_default();
        match sub.as_str() {
            "get-master-addr-by-name" if master_known => bulk_array(&["m1", "6379"]),
            "get-master-addr-by-name" => b"*-1\r\n".to_vec(),
            "slaves" => {
                let mut out = b"*2\r\n".to_vec();
                for host in ["h1", "h2"] {
                    let name = format!("{}:6379", host);
                    out.extend(bulk_array(&[
                        "name",
                        name.as_str(),
                        "ip",
                        host,
                        "port",
                        "6379",
                        "flags",
                        "slave",
                        "master-link-status",
                        "ok",
                    ]));
                }
                out
            }
            _ => format!("-ERR Unknown sentinel subcommand '{}'\r\n", sub).into_bytes(),
        }
    }
}

/// Replica predating 5.0: accepts `SLAVEOF` only.
fn replica(command: &[String]) -> Vec<u8> {
    if command[0].eq_ignore_ascii_case("REPLICAOF") {
        b"-ERR unknown command 'REPLICAOF'\r\n".to_vec()
    } else {
        b"+OK\r\n".to_vec()
    }
}

/// Loopback address nothing listens on.
async fn closed_port() -> ReplicaAddress {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    ReplicaAddress::new("127.0.0.1", port)
}

fn context(
    sentinel: &ReplicaAddress,
    candidates: Vec<ReplicaAddress>,
    policy: SyncPolicy,
) -> RunContext {
    let client = ValkeyClientConfig::new()
        .with_connection_timeout(Duration::from_secs(2))
        .with_command_timeout(Duration::from_secs(5));

    let mut ctx = RunContext::new("pod1", sentinel.clone(), candidates, policy);
    ctx.sentinel_client = client.clone();
    ctx.replica_client = client;
    ctx
}

#[tokio::test]
async fn test_ring_run_over_the_wire() {
    let sentinel = FakeServer::start(sentinel(true)).await;
    let first = FakeServer::start(replica).await;
    let second = FakeServer::start(replica).await;
    let down = closed_port().await;

    let candidates = vec![first.address.clone(), down.clone(), second.address.clone()];
    let ctx = context(&sentinel.address, candidates, SyncPolicy::Ring);

    let report = run_create(&ctx).await.unwrap();

    assert_eq!(report.master, Some(ReplicaAddress::new("m1", 6379)));
    assert_eq!(report.primary_pool.len(), 2);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.outcomes[1].status,
        OutcomeStatus::ConnectFailed { .. }
    ));
    assert_eq!(report.outcomes[1].source, ReplicaAddress::new("h2", 6379));

    assert_eq!(
        sentinel.received("SENTINEL"),
        vec![
            vec!["SENTINEL", "get-master-addr-by-name", "pod1"],
            vec!["SENTINEL", "slaves", "pod1"],
        ]
    );
    for candidate in [&first, &second] {
        assert_eq!(candidate.received("SLAVEOF"), vec![vec!["SLAVEOF", "h1", "6379"]]);
        assert!(candidate.received("REPLICAOF").is_empty());
    }
}

#[tokio::test]
async fn test_unreachable_sentinel_is_fatal() {
    let sentinel = closed_port().await;
    let candidate = FakeServer::start(replica).await;
    let ctx = context(&sentinel, vec![candidate.address.clone()], SyncPolicy::Single);

    let err = run_create(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::SentinelConnect { ref address, .. } if *address == sentinel));
    assert_eq!(err.exit_code(), 1);
    assert!(candidate.commands.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_nil_master_reply_names_pod() {
    let sentinel = FakeServer::start(sentinel(false)).await;
    let candidate = FakeServer::start(replica).await;
    let ctx = context(&sentinel.address, vec![candidate.address.clone()], SyncPolicy::Ring);

    let err = run_create(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::MasterLookup { ref pod, .. } if pod == "pod1"));
    assert_eq!(err.exit_code(), 1);
    let cause = err.source().unwrap().to_string();
    assert_eq!(cause, "Sentinel does not monitor pod 'pod1'");

    assert_eq!(sentinel.received("SENTINEL").len(), 1);
    assert!(candidate.received("SLAVEOF").is_empty());
}

#[tokio::test]
async fn test_no_candidates_never_dials_sentinel() {
    let sentinel = closed_port().await;
    let mut ctx = context(&sentinel, Vec::new(), SyncPolicy::Single);
    ctx.pod = String::new();

    let report = run_create(&ctx).await.unwrap();

    assert!(report.outcomes.is_empty());
    assert!(report.master.is_none());
    assert!(!report.has_failures());
}
