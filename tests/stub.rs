//! Integration tests driving the resolver against in-process mock servers.
//!
//! Each mock is a TCP listener speaking just enough framed DNS to answer
//! the scripted scenario: it reads one framed query per connection, parses
//! it with the crate's own message type, and writes back whatever the
//! test's handler produces.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use stub_resolv::base::iana::Rtype;
use stub_resolv::base::message::Message;
use stub_resolv::base::name::Name;
use stub_resolv::rdata::RecordData;
use stub_resolv::stub::conf::ServerConf;
use stub_resolv::{QueryError, ResolvConf, StubResolver};

/// Sets up logging of events reported by the resolver and the tests.
///
/// Use the RUST_LOG environment variable to override the defaults, e.g.
/// `RUST_LOG=DEBUG` to watch the resolver fail over and chase referrals.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env(),
        )
        .without_time()
        .try_init()
        .ok();
}

//------------ Mock server helpers -------------------------------------------

/// Spawns a mock server on the given address.
///
/// Passing port 0 picks a free port; the actual port is returned together
/// with a counter of the queries received. The handler gets the parsed
/// query and the zero-based query number and returns the framed response.
async fn spawn_server<F>(
    ip: &str,
    port: u16,
    handler: F,
) -> (u16, Arc<AtomicUsize>)
where
    F: Fn(&Message, usize) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind((ip, port)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let Some(request) = read_query(&mut stream).await else {
                continue;
            };
            let response = handler(&request, n);
            let _ = stream.write_all(&response).await;
        }
    });
    (port, count)
}

/// Spawns a mock server that answers with a truncated frame.
///
/// The response announces a long message but only a single octet of it
/// ever arrives before the connection is closed.
async fn spawn_incomplete_server() -> (u16, Arc<AtomicUsize>) {
    spawn_server("127.0.0.1", 0, |_, _| vec![0x00, 0x50, 0x00]).await
}

/// Returns the port of a server that refuses connections.
async fn refused_port() -> u16 {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    listener.local_addr().unwrap().port()
    // The listener is dropped here; connecting to the port is refused.
}

async fn read_query(stream: &mut TcpStream) -> Option<Message> {
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await.ok()?;
    let len = usize::from(u16::from_be_bytes(len_buf));
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await.ok()?;
    Message::from_octets(Bytes::from(buf)).ok()
}

//------------ Wire building helpers -----------------------------------------

struct Rr {
    owner: String,
    rtype: u16,
    rdata: Vec<u8>,
}

fn rr(owner: &str, rtype: u16, rdata: Vec<u8>) -> Rr {
    Rr {
        owner: owner.into(),
        rtype,
        rdata,
    }
}

fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.split('.') {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

fn rdata_a(addr: Ipv4Addr) -> Vec<u8> {
    addr.octets().to_vec()
}

fn rdata_mx(preference: u16, host: &str) -> Vec<u8> {
    let mut out = preference.to_be_bytes().to_vec();
    out.extend_from_slice(&encode_name(host));
    out
}

/// Builds a framed response echoing the request's question.
fn build_response(
    request: &Message,
    answer: &[Rr],
    authority: &[Rr],
    additional: &[Rr],
) -> Vec<u8> {
    let mut msg = vec![0x00, 0x00, 0x81, 0x80];
    for count in [
        1u16,
        answer.len() as u16,
        authority.len() as u16,
        additional.len() as u16,
    ] {
        msg.extend_from_slice(&count.to_be_bytes());
    }
    msg.extend_from_slice(&encode_name(
        &request.question().qname().to_string(),
    ));
    msg.extend_from_slice(&request.question().qtype().to_be_bytes());
    msg.extend_from_slice(&1u16.to_be_bytes());
    for rec in answer.iter().chain(authority).chain(additional) {
        msg.extend_from_slice(&encode_name(&rec.owner));
        msg.extend_from_slice(&rec.rtype.to_be_bytes());
        msg.extend_from_slice(&1u16.to_be_bytes());
        msg.extend_from_slice(&300u32.to_be_bytes());
        msg.extend_from_slice(&(rec.rdata.len() as u16).to_be_bytes());
        msg.extend_from_slice(&rec.rdata);
    }
    let mut framed = (msg.len() as u16).to_be_bytes().to_vec();
    framed.extend_from_slice(&msg);
    framed
}

fn resolver_for(servers: &str) -> StubResolver {
    let mut conf = ResolvConf::new();
    conf.set_nameservers(servers);
    StubResolver::from_conf(conf)
}

fn name(s: &str) -> Name {
    s.parse().unwrap()
}

//------------ Scenarios -----------------------------------------------------

#[tokio::test]
async fn a_record_success() {
    init_logging();
    let (port, count) = spawn_server("127.0.0.1", 0, |request, _| {
        assert_eq!(request.question().qtype(), 1);
        build_response(
            request,
            &[rr(
                "www.example.com",
                1,
                rdata_a(Ipv4Addr::new(93, 184, 216, 34)),
            )],
            &[],
            &[],
        )
    })
    .await;

    let resolver = resolver_for(&format!("127.0.0.1:{}", port));
    let records = resolver
        .resolve(&name("www.example.com"), Rtype::A)
        .await
        .unwrap();
    assert_eq!(
        records,
        Some(vec![RecordData::A(Ipv4Addr::new(93, 184, 216, 34))])
    );
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn mx_with_glue() {
    init_logging();
    let (port, _) = spawn_server("127.0.0.1", 0, |request, _| {
        build_response(
            request,
            &[rr("example.org", 15, rdata_mx(10, "mx.example.org"))],
            &[],
            &[rr(
                "mx.example.org",
                1,
                rdata_a(Ipv4Addr::new(1, 2, 3, 4)),
            )],
        )
    })
    .await;

    let resolver = resolver_for(&format!("127.0.0.1:{}", port));
    let records = resolver
        .resolve(&name("example.org"), Rtype::Mx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(records.len(), 1);
    match records[0] {
        RecordData::Mx(ref mx) => {
            assert_eq!(mx.preference, 10);
            assert_eq!(mx.exchange, name("mx.example.org"));
            assert_eq!(
                mx.addresses,
                Some(vec![Ipv4Addr::new(1, 2, 3, 4)])
            );
        }
        ref other => panic!("expected MX, got {:?}", other),
    }
}

#[tokio::test]
async fn txt_records() {
    init_logging();
    let (port, _) = spawn_server("127.0.0.1", 0, |request, _| {
        build_response(
            request,
            &[rr(
                "example.net",
                16,
                b"\x05hello\x06 world".to_vec(),
            )],
            &[],
            &[],
        )
    })
    .await;

    let resolver = resolver_for(&format!("127.0.0.1:{}", port));
    let records = resolver
        .resolve(&name("example.net"), Rtype::Txt)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(records.len(), 1);
    match records[0] {
        RecordData::Txt(ref txt) => {
            assert_eq!(txt.as_bytes(), b"hello world");
        }
        ref other => panic!("expected TXT, got {:?}", other),
    }
}

#[tokio::test]
async fn failover_to_second_server() {
    init_logging();
    let (good, count) = spawn_server("127.0.0.2", 0, |request, _| {
        build_response(request, &[], &[], &[])
    })
    .await;
    let refused = refused_port().await;

    let resolver = resolver_for(&format!(
        "127.0.0.1:{};127.0.0.2:{}",
        refused, good
    ));
    let records = resolver
        .resolve(&name("www.example.com"), Rtype::A)
        .await
        .unwrap();
    // The second server answered with no data and no error surfaced.
    assert_eq!(records, None);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn single_server_surfaces_refusal() {
    init_logging();
    let refused = refused_port().await;
    let resolver = resolver_for(&format!("127.0.0.1:{}", refused));
    let err = resolver
        .resolve(&name("www.example.com"), Rtype::A)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::ConnectionRefused(ServerConf::with_port(
            "127.0.0.1",
            refused
        ))
    );
}

#[tokio::test]
async fn exhausted_pool_reports_no_server_alive() {
    init_logging();
    // Two pool entries on different loopback hosts, both refusing.
    let first = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let second = TcpListener::bind(("127.0.0.2", 0)).await.unwrap();
    let ports = (
        first.local_addr().unwrap().port(),
        second.local_addr().unwrap().port(),
    );
    drop((first, second));

    let resolver = resolver_for(&format!(
        "127.0.0.1:{};127.0.0.2:{}",
        ports.0, ports.1
    ));
    let err = resolver
        .resolve(&name("www.example.com"), Rtype::A)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::NoServerAlive);
}

#[tokio::test]
async fn incomplete_response_is_fatal() {
    init_logging();
    let (bad, _) = spawn_incomplete_server().await;
    let (good, count) = spawn_server("127.0.0.2", 0, |request, _| {
        build_response(request, &[], &[], &[])
    })
    .await;

    let resolver =
        resolver_for(&format!("127.0.0.1:{};127.0.0.2:{}", bad, good));
    let err = resolver
        .resolve(&name("www.example.com"), Rtype::A)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::IncompleteResponse(ServerConf::with_port(
            "127.0.0.1",
            bad
        ))
    );
    // No failover happened after the broken response.
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ns_referral_is_followed() {
    init_logging();
    let (delegated, delegated_count) =
        spawn_server("127.0.0.2", 0, |request, _| {
            build_response(
                request,
                &[rr(
                    "www.example.com",
                    1,
                    rdata_a(Ipv4Addr::new(192, 0, 2, 80)),
                )],
                &[],
                &[],
            )
        })
        .await;
    let (entry, entry_count) = spawn_server("127.0.0.1", 0, |request, _| {
        build_response(
            request,
            &[],
            &[rr("example.com", 2, encode_name("127.0.0.2"))],
            &[],
        )
    })
    .await;

    let mut conf = ResolvConf::new();
    conf.set_nameservers(&format!("127.0.0.1:{}", entry));
    conf.options.referral_port = delegated;
    let resolver = StubResolver::from_conf(conf);

    let records = resolver
        .resolve(&name("www.example.com"), Rtype::A)
        .await
        .unwrap();
    assert_eq!(
        records,
        Some(vec![RecordData::A(Ipv4Addr::new(192, 0, 2, 80))])
    );
    assert_eq!(entry_count.load(Ordering::SeqCst), 1);
    assert_eq!(delegated_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn referral_loop_exhausts_hops() {
    init_logging();
    // Two servers on the same port of two loopback addresses, each
    // referring every query to the other one.
    let (port, first_count) = spawn_server("127.0.0.1", 0, |request, _| {
        build_response(
            request,
            &[],
            &[rr("example.com", 2, encode_name("127.0.0.2"))],
            &[],
        )
    })
    .await;
    let (_, second_count) =
        spawn_server("127.0.0.2", port, |request, _| {
            build_response(
                request,
                &[],
                &[rr("example.com", 2, encode_name("127.0.0.1"))],
                &[],
            )
        })
        .await;

    let mut conf = ResolvConf::new();
    conf.set_nameservers(&format!("127.0.0.1:{}", port));
    conf.options.referral_port = port;
    let resolver = StubResolver::from_conf(conf);

    let err = resolver
        .resolve(&name("www.example.com"), Rtype::A)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::TooManyHops);
    // The initial query plus ten followed referrals.
    assert_eq!(
        first_count.load(Ordering::SeqCst)
            + second_count.load(Ordering::SeqCst),
        11
    );
}

#[tokio::test]
async fn reverse_lookup_is_forward_confirmed() {
    init_logging();
    let (port, _) = spawn_server("127.0.0.1", 0, |request, _| {
        let qname = request.question().qname().to_string();
        match (qname.as_str(), request.question().qtype()) {
            ("4.3.2.1.in-addr.arpa", 12) => build_response(
                request,
                &[
                    rr(
                        "4.3.2.1.in-addr.arpa",
                        12,
                        encode_name("host1.example"),
                    ),
                    rr(
                        "4.3.2.1.in-addr.arpa",
                        12,
                        encode_name("host2.example"),
                    ),
                ],
                &[],
                &[],
            ),
            ("host1.example", 1) => build_response(
                request,
                &[rr(
                    "host1.example",
                    1,
                    rdata_a(Ipv4Addr::new(1, 2, 3, 4)),
                )],
                &[],
                &[],
            ),
            ("host2.example", 1) => build_response(
                request,
                &[rr(
                    "host2.example",
                    1,
                    rdata_a(Ipv4Addr::new(9, 9, 9, 9)),
                )],
                &[],
                &[],
            ),
            _ => build_response(request, &[], &[], &[]),
        }
    })
    .await;

    let resolver = resolver_for(&format!("127.0.0.1:{}", port));
    let found = resolver
        .lookup_addr(Ipv4Addr::new(1, 2, 3, 4))
        .await
        .unwrap()
        .expect("no confirmed names");
    let names: Vec<String> =
        found.iter().map(|name| name.to_string()).collect();
    assert_eq!(names, vec!["host1.example".to_string()]);
}

#[tokio::test]
async fn reverse_lookup_without_ptr_data() {
    init_logging();
    let (port, _) = spawn_server("127.0.0.1", 0, |request, _| {
        build_response(request, &[], &[], &[])
    })
    .await;

    let resolver = resolver_for(&format!("127.0.0.1:{}", port));
    let found = resolver
        .lookup_addr(Ipv4Addr::new(192, 0, 2, 1))
        .await
        .unwrap();
    assert!(found.is_none());
}
