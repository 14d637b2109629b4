use std::net::SocketAddr;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use redlink::client::Client;
use redlink::frame::Reply;
use redlink::Error;

/// Spawns a scripted peer: for each canned reply it reads one request
/// line, records it, and writes the reply back. The join handle yields
/// the recorded request lines (CRLF stripped).
async fn spawn_scripted_peer(replies: Vec<Vec<u8>>) -> (SocketAddr, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut reader = BufReader::new(read_half);

        let mut requests = Vec::new();
        for reply in replies {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            requests.push(line.trim_end().to_string());

            write_half.write_all(&reply).await.unwrap();
        }
        requests
    });

    (addr, handle)
}

#[tokio::test]
async fn get_returns_bulk_value() {
    let (addr, peer) = spawn_scripted_peer(vec![b"$5\r\nhello\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let value = client.get("mykey").await.unwrap();

    assert_eq!(value, "hello");
    assert_eq!(peer.await.unwrap(), vec!["GET \"mykey\""]);
}

#[tokio::test]
async fn get_missing_key_is_not_found() {
    let (addr, _peer) = spawn_scripted_peer(vec![b"$-1\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let err = client.get("nope").await.unwrap_err();

    assert!(matches!(err, Error::NotFound));
}

#[tokio::test]
async fn set_returns_simple_string() {
    let (addr, peer) = spawn_scripted_peer(vec![b"+OK\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let value = client.set("mykey", "two words").await.unwrap();

    assert_eq!(value, "OK");
    assert_eq!(peer.await.unwrap(), vec!["SET \"mykey\" \"two words\""]);
}

#[tokio::test]
async fn ttl_returns_integer() {
    let (addr, _peer) = spawn_scripted_peer(vec![b":42\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let value = client.ttl("mykey").await.unwrap();

    assert_eq!(value, 42);
}

#[tokio::test]
async fn keys_returns_string_array() {
    let (addr, _peer) = spawn_scripted_peer(vec![b"*2\r\n$1\r\na\r\n$1\r\nb\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let value = client.keys("*").await.unwrap();

    assert_eq!(value, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn server_error_surfaces_verbatim() {
    let (addr, _peer) = spawn_scripted_peer(vec![b"-ERR unknown command\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let err = client.get("mykey").await.unwrap_err();

    assert!(matches!(err, Error::Server(ref msg) if msg == "ERR unknown command"));
}

#[tokio::test]
async fn exists_projects_integer_to_bool() {
    let (addr, _peer) = spawn_scripted_peer(vec![b":1\r\n".to_vec(), b":0\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    assert!(client.exists("present").await.unwrap());
    assert!(!client.exists("absent").await.unwrap());
}

#[tokio::test]
async fn integer_projection_of_text_is_a_parse_failure() {
    let (addr, _peer) = spawn_scripted_peer(vec![b"+abc\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let err = client.ttl("mykey").await.unwrap_err();

    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn string_projection_of_array_is_a_type_mismatch() {
    let (addr, _peer) = spawn_scripted_peer(vec![b"*1\r\n$1\r\na\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let err = client.get("mykey").await.unwrap_err();

    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[tokio::test]
async fn string_array_projection_rejects_null_element() {
    let (addr, _peer) =
        spawn_scripted_peer(vec![b"*2\r\n$1\r\na\r\n$-1\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let err = client.keys("*").await.unwrap_err();

    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[tokio::test]
async fn string_array_projection_rejects_nested_array_element() {
    let (addr, _peer) =
        spawn_scripted_peer(vec![b"*2\r\n$1\r\na\r\n*1\r\n$1\r\nb\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let err = client.smembers("myset").await.unwrap_err();

    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[tokio::test]
async fn run_command_returns_the_raw_reply() {
    let (addr, peer) = spawn_scripted_peer(vec![b"+PONG\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let reply = client.run_command("PING", &[]).await.unwrap();

    assert_eq!(reply, Reply::Simple("PONG".to_string()));
    assert_eq!(peer.await.unwrap(), vec!["PING"]);
}

#[tokio::test]
async fn run_array_command_preserves_element_kinds() {
    let reply_bytes = b"*3\r\n$1\r\na\r\n$-1\r\n*1\r\n:1\r\n".to_vec();
    let (addr, _peer) = spawn_scripted_peer(vec![reply_bytes]).await;
    let mut client = Client::connect(addr).await.unwrap();

    let elements = client.run_array_command("XRANGE", &["s", "-", "+"]).await.unwrap();

    assert_eq!(
        elements,
        vec![
            Reply::Bulk(Bytes::from("a")),
            Reply::Null,
            Reply::Array(vec![Reply::Integer("1".to_string())]),
        ]
    );
}

#[tokio::test]
async fn commands_run_serially_on_one_connection() {
    let (addr, peer) = spawn_scripted_peer(vec![
        b"+OK\r\n".to_vec(),
        b"$5\r\nhello\r\n".to_vec(),
        b":1\r\n".to_vec(),
    ])
    .await;
    let mut client = Client::connect(addr).await.unwrap();

    assert_eq!(client.set("k", "hello").await.unwrap(), "OK");
    assert_eq!(client.get("k").await.unwrap(), "hello");
    assert_eq!(client.del(&["k"]).await.unwrap(), "1");

    assert_eq!(
        peer.await.unwrap(),
        vec!["SET \"k\" \"hello\"", "GET \"k\"", "DEL \"k\""]
    );
}

#[tokio::test]
async fn client_stays_usable_after_a_server_error() {
    let (addr, _peer) = spawn_scripted_peer(vec![
        b"-ERR wrong number of arguments\r\n".to_vec(),
        b"+PONG\r\n".to_vec(),
    ])
    .await;
    let mut client = Client::connect(addr).await.unwrap();

    let err = client.get("mykey").await.unwrap_err();
    assert!(matches!(err, Error::Server(_)));

    assert_eq!(client.ping().await.unwrap(), "PONG");
}

#[tokio::test]
async fn close_shuts_the_connection_down() {
    let (addr, _peer) = spawn_scripted_peer(vec![b"+PONG\r\n".to_vec()]).await;
    let mut client = Client::connect(addr).await.unwrap();

    client.ping().await.unwrap();

    client.close().await.unwrap();
}
