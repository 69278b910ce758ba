use std::net::SocketAddr;
use std::time::Duration;

use fs6ipc_block::BlockBuilder;
use fs6ipc_executor::{request_channel, Executor, ExecutorConfig, FixedCadence, Inbox};
use fs6ipc_server::{ClientError, IpcClient, ServerConfig, TransportServer, WireReply};
use fs6ipc_telemetry::{HandshakeIdentity, StaticSource, TelemetryEncoder};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

struct Harness {
    addr: SocketAddr,
    shutdown: CancellationToken,
    executor: Option<FixedCadence<StaticSource>>,
    _inbox: Option<Inbox>,
}

impl Harness {
    /// Server plus an executor ticking every millisecond.
    async fn start() -> Self {
        Self::start_with(ServerConfig::default(), true).await
    }

    async fn start_with(mut config: ServerConfig, run_executor: bool) -> Self {
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        let shutdown = CancellationToken::new();
        let (submitter, inbox) = request_channel();

        let (executor, idle_inbox) = if run_executor {
            let mut source = StaticSource::new();
            source.set("sim/flightmodel/position/indicated_airspeed", 120.0);
            let encoder = TelemetryEncoder::new(source, HandshakeIdentity::default());
            let executor = Executor::new(
                encoder,
                inbox,
                ExecutorConfig {
                    cadence: Duration::from_millis(1),
                    ..ExecutorConfig::default()
                },
            );
            let runner = FixedCadence::spawn(executor, shutdown.clone())
                .expect("executor thread should spawn");
            (Some(runner), None)
        } else {
            (None, Some(inbox))
        };

        let server = TransportServer::bind(config, submitter, &shutdown)
            .await
            .expect("server should bind");
        let addr = server.local_addr().expect("bound address should be known");
        tokio::spawn(server.serve(shutdown.clone()));

        Self {
            addr,
            shutdown,
            executor,
            _inbox: idle_inbox,
        }
    }

    async fn client(&self) -> IpcClient {
        IpcClient::connect(self.addr)
            .await
            .expect("client should connect")
    }

    async fn stop(self) {
        self.shutdown.cancel();
        if let Some(runner) = self.executor {
            tokio::task::spawn_blocking(move || runner.join())
                .await
                .expect("join task should not panic")
                .expect("executor should stop cleanly");
        }
    }
}

fn failure(reply: WireReply) -> String {
    match reply {
        WireReply::Failure { error, .. } => error,
        other => panic!("expected failure reply, got {other:?}"),
    }
}

#[tokio::test]
async fn read_of_unmapped_offset_round_trips() {
    let harness = Harness::start().await;
    let mut client = harness.client().await;

    let hex = "010000000003000004000000000000000000000000000000";
    let reply = client
        .send_raw(&format!(
            r#"{{"cmd":"ipc","dwData":7,"cbData":24,"hex":"{hex}"}}"#
        ))
        .await
        .expect("request should be answered");
    assert_eq!(
        reply,
        WireReply::Success {
            ok: true,
            reply_hex: hex.to_string(),
            reply_dw_data: 7,
        }
    );

    harness.stop().await;
}

#[tokio::test]
async fn handshake_offsets_are_served() {
    let harness = Harness::start().await;
    let mut client = harness.client().await;

    let mut builder = BlockBuilder::new();
    let version = builder.read(0x3304, 4);
    let fs_version = builder.read(0x3308, 2);
    let signature = builder.read(0x330A, 2);
    let reply = client
        .call(11, &builder.finish())
        .await
        .expect("call should succeed");

    assert_eq!(reply.correlation_id, 11);
    assert_eq!(version.extract(&reply.payload), Some(&[0x00, 0x00, 0x05, 0x75][..]));
    assert_eq!(fs_version.extract(&reply.payload), Some(&[14, 0][..]));
    assert_eq!(signature.extract(&reply.payload), Some(&[0xDE, 0xFA][..]));

    harness.stop().await;
}

#[tokio::test]
async fn malformed_requests_keep_the_connection() {
    let harness = Harness::start().await;
    let mut client = harness.client().await;

    let odd = client
        .send_raw(r#"{"cmd":"ipc","dwData":1,"hex":"ABC"}"#)
        .await
        .unwrap();
    assert_eq!(failure(odd), "hex length must be even");

    let bad_hex = client.send_raw(r#"{"cmd":"ipc","hex":"XY"}"#).await.unwrap();
    assert!(failure(bad_hex).starts_with("invalid hex: "));

    let bad_json = client.send_raw("{\"cmd\":").await.unwrap();
    assert!(failure(bad_json).starts_with("invalid json: "));

    let unknown = client.send_raw(r#"{"cmd":" Status "}"#).await.unwrap();
    assert_eq!(failure(unknown), "unknown cmd: status");

    let truncated = client.call(2, &[1, 0, 0, 0, 0, 3]).await.unwrap_err();
    assert!(matches!(truncated, ClientError::Server(msg) if msg == "READ header truncated"));

    let ok = client.call(3, &[0, 0, 0, 0]).await.unwrap();
    assert_eq!(ok.payload, vec![0, 0, 0, 0]);

    harness.stop().await;
}

#[tokio::test]
async fn unanswered_request_times_out_and_connection_survives() {
    let config = ServerConfig {
        reply_timeout: Duration::from_millis(100),
        ..ServerConfig::default()
    };
    let harness = Harness::start_with(config, false).await;
    let mut client = harness.client().await;

    let err = client.call(5, &[0, 0, 0, 0]).await.unwrap_err();
    assert!(matches!(err, ClientError::Server(msg) if msg == "timeout"));

    let next = client.send_raw("not json").await.unwrap();
    assert!(failure(next).starts_with("invalid json: "));

    harness.stop().await;
}

#[tokio::test]
async fn over_long_line_is_rejected_then_next_line_served() {
    let config = ServerConfig {
        max_line_length: 64,
        ..ServerConfig::default()
    };
    let harness = Harness::start_with(config, true).await;
    let stream = TcpStream::connect(harness.addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut replies = BufReader::new(read).lines();

    let long = format!("{{\"cmd\":\"ipc\",\"hex\":\"{}\"}}\n", "00".repeat(64));
    write.write_all(long.as_bytes()).await.unwrap();
    write
        .write_all(b"{\"cmd\":\"ipc\",\"dwData\":9,\"hex\":\"00000000\"}\r\n")
        .await
        .unwrap();

    assert_eq!(
        replies.next_line().await.unwrap().unwrap(),
        r#"{"ok":false,"error":"line too long"}"#
    );
    assert_eq!(
        replies.next_line().await.unwrap().unwrap(),
        r#"{"ok":true,"replyHex":"00000000","replyDwData":9}"#
    );

    harness.stop().await;
}

#[tokio::test]
async fn concurrent_clients_get_their_own_replies() {
    let harness = Harness::start().await;
    let mut tasks = tokio::task::JoinSet::new();

    for id in 0..8u32 {
        let addr = harness.addr;
        tasks.spawn(async move {
            let mut client = IpcClient::connect(addr).await.unwrap();
            for round in 0..5u32 {
                let dw_data = id * 100 + round;
                let reply = client.call(dw_data, &[0, 0, 0, 0]).await.unwrap();
                assert_eq!(reply.correlation_id, dw_data);
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.expect("client task should not panic");
    }

    harness.stop().await;
}
