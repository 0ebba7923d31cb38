use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vset_rpc::{ChainClient, HttpChainClient, RpcError};

struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.to_string(),
        }
    }
}

/// Plain HTTP/1.1 responder answering every request from a closure and
/// recording each request target.
struct CannedNode {
    addr: String,
    targets: Arc<Mutex<Vec<String>>>,
}

impl CannedNode {
    async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let targets = Arc::new(Mutex::new(Vec::new()));
        let seen = targets.clone();
        let respond = Arc::new(respond);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let seen = seen.clone();
                let respond = respond.clone();
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = socket.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        head.extend_from_slice(&chunk[..n]);
                    }
                    let head = String::from_utf8_lossy(&head).to_string();
                    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(target.clone());

                    let reply = respond(&target);
                    let reason = if reply.status == 200 { "OK" } else { "Internal Server Error" };
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        reply.status,
                        reason,
                        reply.content_type,
                        reply.body.len(),
                        reply.body
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, targets }
    }

    fn client(&self) -> HttpChainClient {
        HttpChainClient::new("provider", &self.addr).unwrap()
    }

    fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

fn query_param(target: &str, key: &str) -> Option<String> {
    let query = target.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}

fn validators_page(indices: std::ops::Range<u64>, total: Option<u64>) -> Reply {
    let validators: Vec<_> = indices
        .map(|i| {
            json!({
                "address": format!("{:040X}", i),
                "pub_key": {"type": "tendermint/PubKeyEd25519", "value": "AAAA"},
                "voting_power": (10 + i).to_string(),
                "proposer_priority": "0"
            })
        })
        .collect();
    let count = validators.len().to_string();
    let mut result = json!({
        "block_height": "42",
        "validators": validators,
        "count": count,
    });
    if let Some(total) = total {
        result["total"] = json!(total.to_string());
    }
    Reply::json(json!({"jsonrpc": "2.0", "id": -1, "result": result}))
}

fn block_body(height: u64) -> Reply {
    Reply::json(json!({
        "jsonrpc": "2.0",
        "id": -1,
        "result": {
            "block_id": {"hash": "FF"},
            "block": {
                "header": {
                    "height": height.to_string(),
                    "time": "2024-01-01T00:00:42.5Z",
                    "validators_hash": "ABCD"
                },
                "data": {"txs": []},
                "evidence": {
                    "evidence": [{"type": "tendermint/DuplicateVoteEvidence", "value": {}}]
                },
                "last_commit": {
                    "height": (height - 1).to_string(),
                    "signatures": [{"validator_address": "AA"}, {"validator_address": "BB"}]
                }
            }
        }
    }))
}

#[tokio::test]
async fn test_validators_are_paged_until_total() {
    let node = CannedNode::start(|target| {
        let page: u64 = query_param(target, "page").unwrap().parse().unwrap();
        let start = (page - 1) * 100;
        validators_page(start..(start + 100).min(250), Some(250))
    })
    .await;

    let validators = node.client().validators_at(42).await.unwrap();
    assert_eq!(validators.len(), 250);
    assert_eq!(validators[0].voting_power, 10);
    assert_eq!(validators[249].address, format!("{:040X}", 249));

    let targets = node.targets();
    assert_eq!(targets.len(), 3);
    for (i, target) in targets.iter().enumerate() {
        assert!(target.starts_with("/validators?"));
        assert_eq!(query_param(target, "height").as_deref(), Some("42"));
        assert_eq!(query_param(target, "per_page").as_deref(), Some("100"));
        assert_eq!(query_param(target, "page"), Some((i + 1).to_string()));
    }
}

#[tokio::test]
async fn test_validators_without_total_stop_after_one_page() {
    let node = CannedNode::start(|_| validators_page(0..3, None)).await;

    let validators = node.client().validators_at(42).await.unwrap();
    assert_eq!(validators.len(), 3);
    assert_eq!(node.targets().len(), 1);
}

#[tokio::test]
async fn test_validators_stop_on_empty_page() {
    let node = CannedNode::start(|target| match query_param(target, "page").as_deref() {
        Some("1") => validators_page(0..100, Some(250)),
        _ => validators_page(0..0, Some(250)),
    })
    .await;

    let validators = node.client().validators_at(42).await.unwrap();
    assert_eq!(validators.len(), 100);
    assert_eq!(node.targets().len(), 2);
}

#[tokio::test]
async fn test_error_status_without_json_is_http_error() {
    let node = CannedNode::start(|_| Reply {
        status: 500,
        content_type: "text/html",
        body: "<html><body>Internal Server Error</body></html>".to_string(),
    })
    .await;

    match node.client().block_at(7).await {
        Err(RpcError::Http { status, url }) => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/block"));
        }
        other => panic!("unexpected result: {:?}", other.map(|f| f.block.height)),
    }
}

#[tokio::test]
async fn test_json_error_body_is_rpc_error_even_on_error_status() {
    let node = CannedNode::start(|_| Reply {
        status: 500,
        content_type: "application/json",
        body: json!({
            "jsonrpc": "2.0",
            "id": -1,
            "error": {
                "code": -32603,
                "message": "Internal error",
                "data": "height 900 must be less than or equal to the current blockchain height 800"
            }
        })
        .to_string(),
    })
    .await;

    match node.client().block_at(900).await {
        Err(RpcError::Rpc { code, data, .. }) => {
            assert_eq!(code, -32603);
            assert!(data.unwrap().contains("current blockchain height"));
        }
        other => panic!("unexpected result: {:?}", other.map(|f| f.block.height)),
    }
}

#[tokio::test]
async fn test_block_with_wrong_height_is_rejected() {
    let node = CannedNode::start(|_| block_body(8)).await;

    match node.client().block_at(7).await {
        Err(RpcError::UnexpectedHeight { requested, returned }) => {
            assert_eq!(requested, 7);
            assert_eq!(returned, 8);
        }
        other => panic!("unexpected result: {:?}", other.map(|f| f.block.height)),
    }
}

#[tokio::test]
async fn test_status_and_block() {
    let node = CannedNode::start(|target| {
        if target.starts_with("/status") {
            Reply::json(json!({
                "jsonrpc": "2.0",
                "id": -1,
                "result": {"sync_info": {"latest_block_height": "12345"}}
            }))
        } else {
            let height: u64 = query_param(target, "height").unwrap().parse().unwrap();
            block_body(height)
        }
    })
    .await;
    let client = node.client();

    assert_eq!(client.latest_height().await.unwrap(), 12345);
    let fetched = client.block_at(7).await.unwrap();
    assert_eq!(fetched.block.height, 7);
    assert_eq!(fetched.block.validators_hash, "ABCD");
    assert_eq!(fetched.evidence.map(|e| e.len()), Some(1));
    assert_eq!(
        fetched.block.signer_addresses(),
        Some(vec!["AA".to_string(), "BB".to_string()])
    );
    let targets = node.targets();
    assert_eq!(targets.len(), 2);
    assert!(targets[0].starts_with("/status"));
    assert_eq!(targets[1], "/block?height=7");
}
