//! End-to-end tests for the gateway HTTP API against in-process mock
//! servers: a scripted Soroban RPC node and a Pinata stand-in.

use axum::body::Body;
use axum::extract::{Json as AxumJson, Multipart, State};
use axum::http::{header, Request, StatusCode};
use axum::routing::post;
use axum::Router;
use guarana_gateway::envelope;
use guarana_gateway::signer::{EnvelopeSigner, LocalSigner};
use guarana_gateway::{create_router, AppState, Config};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use stellar_xdr::curr::{
    AccountEntry, AccountEntryExt, AccountId, ExtensionPoint, HostFunction, LedgerEntryChanges,
    LedgerEntryData, LedgerKey, Limits, OperationBody, PublicKey, ReadXdr, ScMap, ScMapEntry,
    ScString, ScSymbol, ScVal, SequenceNumber, Thresholds, TransactionEnvelope, TransactionMeta,
    TransactionMetaV3, SorobanTransactionMeta, SorobanTransactionMetaExt, VecM, WriteXdr,
};
use tower::util::ServiceExt;

const BOUNDARY: &str = "guarana-test-boundary";

// --- Mock Soroban RPC ---

/// Contract state the mock node serves. Collection 0 exists; every queried
/// account exists with sequence 100. Both counts advance whenever the
/// corresponding mutating invocation (`create_collection`, `mint_nft`) is
/// processed, so consecutive calls observe increasing counts the way the
/// live contract would.
struct MockChain {
    total_collections: AtomicU32,
    tokens_in_collection: AtomicU32,
    base_uri: Option<String>,
    owner: String,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            total_collections: AtomicU32::new(3),
            tokens_in_collection: AtomicU32::new(2),
            base_uri: Some("https://x/".into()),
            owner: stellar_strkey::ed25519::PublicKey([7u8; 32]).to_string(),
        }
    }
}

fn scval_b64(val: &ScVal) -> String {
    val.to_xdr_base64(Limits::none()).unwrap()
}

fn symbol(s: &str) -> ScVal {
    ScVal::Symbol(ScSymbol(s.try_into().unwrap()))
}

fn string(s: &str) -> ScVal {
    ScVal::String(ScString(s.try_into().unwrap()))
}

fn address(strkey: &str) -> ScVal {
    let pk = stellar_strkey::ed25519::PublicKey::from_string(strkey).unwrap();
    ScVal::Address(stellar_xdr::curr::ScAddress::Account(AccountId(
        PublicKey::PublicKeyTypeEd25519(stellar_xdr::curr::Uint256(pk.0)),
    )))
}

fn struct_map(fields: Vec<(&str, ScVal)>) -> ScVal {
    let entries: Vec<ScMapEntry> = fields
        .into_iter()
        .map(|(k, val)| ScMapEntry {
            key: symbol(k),
            val,
        })
        .collect();
    ScVal::Map(Some(ScMap(entries.try_into().unwrap())))
}

/// Function name and argument list of the single InvokeHostFunction op.
fn invocation(tx_b64: &str) -> (String, Vec<ScVal>) {
    let tx = match TransactionEnvelope::from_xdr_base64(tx_b64, Limits::none()).unwrap() {
        TransactionEnvelope::Tx(inner) => inner.tx,
        other => panic!("unexpected envelope shape: {other:?}"),
    };
    match &tx.operations[0].body {
        OperationBody::InvokeHostFunction(op) => match &op.host_function {
            HostFunction::InvokeContract(args) => (
                args.function_name.0.to_utf8_string_lossy(),
                args.args.to_vec(),
            ),
            other => panic!("unexpected host function: {other:?}"),
        },
        other => panic!("unexpected operation: {other:?}"),
    }
}

/// A funded account entry for whatever account key was requested.
fn account_entry_b64(key_b64: &str) -> String {
    let account_id = match LedgerKey::from_xdr_base64(key_b64, Limits::none()).unwrap() {
        LedgerKey::Account(key) => key.account_id,
        other => panic!("unexpected ledger key: {other:?}"),
    };
    let entry = LedgerEntryData::Account(AccountEntry {
        account_id,
        balance: 100_000_000,
        seq_num: SequenceNumber(100),
        num_sub_entries: 0,
        inflation_dest: None,
        flags: 0,
        home_domain: Default::default(),
        thresholds: Thresholds([1, 0, 0, 0]),
        signers: VecM::default(),
        ext: AccountEntryExt::V0,
    });
    entry.to_xdr_base64(Limits::none()).unwrap()
}

fn meta_b64(return_value: ScVal) -> String {
    let meta = TransactionMeta::V3(TransactionMetaV3 {
        ext: ExtensionPoint::V0,
        tx_changes_before: LedgerEntryChanges(VecM::default()),
        operations: VecM::default(),
        tx_changes_after: LedgerEntryChanges(VecM::default()),
        soroban_meta: Some(SorobanTransactionMeta {
            ext: SorobanTransactionMetaExt::V0,
            events: VecM::default(),
            return_value,
            diagnostic_events: VecM::default(),
        }),
    });
    meta.to_xdr_base64(Limits::none()).unwrap()
}

fn simulate(chain: &MockChain, tx_b64: &str) -> Value {
    let (name, args) = invocation(tx_b64);
    let return_value = match name.as_str() {
        "total_collections" => ScVal::U32(chain.total_collections.load(Ordering::SeqCst)),
        "create_collection" => ScVal::U32(chain.total_collections.fetch_add(1, Ordering::SeqCst)),
        "total_tokens_in_collection" => {
            ScVal::U32(chain.tokens_in_collection.load(Ordering::SeqCst))
        }
        "mint_nft" => ScVal::U32(chain.tokens_in_collection.fetch_add(1, Ordering::SeqCst)),
        "get_collection" => match args[0] {
            // Only collection 0 exists on the mock ledger.
            ScVal::U32(0) => struct_map(vec![
                (
                    "base_uri",
                    chain
                        .base_uri
                        .as_deref()
                        .map(string)
                        .unwrap_or(ScVal::Void),
                ),
                ("name", string("Guarana")),
                ("owner", address(&chain.owner)),
                ("symbol", string("GRN")),
            ]),
            _ => ScVal::Void,
        },
        "get_token" => struct_map(vec![
            ("owner", address(&chain.owner)),
            ("uri", string("ipfs://stored")),
        ]),
        "owner_of" => address(&chain.owner),
        "tokens_of" => ScVal::Vec(Some(
            vec![struct_map(vec![
                ("collection_id", ScVal::U32(0)),
                ("token_id", ScVal::U32(1)),
            ])]
            .try_into()
            .unwrap(),
        )),
        _ => ScVal::Void,
    };
    json!({
        "minResourceFee": "5000",
        "results": [{"xdr": scval_b64(&return_value), "auth": []}],
        "latestLedger": 100
    })
}

async fn rpc_handler(
    State(chain): State<Arc<MockChain>>,
    AxumJson(req): AxumJson<Value>,
) -> AxumJson<Value> {
    let result = match req["method"].as_str().unwrap_or_default() {
        "getHealth" => json!({"status": "healthy"}),
        "getLedgerEntries" => {
            let key = req["params"]["keys"][0].as_str().unwrap();
            json!({"entries": [{"xdr": account_entry_b64(key)}], "latestLedger": 100})
        }
        "simulateTransaction" => {
            simulate(&chain, req["params"]["transaction"].as_str().unwrap())
        }
        "sendTransaction" => json!({"status": "PENDING", "hash": ""}),
        "getTransaction" => json!({
            "status": "SUCCESS",
            "latestLedger": 101,
            "resultMetaXdr": meta_b64(ScVal::U32(7))
        }),
        other => panic!("unexpected rpc method: {other}"),
    };
    AxumJson(json!({"jsonrpc": "2.0", "id": req["id"], "result": result}))
}

async fn spawn_mock_rpc(chain: MockChain) -> String {
    let app = Router::new()
        .route("/", post(rpc_handler))
        .with_state(Arc::new(chain));
    spawn_server(app).await
}

// --- Mock Pinata ---

async fn mock_create_group(AxumJson(body): AxumJson<Value>) -> AxumJson<Value> {
    AxumJson(json!({
        "data": {
            "id": "grp-1",
            "name": body["name"],
            "created_at": "2026-01-01T00:00:00Z"
        }
    }))
}

async fn mock_upload(
    State(counter): State<Arc<AtomicU32>>,
    mut multipart: Multipart,
) -> AxumJson<Value> {
    let mut name = String::new();
    let mut group_id = String::new();
    let mut size = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name() {
            Some("name") => name = field.text().await.unwrap(),
            Some("group_id") => group_id = field.text().await.unwrap(),
            Some("file") => size = field.bytes().await.unwrap().len(),
            _ => {}
        }
    }
    let n = counter.fetch_add(1, Ordering::SeqCst);
    AxumJson(json!({
        "data": {
            "id": format!("file-{n}"),
            "name": name,
            "cid": format!("bafy{n}"),
            "size": size,
            "mime_type": "image/png",
            "group_id": group_id
        }
    }))
}

async fn spawn_mock_pinata() -> String {
    let app = Router::new()
        .route("/groups/public", post(mock_create_group))
        .route("/files", post(mock_upload))
        .with_state(Arc::new(AtomicU32::new(0)));
    spawn_server(app).await
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// --- Test harness ---

async fn gateway(chain: MockChain, with_pinata: bool) -> (Router, Config) {
    let rpc_url = spawn_mock_rpc(chain).await;
    let mut config = Config {
        rpc_url,
        ..Config::default()
    };
    if with_pinata {
        let pinata_url = spawn_mock_pinata().await;
        config.pinata_api_url = pinata_url.clone();
        config.pinata_upload_url = pinata_url;
        config.pinata_jwt = "test-jwt".into();
    }
    let state = Arc::new(AppState::new(config.clone()));
    (create_router(state), config)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_request(uri: &str, parts: Vec<(&str, Option<&str>, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn funded_signer() -> LocalSigner {
    let secret = stellar_strkey::ed25519::PrivateKey([9u8; 32]).to_string();
    LocalSigner::from_secret(&secret).unwrap()
}

// --- Tests ---

#[tokio::test]
async fn health_reports_node_status_and_contract() {
    let (app, config) = gateway(MockChain::default(), false).await;
    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["contract_id"], config.contract_id);
}

#[tokio::test]
async fn upload_pins_files_in_request_order() {
    let (app, _) = gateway(MockChain::default(), true).await;
    let request = multipart_request(
        "/api/files",
        vec![
            ("collectionName", None, b"guarana-drop".as_slice()),
            ("files", Some("0.png"), b"png-zero".as_slice()),
            ("files", Some("1.png"), b"png-one".as_slice()),
        ],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["group"]["id"], "grp-1");
    assert_eq!(body["group"]["name"], "guarana-drop");
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], "0.png");
    assert_eq!(files[1]["name"], "1.png");
    assert_eq!(files[0]["cid"], "bafy0");
    assert_eq!(files[1]["cid"], "bafy1");
    assert_eq!(files[0]["group_id"], "grp-1");
}

#[tokio::test]
async fn upload_without_files_is_rejected() {
    let (app, _) = gateway(MockChain::default(), true).await;
    let request = multipart_request(
        "/api/files",
        vec![("collectionName", None, b"empty-drop".as_slice())],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("no files"));
}

#[tokio::test]
async fn create_collection_returns_prepared_unsigned_envelope() {
    let (app, _) = gateway(MockChain::default(), false).await;
    let creator = funded_signer().address().to_string();
    let response = app
        .oneshot(json_request(
            "/api/collections",
            json!({
                "creator": creator,
                "name": "Guarana",
                "symbol": "GRN",
                "base_uri": "https://x/"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    // The expected id is a snapshot of the current total.
    assert_eq!(body["result"]["expected_collection_id"], 3);

    let parsed =
        envelope::parse_signed_envelope(body["result"]["xdr"].as_str().unwrap()).unwrap();
    assert!(parsed.signatures.is_empty());
    // Prepared: the simulation's resource fee was folded in.
    assert_eq!(parsed.tx.fee, 100 + 5000);
    assert_eq!(parsed.tx.seq_num, SequenceNumber(101));
}

#[tokio::test]
async fn create_then_count_observes_exactly_one_more_collection() {
    let (app, config) = gateway(MockChain::default(), false).await;
    let signer = funded_signer();

    let response = app
        .clone()
        .oneshot(get_request("/api/collections/total"))
        .await
        .unwrap();
    let before = body_json(response).await["result"]["total_collections"]
        .as_u64()
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/collections",
            json!({
                "creator": signer.address(),
                "name": "Guarana",
                "symbol": "GRN"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["expected_collection_id"], before);

    // Sign the returned envelope the way a wallet would and submit it.
    let unsigned =
        envelope::parse_signed_envelope(body["result"]["xdr"].as_str().unwrap()).unwrap();
    let signed = signer.sign(&unsigned.tx, &config.network_passphrase).unwrap();
    let signed_xdr = envelope::envelope_to_base64(&signed).unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/transactions",
            json!({ "signed_xdr": signed_xdr }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/collections/total"))
        .await
        .unwrap();
    let after = body_json(response).await["result"]["total_collections"]
        .as_u64()
        .unwrap();
    assert_eq!(after, before + 1);
}

#[tokio::test]
async fn create_collection_with_bad_symbol_never_hits_the_network() {
    let (app, _) = gateway(MockChain::default(), false).await;
    let response = app
        .oneshot(json_request(
            "/api/collections",
            json!({
                "creator": funded_signer().address(),
                "name": "Guarana",
                "symbol": "AB"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("symbol"));
}

#[tokio::test]
async fn mint_previews_the_next_token_id_and_derived_uri() {
    let (app, _) = gateway(MockChain::default(), false).await;
    let minter = funded_signer().address().to_string();
    let response = app
        .oneshot(json_request(
            "/api/collections/0/mint",
            json!({
                "minter": minter,
                "to": stellar_strkey::ed25519::PublicKey([4u8; 32]).to_string()
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["result"]["expected_token_id"], 2);
    assert_eq!(body["result"]["expected_uri"], "https://x/2");
}

#[tokio::test]
async fn sequential_mints_preview_contiguous_token_ids() {
    let (app, _) = gateway(MockChain::default(), false).await;
    let minter = funded_signer().address().to_string();
    let to = stellar_strkey::ed25519::PublicKey([4u8; 32]).to_string();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                "/api/collections/0/mint",
                json!({ "minter": minter, "to": to }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        ids.push(body["result"]["expected_token_id"].as_u64().unwrap());
    }
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn mint_into_a_missing_collection_is_rejected() {
    let (app, _) = gateway(MockChain::default(), false).await;
    let response = app
        .oneshot(json_request(
            "/api/collections/9/mint",
            json!({
                "minter": funded_signer().address(),
                "to": stellar_strkey::ed25519::PublicKey([4u8; 32]).to_string()
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn submitting_a_signed_envelope_confirms_and_returns_the_result() {
    let (app, config) = gateway(MockChain::default(), false).await;
    let signer = funded_signer();

    let tx = envelope::build_invoke_transaction(
        &config.network(),
        signer.address(),
        100,
        "create_collection",
        vec![],
    )
    .unwrap();
    let signed = signer.sign(&tx, &config.network_passphrase).unwrap();
    let signed_xdr = envelope::envelope_to_base64(&signed).unwrap();
    let expected_hash = hex::encode(
        envelope::transaction_hash(&config.network_passphrase, &tx).unwrap(),
    );

    let response = app
        .oneshot(json_request(
            "/api/transactions",
            json!({ "signed_xdr": signed_xdr }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["tx_hash"], expected_hash);
    // Return value decoded from the transaction meta.
    assert_eq!(body["result"], 7);
}

#[tokio::test]
async fn submitting_an_unsigned_envelope_is_rejected() {
    let (app, config) = gateway(MockChain::default(), false).await;
    let tx = envelope::build_invoke_transaction(
        &config.network(),
        funded_signer().address(),
        100,
        "transfer",
        vec![],
    )
    .unwrap();
    let unsigned_xdr = envelope::unsigned_envelope_base64(&tx).unwrap();

    let response = app
        .oneshot(json_request(
            "/api/transactions",
            json!({ "signed_xdr": unsigned_xdr }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("no signatures"));
}

#[tokio::test]
async fn query_endpoints_render_contract_state() {
    let (app, _) = gateway(MockChain::default(), false).await;

    let response = app
        .clone()
        .oneshot(get_request("/api/collections/total"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["total_collections"], 3);

    let response = app
        .clone()
        .oneshot(get_request("/api/collections/0"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["name"], "Guarana");
    assert_eq!(body["result"]["symbol"], "GRN");
    assert_eq!(body["result"]["base_uri"], "https://x/");

    let response = app
        .clone()
        .oneshot(get_request("/api/collections/0/tokens/total"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["total_tokens"], 2);

    let owner = MockChain::default().owner;
    let response = app
        .clone()
        .oneshot(get_request("/api/collections/0/tokens/1/owner"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["owner"], owner);

    let response = app
        .oneshot(get_request(&format!("/api/accounts/{owner}/tokens")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["tokens"][0]["collection_id"], 0);
    assert_eq!(body["result"]["tokens"][0]["token_id"], 1);
}

#[tokio::test]
async fn token_display_uri_is_derived_from_the_collection_base_uri() {
    let (app, _) = gateway(MockChain::default(), false).await;
    let response = app
        .oneshot(get_request("/api/collections/0/tokens/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // The stored uri ("ipfs://stored") is shadowed by base_uri + token id.
    assert_eq!(body["result"]["uri"], "https://x/1");
}

#[tokio::test]
async fn missing_collection_is_a_404_with_a_uniform_error_body() {
    let (app, _) = gateway(MockChain::default(), false).await;
    let response = app
        .oneshot(get_request("/api/collections/42"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn request_id_is_echoed_back() {
    let (app, _) = gateway(MockChain::default(), false).await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "corr-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "corr-123"
    );

    // Without a caller-supplied id the gateway mints its own.
    let response = app.oneshot(get_request("/health")).await.unwrap();
    let minted = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(minted.starts_with("gw-"));
}
