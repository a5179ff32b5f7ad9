//! End-to-end tests of the subcommand handlers against a wiremock gateway.

use paynvp_cli::check::{run_check_config, CheckConfigArgs};
use paynvp_cli::ipn::{run_verify_ipn, VerifyIpnArgs};
use paynvp_cli::transaction::{run_details, run_refund, run_search, DetailsArgs, RefundArgs, SearchArgs};
use paynvp_cli::{GatewayOpts, KindArg};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_bundle(dir: &tempfile::TempDir, api_url: &str, gateway_url: &str) -> GatewayOpts {
    let config = dir.path().join("paynvp.yaml");
    std::fs::write(
        &config,
        format!(
            "mode: sandbox
notify_url: https://shop.example.com/ipn
sandbox:
  username: cli_user
  password: cli_pass
  secret: cli_sig
  api_url: {api_url}
  gateway_url: {gateway_url}
"
        ),
    )
    .unwrap();
    GatewayOpts {
        config: Some(config),
        mode: None,
        kind: KindArg::ExpressCheckout,
        currency: None,
        timeout_secs: 5,
    }
}

fn opts_for(server: &MockServer, dir: &tempfile::TempDir) -> GatewayOpts {
    write_bundle(dir, &format!("{}/nvp", server.uri()), &server.uri())
}

#[tokio::test]
async fn refund_prints_reply_and_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nvp"))
        .and(body_string_contains("TRANSACTIONID=T123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("REFUNDTRANSACTIONID=R1&ACK=Success"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let opts = opts_for(&server, &dir);
    let args = RefundArgs {
        transaction_id: "T123".into(),
        amount: None,
        note: None,
    };
    let mut out = Vec::new();
    assert_eq!(run_refund(&args, &opts, &mut out).await.unwrap(), 0);

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["REFUNDTRANSACTIONID"], "R1");
}

#[tokio::test]
async fn partial_refund_uses_currency_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nvp"))
        .and(body_string_contains("REFUNDTYPE=Partial"))
        .and(body_string_contains("CURRENCYCODE=JPY"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ACK=Success"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut opts = opts_for(&server, &dir);
    opts.currency = Some("JPY".into());
    let args = RefundArgs {
        transaction_id: "T123".into(),
        amount: Some("500".into()),
        note: None,
    };
    let mut out = Vec::new();
    assert_eq!(run_refund(&args, &opts, &mut out).await.unwrap(), 0);
}

#[tokio::test]
async fn failure_ack_exits_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nvp"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "ACK=Failure&L_ERRORCODE0=10004&L_SHORTMESSAGE0=Invalid+transaction+ID",
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let opts = opts_for(&server, &dir);
    let mut out = Vec::new();
    let args = DetailsArgs {
        transaction_id: "BAD".into(),
    };
    assert_eq!(run_details(&args, &opts, &mut out).await.unwrap(), 1);
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["L_SHORTMESSAGE0"], "Invalid transaction ID");
}

#[tokio::test]
async fn search_sends_start_date() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nvp"))
        .and(body_string_contains("METHOD=TransactionSearch"))
        .and(body_string_contains("STARTDATE=2024-01-01T00%3A00%3A00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ACK=Success"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let opts = opts_for(&server, &dir);
    let args = SearchArgs {
        start: "2024-01-01T00:00:00Z".parse().unwrap(),
        end: None,
        transaction_id: None,
        email: None,
        status: None,
        amount: None,
        fields: Vec::new(),
    };
    let mut out = Vec::new();
    assert_eq!(run_search(&args, &opts, &mut out).await.unwrap(), 0);
}

#[tokio::test]
async fn verify_ipn_reports_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/webscr"))
        .and(body_string_contains("cmd=_notify-validate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("VERIFIED"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let opts = opts_for(&server, &dir);
    let args = VerifyIpnArgs {
        body: Some("txn_id=X1&payment_status=Completed".into()),
        fields: Vec::new(),
    };
    let mut out = Vec::new();
    assert_eq!(run_verify_ipn(&args, &opts, &mut out).await.unwrap(), 0);
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["verdict"], "Verified");
    assert_eq!(json["response"], "VERIFIED");
}

#[tokio::test]
async fn unreachable_gateway_is_soft_failure() {
    let dir = tempfile::tempdir().unwrap();
    let opts = write_bundle(&dir, "http://127.0.0.1:1/nvp", "http://127.0.0.1:1");
    let args = RefundArgs {
        transaction_id: "T123".into(),
        amount: None,
        note: None,
    };
    let mut out = Vec::new();
    assert_eq!(run_refund(&args, &opts, &mut out).await.unwrap(), 2);
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["type"], "error");
}

#[tokio::test]
async fn server_error_is_hard_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let opts = opts_for(&server, &dir);
    let args = DetailsArgs {
        transaction_id: "T1".into(),
    };
    let mut out = Vec::new();
    let err = run_details(&args, &opts, &mut out).await.unwrap_err();
    assert!(err.to_string().contains("502"));
}

#[test]
fn check_config_uses_endpoint_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let opts = write_bundle(&dir, "https://nvp.example.com/nvp", "https://web.example.com");
    let mut out = Vec::new();
    assert_eq!(
        run_check_config(&CheckConfigArgs { all_modes: false }, &opts, &mut out).unwrap(),
        0
    );
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["api_url"], "https://nvp.example.com/nvp");
    assert_eq!(json["gateway_url"], "https://web.example.com/");
}
