mod common;

use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::{json, Value};

use common::{serve_artwork, url};

/// Run the binary with `stdin` piped in; returns (exit code, parsed stdout).
fn run(args: &[&str], stdin: &str) -> (i32, Value) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_artmatch"))
        .args(args)
        .arg("--quiet")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn artmatch");
    // the binary may exit before reading stdin (e.g. bad config)
    let _ = child.stdin.take().unwrap().write_all(stdin.as_bytes());
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end().lines().count(), 1, "one JSON line expected: {stdout}");
    let value = serde_json::from_str(&stdout).expect("stdout is JSON");
    (output.status.code().unwrap(), value)
}

async fn run_async(args: Vec<String>, stdin: String) -> (i32, Value) {
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run(&args, &stdin)
    })
    .await
    .unwrap()
}

#[test]
fn empty_request_exits_1() {
    let (code, out) = run(&[], "{}");
    assert_eq!(code, 1);
    assert_eq!(out, json!({"error": "Missing url1 or url2"}));
}

#[test]
fn empty_string_url_exits_1() {
    let (code, out) = run(&[], r#"{"url1": "", "url2": "http://example.invalid/a.png"}"#);
    assert_eq!(code, 1);
    assert!(out["error"].as_str().unwrap().contains("Missing"));
}

#[test]
fn malformed_stdin_exits_1_with_zero_similarity() {
    let (code, out) = run(&[], "{not json");
    assert_eq!(code, 1);
    assert!(out.get("error").is_some());
    assert_eq!(out["similarity"], 0.0);
}

#[test]
fn invalid_config_exits_1() {
    let path = std::env::temp_dir().join(format!("artmatch-bad-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"hash_size": 6}"#).unwrap();
    let (code, out) = run(&["--config", path.to_str().unwrap()], "{}");
    std::fs::remove_file(&path).unwrap();

    assert_eq!(code, 1);
    assert!(out["error"].as_str().unwrap().contains("hash_size"));
    assert_eq!(out["similarity"], 0.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn bad_url_with_valid_url_exits_0() {
    let addr = serve_artwork().await;
    let request = json!({"url1": "<bad-url>", "url2": url(addr, "/cover.png")}).to_string();

    let (code, out) = run_async(vec![], request).await;
    assert_eq!(code, 0);
    assert_eq!(
        out,
        json!({"error": "Failed to download one or both images", "similarity": 0.0})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn whitespace_url_is_a_download_failure() {
    let addr = serve_artwork().await;
    let request = json!({"url1": "   ", "url2": url(addr, "/cover.png")}).to_string();

    let (code, out) = run_async(vec![], request).await;
    assert_eq!(code, 0);
    assert_eq!(
        out,
        json!({"error": "Failed to download one or both images", "similarity": 0.0})
    );
}

#[test]
fn array_request_exits_1() {
    let (code, out) = run(&[], r#"["http://example.invalid/a.png", "http://example.invalid/b.png"]"#);
    assert_eq!(code, 1);
    assert!(out["error"].as_str().unwrap().contains("JSON object"));
    assert_eq!(out["similarity"], 0.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn identical_images_report_full_result() {
    let addr = serve_artwork().await;
    let request = json!({
        "url1": url(addr, "/cover.png"),
        "url2": url(addr, "/mirror/cover.png"),
    })
    .to_string();

    let (code, out) = run_async(vec!["compare".into()], request).await;
    assert_eq!(code, 0);
    assert_eq!(out["similarity"], 100.0);
    assert_eq!(out["avg_similarity"], 100.0);
    assert_eq!(out["phash_similarity"], 100.0);
    assert_eq!(out["distances"], json!({"average": 0, "phash": 0, "dhash": 0, "whash": 0}));
    for kind in ["average", "phash", "dhash", "whash"] {
        assert_eq!(out["hashes1"][kind].as_str().unwrap().len(), 16);
    }
    assert_eq!(out["hashes1"], out["hashes2"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn fingerprint_subcommand_matches_compare_hashes() {
    let addr = serve_artwork().await;
    let cover = url(addr, "/cover.png");

    let (code, single) = run_async(vec!["fingerprint".into(), cover.clone()], String::new()).await;
    assert_eq!(code, 0);

    let request = json!({"url1": cover, "url2": url(addr, "/cover.jpg")}).to_string();
    let (_, compared) = run_async(vec![], request).await;
    assert_eq!(single, compared["hashes1"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn fingerprint_subcommand_fails_on_missing_image() {
    let addr = serve_artwork().await;
    let (code, out) = run_async(vec!["fingerprint".into(), url(addr, "/missing.png")], String::new()).await;
    assert_eq!(code, 1);
    assert!(out["error"].as_str().unwrap().contains("404"));
}
