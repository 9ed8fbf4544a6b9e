use std::fs;
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

const PAGE: &str = r#"
<div class="tabs-products-metafields" id="product-tabs">
  <span class="tp-tab-seed" data-tab-id="t1" data-panel-id="p1" data-label="Details" data-active="1"></span>
  <span class="tp-tab-seed" data-tab-id="t2" data-panel-id="p2" data-label="Empty"></span>
  <span class="tp-tab-seed" data-tab-id="t3" data-panel-id="p3" data-label="Care"></span>
  <div class="tp-tablist" role="tablist"></div>
  <div class="tp-panels">
    <div class="tp-panel" id="p1" aria-labelledby="t1"><p class="resource-list__item">Cotton</p></div>
    <div class="tp-panel" id="p2" aria-labelledby="t2"><p>Nothing here</p></div>
    <div class="tp-panel" id="p3" aria-labelledby="t3"><p class="resource-list__item">Wash cold</p></div>
  </div>
</div>
"#;

fn run(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_tabs_app"))
        .args(args)
        .output()
        .expect("spawn tabs_app");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn renders_static_page_and_replays_clicks() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("page.html");
    let output = temp.path().join("out").join("page.html");
    fs::write(&input, PAGE).unwrap();

    let (ok, stdout, stderr) = run(&[
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--click",
        "t3",
        "--key",
        "right",
        "--json",
    ]);
    assert!(ok, "{stderr}");

    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["settled"], true);
    assert_eq!(summary["widgets"][0]["root_id"], "product-tabs");
    assert_eq!(summary["widgets"][0]["tabs"], serde_json::json!(["t1", "t3"]));
    assert_eq!(summary["widgets"][0]["active_tab"], "t1");
    // Reveal, click, key.
    assert_eq!(summary["layout_notifications"], 3);

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains(r#"id="t3""#));
    assert!(!written.contains(r#"id="p2""#));
    assert!(written.contains(r#"data-tp-init="1""#));
}

#[test]
fn unknown_click_target_fails_with_message() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("page.html");
    fs::write(&input, PAGE).unwrap();

    let (ok, _, stderr) = run(&[input.to_str().unwrap(), "--click", "nope"]);
    assert!(!ok);
    assert!(stderr.contains("--click nope"), "{stderr}");
}
