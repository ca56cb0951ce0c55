//! Tests for the rule loader module.

use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::schema::RuleKind;

const FREQUENCY_RULE_YAML: &str = r#"
name: r1
type: frequency
index: logs-*
num_events: 50
timeframe: 1h
"#;

const BOGUS_RULE_YAML: &str = r#"
name: r2
type: bogus
index: logs-*
"#;

const SPIKE_RULE_YAML: &str = r#"
name: r3
type: spike
index: logs-*
threshold_cur: 10
"#;

fn temp_loader() -> (TempDir, RuleLoader) {
    let dir = TempDir::new().expect("create tempdir");
    let loader = RuleLoader::new(LoaderOptions::new(dir.path()));
    (dir, loader)
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn frequency(name: &str) -> String {
    format!("name: {name}\ntype: frequency\nindex: logs-*\n")
}

// ── RuleParser ──────────────────────────────────────────────

#[test]
fn parse_file_reads_rule() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.yaml");
    fs::write(&path, FREQUENCY_RULE_YAML).unwrap();

    let rule = RuleParser::parse_file(&path).unwrap();
    assert_eq!(rule.name(), "r1");
    assert_eq!(rule.kind(), RuleKind::Frequency);
    assert_eq!(rule.base().num_events, 50);
}

#[test]
fn parse_file_missing_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = RuleParser::parse_file(&dir.path().join("gone.yaml")).unwrap_err();
    assert!(matches!(err, RuleError::Io(_)));
}

#[test]
fn parse_str_failure_modes() {
    assert!(matches!(RuleParser::parse_str("name: [unclosed"), Err(RuleError::Parse(_))));
    assert!(RuleParser::parse_str("").is_err());
    assert!(matches!(RuleParser::parse_str("- a\n"), Err(RuleError::NotStructured)));
    assert!(matches!(RuleParser::parse_str("name: x\n"), Err(RuleError::MissingType)));
    assert!(matches!(RuleParser::parse_str(BOGUS_RULE_YAML), Err(RuleError::UnknownType(_))));
}

// ── RuleLoader::load ────────────────────────────────────────

#[tokio::test]
async fn load_skips_unknown_type_and_keeps_order() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "a.yaml", FREQUENCY_RULE_YAML);
    write(dir.path(), "b.yaml", BOGUS_RULE_YAML);
    write(dir.path(), "c.yaml", SPIKE_RULE_YAML);

    let (rules, report) = loader.load_report().await.unwrap();
    assert_eq!(rules.names(), vec!["r1", "r3"]);
    assert_eq!(rules.get(0).map(|r| r.kind()), Some(RuleKind::Frequency));
    assert_eq!(rules.get(1).map(|r| r.kind()), Some(RuleKind::Spike));
    assert_eq!(rules.get(1).and_then(|r| r.as_spike()).map(|s| s.threshold_cur), Some(10));

    assert_eq!(report.len(), 3);
    assert!(report[0].status.is_loaded());
    assert!(matches!(&report[1].status, LoadStatus::Failed { error } if error.contains("bogus")));
    assert!(report[2].status.is_loaded());
    assert!(report[1].path.ends_with("b.yaml"));
}

#[tokio::test]
async fn load_count_is_candidates_minus_failures() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "01-ok.yaml", &frequency("ok-1"));
    write(dir.path(), "02-empty.yaml", "");
    write(dir.path(), "03-broken.yaml", "name: [oops");
    write(dir.path(), "04-list.yaml", "- type: frequency\n");
    write(dir.path(), "05-notype.yaml", "name: nothing\n");
    write(dir.path(), "06-shape.yaml", "name: c\ntype: cardinality\n");
    write(dir.path(), "07-ok.yaml", &frequency("ok-2"));
    write(dir.path(), "08-ignored.txt", &frequency("not-a-candidate"));

    let (rules, report) = loader.load_report().await.unwrap();
    let failed = report.iter().filter(|r| !r.status.is_loaded()).count();

    assert_eq!(report.len(), 7);
    assert_eq!(failed, 5);
    assert_eq!(rules.len(), report.len() - failed);
    assert_eq!(rules.names(), vec!["ok-1", "ok-2"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn load_preserves_candidate_order_under_concurrency() {
    let dir = TempDir::new().unwrap();
    let mut expected = Vec::new();
    for i in 0..90 {
        let name = format!("rule-{i:03}");
        if i % 3 == 1 {
            write(dir.path(), &format!("{i:03}.yaml"), "type: nonsense\nname: x\n");
        } else {
            write(dir.path(), &format!("{i:03}.yaml"), &frequency(&name));
            expected.push(name);
        }
    }

    let loader = RuleLoader::new(LoaderOptions::new(dir.path()).parse_concurrency(4));
    let rules = loader.load().await.unwrap();
    assert_eq!(rules.names(), expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn load_is_idempotent() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "a.yaml", FREQUENCY_RULE_YAML);
    write(dir.path(), "nested/b.yaml", SPIKE_RULE_YAML);
    write(dir.path(), "nested/deep/c.yaml", &frequency("r4"));
    write(dir.path(), "z.yaml", BOGUS_RULE_YAML);

    let first = loader.load().await.unwrap();
    let second = loader.load().await.unwrap();
    assert_eq!(first.as_slice(), second.as_slice());
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn load_keeps_duplicate_names() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "a.yaml", &frequency("same"));
    write(dir.path(), "b.yaml", &frequency("same"));

    let rules = loader.load().await.unwrap();
    assert_eq!(rules.names(), vec!["same", "same"]);
}

#[tokio::test]
async fn load_without_descend_ignores_subdirectories() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "top.yaml", &frequency("top"));
    write(dir.path(), "sub/inner.yaml", &frequency("inner"));

    let loader = RuleLoader::new(LoaderOptions::new(dir.path()).descend(false));
    let rules = loader.load().await.unwrap();
    assert_eq!(rules.names(), vec!["top"]);
}

#[tokio::test]
async fn load_honours_suffix() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yml", &frequency("yml"));
    write(dir.path(), "b.yaml", &frequency("yaml"));

    let loader = RuleLoader::new(LoaderOptions::new(dir.path()).suffix("yml"));
    let rules = loader.load().await.unwrap();
    assert_eq!(rules.names(), vec!["yml"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parallel_scan_loads_same_set() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yaml", &frequency("a"));
    write(dir.path(), "x/b.yaml", &frequency("b"));
    write(dir.path(), "x/y/c.yaml", &frequency("c"));
    write(dir.path(), "w/d.yaml", &frequency("d"));

    let sequential = RuleLoader::new(LoaderOptions::new(dir.path()));
    let parallel = RuleLoader::new(LoaderOptions::new(dir.path()).parallel_scan(true));

    let a = sequential.load().await.unwrap();
    let b = parallel.load().await.unwrap();
    assert_eq!(a.as_slice(), b.as_slice());
    assert_eq!(a.len(), 4);
}

#[tokio::test]
async fn zero_parse_concurrency_still_loads() {
    let (dir, _) = temp_loader();
    write(dir.path(), "a.yaml", &frequency("a"));
    let loader = RuleLoader::new(LoaderOptions::new(dir.path()).parse_concurrency(0));
    assert_eq!(loader.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn load_missing_root_is_error() {
    let dir = TempDir::new().unwrap();
    let loader = RuleLoader::new(LoaderOptions::new(dir.path().join("missing")));
    assert!(matches!(loader.load().await, Err(RuleError::Scan(_))));
}

#[tokio::test]
async fn load_empty_directory() {
    let (_dir, loader) = temp_loader();
    let rules = loader.load().await.unwrap();
    assert!(rules.is_empty());
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn load_follows_symlinked_rule_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "real/real.yaml", &frequency("linked"));
    write(dir.path(), "plain.yaml", &frequency("plain"));
    std::os::unix::fs::symlink(dir.path().join("real/real.yaml"), dir.path().join("linked.yaml")).unwrap();

    let options = LoaderOptions::new(dir.path()).descend(false);
    let sequential = RuleLoader::new(options.clone()).load().await.unwrap();
    let parallel = RuleLoader::new(options.parallel_scan(true)).load().await.unwrap();

    assert_eq!(sequential.names(), vec!["linked", "plain"]);
    assert_eq!(parallel.names(), vec!["linked", "plain"]);
}

// ── SharedRuleSet ───────────────────────────────────────────

#[test]
fn shared_rule_set_swaps_whole_sets() {
    let first = RuleSet::new(vec![RuleParser::parse_str(FREQUENCY_RULE_YAML).unwrap()]);
    let shared = SharedRuleSet::new(first);

    let held = shared.snapshot();
    let second = RuleSet::new(vec![
        RuleParser::parse_str(SPIKE_RULE_YAML).unwrap(),
        RuleParser::parse_str(&frequency("r9")).unwrap(),
    ]);
    let previous = shared.replace(second);

    assert_eq!(previous.names(), vec!["r1"]);
    assert_eq!(held.names(), vec!["r1"]);
    assert_eq!(shared.snapshot().names(), vec!["r3", "r9"]);
}

// ── Hot reload ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watch_reloads_on_new_file() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "a.yaml", &frequency("a"));

    let shared = SharedRuleSet::new(loader.load().await.unwrap());
    let _watcher = loader.watch(shared.clone(), Duration::from_millis(100)).unwrap();

    // Give the backend a moment to register before changing the tree.
    tokio::time::sleep(Duration::from_millis(200)).await;
    write(dir.path(), "b.yaml", &frequency("b"));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while shared.snapshot().len() < 2 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(shared.snapshot().names(), vec!["a", "b"]);
}
