//! End-to-end: rules on disk, through the loader, into the dispatcher.

use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use elastalert_rules::dispatcher::{
    DispatchReport, EvalContext, EvalError, Evaluator, EvaluatorRegistry, RuleDispatcher,
};
use elastalert_rules::loader::{LoaderOptions, RuleLoader, SharedRuleSet};
use elastalert_rules::schema::{RuleDefinition, RuleKind};

#[derive(Default)]
struct Seen(Mutex<Vec<(String, RuleKind)>>);

#[async_trait]
impl Evaluator for Seen {
    async fn evaluate(&self, rule: &RuleDefinition, _ctx: &EvalContext) -> Result<(), EvalError> {
        self.0.lock().unwrap().push((rule.name().to_string(), rule.kind()));
        Ok(())
    }
}

#[tokio::test]
async fn unknown_type_is_skipped_and_the_rest_dispatched() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.yaml"), "name: r1\ntype: frequency\nindex: logs-*\n").unwrap();
    fs::write(dir.path().join("b.yaml"), "name: r2\ntype: bogus\nindex: logs-*\n").unwrap();
    fs::write(
        dir.path().join("c.yaml"),
        "name: r3\ntype: spike\nindex: logs-*\nthreshold_cur: 10\n",
    )
    .unwrap();

    let loader = RuleLoader::new(LoaderOptions::new(dir.path()));
    let rules = loader.load().await.unwrap();
    assert_eq!(rules.names(), vec!["r1", "r3"]);

    let seen = Arc::new(Seen::default());
    let dispatcher = RuleDispatcher::new(
        EvaluatorRegistry::new()
            .with(RuleKind::Frequency, seen.clone())
            .with(RuleKind::Spike, seen.clone()),
    );
    let shared = SharedRuleSet::new(rules);
    let report = dispatcher
        .dispatch_all(&shared.snapshot(), &EvalContext::new(Utc::now(), 1))
        .await;

    assert_eq!(report, DispatchReport { evaluated: 2, failed: 0, missing: 0 });
    assert_eq!(
        *seen.0.lock().unwrap(),
        vec![
            ("r1".to_string(), RuleKind::Frequency),
            ("r3".to_string(), RuleKind::Spike),
        ]
    );
}

#[tokio::test]
async fn reload_after_edit_changes_what_is_dispatched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rule.yaml");
    fs::write(&path, "name: before\ntype: frequency\n").unwrap();

    let loader = RuleLoader::new(LoaderOptions::new(dir.path()));
    let shared = SharedRuleSet::new(loader.load().await.unwrap());

    fs::write(&path, "name: after\ntype: change\ncompare_key: host\n").unwrap();
    shared.replace(loader.load().await.unwrap());

    let seen = Arc::new(Seen::default());
    let dispatcher = RuleDispatcher::new(EvaluatorRegistry::new().with_default(seen.clone()));
    dispatcher
        .dispatch_all(&shared.snapshot(), &EvalContext::new(Utc::now(), 2))
        .await;

    assert_eq!(*seen.0.lock().unwrap(), vec![("after".to_string(), RuleKind::Change)]);
}
