//! Integration tests for action application.

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use commonware_codec::Encode;
use evt_apply::{
    ApplyContext, ApplyError, ApplyHandler, Controller, HandlerRegistry, NotifyLimit, Permission,
    TransactionExecutor, apply_action, console_append,
};
use evt_config::{ApplyConfig, ConfigError};
use evt_domain::{Action, ApplyResults, AuthorizerRef, Transaction, TransactionMetadata};
use evt_overlay::{
    ChainSession, TokenSession,
    test_utils::{MemoryChainDb, MemoryTokenDb, name},
};
use evt_primitives::{AccountName, ActionName, Bytes, Name};
use evt_traits::{AccountRecord, StateDbError, TokenKey};
use rstest::rstest;

// ---- Helpers ----

type Registry = HandlerRegistry<MemoryChainDb, MemoryTokenDb>;
type Ctx<'a> = ApplyContext<'a, MemoryChainDb, MemoryTokenDb>;

fn auth(domain: &str, key: &str) -> AuthorizerRef {
    AuthorizerRef::new(name(domain), name(key))
}

fn chain_db() -> MemoryChainDb {
    MemoryChainDb::default()
        .with_account(AccountRecord::privileged(name("evt")))
        .with_account(AccountRecord::new(name("alice")))
        .with_account(AccountRecord::new(name("bob")))
        .with_account(AccountRecord::new(name("carol")))
        .with_producers(vec![name("bp3"), name("bp1"), name("bp2")])
}

fn transfer() -> Action {
    Action::new(name("evt"), name("transfer"), Bytes::from_static(b"t1"))
        .with_authorization(auth("art", "owner"))
}

fn metadata(act: &Action) -> TransactionMetadata {
    TransactionMetadata::new(Transaction::with_actions(vec![act.clone()]))
}

fn registry() -> Registry {
    HandlerRegistry::new(ApplyConfig::default()).unwrap()
}

fn apply(
    controller: &dyn Controller<MemoryChainDb, MemoryTokenDb>,
    act: &Action,
) -> Result<ApplyResults, ApplyError> {
    let meta = metadata(act);
    let mut chain = ChainSession::new(chain_db());
    let mut tokens = TokenSession::new(MemoryTokenDb::default());
    apply_action(controller, &mut chain, &mut tokens, act, &meta)
}

fn notifier(
    accounts: &'static [&'static str],
) -> impl Fn(&mut Ctx<'_>) -> Result<(), ApplyError> + Send + Sync + 'static {
    move |ctx: &mut Ctx<'_>| {
        for account in accounts {
            ctx.notify(name(account));
        }
        Ok(())
    }
}

fn controller(registry: &Registry) -> &dyn Controller<MemoryChainDb, MemoryTokenDb> {
    registry
}

fn executor(registry: &Registry) -> TransactionExecutor<'_, MemoryChainDb, MemoryTokenDb> {
    TransactionExecutor::new(registry)
}

fn receivers(results: &ApplyResults) -> Vec<Name> {
    results.receivers().collect()
}

// ---- Tests for notification fan-out ----

#[test]
fn test_no_notifications_single_trace() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), |ctx| {
        ctx.console_append("moved");
        Ok(())
    });

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(results.len(), 1);
    let trace = &results.applied_actions[0];
    assert_eq!(trace.receiver, name("evt"));
    assert_eq!(trace.act, transfer());
    assert_eq!(trace.console, "moved");
}

#[test]
fn test_duplicate_notifications_deduped() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), notifier(&["alice", "alice", "bob"]));

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(receivers(&results), vec![name("evt"), name("alice"), name("bob")]);
}

#[test]
fn test_notifying_primary_is_ignored() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), notifier(&["evt"]));

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(receivers(&results), vec![name("evt")]);
}

#[test]
fn test_fan_out_is_depth_first() {
    let mut registry = registry();
    registry
        .register(name("evt"), name("transfer"), notifier(&["alice", "bob"]))
        .register(name("alice"), name("transfer"), notifier(&["carol"]))
        .register(name("bob"), name("transfer"), notifier(&["carol", "evt"]));

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(receivers(&results), vec![name("evt"), name("alice"), name("carol"), name("bob")]);
}

#[test]
fn test_receiver_without_handler_still_traced() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), notifier(&["alice"]));

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(receivers(&results), vec![name("evt"), name("alice")]);
    assert!(results.applied_actions[1].console.is_empty());
    assert!(results.applied_actions[1].effects.is_empty());
}

#[test]
fn test_nested_context_sees_depth() {
    let depths = Arc::new(Mutex::new(Vec::new()));
    let mut registry = registry();
    for (receiver, next) in [("evt", Some("alice")), ("alice", Some("bob")), ("bob", None)] {
        let depths = depths.clone();
        registry.register(name(receiver), name("transfer"), move |ctx| {
            depths.lock().unwrap().push((ctx.receiver(), ctx.depth()));
            if let Some(next) = next {
                ctx.notify(name(next));
            }
            Ok(())
        });
    }

    apply(&registry, &transfer()).unwrap();
    assert_eq!(
        *depths.lock().unwrap(),
        vec![(name("evt"), 0), (name("alice"), 1), (name("bob"), 2)]
    );
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(2, 2)]
fn test_depth_limit(#[case] max_depth: u32, #[case] expected_max: usize) {
    let config = ApplyConfig::default().with_max_notify_depth(max_depth);
    let mut registry = HandlerRegistry::new(config).unwrap();
    registry
        .register(name("evt"), name("transfer"), notifier(&["alice"]))
        .register(name("alice"), name("transfer"), notifier(&["bob"]))
        .register(name("bob"), name("transfer"), notifier(&["carol"]));

    let err = apply(&registry, &transfer()).unwrap_err();
    match err {
        ApplyError::RecursionLimitExceeded { limit: NotifyLimit::Depth, value, max } => {
            assert_eq!(max, expected_max);
            assert_eq!(value, expected_max + 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_depth_within_limit_succeeds() {
    let config = ApplyConfig::default().with_max_notify_depth(2);
    let mut registry = HandlerRegistry::new(config).unwrap();
    registry
        .register(name("evt"), name("transfer"), notifier(&["alice"]))
        .register(name("alice"), name("transfer"), notifier(&["bob"]));

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn test_breadth_limit_counts_primary() {
    let mut registry =
        HandlerRegistry::new(ApplyConfig::default().with_max_notified_accounts(2)).unwrap();
    registry.register(name("evt"), name("transfer"), notifier(&["alice", "alice", "bob"]));

    let err = apply(&registry, &transfer()).unwrap_err();
    assert!(matches!(
        err,
        ApplyError::RecursionLimitExceeded { limit: NotifyLimit::Breadth, value: 3, max: 2 }
    ));
}

#[test]
fn test_notifying_unknown_account_fails() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), notifier(&["dave"]));

    let err = apply(&registry, &transfer()).unwrap_err();
    assert!(matches!(err, ApplyError::AccountNotFound(account) if account == name("dave")));
}

#[test]
fn test_unknown_receiver_fails() {
    let registry = registry();
    let act = Action::new(name("ghost"), name("transfer"), Bytes::new());

    let err = apply(&registry, &act).unwrap_err();
    assert!(matches!(err, ApplyError::AccountNotFound(account) if account == name("ghost")));
}

// ---- Tests for authorization and privilege ----

#[rstest]
#[case("art", "owner", true)]
#[case("art", "admin", false)]
#[case("music", "owner", false)]
fn test_has_authorized_in_every_receiver(
    #[case] domain: &'static str,
    #[case] key: &'static str,
    #[case] expected: bool,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = registry();
    for receiver in ["evt", "alice"] {
        let seen = seen.clone();
        registry.register(name(receiver), name("transfer"), move |ctx| {
            seen.lock().unwrap().push(ctx.has_authorized(name(domain), name(key)));
            ctx.notify(name("alice"));
            Ok(())
        });
    }

    apply(&registry, &transfer()).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![expected, expected]);
}

#[test]
fn test_require_authorization_failure_aborts() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), |ctx| {
        ctx.require_authorization(name("art"), name("owner"))?;
        assert!(ctx.unused_authorizations().is_empty());
        ctx.require_authorization(name("art"), name("admin"))
    });

    let err = apply(&registry, &transfer()).unwrap_err();
    assert!(matches!(
        err,
        ApplyError::AuthorizationFailure { domain, key } if domain == name("art") && key == name("admin")
    ));
}

#[test]
fn test_check_permission_threshold() {
    let act = Action::new(name("evt"), name("issue"), Bytes::new())
        .with_authorization(auth("art", "alice"))
        .with_authorization(auth("art", "bob"));

    let mut registry = registry();
    registry.register(name("evt"), name("issue"), |ctx| {
        let two_of_three = Permission::new(name("issue"), 2)
            .with_authorizer(auth("art", "alice"), 1)
            .with_authorizer(auth("art", "bob"), 1)
            .with_authorizer(auth("art", "carol"), 1);
        ctx.check_permission(&two_of_three)?;

        let three_of_three = Permission { threshold: 3, ..two_of_three };
        ctx.check_permission(&three_of_three)
    });

    let err = apply(&registry, &act).unwrap_err();
    assert!(matches!(err, ApplyError::InsufficientAuthority { weight: 2, threshold: 3, .. }));
}

#[test]
fn test_privilege_recomputed_per_receiver() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = registry();
    for receiver in ["evt", "alice"] {
        let seen = seen.clone();
        registry.register(name(receiver), name("transfer"), move |ctx| {
            seen.lock().unwrap().push((ctx.receiver(), ctx.is_privileged()));
            ctx.notify(name("alice"));
            Ok(())
        });
    }

    apply(&registry, &transfer()).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![(name("evt"), true), (name("alice"), false)]);
}

#[test]
fn test_require_privileged_fails_closed_in_notified_context() {
    let mut registry = registry();
    registry
        .register(name("evt"), name("transfer"), |ctx| {
            ctx.require_privileged()?;
            ctx.notify(name("alice"));
            Ok(())
        })
        .register(name("alice"), name("transfer"), |ctx| ctx.require_privileged());

    let err = apply(&registry, &transfer()).unwrap_err();
    assert!(matches!(err, ApplyError::PrivilegeViolation(account) if account == name("alice")));
}

struct Elevated {
    inner: Registry,
    account: AccountName,
}

impl Controller<MemoryChainDb, MemoryTokenDb> for Elevated {
    fn find_apply_handler(
        &self,
        receiver: &AccountName,
        action: &ActionName,
    ) -> Option<&dyn ApplyHandler<MemoryChainDb, MemoryTokenDb>> {
        self.inner.find_apply_handler(receiver, action)
    }

    fn is_privileged(&self, record: &AccountRecord) -> bool {
        record.privileged || record.name == self.account
    }

    fn config(&self) -> &ApplyConfig {
        self.inner.config()
    }
}

#[test]
fn test_controller_decides_privilege() {
    let mut inner = registry();
    inner
        .register(name("evt"), name("transfer"), notifier(&["alice"]))
        .register(name("alice"), name("transfer"), |ctx| ctx.require_privileged());
    let controller = Elevated { inner, account: name("alice") };

    let results = apply(&controller, &transfer()).unwrap();
    assert_eq!(receivers(&results), vec![name("evt"), name("alice")]);
}

// ---- Tests for console and effects ----

#[test]
fn test_console_append_macro() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), |ctx| {
        console_append!(ctx, "x", 1, "y");
        Ok(())
    });

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(results.applied_actions[0].console, "x1y");
}

#[test]
fn test_console_is_per_receiver() {
    let mut registry = registry();
    registry
        .register(name("evt"), name("transfer"), |ctx| {
            ctx.console_append("primary").notify(name("alice"));
            Ok(())
        })
        .register(name("alice"), name("transfer"), |ctx| {
            assert!(ctx.console().is_empty());
            let depth = ctx.depth();
            ctx.console_append("alice:").console_append(depth);
            Ok(())
        });

    let results = apply(&registry, &transfer()).unwrap();
    let consoles: Vec<_> = results.applied_actions.iter().map(|t| t.console.as_str()).collect();
    assert_eq!(consoles, vec!["primary", "alice:1"]);
}

#[test]
fn test_console_append_formatted() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), |ctx| {
        let args = serde_json::json!({ "token": "t1", "count": 2 });
        let args = args.as_object().cloned().unwrap_or_default();
        ctx.console_append_formatted("moved ${token} x${count}", &args);
        Ok(())
    });

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(results.applied_actions[0].console, "moved t1 x2");
}

#[test]
fn test_effects_recorded_per_trace() {
    let mut registry = registry();
    registry
        .register(name("evt"), name("transfer"), |ctx| {
            ctx.emit_effect(Bytes::from_static(b"debit"));
            ctx.emit_effect(b"credit".to_vec());
            ctx.notify(name("alice"));
            Ok(())
        })
        .register(name("alice"), name("transfer"), |ctx| {
            ctx.emit_effect(Bytes::from_static(b"seen"));
            Ok(())
        });

    let results = apply(&registry, &transfer()).unwrap();
    assert_eq!(
        results.applied_actions[0].effects,
        vec![Bytes::from_static(b"debit"), Bytes::from_static(b"credit")]
    );
    assert_eq!(results.applied_actions[1].effects, vec![Bytes::from_static(b"seen")]);
}

// ---- Tests for chain queries ----

#[test]
fn test_is_account_and_producers() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), |ctx| {
        assert!(ctx.is_account(name("alice")));
        assert!(!ctx.is_account(name("dave")));
        assert!(!ctx.deadline_exceeded());
        assert_eq!(ctx.get_active_producers()?, vec![name("bp3"), name("bp1"), name("bp2")]);
        Ok(())
    });

    apply(&registry, &transfer()).unwrap();
}

#[test]
fn test_packed_transaction_shared_across_contexts() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = registry();
    for receiver in ["evt", "alice"] {
        let seen = seen.clone();
        registry.register(name(receiver), name("transfer"), move |ctx| {
            let first = ctx.get_packed_transaction();
            let second = ctx.get_packed_transaction();
            assert!(std::ptr::eq(first.as_ptr(), second.as_ptr()));
            seen.lock().unwrap().push((first.as_ptr() as usize, first.clone()));
            ctx.notify(name("alice"));
            Ok(())
        });
    }

    let act = transfer();
    let meta = metadata(&act);
    let mut chain = ChainSession::new(chain_db());
    let mut tokens = TokenSession::new(MemoryTokenDb::default());
    apply_action(controller(&registry), &mut chain, &mut tokens, &act, &meta).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], seen[1]);
    assert_eq!(&seen[0].1[..], &meta.trx().encode()[..]);
}

#[test]
fn test_get_action_copy_and_errors() {
    let context_free = Action::new(name("evt"), name("ping"), Bytes::from_static(b"cf"));
    let act = transfer();
    let trx = Transaction {
        context_free_actions: vec![context_free.clone()],
        ..Transaction::with_actions(vec![act.clone()])
    };
    let meta = TransactionMetadata::new(trx);

    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), move |ctx| {
        let expected = transfer().encode();
        let mut buffer = vec![0u8; 256];
        let written = ctx.get_action(1, 0, &mut buffer)?;
        assert_eq!(written, expected.len());
        assert_eq!(&buffer[..written], &expected[..]);

        let written = ctx.get_action(0, 0, &mut buffer)?;
        assert_eq!(&buffer[..written], &context_free.encode()[..]);

        let mut small = vec![0xAAu8; 4];
        match ctx.get_action(1, 0, &mut small) {
            Err(ApplyError::BufferTooSmall { required, available }) => {
                assert_eq!(required, expected.len());
                assert_eq!(available, 4);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(small, vec![0xAA; 4]);

        assert!(matches!(
            ctx.get_action(1, 1, &mut buffer),
            Err(ApplyError::ActionIndexOutOfRange { kind: 1, index: 1 })
        ));
        assert!(matches!(
            ctx.get_action(2, 0, &mut buffer),
            Err(ApplyError::ActionIndexOutOfRange { kind: 2, index: 0 })
        ));
        Ok(())
    });

    let mut chain = ChainSession::new(chain_db());
    let mut tokens = TokenSession::new(MemoryTokenDb::default());
    apply_action(controller(&registry), &mut chain, &mut tokens, &act, &meta).unwrap();
}

// ---- Tests for transaction execution ----

fn art_token() -> TokenKey {
    TokenKey::Token { domain: name("art"), name: name("t1") }
}

type BobHandler = fn(&mut Ctx<'_>) -> Result<(), ApplyError>;

fn bob_succeeds(ctx: &mut Ctx<'_>) -> Result<(), ApplyError> {
    let depth = ctx.depth();
    console_append!(ctx, "bob at depth ", depth);
    Ok(())
}

fn bob_rejects_transfer(_ctx: &mut Ctx<'_>) -> Result<(), ApplyError> {
    Err(ApplyError::handler("insufficient balance"))
}

fn bob_requires_admin(ctx: &mut Ctx<'_>) -> Result<(), ApplyError> {
    ctx.require_authorization(name("art"), name("admin"))
}

fn writing_registry(bob: BobHandler) -> Registry {
    let mut registry = registry();
    registry
        .register(name("evt"), name("transfer"), |ctx| {
            ctx.tokens_mut().put(art_token(), Bytes::from_static(b"alice"));
            ctx.notify(name("alice"));
            Ok(())
        })
        .register(name("alice"), name("transfer"), |ctx| {
            ctx.chain_mut().put(
                name("alice"),
                Bytes::from_static(b"received"),
                Bytes::from_static(b"t1"),
            );
            assert_eq!(ctx.read_token(&art_token())?, Some(Bytes::from_static(b"alice")));
            ctx.notify(name("bob"));
            Ok(())
        })
        .register(name("bob"), name("transfer"), bob);
    registry
}

#[test]
fn test_transaction_commits_both_stores() {
    let registry = writing_registry(bob_succeeds);
    let (chain, tokens) = (chain_db(), MemoryTokenDb::default());
    let meta = metadata(&transfer());

    let trace =
        executor(&registry).apply_transaction(chain.clone(), tokens.clone(), &meta).unwrap();

    assert_eq!(trace.id, meta.id());
    assert_eq!(trace.action_results.len(), 1);
    assert_eq!(trace.trace_count(), 3);
    assert_eq!(trace.action_results[0].applied_actions[2].console, "bob at depth 2");
    assert_eq!(tokens.entry(&art_token()), Some(Bytes::from_static(b"alice")));
    assert_eq!(chain.entry(name("alice"), b"received"), Some(Bytes::from_static(b"t1")));
}

#[rstest]
#[case::handler_failure(bob_rejects_transfer as BobHandler, "handler failed: insufficient balance")]
#[case::missing_authorization(bob_requires_admin as BobHandler, "missing authorization art/admin")]
fn test_failure_at_depth_two_rolls_back(#[case] bob: BobHandler, #[case] expected: &str) {
    let registry = writing_registry(bob);
    let (chain, tokens) = (chain_db(), MemoryTokenDb::default());
    let meta = metadata(&transfer());

    let err =
        executor(&registry).apply_transaction(chain.clone(), tokens.clone(), &meta).unwrap_err();

    assert_eq!(err.to_string(), expected);
    assert_eq!(tokens.entry(&art_token()), None);
    assert_eq!(chain.entry(name("alice"), b"received"), None);
}

#[rstest]
#[case::rejected_at_prepare(MemoryTokenDb::default().rejecting())]
#[case::failed_commit(MemoryTokenDb::default().failing_commits())]
fn test_ledger_failure_leaves_chain_untouched(#[case] tokens: MemoryTokenDb) {
    let registry = writing_registry(bob_succeeds);
    let chain = chain_db();
    let meta = metadata(&transfer());

    let err =
        executor(&registry).apply_transaction(chain.clone(), tokens.clone(), &meta).unwrap_err();

    assert!(matches!(err, ApplyError::State(StateDbError::CommitRejected(_))));
    assert_eq!(tokens.entry(&art_token()), None);
    assert_eq!(chain.entry(name("alice"), b"received"), None);
}

#[test]
fn test_failure_in_later_action_discards_earlier_actions() {
    let mut registry = registry();
    registry
        .register(name("evt"), name("transfer"), |ctx| {
            ctx.tokens_mut().put(art_token(), Bytes::from_static(b"bob"));
            Ok(())
        })
        .register(name("evt"), name("burn"), |_ctx| Err(ApplyError::handler("burn disabled")));
    let trx = Transaction::with_actions(vec![
        transfer(),
        Action::new(name("evt"), name("burn"), Bytes::new()),
    ]);
    let meta = TransactionMetadata::new(trx);
    let tokens = MemoryTokenDb::default();

    assert!(executor(&registry).apply_transaction(chain_db(), tokens.clone(), &meta).is_err());
    assert_eq!(tokens.entry(&art_token()), None);
}

#[test]
fn test_each_action_gets_fresh_registry() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), notifier(&["alice"]));
    let meta = TransactionMetadata::new(Transaction::with_actions(vec![transfer(), transfer()]));

    let trace =
        executor(&registry).apply_transaction(chain_db(), MemoryTokenDb::default(), &meta).unwrap();

    assert_eq!(trace.action_results.len(), 2);
    for results in &trace.action_results {
        assert_eq!(receivers(results), vec![name("evt"), name("alice")]);
    }
}

#[test]
fn test_registry_rejects_invalid_config() {
    let err = Registry::new(ApplyConfig::default().with_max_notified_accounts(0)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = Registry::new(ApplyConfig::default().with_max_notify_depth(1_000)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_transaction_too_large() {
    let config = ApplyConfig::default().with_max_transaction_bytes(16);
    let registry = HandlerRegistry::new(config).unwrap();
    let meta = metadata(&transfer());

    let err = executor(&registry)
        .apply_transaction(chain_db(), MemoryTokenDb::default(), &meta)
        .unwrap_err();
    assert!(matches!(err, ApplyError::TransactionTooLarge { max: 16, .. }));
}

#[test]
fn test_deadline_exceeded() {
    let registry = registry();
    let meta = metadata(&transfer()).with_deadline(Instant::now() - Duration::from_secs(1));

    let err = executor(&registry)
        .apply_transaction(chain_db(), MemoryTokenDb::default(), &meta)
        .unwrap_err();
    assert!(matches!(err, ApplyError::DeadlineExceeded));
}

#[test]
fn test_trace_serializes_to_receipt_json() {
    let mut registry = registry();
    registry.register(name("evt"), name("transfer"), |ctx| {
        ctx.console_append("ok");
        Ok(())
    });
    let meta = metadata(&transfer());

    let trace =
        executor(&registry).apply_transaction(chain_db(), MemoryTokenDb::default(), &meta).unwrap();

    let json = serde_json::to_value(&trace).unwrap();
    let entry = &json["action_results"][0]["applied_actions"][0];
    assert_eq!(entry["receiver"], "evt");
    assert_eq!(entry["console"], "ok");
    assert_eq!(entry["act"]["name"], "transfer");
}
