//! Checked-date synchronizer.
//!
//! Local state is updated optimistically before each remote call and rolled
//! back when the call fails. Only the synchronous part of each operation runs
//! under the state lock; the remote call happens after the lock is released,
//! so several requests may be in flight at once.
//!
//! Per date:
//! `Unchecked -> toggle -> OptimisticallyChecked -> ack -> Checked` (failure: back to `Unchecked`),
//! `Checked -> toggle -> ConfirmPending -> confirm -> OptimisticallyUnchecked -> ack -> Unchecked`
//! (failure: whole-set restore), `ConfirmPending -> cancel -> Checked`.

use crate::auth::{Session, SessionEvent};
use crate::dates::date_key;
use crate::errors::{SyncError, SyncOp};
use crate::models::{CheckedDateSet, ToggleOutcome};
use crate::remote::RecordStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info};

#[derive(Debug, Default)]
struct SyncState {
    session: Option<Session>,
    checked: CheckedDateSet,
    pending: Option<NaiveDate>,
    loading: bool,
    last_notice: Option<String>,
    /// Bumped on every sign-out; results from an older epoch are discarded.
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSnapshot {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub checked: CheckedDateSet,
    pub pending: Option<NaiveDate>,
    pub loading: bool,
    pub last_notice: Option<String>,
}

pub struct Synchronizer<S> {
    store: S,
    state: Mutex<SyncState>,
    ready: watch::Sender<Option<String>>,
}

impl<S: RecordStore> Synchronizer<S> {
    pub fn new(store: S) -> Self {
        let (ready, _rx) = watch::channel(None);
        Self {
            store,
            state: Mutex::new(SyncState::default()),
            ready,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn snapshot(&self) -> SyncSnapshot {
        let state = self.state.lock().await;
        SyncSnapshot {
            user_id: state.session.as_ref().map(|session| session.user_id.clone()),
            email: state.session.as_ref().and_then(|session| session.email.clone()),
            checked: state.checked.clone(),
            pending: state.pending,
            loading: state.loading,
            last_notice: state.last_notice.clone(),
        }
    }

    /// Installs a session. A different user than the current one clears state first.
    pub async fn begin_session(&self, session: Session) {
        let mut state = self.state.lock().await;
        let switching = state
            .session
            .as_ref()
            .is_some_and(|current| current.user_id != session.user_id);
        if switching {
            Self::reset(&mut state);
            self.ready.send_replace(None);
        }
        self.store.authorize(Some(&session));
        info!(user_id = %session.user_id, "synchronizer attached to session");
        state.session = Some(session);
    }

    /// Same user, new credentials. Does not reload.
    pub async fn refresh_session(&self, session: Session) {
        let mut state = self.state.lock().await;
        if state
            .session
            .as_ref()
            .is_some_and(|current| current.user_id == session.user_id)
        {
            self.store.authorize(Some(&session));
            state.session = Some(session);
        }
    }

    /// Fetches the user's rows and replaces the checked set wholesale.
    /// On failure the set is left untouched.
    pub async fn load(&self, user_id: &str) -> Result<(), SyncError> {
        let epoch = {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.epoch
        };

        let result = self.store.fetch_by_user(user_id).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            debug!(user_id, "discarding load result from a previous session");
            return Ok(());
        }
        state.loading = false;

        let outcome = match result {
            Ok(rows) => {
                state.checked = CheckedDateSet::from_rows(rows);
                state.last_notice = None;
                info!(user_id, count = state.checked.len(), "loaded checked dates");
                Ok(())
            }
            Err(err) => {
                let err = SyncError::from_remote(SyncOp::Load, err);
                error!(user_id, "load failed: {err}");
                state.last_notice = Some(err.to_string());
                Err(err)
            }
        };
        drop(state);

        self.ready.send_replace(Some(user_id.to_string()));
        outcome
    }

    /// Waits until a load for `user_id` has finished, successfully or not.
    /// Returns `false` as soon as `sessions` no longer holds that user, since
    /// the load will then never complete for it.
    pub async fn wait_ready(&self, user_id: &str, mut sessions: watch::Receiver<Option<Session>>) -> bool {
        let mut ready = self.ready.subscribe();
        let loaded = async { ready.wait_for(|ready| ready.as_deref() == Some(user_id)).await.is_ok() };
        let ended = async {
            let _ = sessions
                .wait_for(|session| session.as_ref().map(|s| s.user_id.as_str()) != Some(user_id))
                .await;
        };

        tokio::select! {
            loaded = loaded => loaded,
            () = ended => false,
        }
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.state.lock().await.session.clone()
    }

    /// Unchecked dates are checked optimistically and inserted remotely.
    /// Checked dates only raise a confirmation request, replacing any earlier one.
    pub async fn toggle_check(&self, date: NaiveDate) -> Result<ToggleOutcome, SyncError> {
        let key = date_key(date);

        let (user_id, epoch) = {
            let mut state = self.state.lock().await;
            let Some(user_id) = state.session.as_ref().map(|session| session.user_id.clone()) else {
                return Ok(ToggleOutcome::Ignored);
            };

            if state.checked.is_checked(&key) {
                if let Some(previous) = state.pending.replace(date) {
                    if previous != date {
                        debug!(%previous, %date, "replacing pending confirmation");
                    }
                }
                return Ok(ToggleOutcome::ConfirmRequired);
            }

            state.checked.check(key.clone());
            debug!(date = %key, "optimistically checked");
            (user_id, state.epoch)
        };

        let result = self.store.insert(&key, &user_id).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(()) => {
                if state.epoch == epoch {
                    state.last_notice = None;
                }
                Ok(ToggleOutcome::Checked)
            }
            Err(err) => {
                let err = SyncError::from_remote(SyncOp::Insert, err);
                error!(date = %key, "insert failed, rolling back: {err}");
                if state.epoch == epoch {
                    state.checked.remove(&key);
                    state.last_notice = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Removes the pending date optimistically and deletes it remotely.
    /// Returns the date that was unchecked, or `None` when nothing was pending.
    pub async fn confirm_uncheck(&self) -> Result<Option<NaiveDate>, SyncError> {
        let (date, key, user_id, snapshot, epoch) = {
            let mut state = self.state.lock().await;
            let Some(date) = state.pending.take() else {
                return Ok(None);
            };
            let Some(user_id) = state.session.as_ref().map(|session| session.user_id.clone()) else {
                return Ok(None);
            };

            let key = date_key(date);
            let snapshot = state.checked.clone();
            state.checked.remove(&key);
            debug!(date = %key, "optimistically unchecked");
            (date, key, user_id, snapshot, state.epoch)
        };

        let result = self.store.delete_matching(&key, &user_id).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(()) => {
                if state.epoch == epoch {
                    state.last_notice = None;
                }
                Ok(Some(date))
            }
            Err(err) => {
                let err = SyncError::from_remote(SyncOp::Delete, err);
                error!(date = %key, "delete failed, restoring snapshot: {err}");
                if state.epoch == epoch {
                    state.checked = snapshot;
                    state.last_notice = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    pub async fn cancel_uncheck(&self) -> Option<NaiveDate> {
        self.state.lock().await.pending.take()
    }

    /// Drops everything owned by the ended session. Returns `false` when no
    /// session was attached, so a sign-out seen twice only clears once.
    pub async fn clear_on_sign_out(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.session.is_none() {
            return false;
        }
        Self::reset(&mut state);
        self.store.authorize(None);
        self.ready.send_replace(None);
        info!("cleared local state after sign-out");
        true
    }

    fn reset(state: &mut SyncState) {
        state.session = None;
        state.checked.clear();
        state.pending = None;
        state.loading = false;
        state.last_notice = None;
        state.epoch = state.epoch.wrapping_add(1);
    }
}

/// Drives the synchronizer from session changes until the sender is dropped.
///
/// Transitions are computed against the session the synchronizer actually
/// holds, so a sign-out already applied directly is not applied again and a
/// quick sign-out/sign-in pair still reloads.
pub async fn run_session_watcher<S: RecordStore>(
    sync: Arc<Synchronizer<S>>,
    mut sessions: watch::Receiver<Option<Session>>,
) {
    loop {
        let next = sessions.borrow_and_update().clone();
        let current = sync.current_session().await;
        match SessionEvent::between(current.as_ref(), next.as_ref()) {
            Some(SessionEvent::SignedIn(session)) => {
                sync.begin_session(session.clone()).await;
                let sync = Arc::clone(&sync);
                tokio::spawn(async move {
                    // Failures are already recorded as the visible notice.
                    let _ = sync.load(&session.user_id).await;
                });
            }
            Some(SessionEvent::TokenRefreshed(session)) => sync.refresh_session(session).await,
            Some(SessionEvent::SignedOut) => {
                sync.clear_on_sign_out().await;
            }
            None => {}
        }

        if sessions.changed().await.is_err() {
            debug!("session source closed, stopping watcher");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionHub;
    use crate::errors::RemoteError;
    use crate::models::RemoteRow;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct ScriptedStore {
        rows: Vec<RemoteRow>,
        fail_fetch: Option<&'static str>,
        fetch_gate: Option<Arc<Notify>>,
        fail_insert: Option<&'static str>,
        fail_delete: Option<&'static str>,
        insert_gate: Option<Arc<Notify>>,
        delete_gate: Option<Arc<Notify>>,
        calls: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedStore {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RecordStore for ScriptedStore {
        async fn fetch_by_user(&self, user_id: &str) -> Result<Vec<RemoteRow>, RemoteError> {
            self.record(format!("fetch {user_id}"));
            if let Some(gate) = &self.fetch_gate {
                gate.notified().await;
            }
            match self.fail_fetch {
                Some(message) => Err(RemoteError::new(message)),
                None => Ok(self.rows.clone()),
            }
        }

        async fn insert(&self, date: &str, user_id: &str) -> Result<(), RemoteError> {
            self.record(format!("insert {date} {user_id}"));
            if let Some(gate) = &self.insert_gate {
                gate.notified().await;
            }
            match self.fail_insert {
                Some(message) => Err(RemoteError::new(message)),
                None => Ok(()),
            }
        }

        async fn delete_matching(&self, date: &str, user_id: &str) -> Result<(), RemoteError> {
            self.record(format!("delete {date} {user_id}"));
            if let Some(gate) = &self.delete_gate {
                gate.notified().await;
            }
            match self.fail_delete {
                Some(message) => Err(RemoteError::new(message)),
                None => Ok(()),
            }
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date: &str) -> RemoteRow {
        RemoteRow {
            date: Some(date.to_string()),
        }
    }

    fn alice() -> Session {
        Session {
            user_id: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            access_token: None,
        }
    }

    async fn signed_in(store: ScriptedStore) -> Arc<Synchronizer<ScriptedStore>> {
        let sync = Arc::new(Synchronizer::new(store));
        sync.begin_session(alice()).await;
        sync.load("alice").await.unwrap();
        sync
    }

    async fn checked(sync: &Synchronizer<ScriptedStore>) -> CheckedDateSet {
        sync.snapshot().await.checked
    }

    #[tokio::test]
    async fn load_reflects_fetched_rows() {
        let store = ScriptedStore {
            rows: vec![row("2024-02-10"), RemoteRow { date: None }, row("2024-02-12")],
            ..Default::default()
        };
        let sync = signed_in(store).await;

        let expected: CheckedDateSet = ["2024-02-10", "2024-02-12"].into_iter().collect();
        assert_eq!(checked(&sync).await, expected);
        assert!(!sync.snapshot().await.loading);
        assert_eq!(sync.store().calls(), vec!["fetch alice"]);
    }

    #[tokio::test]
    async fn failed_load_keeps_state_and_reports_policy() {
        let store = ScriptedStore {
            fail_fetch: Some("permission denied by row-level security policy"),
            ..Default::default()
        };
        let sync = Arc::new(Synchronizer::new(store));
        sync.begin_session(alice()).await;

        let err = sync.load("alice").await.unwrap_err();
        assert!(matches!(err, SyncError::AuthorizationDenied { op: SyncOp::Load, .. }));

        let snapshot = sync.snapshot().await;
        assert!(snapshot.checked.is_empty());
        assert_eq!(snapshot.last_notice, Some(err.to_string()));
        assert_eq!(sync.store().calls().len(), 1);
    }

    #[tokio::test]
    async fn toggle_unchecked_date_persists() {
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-01")],
            ..Default::default()
        })
        .await;
        let before = checked(&sync).await;

        let outcome = sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Checked);

        let mut expected = before.clone();
        expected.check("2024-02-10");
        assert_eq!(checked(&sync).await, expected);
        assert!(sync.store().calls().contains(&"insert 2024-02-10 alice".to_string()));
    }

    #[tokio::test]
    async fn check_is_visible_before_the_insert_resolves() {
        let gate = Arc::new(Notify::new());
        let sync = signed_in(ScriptedStore {
            insert_gate: Some(Arc::clone(&gate)),
            ..Default::default()
        })
        .await;

        let task = tokio::spawn({
            let sync = Arc::clone(&sync);
            async move { sync.toggle_check(ymd(2024, 2, 10)).await }
        });
        while !checked(&sync).await.is_checked("2024-02-10") {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        gate.notify_one();
        assert_eq!(task.await.unwrap().unwrap(), ToggleOutcome::Checked);
        assert!(checked(&sync).await.is_checked("2024-02-10"));
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_exactly() {
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-01"), row("2024-02-02")],
            fail_insert: Some("network unreachable"),
            ..Default::default()
        })
        .await;
        let before = checked(&sync).await;

        let err = sync.toggle_check(ymd(2024, 2, 10)).await.unwrap_err();
        assert!(matches!(err, SyncError::TransientRemoteFailure { op: SyncOp::Insert, .. }));
        assert_eq!(checked(&sync).await, before);
        assert!(sync.snapshot().await.last_notice.is_some());
    }

    #[tokio::test]
    async fn toggling_checked_date_only_requests_confirmation() {
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-10")],
            ..Default::default()
        })
        .await;
        let before = checked(&sync).await;

        let outcome = sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::ConfirmRequired);

        let snapshot = sync.snapshot().await;
        assert_eq!(snapshot.checked, before);
        assert_eq!(snapshot.pending, Some(ymd(2024, 2, 10)));
        assert_eq!(sync.store().calls(), vec!["fetch alice"]);
    }

    #[tokio::test]
    async fn confirm_uncheck_removes_date() {
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-10")],
            ..Default::default()
        })
        .await;

        sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();
        let unchecked = sync.confirm_uncheck().await.unwrap();
        assert_eq!(unchecked, Some(ymd(2024, 2, 10)));

        let snapshot = sync.snapshot().await;
        assert!(snapshot.checked.is_empty());
        assert_eq!(snapshot.pending, None);
        assert!(sync.store().calls().contains(&"delete 2024-02-10 alice".to_string()));
    }

    #[tokio::test]
    async fn confirm_without_pending_is_a_no_op() {
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-10")],
            ..Default::default()
        })
        .await;

        assert_eq!(sync.confirm_uncheck().await.unwrap(), None);
        assert!(checked(&sync).await.is_checked("2024-02-10"));
        assert_eq!(sync.store().calls(), vec!["fetch alice"]);
    }

    #[tokio::test]
    async fn cancel_clears_pending_without_touching_dates() {
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-10")],
            ..Default::default()
        })
        .await;
        let before = checked(&sync).await;

        sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();
        assert_eq!(sync.cancel_uncheck().await, Some(ymd(2024, 2, 10)));

        let snapshot = sync.snapshot().await;
        assert_eq!(snapshot.pending, None);
        assert_eq!(snapshot.checked, before);
    }

    #[tokio::test]
    async fn second_uncheck_request_replaces_pending_target() {
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-10"), row("2024-02-11")],
            ..Default::default()
        })
        .await;

        sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();
        sync.toggle_check(ymd(2024, 2, 11)).await.unwrap();
        assert_eq!(sync.snapshot().await.pending, Some(ymd(2024, 2, 11)));

        sync.confirm_uncheck().await.unwrap();
        let remaining: Vec<_> = checked(&sync).await.checked_keys().map(str::to_string).collect();
        assert_eq!(remaining, vec!["2024-02-10"]);
    }

    #[tokio::test]
    async fn failed_uncheck_restores_whole_snapshot() {
        let gate = Arc::new(Notify::new());
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-10"), row("2024-02-11")],
            fail_delete: Some("upstream timeout"),
            delete_gate: Some(Arc::clone(&gate)),
            ..Default::default()
        })
        .await;
        let before = checked(&sync).await;

        sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();
        let task = tokio::spawn({
            let sync = Arc::clone(&sync);
            async move { sync.confirm_uncheck().await }
        });
        while checked(&sync).await.is_checked("2024-02-10") {
            tokio::task::yield_now().await;
        }

        // An unrelated check lands while the delete is in flight.
        sync.toggle_check(ymd(2024, 2, 20)).await.unwrap();
        assert!(checked(&sync).await.is_checked("2024-02-20"));

        gate.notify_one();
        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, SyncError::TransientRemoteFailure { op: SyncOp::Delete, .. }));
        assert_eq!(checked(&sync).await, before);
    }

    #[tokio::test]
    async fn operations_without_session_are_ignored() {
        let sync = Synchronizer::new(ScriptedStore::default());
        assert_eq!(
            sync.toggle_check(ymd(2024, 2, 10)).await.unwrap(),
            ToggleOutcome::Ignored
        );
        assert_eq!(sync.confirm_uncheck().await.unwrap(), None);
        assert!(sync.snapshot().await.checked.is_empty());
        assert!(sync.store().calls().is_empty());
    }

    #[tokio::test]
    async fn sign_out_clears_everything() {
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-10"), row("2024-02-11")],
            ..Default::default()
        })
        .await;
        sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();

        assert!(sync.clear_on_sign_out().await);
        let snapshot = sync.snapshot().await;
        assert!(snapshot.checked.is_empty());
        assert_eq!(snapshot.pending, None);
        assert_eq!(snapshot.user_id, None);

        assert!(!sync.clear_on_sign_out().await);
    }

    #[tokio::test]
    async fn late_failure_after_sign_out_does_not_restore_old_user_data() {
        let gate = Arc::new(Notify::new());
        let sync = signed_in(ScriptedStore {
            rows: vec![row("2024-02-10")],
            fail_delete: Some("upstream timeout"),
            delete_gate: Some(Arc::clone(&gate)),
            ..Default::default()
        })
        .await;

        sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();
        let task = tokio::spawn({
            let sync = Arc::clone(&sync);
            async move { sync.confirm_uncheck().await }
        });
        while checked(&sync).await.is_checked("2024-02-10") {
            tokio::task::yield_now().await;
        }

        sync.clear_on_sign_out().await;
        gate.notify_one();
        assert!(task.await.unwrap().is_err());

        let snapshot = sync.snapshot().await;
        assert!(snapshot.checked.is_empty());
        assert_eq!(snapshot.last_notice, None);
    }

    #[tokio::test]
    async fn watcher_loads_on_sign_in_and_clears_on_sign_out() {
        let hub = SessionHub::new();
        let sync = Arc::new(Synchronizer::new(ScriptedStore {
            rows: vec![row("2024-02-10")],
            ..Default::default()
        }));
        let watcher = tokio::spawn(run_session_watcher(Arc::clone(&sync), hub.subscribe()));

        hub.sign_in(alice());
        assert!(sync.wait_ready("alice", hub.subscribe()).await);
        assert!(checked(&sync).await.is_checked("2024-02-10"));

        let mut refreshed = alice();
        refreshed.access_token = Some("fresh".to_string());
        hub.refresh(refreshed);
        hub.sign_out();
        while sync.snapshot().await.user_id.is_some() {
            tokio::task::yield_now().await;
        }
        assert!(checked(&sync).await.is_empty());
        assert_eq!(sync.store().calls(), vec!["fetch alice"]);

        drop(hub);
        watcher.await.unwrap();
    }

    #[tokio::test]
    async fn wait_ready_gives_up_when_sign_in_is_undone() {
        let hub = SessionHub::new();
        let sync = Synchronizer::new(ScriptedStore::default());

        hub.sign_in(alice());
        hub.sign_out();
        assert!(!sync.wait_ready("alice", hub.subscribe()).await);
    }

    #[tokio::test]
    async fn wait_ready_gives_up_when_signed_out_mid_load() {
        let gate = Arc::new(Notify::new());
        let hub = SessionHub::new();
        let sync = Arc::new(Synchronizer::new(ScriptedStore {
            rows: vec![row("2024-02-10")],
            fetch_gate: Some(Arc::clone(&gate)),
            ..Default::default()
        }));
        let watcher = tokio::spawn(run_session_watcher(Arc::clone(&sync), hub.subscribe()));

        hub.sign_in(alice());
        while !sync.snapshot().await.loading {
            tokio::task::yield_now().await;
        }

        let waiter = tokio::spawn({
            let sync = Arc::clone(&sync);
            let sessions = hub.subscribe();
            async move { sync.wait_ready("alice", sessions).await }
        });
        hub.sign_out();
        assert!(!waiter.await.unwrap());

        gate.notify_one();
        while sync.snapshot().await.user_id.is_some() {
            tokio::task::yield_now().await;
        }
        assert!(checked(&sync).await.is_empty());

        drop(hub);
        watcher.await.unwrap();
    }

    #[tokio::test]
    async fn quick_sign_out_and_back_in_clears_then_reloads() {
        let hub = SessionHub::new();
        let sync = Arc::new(Synchronizer::new(ScriptedStore {
            rows: vec![row("2024-02-10")],
            ..Default::default()
        }));
        let watcher = tokio::spawn(run_session_watcher(Arc::clone(&sync), hub.subscribe()));

        hub.sign_in(alice());
        assert!(sync.wait_ready("alice", hub.subscribe()).await);
        sync.toggle_check(ymd(2024, 2, 10)).await.unwrap();
        assert_eq!(sync.snapshot().await.pending, Some(ymd(2024, 2, 10)));

        // Sign-out is applied directly; the watcher never sees the `None`.
        hub.sign_out();
        assert!(sync.clear_on_sign_out().await);
        assert_eq!(sync.snapshot().await.pending, None);
        hub.sign_in(alice());

        assert!(sync.wait_ready("alice", hub.subscribe()).await);
        assert!(checked(&sync).await.is_checked("2024-02-10"));
        assert_eq!(sync.store().calls(), vec!["fetch alice", "fetch alice"]);

        drop(hub);
        watcher.await.unwrap();
    }
}
