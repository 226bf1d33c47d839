use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::{info, warn};
use reqwest::Method;
use rocket::futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{
    AssignedDelivery, Bill, ChangeRequest, CommissionReport, Complaint, CustomerSummary,
    DeliveryStats, ManagerStats, PauseRequest, Plan, Resolvable, RouteSummary, Session, Stop,
    SubscribeRequest, Subscription,
};
use crate::services::api::{ApiClient, ClientError, Reply};
use crate::services::{Action, Manifest, Resource};
use crate::utils::Notification;

/// Everything a dashboard renders, merged from one batch of reads.
///
/// A resource that failed to load keeps its empty default and is listed in
/// `failed`, so the page can tell "nothing yet" apart from "could not load".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub plans: Vec<Plan>,
    pub subscriptions: Vec<Subscription>,
    pub current_bill: Option<Bill>,
    pub subscribe_requests: Vec<SubscribeRequest>,
    pub change_requests: Vec<ChangeRequest>,
    pub pause_requests: Vec<PauseRequest>,
    pub complaints: Vec<Complaint>,
    pub stops: Vec<Stop>,
    pub delivery_stats: Option<DeliveryStats>,
    pub bills: Vec<Bill>,
    pub manager_stats: Option<ManagerStats>,
    pub customers: Vec<CustomerSummary>,
    pub deliveries: Vec<AssignedDelivery>,
    pub commission_report: Option<CommissionReport>,
    pub failed: BTreeSet<Resource>,
}

impl DashboardState {
    fn absorb(&mut self, resource: Resource, body: Value) -> Result<(), serde_json::Error> {
        match resource {
            Resource::Plans => self.plans = serde_json::from_value(body)?,
            Resource::MySubscriptions | Resource::AllSubscriptions => {
                self.subscriptions = serde_json::from_value(body)?
            }
            Resource::CurrentBill => self.current_bill = Bill::from_current_month(body)?,
            Resource::MySubscribeRequests | Resource::SubscribeQueue => {
                self.subscribe_requests = serde_json::from_value(body)?
            }
            Resource::ChangeQueue => self.change_requests = serde_json::from_value(body)?,
            Resource::MyPauseRequests | Resource::PauseQueue => {
                self.pause_requests = serde_json::from_value(body)?
            }
            Resource::MyComplaints | Resource::ComplaintQueue => {
                self.complaints = serde_json::from_value(body)?
            }
            Resource::TodayRoute => {
                let mut stops: Vec<Stop> = serde_json::from_value(body)?;
                stops.sort_by_key(|stop| stop.sequence);
                self.stops = stops;
            }
            Resource::DeliveryStats => self.delivery_stats = Some(serde_json::from_value(body)?),
            Resource::Bills => self.bills = serde_json::from_value(body)?,
            Resource::ManagerStats => self.manager_stats = Some(serde_json::from_value(body)?),
            Resource::Customers => self.customers = serde_json::from_value(body)?,
            Resource::Deliveries => self.deliveries = serde_json::from_value(body)?,
            Resource::CommissionReport => {
                self.commission_report = Some(serde_json::from_value(body)?)
            }
        }
        Ok(())
    }

    pub fn route_summary(&self) -> RouteSummary {
        RouteSummary::of(&self.stops)
    }

    /// Requests still waiting on a decision, across all three queues.
    pub fn pending_requests(&self) -> usize {
        fn pending<R: Resolvable>(requests: &[R]) -> usize {
            requests.iter().filter(|request| request.is_pending()).count()
        }

        pending(&self.subscribe_requests)
            + pending(&self.change_requests)
            + pending(&self.pause_requests)
    }

    /// One aggregate notice for the whole batch.
    pub fn load_notice(&self) -> Option<Notification> {
        if self.failed.is_empty() {
            None
        } else {
            Some(Notification::error("Failed to load data"))
        }
    }
}

/// The API refused the session token while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("API rejected the session token")]
pub struct SessionExpired;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("action is not available to this role")]
    Forbidden,
    #[error("API rejected the session token")]
    Unauthorized,
    #[error("{message}")]
    Failed { message: String },
}

impl From<SessionExpired> for ActionError {
    fn from(_: SessionExpired) -> Self {
        ActionError::Unauthorized
    }
}

impl ActionError {
    pub fn notification(&self) -> Notification {
        match self {
            ActionError::Forbidden => Notification::error("You are not allowed to do that"),
            ActionError::Unauthorized => Notification::error("Session expired. Login again."),
            ActionError::Failed { message } => Notification::error(message.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ack {
    pub notification: Notification,
    pub state: Arc<DashboardState>,
}

struct Snapshot {
    state: Arc<DashboardState>,
    started: u64,
    finished: u64,
    /// Set after an action; the next page view shows it instead of reloading.
    fresh: bool,
}

/// Loads one role's dashboard and runs its actions for one session.
///
/// Batches are serialized by `gate`. Every load request takes a tick from
/// `clock`; a caller that finds a snapshot finished after its own tick reuses
/// it instead of starting another batch.
pub struct DashboardController {
    api: ApiClient,
    token: String,
    manifest: &'static Manifest,
    gate: tokio::sync::Mutex<()>,
    clock: AtomicU64,
    snapshot: Mutex<Option<Snapshot>>,
}

impl DashboardController {
    pub fn new(api: ApiClient, session: &Session) -> Self {
        DashboardController {
            api,
            token: session.token.clone(),
            manifest: Manifest::for_role(session.role),
            gate: tokio::sync::Mutex::new(()),
            clock: AtomicU64::new(0),
            snapshot: Mutex::new(None),
        }
    }

    pub fn manifest(&self) -> &'static Manifest {
        self.manifest
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn with_snapshot<T>(&self, f: impl FnOnce(&mut Option<Snapshot>) -> T) -> T {
        f(&mut self.snapshot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Issue the manifest's reads concurrently and merge them.
    ///
    /// A call made while a batch is running waits for it and returns its
    /// result.
    pub async fn load_all(&self) -> Result<Arc<DashboardState>, SessionExpired> {
        let requested = self.tick();
        let _gate = self.gate.lock().await;

        let reusable = self.with_snapshot(|slot| {
            slot.as_ref()
                .filter(|snap| snap.finished > requested)
                .map(|snap| Arc::clone(&snap.state))
        });
        if let Some(state) = reusable {
            return Ok(state);
        }

        self.run_batch().await
    }

    /// Reload after an action. Only a batch that started after the action
    /// completed may be reused, so the result always reflects it.
    async fn reload(&self) -> Result<Arc<DashboardState>, SessionExpired> {
        let requested = self.tick();
        let _gate = self.gate.lock().await;

        let reusable = self.with_snapshot(|slot| {
            slot.as_ref()
                .filter(|snap| snap.started > requested)
                .map(|snap| Arc::clone(&snap.state))
        });
        if let Some(state) = reusable {
            return Ok(state);
        }

        self.run_batch().await
    }

    async fn fetch(&self, resource: Resource) -> (Resource, Result<Reply, ClientError>) {
        let reply = self
            .api
            .execute(Method::GET, resource.path(), Some(&self.token), None)
            .await;
        (resource, reply)
    }

    async fn run_batch(&self) -> Result<Arc<DashboardState>, SessionExpired> {
        let started = self.tick();
        let replies = join_all(
            self.manifest
                .resources
                .iter()
                .map(|&resource| self.fetch(resource)),
        )
        .await;

        let mut state = DashboardState::default();
        let mut expired = false;

        for (resource, reply) in replies {
            let merged = reply.and_then(|reply| {
                state
                    .absorb(resource, reply.body)
                    .map_err(|e| ClientError::Decode(e.to_string()))
            });

            match merged {
                Ok(()) => {}
                Err(ClientError::Unauthorized) => expired = true,
                Err(err) => {
                    warn!("could not load {}: {}", resource.label(), err);
                    state.failed.insert(resource);
                }
            }
        }

        if expired {
            return Err(SessionExpired);
        }

        let state = Arc::new(state);
        let finished = self.tick();
        self.with_snapshot(|slot| {
            *slot = Some(Snapshot {
                state: Arc::clone(&state),
                started,
                finished,
                fresh: false,
            })
        });

        Ok(state)
    }

    /// Run one action and, if the API accepts it, reload exactly once.
    ///
    /// On failure nothing is reloaded and the previous state stays current.
    pub async fn mutate(&self, action: Action) -> Result<Ack, ActionError> {
        if !self.manifest.allows(action.kind()) {
            warn!(
                "refused {:?} for the {} dashboard",
                action.kind(),
                self.manifest.role.label()
            );
            return Err(ActionError::Forbidden);
        }

        let body = action.body();
        let result = self
            .api
            .execute(action.method(), &action.path(), Some(&self.token), body.as_ref())
            .await;

        let reply = match result {
            Ok(reply) => reply,
            Err(ClientError::Unauthorized) => return Err(ActionError::Unauthorized),
            Err(err) => {
                warn!("{:?} failed: {}", action.kind(), err);
                self.mark_fresh();
                return Err(ActionError::Failed {
                    message: err.user_message(action.failure_message()),
                });
            }
        };

        let notification = action.acknowledge(&reply);
        info!("✓ {:?}: {}", action.kind(), notification.message);

        let state = self.reload().await?;
        self.mark_fresh();

        Ok(Ack {
            notification,
            state,
        })
    }

    fn mark_fresh(&self) {
        self.with_snapshot(|slot| {
            if let Some(snap) = slot.as_mut() {
                snap.fresh = true;
            }
        });
    }

    /// State for a page view: the snapshot an action just left behind, or a
    /// new batch.
    pub async fn view(&self) -> Result<Arc<DashboardState>, SessionExpired> {
        let fresh = self.with_snapshot(|slot| {
            slot.as_mut().filter(|snap| snap.fresh).map(|snap| {
                snap.fresh = false;
                Arc::clone(&snap.state)
            })
        });

        match fresh {
            Some(state) => Ok(state),
            None => self.load_all().await,
        }
    }
}

/// One controller per logged-in session. Clones share the same map.
#[derive(Default, Clone)]
pub struct DashboardRegistry {
    controllers: Arc<RwLock<HashMap<Uuid, Arc<DashboardController>>>>,
}

impl DashboardRegistry {
    /// The session's controller, replaced when the token or role changed.
    pub fn controller_for(
        &self,
        session_id: Uuid,
        session: &Session,
        api: &ApiClient,
    ) -> Arc<DashboardController> {
        let is_current = |controller: &DashboardController| {
            controller.token == session.token && controller.manifest.role == session.role
        };

        if let Some(controller) = self
            .controllers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session_id)
            .filter(|controller| is_current(controller))
        {
            return Arc::clone(controller);
        }

        let mut controllers = self
            .controllers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = controllers
            .entry(session_id)
            .or_insert_with(|| Arc::new(DashboardController::new(api.clone(), session)));
        if !is_current(entry) {
            *entry = Arc::new(DashboardController::new(api.clone(), session));
        }
        Arc::clone(entry)
    }

    pub fn evict(&self, session_id: &Uuid) {
        self.controllers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
    }

    /// Keep only the controllers whose session is still alive.
    pub fn retain(&self, live: impl Fn(&Uuid) -> bool) -> usize {
        let mut controllers = self
            .controllers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = controllers.len();
        controllers.retain(|id, _| live(id));
        before - controllers.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.controllers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decision, DeliveryStatus, RequestKind, Role};
    use crate::utils::response::NotificationLevel;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn session(role: Role) -> Session {
        Session {
            token: "tok".into(),
            role,
            username: "tester".into(),
            user_id: 1,
            expires_at: None,
        }
    }

    fn controller(server: &MockServer, role: Role) -> DashboardController {
        let api = ApiClient::new(&server.base_url()).unwrap();
        DashboardController::new(api, &session(role))
    }

    fn serve<'a>(server: &'a MockServer, path: &str, body: Value) -> httpmock::Mock<'a> {
        server.mock(|when, then| {
            when.method(GET)
                .path(path)
                .header("authorization", "Bearer tok");
            then.status(200).json_body(body);
        })
    }

    fn plan(id: i64) -> Value {
        json!({ "id": id, "title": format!("Plan {id}"), "price": "150.00" })
    }

    fn stop(id: i64, sequence: i64, status: &str) -> Value {
        json!({
            "id": id,
            "house_number": format!("{id}A"),
            "address_line": "MG Road",
            "publications": ["The Hindu"],
            "status": status,
            "sequence": sequence,
            "commission": "2.50"
        })
    }

    #[test]
    fn pending_requests_skip_resolved_ones() {
        let mut state = DashboardState::default();
        state.subscribe_requests = serde_json::from_value(json!([
            { "id": 1, "customer": 4, "plan": 5, "approved": null },
            { "id": 2, "customer": 4, "plan": 6, "approved": true }
        ]))
        .unwrap();
        state.pause_requests = serde_json::from_value(json!([
            { "id": 7, "customer": 4, "approved": null },
            { "id": 8, "customer": 9, "approved": false }
        ]))
        .unwrap();

        assert_eq!(state.pending_requests(), 2);
    }

    #[tokio::test]
    async fn one_failed_read_leaves_the_rest_populated() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/api/plans/");
            then.status(500);
        });
        serve(
            &server,
            "/api/customer/subscriptions/",
            json!([{ "id": 1, "plan": 5, "plan_title": "Plan 5", "status": "active" }]),
        );
        serve(&server, "/api/customer/bills/current-month/", json!({}));
        serve(&server, "/api/customer/subscribe-requests/", json!([]));
        serve(&server, "/api/customer/pause-requests/", json!([]));
        serve(&server, "/api/customer/my-complaints/", json!([]));

        let state = controller(&server, Role::Customer).load_all().await.unwrap();

        assert!(state.plans.is_empty());
        assert_eq!(state.subscriptions.len(), 1);
        assert_eq!(state.current_bill, None);
        assert_eq!(state.failed, BTreeSet::from([Resource::Plans]));
        assert_eq!(
            state.load_notice().map(|n| n.message),
            Some("Failed to load data".to_string())
        );
    }

    #[tokio::test]
    async fn malformed_bodies_count_as_failed() {
        let server = MockServer::start_async().await;
        serve(&server, "/api/delivery/today/summary/", json!({ "detail": "odd" }));
        serve(
            &server,
            "/api/delivery/stats/",
            json!({ "total_deliveries": 3, "total_commission": 7.5 }),
        );

        let state = controller(&server, Role::Delivery).load_all().await.unwrap();

        assert!(state.stops.is_empty());
        assert_eq!(state.failed, BTreeSet::from([Resource::TodayRoute]));
        assert_eq!(state.delivery_stats.as_ref().map(|s| s.total_deliveries), Some(3));
    }

    #[tokio::test]
    async fn a_refused_token_fails_the_whole_load() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/api/cse/complaints/");
            then.status(401).json_body(json!({ "detail": "Token expired" }));
        });

        let result = controller(&server, Role::Cse).load_all().await;
        assert_eq!(result, Err(SessionExpired));
    }

    #[tokio::test]
    async fn overlapping_loads_share_one_batch() {
        let server = MockServer::start_async().await;
        let complaints = server.mock(|when, then| {
            when.path("/api/cse/complaints/");
            then.status(200)
                .delay(Duration::from_millis(200))
                .json_body(json!([]));
        });

        let controller = controller(&server, Role::Cse);
        let (first, second) = tokio::join!(controller.load_all(), controller.load_all());

        assert_eq!(complaints.hits(), 1);
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    }

    #[tokio::test]
    async fn sequential_loads_fetch_again() {
        let server = MockServer::start_async().await;
        let complaints = serve(&server, "/api/cse/complaints/", json!([]));

        let controller = controller(&server, Role::Cse);
        controller.load_all().await.unwrap();
        controller.load_all().await.unwrap();

        assert_eq!(complaints.hits(), 2);
    }

    #[tokio::test]
    async fn actions_outside_the_manifest_never_reach_the_api() {
        let server = MockServer::start_async().await;
        let mark = server.mock(|when, then| {
            when.path("/api/delivery/mark/12/");
            then.status(200);
        });

        let result = controller(&server, Role::Customer)
            .mutate(Action::MarkDelivered { stop_id: 12 })
            .await;

        assert_eq!(result.unwrap_err(), ActionError::Forbidden);
        assert_eq!(mark.hits(), 0);
    }

    #[tokio::test]
    async fn subscribing_reloads_exactly_once() {
        let server = MockServer::start_async().await;
        let plans = serve(&server, "/api/plans/", json!([plan(5)]));
        let subscriptions = serve(&server, "/api/customer/subscriptions/", json!([]));
        let bill = serve(&server, "/api/customer/bills/current-month/", json!({}));
        let requests = serve(
            &server,
            "/api/customer/subscribe-requests/",
            json!([{ "id": 21, "customer": 1, "plan": 5, "approved": null }]),
        );
        let pauses = serve(&server, "/api/customer/pause-requests/", json!([]));
        let complaints = serve(&server, "/api/customer/my-complaints/", json!([]));
        let subscribe = server.mock(|when, then| {
            when.method(POST)
                .path("/api/customer/subscribe/")
                .json_body(json!({ "plan_id": 5 }));
            then.status(201).json_body(json!({ "message": "Subscription request sent" }));
        });

        let controller = controller(&server, Role::Customer);
        let ack = controller
            .mutate(Action::Subscribe { plan_id: 5 })
            .await
            .unwrap();

        subscribe.assert();
        assert_eq!(ack.notification.level, NotificationLevel::Success);
        assert_eq!(ack.notification.message, "Request sent to Subscription Manager");
        assert_eq!(ack.state.subscribe_requests.len(), 1);
        assert!(ack.state.subscribe_requests[0].is_pending());

        // The redirected page view shows the reloaded state without another batch.
        let viewed = controller.view().await.unwrap();
        assert!(Arc::ptr_eq(&viewed, &ack.state));

        for mock in [&plans, &subscriptions, &bill, &requests, &pauses, &complaints] {
            assert_eq!(mock.hits(), 1);
        }
    }

    #[tokio::test]
    async fn marking_a_stop_delivered_moves_it_out_of_pending() {
        let server = MockServer::start_async().await;
        let mut route = serve(
            &server,
            "/api/delivery/today/summary/",
            json!([stop(13, 2, "pending"), stop(12, 1, "pending")]),
        );
        serve(&server, "/api/delivery/stats/", json!({ "total_deliveries": 0 }));

        let controller = controller(&server, Role::Delivery);
        let before = controller.load_all().await.unwrap();
        assert_eq!(before.stops.iter().map(|s| s.id).collect::<Vec<_>>(), [12, 13]);
        assert_eq!(before.route_summary().pending, 2);

        route.delete_async().await;
        route = serve(
            &server,
            "/api/delivery/today/summary/",
            json!([stop(12, 1, "delivered"), stop(13, 2, "pending")]),
        );
        server.mock(|when, then| {
            when.method(POST).path("/api/delivery/mark/12/");
            then.status(200).json_body(json!({ "commission": 2.50 }));
        });

        let ack = controller
            .mutate(Action::MarkDelivered { stop_id: 12 })
            .await
            .unwrap();

        assert!(ack.notification.message.contains("2.50"));
        assert_eq!(ack.state.stops[0].status, DeliveryStatus::Delivered);
        assert_eq!(ack.state.route_summary().pending, 1);
        assert_eq!(ack.state.route_summary().delivered, 1);
        assert_eq!(route.hits(), 1);
    }

    #[tokio::test]
    async fn a_failed_resolution_keeps_the_previous_state() {
        let server = MockServer::start_async().await;
        serve(&server, "/api/plans/", json!([]));
        serve(&server, "/api/sm/requests/subscribe/", json!([]));
        serve(&server, "/api/sm/requests/change/", json!([]));
        let pauses = serve(
            &server,
            "/api/sm/requests/pause/",
            json!([{
                "id": 7,
                "customer": 3,
                "start_date": "2025-12-01",
                "end_date": "2025-12-05",
                "reason": "travel",
                "approved": null
            }]),
        );
        serve(&server, "/api/manager/bills/", json!([]));
        let approve = server.mock(|when, then| {
            when.method(POST).path("/api/sm/requests/pause/7/approve/");
            then.status(500);
        });

        let controller = controller(&server, Role::SubscriptionManager);
        let before = controller.load_all().await.unwrap();

        let err = controller
            .mutate(Action::Resolve {
                kind: RequestKind::Pause,
                request_id: 7,
                decision: Decision::Approve,
            })
            .await
            .unwrap_err();

        approve.assert();
        assert_eq!(
            err,
            ActionError::Failed {
                message: "Action failed".into()
            }
        );

        let after = controller.view().await.unwrap();
        assert_eq!(*after, *before);
        assert!(after.pause_requests[0].is_pending());
        assert_eq!(pauses.hits(), 1);
    }

    #[tokio::test]
    async fn server_messages_are_passed_through() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/manager/bills/9/mark-paid/");
            then.status(404).json_body(json!({ "error": "Bill not found" }));
        });

        let err = controller(&server, Role::Manager)
            .mutate(Action::MarkBillPaid { bill_id: 9 })
            .await
            .unwrap_err();

        assert_eq!(err.notification().message, "Bill not found");
    }

    #[tokio::test]
    async fn a_refused_token_during_an_action_is_unauthorized() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/manager/send-reminders/");
            then.status(401);
        });

        let err = controller(&server, Role::Manager)
            .mutate(Action::SendReminders)
            .await
            .unwrap_err();

        assert_eq!(err, ActionError::Unauthorized);
        assert_eq!(err.notification().message, "Session expired. Login again.");
    }

    #[test]
    fn registry_keeps_one_controller_per_session() {
        let api = ApiClient::new("http://127.0.0.1:8000").unwrap();
        let registry = DashboardRegistry::default();
        let id = Uuid::new_v4();

        let first = registry.controller_for(id, &session(Role::Cse), &api);
        let again = registry.controller_for(id, &session(Role::Cse), &api);
        assert!(Arc::ptr_eq(&first, &again));

        let mut relogged = session(Role::Manager);
        relogged.token = "other".into();
        let replaced = registry.controller_for(id, &relogged, &api);
        assert!(!Arc::ptr_eq(&first, &replaced));
        assert_eq!(replaced.manifest().role, Role::Manager);

        registry.evict(&id);
        let fresh = registry.controller_for(id, &relogged, &api);
        assert!(!Arc::ptr_eq(&replaced, &fresh));
    }

    #[test]
    fn registry_drops_controllers_of_dead_sessions() {
        let api = ApiClient::new("http://127.0.0.1:8000").unwrap();
        let registry = DashboardRegistry::default();
        let alive = Uuid::new_v4();
        let gone = Uuid::new_v4();

        registry.controller_for(alive, &session(Role::Cse), &api);
        registry.clone().controller_for(gone, &session(Role::Delivery), &api);
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.retain(|id| *id == alive), 1);
        assert_eq!(registry.len(), 1);
    }
}
