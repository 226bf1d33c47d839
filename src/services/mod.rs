pub mod actions;
pub mod api;
pub mod auth;
pub mod csrf;
pub mod dashboard;
pub mod jwt;
pub mod manifest;
pub mod session_store;

pub use actions::{Action, ActionKind};
pub use api::ApiClient;
pub use auth::AuthService;
pub use csrf::CsrfService;
pub use dashboard::{ActionError, DashboardController, DashboardRegistry};
pub use jwt::JwtService;
pub use manifest::{Manifest, Resource};
pub use session_store::{MemorySessionStore, SessionStore, SharedSessionStore};

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use rocket::fairing::AdHoc;

use crate::config::Config;

/// Reads the configuration once and manages every service the routes need.
pub fn init() -> AdHoc {
    AdHoc::try_on_ignite("Samaachar services", |rocket| async {
        let config = match Config::from_figment(rocket.figment()) {
            Ok(config) => config,
            Err(e) => {
                error!("✗ Invalid configuration: {}", e);
                return Err(rocket);
            }
        };

        let api = match ApiClient::new(&config.api_base_url) {
            Ok(api) => api,
            Err(e) => {
                error!("✗ Failed to build the API client: {}", e);
                return Err(rocket);
            }
        };

        if config.uses_default_secret() && !Config::is_development() {
            warn!("csrf_secret is not set; using the development default");
        }
        info!("✓ API client ready for {}", api.base_url());

        let csrf = CsrfService::new(&config.csrf_secret);

        Ok(rocket
            .manage(api)
            .manage(csrf)
            .manage(MemorySessionStore::shared(config.idle_timeout()))
            .manage(DashboardRegistry::default()))
    })
}

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Drop idle or expired sessions, then every dashboard left without one.
pub fn sweep(store: &dyn SessionStore, registry: &DashboardRegistry, now: DateTime<Utc>) -> usize {
    let swept = store.sweep(now);
    let dropped = registry.retain(|id| store.contains(id));

    if !swept.is_empty() || dropped > 0 {
        info!("swept {} idle sessions and {} dashboards", swept.len(), dropped);
    }
    swept.len()
}

/// Runs `sweep` once a minute for the life of the server.
pub fn sweeper() -> AdHoc {
    AdHoc::on_liftoff("Session sweeper", |rocket| {
        Box::pin(async move {
            let (Some(store), Some(registry)) = (
                rocket.state::<SharedSessionStore>().cloned(),
                rocket.state::<DashboardRegistry>().cloned(),
            ) else {
                warn!("session sweeper not started: services are not managed");
                return;
            };

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(SWEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    sweep(store.as_ref(), &registry, Utc::now());
                }
            });
            info!("✓ Session sweeper running");
        })
    })
}
