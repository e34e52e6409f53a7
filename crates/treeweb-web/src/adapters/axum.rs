use crate::sim::{StateStore, parse_step_size};
use crate::AppConfig;
use axum::extract::{Form, Path as AxumPath, State as AxumState};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<AppConfig>>,
    pub store: Arc<Mutex<StateStore>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = StateStore::new(&config);
        Self::with_store(config, store)
    }

    pub fn with_store(config: AppConfig, store: StateStore) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Swap in a new config and restart the simulation from it.
    ///
    /// A lock poisoned by a panicking handler is logged and taken over, so
    /// the store and the config never disagree after a reload.
    pub fn reload(&self, config: AppConfig) {
        let mut store = self.store.lock().unwrap_or_else(|poisoned| {
            log::error!("state store lock was poisoned; restarting it anyway");
            poisoned.into_inner()
        });
        store.restart(&config);
        drop(store);

        let mut guard = self.config.write().unwrap_or_else(|poisoned| {
            log::error!("config lock was poisoned; replacing it anyway");
            poisoned.into_inner()
        });
        *guard = config;
    }

    fn config(&self) -> Option<AppConfig> {
        self.config.read().ok().map(|cfg| cfg.clone())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(route_index))
        .route("/index.html", get(route_index))
        .route("/home", get(route_index))
        .route("/getstate", get(route_get_state))
        .route("/setstepsize", post(route_set_step_size))
        .route("/{file}", get(route_script))
        .with_state(state)
}

async fn route_index(AxumState(state): AxumState<AppState>) -> Response {
    let Some(config) = state.config() else {
        return lock_failure();
    };
    serve_static(&config.index_path(), "text/html; charset=utf-8").await
}

async fn route_script(AxumPath(file): AxumPath<String>, AxumState(state): AxumState<AppState>) -> Response {
    let Some(config) = state.config() else {
        return lock_failure();
    };
    if file != config.script_name {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }
    serve_static(&config.script_path(), "application/javascript; charset=utf-8").await
}

async fn route_get_state(AxumState(state): AxumState<AppState>) -> Response {
    let snapshot = match state.store.lock() {
        Ok(mut store) => store.poll(Instant::now()),
        Err(_) => return lock_failure(),
    };
    Json(snapshot).into_response()
}

#[derive(Debug, Deserialize)]
pub struct StepSizeForm {
    pub stepsize: String,
}

async fn route_set_step_size(
    AxumState(state): AxumState<AppState>,
    Form(form): Form<StepSizeForm>,
) -> Response {
    let stepsize = match parse_step_size(&form.stepsize) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("rejected step size: {e}");
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response();
        }
    };
    match state.store.lock() {
        Ok(mut store) => store.set_step_size(stepsize),
        Err(_) => return lock_failure(),
    }
    Json(json!({})).into_response()
}

fn lock_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "failed to lock treeweb state").into_response()
}

async fn serve_static(path: &Path, content_type: &str) -> Response {
    let bytes = match tokio::fs::read(path).await {
        Ok(v) => v,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("{} has not been built", path.display());
            return (StatusCode::NOT_FOUND, "not found").into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to read {}: {e}", path.display()),
            )
                .into_response();
        }
    };

    let mut response = bytes.into_response();
    if let Ok(value) = HeaderValue::from_str(content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::do_build;
    use axum::body::to_bytes;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{}-{}-{}", prefix, std::process::id(), ts));
        std::fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    fn test_state(root: &Path) -> AppState {
        let config = AppConfig {
            nitems: 3,
            ..AppConfig::minimal(root)
        };
        let store = StateStore::with_rng(&config, StdRng::seed_from_u64(42));
        AppState::with_store(config, store)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[tokio::test]
    async fn test_get_state_payload() {
        let state = test_state(&unique_temp_dir("treeweb-axum-state"));
        let response = route_get_state(AxumState(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        for key in ["item0", "item1", "item2", "count", "stepsize", "step", "server_start_time"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["stepsize"], 0.5);
        assert_eq!(json["step"], json!([-0.5, 0.0, 0.5]));
    }

    #[tokio::test]
    async fn test_set_step_size_updates_store() {
        let state = test_state(&unique_temp_dir("treeweb-axum-step"));
        let response = route_set_step_size(
            AxumState(state.clone()),
            Form(StepSizeForm {
                stepsize: "2.5".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({}));
        assert_eq!(state.store.lock().unwrap().state().stepsize, 2.5);
    }

    #[tokio::test]
    async fn test_set_step_size_rejects_out_of_range() {
        let state = test_state(&unique_temp_dir("treeweb-axum-badstep"));
        let response = route_set_step_size(
            AxumState(state.clone()),
            Form(StepSizeForm {
                stepsize: "42".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
        assert_eq!(state.store.lock().unwrap().state().stepsize, 0.5);
    }

    #[tokio::test]
    async fn test_index_and_script_served_after_build() {
        let root = unique_temp_dir("treeweb-axum-static");
        let state = test_state(&root);

        let missing = route_index(AxumState(state.clone())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let config = state.config().unwrap();
        do_build(&config, &[], true).expect("build should succeed");

        let index = route_index(AxumState(state.clone())).await;
        assert_eq!(index.status(), StatusCode::OK);
        assert_eq!(
            index.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );

        let script = route_script(AxumPath("treeweb.js".to_string()), AxumState(state.clone())).await;
        assert_eq!(script.status(), StatusCode::OK);
        assert_eq!(
            script.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/javascript; charset=utf-8"
        );

        let other = route_script(AxumPath("other.js".to_string()), AxumState(state)).await;
        assert_eq!(other.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_reload_recovers_poisoned_locks() {
        let root = unique_temp_dir("treeweb-axum-poisoned");
        let state = test_state(&root);
        let before = state.store.lock().unwrap().server_start_time();

        let holder = state.clone();
        let panicked = std::thread::spawn(move || {
            let _store = holder.store.lock().unwrap();
            let _config = holder.config.write().unwrap();
            panic!("handler died holding both locks");
        })
        .join();
        assert!(panicked.is_err());
        assert!(state.store.is_poisoned() && state.config.is_poisoned());

        state.reload(AppConfig {
            nitems: 4,
            ..AppConfig::minimal(&root)
        });

        let store = state.store.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert!(store.server_start_time() > before);
        assert_eq!(store.snapshot().items.len(), 4);
        let config = state.config.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(config.nitems, 4);
    }

    #[test]
    fn test_reload_restarts_store() {
        let root = unique_temp_dir("treeweb-axum-reload");
        let state = test_state(&root);
        let before = state.store.lock().unwrap().server_start_time();

        let next = AppConfig {
            nitems: 6,
            ..AppConfig::minimal(&root)
        };
        state.reload(next);
        assert!(state.store.lock().unwrap().server_start_time() > before);
        assert_eq!(state.config().unwrap().nitems, 6);
        assert_eq!(state.store.lock().unwrap().snapshot().items.len(), 6);
    }
}
