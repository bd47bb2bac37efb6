//! 可观测性模块
//!
//! 提供请求计数、结构化日志和健康检查。

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::config::LoggingConfig;
use crate::storage::repository::{DailyLogRepository, Repositories};

// ===== Simple Metrics =====

/// 简单应用指标
#[derive(Debug, Default)]
pub struct AppMetrics {
    pub http_requests_total: AtomicU64,
    pub http_request_duration_ms_sum: AtomicU64,
    pub client_errors_total: AtomicU64,
    pub server_errors_total: AtomicU64,
}

/// 指标快照
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub http_requests_total: u64,
    pub http_request_duration_ms_sum: u64,
    pub client_errors_total: u64,
    pub server_errors_total: u64,
}

impl AppMetrics {
    /// 记录一次 HTTP 请求
    pub fn record_http_request(&self, status: StatusCode, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_duration_ms_sum
            .fetch_add(duration_ms, Ordering::Relaxed);
        if status.is_client_error() {
            self.client_errors_total.fetch_add(1, Ordering::Relaxed);
        } else if status.is_server_error() {
            self.server_errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            http_requests_total: self.http_requests_total.load(Ordering::Relaxed),
            http_request_duration_ms_sum: self.http_request_duration_ms_sum.load(Ordering::Relaxed),
            client_errors_total: self.client_errors_total.load(Ordering::Relaxed),
            server_errors_total: self.server_errors_total.load(Ordering::Relaxed),
        }
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub checks: Vec<HealthCheck>,
    pub metrics: MetricsSnapshot,
}

/// 单个健康检查项
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    pub message: Option<String>,
    pub latency_ms: Option<u64>,
}

/// 可观测性状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub repositories: Repositories,
    pub start_time: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(version: impl Into<String>, repositories: Repositories) -> Self {
        Self {
            metrics: Arc::new(AppMetrics::default()),
            repositories,
            start_time: Utc::now(),
            version: version.into(),
        }
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }

    async fn check_storage(&self) -> HealthCheck {
        let started = Instant::now();
        let result = self.repositories.logs.count_all_logs().await;
        let latency_ms = Some(started.elapsed().as_millis() as u64);

        match result {
            Ok(_) => HealthCheck {
                name: "storage".to_string(),
                status: "healthy".to_string(),
                message: None,
                latency_ms,
            },
            Err(e) => HealthCheck {
                name: "storage".to_string(),
                status: "unhealthy".to_string(),
                message: Some(e.to_string()),
                latency_ms,
            },
        }
    }
}

// ===== Health Check Handlers =====

/// 获取完整健康状态
pub async fn health_check(State(state): State<ObservabilityState>) -> impl IntoResponse {
    let checks = vec![state.check_storage().await];
    let all_healthy = checks.iter().all(|c| c.status == "healthy");

    let health_status = HealthStatus {
        status: if all_healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks,
        metrics: state.metrics.snapshot(),
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_status))
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 版本信息端点
pub async fn version(State(state): State<ObservabilityState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: ObservabilityState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Request Metrics Middleware =====

/// 记录请求指标的中间件
pub async fn metrics_middleware(
    State(metrics): State<Arc<AppMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(req).await;
    metrics.record_http_request(response.status(), start.elapsed().as_millis() as u64);
    response
}

// ===== Structured Logging =====

/// 初始化日志
///
/// `RUST_LOG` 优先于配置中的级别。配置了 `log_dir` 时额外按天滚动写入
/// JSON 日志文件；返回的 guard 必须保持到进程退出，否则缓冲日志会丢失。
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},tower_http=info", config.level))
    });

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "neurosync.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().json().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let json_layer = config
        .structured
        .then(|| fmt::layer().json().with_target(true));
    let plain_layer = (!config.structured).then(|| {
        fmt::layer()
            .with_target(true)
            .with_line_number(true)
    });

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(plain_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Tracing subscriber already initialised: {}", e);
    }

    guard
}
