use common::{config::normalize_base_url, routes, Epoch, ReportAck, TaskAssignment, TaskReport};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Tiempo máximo de una llamada. Un coordinator colgado cuenta como caído.
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum CallError {
    /// No se pudo hablar con el coordinator (conexión, timeout, ...).
    #[error("coordinator inalcanzable en {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("coordinator devolvió {status} para {url}")]
    Status { url: String, status: StatusCode },
    #[error("respuesta inválida de {url}: {source}")]
    BadReply {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Cliente de la API del coordinator.
///
/// Cada llamada abre su propia conexión y la cierra al terminar; no hay
/// reintentos acá, eso lo decide el loop del worker.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    http: Client,
    base_url: String,
}

impl CoordinatorClient {
    pub fn new(endpoint: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .pool_max_idle_per_host(0)
            .timeout(CALL_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(endpoint),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn request_task(&self) -> Result<TaskAssignment, CallError> {
        self.call::<(), _>(routes::NEXT_TASK, None).await
    }

    pub async fn report_map_complete(
        &self,
        task_index: usize,
        epoch: Epoch,
    ) -> Result<ReportAck, CallError> {
        let report = TaskReport {
            task_index,
            epoch: Some(epoch),
        };
        self.call(routes::MAP_COMPLETE, Some(&report)).await
    }

    pub async fn report_reduce_complete(
        &self,
        task_index: usize,
        epoch: Epoch,
    ) -> Result<ReportAck, CallError> {
        let report = TaskReport {
            task_index,
            epoch: Some(epoch),
        };
        self.call(routes::REDUCE_COMPLETE, Some(&report)).await
    }

    /// Un POST, una respuesta.
    async fn call<B, R>(&self, path: &str, body: Option<&B>) -> Result<R, CallError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let mut req = self.http.post(&url);
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|source| CallError::Unreachable {
            url: url.clone(),
            source,
        })?;

        if !resp.status().is_success() {
            return Err(CallError::Status {
                url,
                status: resp.status(),
            });
        }

        resp.json::<R>()
            .await
            .map_err(|source| CallError::BadReply { url, source })
    }
}
