/// Parallel Task API 客户端
///
/// 封装所有与 Task API 相关的 HTTP 调用
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::debug;

use super::task_api::{RunPoll, TaskApi, TaskRun, TaskRunResult};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ConfigError};
use crate::models::ProcessorTier;

const API_KEY_HEADER: &str = "x-api-key";
const RUNS_PATH: &str = "/v1/tasks/runs";
/// 在服务端挂起时间之外给网络留出的余量
const TRANSPORT_GRACE: Duration = Duration::from_secs(30);

/// Parallel Task API 客户端
pub struct ParallelClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ParallelClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::Config(ConfigError::HttpClient {
                    message: e.to_string(),
                })
            })?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn runs_url(&self) -> String {
        format!("{}{}", self.base_url, RUNS_PATH)
    }

    fn result_url(&self, run_id: &str) -> String {
        format!("{}{}/{}/result", self.base_url, RUNS_PATH, run_id)
    }
}

#[async_trait]
impl TaskApi for ParallelClient {
    async fn create_run(&self, input: &str, processor: ProcessorTier) -> AppResult<TaskRun> {
        let url = self.runs_url();
        debug!("创建任务: processor={}, 输入长度: {} 字符", processor, input.len());

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({
                "input": input,
                "processor": processor.as_str(),
            }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(RUNS_PATH, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(bad_response(RUNS_PATH, status, message));
        }

        let run: TaskRun = response.json().await.map_err(|e| {
            AppError::Api(ApiError::JsonParseFailed {
                source: Box::new(e),
            })
        })?;

        debug!("任务已创建: {} (状态: {})", run.run_id, run.status);
        Ok(run)
    }

    async fn poll_result(&self, run_id: &str, wait: Duration) -> AppResult<RunPoll> {
        let url = self.result_url(run_id);
        let endpoint = format!("{}/{}/result", RUNS_PATH, run_id);

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("timeout", wait.as_secs().max(1))])
            .timeout(wait + TRANSPORT_GRACE)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.clone(), e))?;

        let status = response.status();
        if status == StatusCode::REQUEST_TIMEOUT {
            debug!("任务 {} 在 {} 秒内未完成", run_id, wait.as_secs());
            return Ok(RunPoll::Pending);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(bad_response(&endpoint, status, message));
        }

        let result: TaskRunResult = response.json().await.map_err(|e| {
            AppError::Api(ApiError::JsonParseFailed {
                source: Box::new(e),
            })
        })?;

        if result.run.status == "failed" {
            let message = result
                .run
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(AppError::Api(ApiError::RunFailed {
                run_id: run_id.to_string(),
                message,
            }));
        }

        Ok(RunPoll::Completed(result))
    }
}

fn bad_response(endpoint: &str, status: StatusCode, message: String) -> AppError {
    AppError::Api(ApiError::BadResponse {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message: crate::utils::logging::truncate_text(&message, 500),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client() -> ParallelClient {
        let config = Config {
            api_key: "test-key".to_string(),
            api_base_url: "https://api.parallel.ai/".to_string(),
            ..Default::default()
        };
        ParallelClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let client = create_test_client();
        assert_eq!(client.runs_url(), "https://api.parallel.ai/v1/tasks/runs");
        assert_eq!(
            client.result_url("trun_abc"),
            "https://api.parallel.ai/v1/tasks/runs/trun_abc/result"
        );
    }

    #[test]
    fn test_parse_run_result_payload() {
        let payload = r#"{
            "run": {"run_id": "trun_abc", "status": "completed", "processor": "pro"},
            "output": {"type": "json", "content": {"sentiment": {}}, "basis": []}
        }"#;
        let result: TaskRunResult = serde_json::from_str(payload).unwrap();
        assert_eq!(result.run.run_id, "trun_abc");
        assert_eq!(result.output["content"]["sentiment"], json!({}));
    }

    #[test]
    fn test_bad_response_truncates_body() {
        let err = bad_response("/v1/tasks/runs", StatusCode::UNAUTHORIZED, "x".repeat(2000));
        match err {
            AppError::Api(ApiError::BadResponse { status, message, .. }) => {
                assert_eq!(status, 401);
                assert!(message.chars().count() <= 503);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    mod wire {
        use super::*;
        use wiremock::matchers::{body_partial_json, header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn client_for(server: &MockServer) -> ParallelClient {
            let config = Config {
                api_key: "test-key-123".to_string(),
                api_base_url: server.uri(),
                ..Default::default()
            };
            ParallelClient::new(&config).unwrap()
        }

        #[tokio::test]
        async fn test_create_run_sends_key_and_processor() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1/tasks/runs"))
                .and(header("x-api-key", "test-key-123"))
                .and(body_partial_json(json!({"input": "hello", "processor": "ultra2x"})))
                .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                    "run_id": "trun_1",
                    "status": "queued",
                    "processor": "ultra2x"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let run = client_for(&server)
                .create_run("hello", ProcessorTier::Ultra2x)
                .await
                .unwrap();
            assert_eq!(run.run_id, "trun_1");
            assert_eq!(run.status, "queued");
        }

        #[tokio::test]
        async fn test_create_run_non_success_is_bad_response() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1/tasks/runs"))
                .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .create_run("hello", ProcessorTier::Lite)
                .await
                .unwrap_err();
            match err {
                AppError::Api(ApiError::BadResponse { status, message, .. }) => {
                    assert_eq!(status, 401);
                    assert_eq!(message, "invalid api key");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_poll_request_timeout_is_pending() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/tasks/runs/trun_1/result"))
                .and(query_param("timeout", "5"))
                .and(header("x-api-key", "test-key-123"))
                .respond_with(ResponseTemplate::new(408))
                .expect(1)
                .mount(&server)
                .await;

            let poll = client_for(&server)
                .poll_result("trun_1", Duration::from_secs(5))
                .await
                .unwrap();
            assert_eq!(poll, RunPoll::Pending);
        }

        #[tokio::test]
        async fn test_poll_completed_run() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/tasks/runs/trun_2/result"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "run": {"run_id": "trun_2", "status": "completed", "processor": "pro"},
                    "output": {"type": "json", "content": {"sentiment": {"positive": 1}}}
                })))
                .mount(&server)
                .await;

            match client_for(&server)
                .poll_result("trun_2", Duration::from_secs(5))
                .await
                .unwrap()
            {
                RunPoll::Completed(result) => {
                    assert_eq!(result.run.run_id, "trun_2");
                    assert_eq!(result.output["content"]["sentiment"]["positive"], json!(1));
                }
                RunPoll::Pending => panic!("expected a completed run"),
            }
        }

        #[tokio::test]
        async fn test_poll_failed_run_is_run_failed() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/tasks/runs/r1/result"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "run": {"run_id": "r1", "status": "failed", "error": {"message": "boom"}},
                    "output": null
                })))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .poll_result("r1", Duration::from_secs(5))
                .await
                .unwrap_err();
            match err {
                AppError::Api(ApiError::RunFailed { run_id, message }) => {
                    assert_eq!(run_id, "r1");
                    assert!(message.contains("boom"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_poll_server_error_is_bad_response() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/tasks/runs/trun_3/result"))
                .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .poll_result("trun_3", Duration::from_secs(5))
                .await
                .unwrap_err();
            match err {
                AppError::Api(ApiError::BadResponse { endpoint, status, .. }) => {
                    assert_eq!(status, 503);
                    assert_eq!(endpoint, "/v1/tasks/runs/trun_3/result");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    /// 真实 API 连通性测试
    ///
    /// ```bash
    /// PARALLEL_API_KEY=... cargo test test_live_lite_run -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_lite_run() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().expect("需要 PARALLEL_API_KEY");
        let client = ParallelClient::new(&config).unwrap();

        let run = client
            .create_run("What is the capital of France?", ProcessorTier::Lite)
            .await
            .expect("创建任务失败");
        println!("run_id: {}", run.run_id);

        match client.poll_result(&run.run_id, Duration::from_secs(120)).await {
            Ok(RunPoll::Completed(result)) => println!("输出: {}", result.output),
            Ok(RunPoll::Pending) => println!("任务尚未完成"),
            Err(e) => panic!("轮询失败: {e}"),
        }
    }
}
