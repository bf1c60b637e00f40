use httpmock::prelude::*;
use quiz_chain_solver::{ChainOutcome, ChainRequest, ChainSolver, Config, Method, StopReason};
use serde_json::json;

/// 所有外部地址都指向 mock 服务
fn test_config(server: &MockServer) -> Config {
    Config {
        aipipe_token: Some("test-token".to_string()),
        aipipe_url: Some(server.url("/v1/chat/completions")),
        submit_url: server.url("/submit"),
        step_delay_ms: 0,
        http_timeout_secs: 5,
        llm_timeout_secs: 5,
        ..Config::default()
    }
}

fn request(start_url: String, required_min_steps: usize, max_steps: usize) -> ChainRequest {
    ChainRequest {
        email: "student@example.com".to_string(),
        secret: "s3cr3t".to_string(),
        start_url,
        required_min_steps,
        max_steps,
    }
}

fn html(body: &str) -> String {
    format!("<html><body>{}</body></html>", body)
}

#[tokio::test]
async fn test_chain_stops_without_next_url() {
    let server = MockServer::start_async().await;

    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/q1");
            then.status(200)
                .header("content-type", "text/html")
                .body(html("<p>Your codeword is tds{abc123}</p>"));
        })
        .await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/submit")
                .json_body_partial(r#"{"answer": "tds{abc123}", "email": "student@example.com"}"#);
            then.status(200).json_body(json!({"correct": true}));
        })
        .await;

    let solver = ChainSolver::new(&test_config(&server));
    let result = solver.solve(&request(server.url("/q1"), 3, 10)).await;

    page.assert_async().await;
    submit.assert_async().await;

    assert_eq!(result.steps_done, 1);
    assert!(!result.meets_required_steps);
    assert_eq!(result.result, ChainOutcome::ChainCompleted);
    assert_eq!(result.stop_reason, StopReason::NoNextUrl);

    let step = &result.steps[0];
    assert_eq!(step.step, 1);
    assert_eq!(step.method, Some(Method::ExtractedSecret));
    assert_eq!(step.submitted_answer, Some(json!("tds{abc123}")));
    assert_eq!(step.submit_status, Some(200));
    assert_eq!(step.next_url, None);
    assert_eq!(step.error, None);
}

#[tokio::test]
async fn test_chain_halts_at_max_steps() {
    let server = MockServer::start_async().await;
    let loop_url = server.url("/loop");

    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/loop");
            then.status(200).body(html("<p>Repeat forever</p>"));
        })
        .await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST).path("/submit");
            then.status(200)
                .json_body(json!({"correct": true, "url": loop_url}));
        })
        .await;

    let solver = ChainSolver::new(&test_config(&server));
    let result = solver.solve(&request(server.url("/loop"), 3, 3)).await;

    page.assert_hits_async(3).await;
    submit.assert_hits_async(3).await;

    assert_eq!(result.steps_done, 3);
    assert_eq!(result.steps.len(), 3);
    assert!(result.meets_required_steps);
    assert_eq!(result.result, ChainOutcome::ChainCompleted);
    assert_eq!(result.stop_reason, StopReason::MaxStepsReached);
    assert_eq!(
        result.steps.iter().map(|s| s.step).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn test_csv_sum_heuristic() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/csv-quiz");
            then.status(200).body(html(
                r#"<p>Please sum the values in the file.</p><a href="data.csv">data</a>"#,
            ));
        })
        .await;
    let file = server
        .mock_async(|when, then| {
            when.method(GET).path("/data.csv");
            then.status(200).body("name,value\na,1\nb,2\nc,3\n");
        })
        .await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST).path("/submit").json_body_partial(r#"{"answer": 6}"#);
            then.status(200).json_body(json!({"correct": true}));
        })
        .await;

    let solver = ChainSolver::new(&test_config(&server));
    let result = solver.solve(&request(server.url("/csv-quiz"), 1, 10)).await;

    file.assert_async().await;
    submit.assert_async().await;

    let step = &result.steps[0];
    assert_eq!(step.method, Some(Method::FileHeuristic));
    assert_eq!(step.raw_answer, Some(json!(6)));
    assert_eq!(step.submitted_answer, Some(json!(6)));
    assert_eq!(step.file_error, None);
    assert!(result.meets_required_steps);
}

#[tokio::test]
async fn test_file_failure_falls_through_to_secret() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/broken");
            then.status(200)
                .body(html(r#"<p>Please sum it</p><a href="/missing.csv">file</a>"#));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/submit");
            then.status(200).json_body(json!({"correct": false}));
        })
        .await;

    let solver = ChainSolver::new(&test_config(&server));
    let result = solver.solve(&request(server.url("/broken"), 1, 10)).await;

    let step = &result.steps[0];
    assert!(step.file_error.is_some());
    assert_eq!(step.method, Some(Method::ExtractedSecret));
    assert_eq!(step.submitted_answer, Some(json!("Please")));
    assert_eq!(step.error, None);
    assert_eq!(result.result, ChainOutcome::ChainCompleted);
}

#[tokio::test]
async fn test_llm_fallback() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/math");
            then.status(200).body(html("<p>What is 2 + 2 ?</p>"));
        })
        .await;
    let llm = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "openai/gpt-4.1-nano",
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": "{\"answer\": 4, \"explanation\": \"2 + 2 = 4\"}"
                    },
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            }));
        })
        .await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST).path("/submit").json_body_partial(r#"{"answer": 4}"#);
            then.status(200).json_body(json!({"correct": true}));
        })
        .await;

    let solver = ChainSolver::new(&test_config(&server));
    let result = solver.solve(&request(server.url("/math"), 1, 10)).await;

    llm.assert_async().await;
    submit.assert_async().await;

    let step = &result.steps[0];
    assert_eq!(step.method, Some(Method::Aipipe));
    assert_eq!(
        step.raw_answer,
        Some(json!({"answer": 4, "explanation": "2 + 2 = 4"}))
    );
    assert_eq!(step.submitted_answer, Some(json!(4)));
}

#[tokio::test]
async fn test_llm_not_configured_stops_chain() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/math");
            then.status(200).body(html("<p>What is 2 + 2 ?</p>"));
        })
        .await;

    let config = Config {
        aipipe_token: None,
        ..test_config(&server)
    };
    let result = ChainSolver::new(&config)
        .solve(&request(server.url("/math"), 1, 10))
        .await;

    let step = &result.steps[0];
    assert_eq!(step.method, Some(Method::Aipipe));
    assert!(step.error.is_some());
    assert_eq!(step.submit_status, None);
    assert_eq!(result.stop_reason, StopReason::Error);
    assert_eq!(result.result, ChainOutcome::ChainWithErrors);
}

#[tokio::test]
async fn test_fetch_failure_records_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/down");
            then.status(500);
        })
        .await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST).path("/submit");
            then.status(200);
        })
        .await;

    let solver = ChainSolver::new(&test_config(&server));
    let result = solver.solve(&request(server.url("/down"), 1, 10)).await;

    submit.assert_hits_async(0).await;

    assert_eq!(result.steps_done, 1);
    assert!(result.meets_required_steps);
    assert_eq!(result.result, ChainOutcome::ChainWithErrors);
    assert_eq!(result.stop_reason, StopReason::Error);

    let step = &result.steps[0];
    assert_eq!(step.method, None);
    assert!(step.error.as_deref().unwrap_or_default().contains("500"));
}

#[tokio::test]
async fn test_double_encoded_next_url_followed() {
    let server = MockServer::start_async().await;
    let q1 = server.url("/q1");
    let q2 = server.url("/q2");
    let nested = json!({"url": q2}).to_string();

    for path in ["/q1", "/q2"] {
        server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200).body(html("<p>codeword tds{step}</p>"));
            })
            .await;
    }
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/submit")
                .json_body_partial(json!({ "url": q1 }).to_string());
            then.status(200).json_body(json!({ "url": nested }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/submit")
                .json_body_partial(json!({ "url": q2 }).to_string());
            then.status(200).json_body(json!({"correct": true, "reason": null}));
        })
        .await;

    let solver = ChainSolver::new(&test_config(&server));
    let result = solver.solve(&request(q1.clone(), 2, 10)).await;

    assert_eq!(result.steps_done, 2);
    assert_eq!(result.steps[0].next_url.as_deref(), Some(q2.as_str()));
    assert_eq!(result.steps[1].url, q2);
    assert!(result.meets_required_steps);
    assert_eq!(result.stop_reason, StopReason::NoNextUrl);
}

#[tokio::test]
async fn test_non_json_grader_response_wrapped() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/q");
            then.status(200).body(html("<p>tds{x}</p>"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/submit");
            then.status(400).body("Bad Request");
        })
        .await;

    let solver = ChainSolver::new(&test_config(&server));
    let result = solver.solve(&request(server.url("/q"), 1, 10)).await;

    let step = &result.steps[0];
    assert_eq!(step.submit_status, Some(400));
    assert_eq!(step.submit_parsed, Some(json!({"raw": "Bad Request"})));
    assert_eq!(step.error, None);
    assert_eq!(result.result, ChainOutcome::ChainWithErrors);
    assert_eq!(result.stop_reason, StopReason::NoNextUrl);
}

#[tokio::test]
async fn test_empty_start_url_runs_no_steps() {
    let server = MockServer::start_async().await;
    let solver = ChainSolver::new(&test_config(&server));

    let result = solver.solve(&request(String::new(), 1, 10)).await;

    assert_eq!(result.steps_done, 0);
    assert!(!result.meets_required_steps);
    assert_eq!(result.result, ChainOutcome::ChainCompleted);
}
