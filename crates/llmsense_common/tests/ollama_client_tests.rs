//! HTTP backend against a local stand-in server.

use std::io::Read;
use std::thread;

use llmsense_common::config::LlmConfig;
use llmsense_common::llm_client::{no_delay_retry, Generation, TextGenerationClient};

/// Serve `responses` (status, body) in order, returning the request bodies seen
fn serve(responses: Vec<(u16, String)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    let handle = thread::spawn(move || {
        let mut bodies = Vec::new();
        for (status, body) in responses {
            let mut request = server.recv().unwrap();
            assert_eq!(request.url(), "/api/generate");
            let mut content = String::new();
            request.as_reader().read_to_string(&mut content).unwrap();
            bodies.push(content);
            let response = tiny_http::Response::from_string(body).with_status_code(status);
            request.respond(response).unwrap();
        }
        bodies
    });

    (format!("http://{}", addr), handle)
}

fn config(endpoint: String) -> LlmConfig {
    LlmConfig {
        endpoint,
        timeout_secs: 5,
        ..LlmConfig::default()
    }
}

#[test]
fn test_generate_sends_ollama_request() {
    let (endpoint, handle) = serve(vec![(
        200,
        r#"{"model": "mistral", "response": "  Interpretation text \n", "done": true}"#.to_string(),
    )]);

    let client = TextGenerationClient::from_config(&config(endpoint), &no_delay_retry(3)).unwrap();
    let result = client.generate_at("Explain this", 0.5);
    assert_eq!(result, Generation::Text("Interpretation text".to_string()));

    let bodies = handle.join().unwrap();
    let body: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(body["model"], "mistral");
    assert_eq!(body["prompt"], "Explain this");
    assert_eq!(body["stream"], false);
    assert_eq!(body["options"]["temperature"], 0.5);
}

#[test]
fn test_default_temperature_is_sent_exactly() {
    let (endpoint, handle) = serve(vec![(200, r#"{"response": "ok"}"#.to_string())]);

    let client = TextGenerationClient::from_config(&config(endpoint), &no_delay_retry(1)).unwrap();
    assert_eq!(client.generate("p"), Generation::Text("ok".to_string()));

    let bodies = handle.join().unwrap();
    assert!(bodies[0].contains(r#""temperature":0.1}"#), "body was {}", bodies[0]);
    let body: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(body["options"]["temperature"].as_f64(), Some(0.1));
}

#[test]
fn test_missing_response_field_is_empty_text() {
    let (endpoint, handle) = serve(vec![(200, r#"{"done": true}"#.to_string())]);

    let client = TextGenerationClient::from_config(&config(endpoint), &no_delay_retry(3)).unwrap();
    assert_eq!(client.generate("p"), Generation::Text(String::new()));
    handle.join().unwrap();
}

#[test]
fn test_server_errors_exhaust_retries() {
    let failures = (0..3).map(|_| (500, "boom".to_string())).collect();
    let (endpoint, handle) = serve(failures);

    let client = TextGenerationClient::from_config(&config(endpoint), &no_delay_retry(3)).unwrap();
    match client.generate("p") {
        Generation::Failed { message } => {
            assert!(message.contains("after 3 attempts"));
            assert!(message.contains("500"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(handle.join().unwrap().len(), 3);
}

#[test]
fn test_recovers_after_server_error() {
    let (endpoint, handle) = serve(vec![
        (503, "busy".to_string()),
        (200, r#"{"response": "ok"}"#.to_string()),
    ]);

    let client = TextGenerationClient::from_config(&config(endpoint), &no_delay_retry(3)).unwrap();
    assert_eq!(client.generate("p"), Generation::Text("ok".to_string()));
    assert_eq!(handle.join().unwrap().len(), 2);
}
