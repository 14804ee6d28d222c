//! Sanitizer Integration Tests
//!
//! Realistic completions: chatty wrappers, truncated premium output and
//! sloppy JSON, run through sanitizing and payload coercion together.

use serde_json::json;
use somnia::services::analysis::payload::AnalysisPayload;
use somnia::services::analysis::sanitizer::{repair_json, sanitize_response};
use somnia::services::analysis::SanitizeError;

#[test]
fn test_prose_and_fence_around_object() {
    let raw = "Certainly! Here is the analysis you asked for:\n\n```json\n{\n  \"summary\": \"A journey inward.\",\n  \"symbols\": [{\"name\": \"Door\", \"meaning\": \"threshold\"}]\n}\n```\n\nLet me know if you need more.";
    let value = sanitize_response(raw).unwrap();
    assert_eq!(value["summary"], "A journey inward.");
    assert_eq!(value["symbols"][0]["name"], "Door");
}

#[test]
fn test_truncated_premium_completion_recovers_prefix() {
    let raw = r#"{"summary":"ok","symbols":[{"name":"Flying","meaning":"freedom"}],"interpretation":"long text","reflectionQuestions":["one?","two?"],"premiumAnalysis":{"psychological":"deep","lifeConnections":"the dream conne"#;
    let value = sanitize_response(raw).unwrap();
    let payload = AnalysisPayload::from_value(&value);

    assert_eq!(payload.summary.as_deref(), Some("ok"));
    assert_eq!(payload.reflection_questions.len(), 2);
    let premium = payload.premium.unwrap();
    assert_eq!(premium.psychological.as_deref(), Some("deep"));
    assert_eq!(premium.life_connections.as_deref(), Some("the dream conne"));
    assert_eq!(premium.present_count(), 2);
}

#[test]
fn test_sloppy_json_is_repaired() {
    let raw = r#"{summary: "ok", symbols: [{"name":"A","meaning":"a"} {"name":"B","meaning":"b"},], reflectionQuestions: ["x", "y",],}"#;
    let value = sanitize_response(raw).unwrap();
    assert_eq!(
        value,
        json!({
            "summary": "ok",
            "symbols": [{"name":"A","meaning":"a"}, {"name":"B","meaning":"b"}],
            "reflectionQuestions": ["x", "y"]
        })
    );
}

#[test]
fn test_braces_and_commas_inside_strings_survive() {
    let raw = r#"{"summary":"a {curly}, [bracketed],} text","symbols":[]}"#;
    let value = sanitize_response(raw).unwrap();
    assert_eq!(value["summary"], "a {curly}, [bracketed],} text");
}

#[test]
fn test_refusal_has_no_json() {
    assert_eq!(
        sanitize_response("I'm sorry, but I can't help with that."),
        Err(SanitizeError::NoJsonFound)
    );
}

#[test]
fn test_repair_output_is_stable() {
    let inputs = [
        r#"{"a":1,}"#,
        r#"{a: [1, 2,], "b": {"c": "d""#,
        r#"{"x":{"y":1} {"z":2}}"#,
        r#"{"s":"unterminated \"quote"#,
    ];
    for input in inputs {
        let once = repair_json(input);
        assert_eq!(repair_json(&once), once, "repair not stable for {input}");
    }
}
