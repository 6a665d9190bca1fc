//! End-to-end pipeline runs against a scripted completion client.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use ai_llm_service::{
    AiLlmError, CompletionClient, CompletionFuture, CompletionResult, LlmProvider,
    ResponseFormat,
    error_handler::{ProviderError, ProviderErrorKind},
};
use copy_pipeline::{
    AdCopyPipeline, AdCopyResponse, GenerationRequest, PipelineConfig,
    validate::{char_len, jaccard_2gram},
};
use serde_json::json;

enum Step {
    Reply(CompletionResult),
    Fail(AiLlmError),
    Hang,
    Panic,
}

#[derive(Debug, Clone)]
struct Call {
    prompt: String,
    schema: String,
    n: u32,
}

struct ScriptedClient {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl CompletionClient for ScriptedClient {
    fn request_many<'a>(
        &'a self,
        prompt: &'a str,
        format: &'a ResponseFormat,
        n: u32,
    ) -> CompletionFuture<'a, CompletionResult> {
        self.calls.lock().unwrap().push(Call {
            prompt: prompt.to_string(),
            schema: format.name().unwrap_or_default().to_string(),
            n,
        });
        let step = self.steps.lock().unwrap().pop_front();
        Box::pin(async move {
            match step {
                Some(Step::Reply(r)) => Ok(r),
                Some(Step::Fail(e)) => Err(e),
                Some(Step::Hang) => {
                    std::future::pending::<Result<CompletionResult, AiLlmError>>().await
                }
                Some(Step::Panic) => panic!("scripted panic"),
                None => panic!("unexpected completion call"),
            }
        })
    }
}

fn ok(contents: Vec<String>) -> Step {
    Step::Reply(CompletionResult {
        status: 200,
        contents,
        error_message: None,
    })
}

fn upstream_error(status: u16, msg: &str) -> Step {
    Step::Reply(CompletionResult {
        status,
        contents: Vec::new(),
        error_message: Some(msg.to_string()),
    })
}

fn list(texts: &[&str]) -> String {
    json!({ "adTexts": texts }).to_string()
}

fn single(text: &str) -> String {
    json!({ "adText": text }).to_string()
}

fn request() -> GenerationRequest {
    GenerationRequest {
        product: Some("꿀잠 베개".into()),
        benefit: Some("5분 만에 숙면".into()),
        pain_point: Some("새벽까지 뒤척임".into()),
        promotion: None,
        tone_guide: Some("반말".into()),
    }
}

fn pipeline(client: &Arc<ScriptedClient>) -> AdCopyPipeline {
    AdCopyPipeline::new(client.clone(), PipelineConfig::default())
}

fn assert_valid_success(resp: &AdCopyResponse) {
    let cfg = PipelineConfig::default();
    assert!(resp.ok, "expected success, got {resp:?}");
    assert_eq!(resp.warning, None);
    assert_eq!(resp.ad_texts.len(), 3);
    for t in &resp.ad_texts {
        assert!(char_len(t) <= cfg.max_chars, "too long: {t}");
        assert!(!cfg.contains_banned(t), "banned: {t}");
    }
    for i in 0..3 {
        for j in (i + 1)..3 {
            assert!(
                jaccard_2gram(&resp.ad_texts[i], &resp.ad_texts[j]) < cfg.similarity_threshold,
                "similar pair {i},{j}: {:?}",
                resp.ad_texts
            );
        }
    }
}

const GOOD: [&str; 3] = ["눕자마자 기절, 알람 주의", "남들 다 바꾼 베개 너만 아직", "뒤척임 끝, 5분 컷 숙면"];

#[tokio::test]
async fn blank_required_field_fails_without_network_call() {
    let client = ScriptedClient::new(vec![]);
    let mut req = request();
    req.product = Some("   ".into());

    let resp = pipeline(&client).generate(req).await;

    assert!(!resp.ok);
    assert!(resp.warning.as_deref().unwrap_or_default().contains("product"));
    assert!(resp.ad_texts.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn provider_error_text_is_passed_through() {
    let client = ScriptedClient::new(vec![upstream_error(429, "rate limited")]);

    let resp = pipeline(&client).generate(request()).await;

    assert_eq!(
        resp,
        AdCopyResponse {
            ok: false,
            warning: Some("rate limited".into()),
            ad_texts: vec![],
            detail: None,
            meta: None,
        }
    );
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn happy_path_uses_breadth_then_selection() {
    let client = ScriptedClient::new(vec![
        ok(vec![
            list(&[GOOD[0], GOOD[1], "프리미엄 베개"]),
            list(&[GOOD[2], GOOD[0], "출근길 허리 통증 끝"]),
        ]),
        ok(vec![format!("Sure!\n{}", list(&GOOD))]),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert_valid_success(&resp);
    assert_eq!(resp.ad_texts, GOOD.map(String::from).to_vec());

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].n, 5);
    assert_eq!(calls[0].schema, "ad_copy_response");
    assert!(calls[0].prompt.contains("금지 표현/톤 가이드: 반말"));
    assert_eq!(calls[1].n, 1);
    assert!(calls[1].prompt.contains("1) 눕자마자 기절, 알람 주의"));
    // Banned candidate never reaches the selection prompt.
    assert!(!calls[1].prompt.contains("프리미엄 베개"));
}

#[tokio::test]
async fn empty_breadth_response_reports_status() {
    let client = ScriptedClient::new(vec![ok(vec![])]);

    let resp = pipeline(&client).generate(request()).await;

    assert!(!resp.ok);
    assert_eq!(resp.meta.map(|m| m.openai_status), Some(200));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn empty_pool_triggers_exactly_one_fallback() {
    let long = "가".repeat(31);
    let client = ScriptedClient::new(vec![
        ok(vec![list(&["최고의 베개", long.as_str()]), "not json".to_string()]),
        upstream_error(500, "overloaded"),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert!(!resp.ok);
    assert_eq!(
        resp.warning.as_deref(),
        Some("후보 풀 생성에 실패했어요. 다시 시도해 주세요.")
    );
    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].n, 1);
    assert_eq!(calls[1].prompt, calls[0].prompt);
}

#[tokio::test]
async fn fallback_pool_feeds_selection() {
    let client = ScriptedClient::new(vec![
        ok(vec!["garbage".to_string()]),
        ok(vec![list(&GOOD)]),
        ok(vec![list(&GOOD)]),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert_valid_success(&resp);
    assert_eq!(client.calls().len(), 3);
}

#[tokio::test]
async fn short_selection_is_a_soft_failure() {
    let client = ScriptedClient::new(vec![
        ok(vec![list(&GOOD)]),
        ok(vec![list(&GOOD[..2])]),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert!(!resp.ok);
    assert_eq!(
        resp.warning.as_deref(),
        Some("선별은 됐지만 형식 파싱에 실패했어요. 다시 시도해 주세요.")
    );
}

#[tokio::test]
async fn overlong_candidate_is_rewritten() {
    let long = "가".repeat(31);
    let client = ScriptedClient::new(vec![
        ok(vec![list(&GOOD)]),
        ok(vec![list(&[long.as_str(), GOOD[1], GOOD[2]])]),
        ok(vec![single("  출근길 허리 통증 끝 ")]),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert_valid_success(&resp);
    assert_eq!(resp.ad_texts[0], "출근길 허리 통증 끝");

    let calls = client.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].schema, "ad_copy_rewrite_response");
    assert!(calls[2].prompt.contains("재작성 사유: 30자 초과"));
    assert!(calls[2].prompt.contains(&format!("다른 문구1: {}", GOOD[1])));
}

#[tokio::test]
async fn similar_candidate_is_rewritten_at_later_index() {
    let client = ScriptedClient::new(vec![
        ok(vec![list(&GOOD)]),
        ok(vec![list(&[GOOD[0], "눕자마자 기절! 알람 주의", GOOD[2]])]),
        ok(vec![single("출근길 허리 통증 끝")]),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert_valid_success(&resp);
    assert_eq!(resp.ad_texts[1], "출근길 허리 통증 끝");
    assert!(client.calls()[2].prompt.contains("다른 문구와 너무 유사"));
}

#[tokio::test]
async fn failed_rewrites_end_in_finalize_failure() {
    let client = ScriptedClient::new(vec![
        ok(vec![list(&GOOD)]),
        ok(vec![list(&["A", "A", "B"])]),
        // Round 1: indices 0 and 1.
        upstream_error(500, "overloaded"),
        ok(vec!["   ".to_string()]),
        // Round 2: same indices again.
        ok(vec!["not json".to_string()]),
        upstream_error(500, "overloaded"),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert!(!resp.ok);
    assert!(resp.ad_texts.is_empty());
    assert_eq!(
        resp.warning.as_deref(),
        Some("최종 문구 생성에 실패했어요. 다시 시도해 주세요.")
    );
    assert_eq!(client.calls().len(), 6);
}

#[tokio::test]
async fn transport_timeout_becomes_timeout_envelope() {
    let client = ScriptedClient::new(vec![
        ok(vec![list(&GOOD)]),
        Step::Fail(AiLlmError::Timeout(Duration::from_secs(180))),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert!(!resp.ok);
    assert_eq!(
        resp.warning.as_deref(),
        Some("요청이 시간 초과됐어요. 잠시 후 다시 시도해 주세요.")
    );
    assert_eq!(resp.detail, None);
}

#[tokio::test]
async fn other_client_errors_are_internal_with_detail() {
    let client = ScriptedClient::new(vec![Step::Fail(
        ProviderError::new(
            LlmProvider::OpenAI,
            ProviderErrorKind::Decode("bad header".into()),
        )
        .into(),
    )]);

    let resp = pipeline(&client).generate(request()).await;

    assert!(!resp.ok);
    assert!(resp.detail.as_deref().unwrap_or_default().contains("bad header"));
}

#[tokio::test]
async fn panic_inside_invocation_is_contained() {
    let client = ScriptedClient::new(vec![Step::Panic]);

    let resp = pipeline(&client).generate(request()).await;

    assert!(!resp.ok);
    assert!(resp.detail.as_deref().unwrap_or_default().contains("scripted panic"));
}

#[tokio::test(start_paused = true)]
async fn request_deadline_aborts_pending_call() {
    let client = ScriptedClient::new(vec![Step::Hang]);
    let cfg = PipelineConfig {
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let pipeline = AdCopyPipeline::new(client.clone(), cfg);

    let resp = pipeline.generate(request()).await;

    assert!(!resp.ok);
    assert_eq!(
        resp.warning.as_deref(),
        Some("요청이 시간 초과됐어요. 잠시 후 다시 시도해 주세요.")
    );
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn rewrite_prompts_use_round_start_snapshot() {
    let long = "가".repeat(31);
    let client = ScriptedClient::new(vec![
        ok(vec![list(&GOOD)]),
        ok(vec![list(&[long.as_str(), "남들 다 바꾼 베개 프리미엄", GOOD[2]])]),
        ok(vec![single("출근길 허리 통증 끝")]),
        ok(vec![single(GOOD[1])]),
    ]);

    let resp = pipeline(&client).generate(request()).await;

    assert_valid_success(&resp);
    assert_eq!(
        resp.ad_texts,
        vec!["출근길 허리 통증 끝".to_string(), GOOD[1].to_string(), GOOD[2].to_string()]
    );

    let calls = client.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[2].prompt.contains("재작성 사유: 30자 초과"));
    // Index 0 was already replaced, but index 1 still sees the old text.
    assert!(calls[3].prompt.contains(&format!("다른 문구1: {long}")));
    assert!(!calls[3].prompt.contains("출근길 허리 통증 끝"));
}

#[tokio::test(start_paused = true)]
async fn dropping_generate_aborts_in_flight_call() {
    let client = ScriptedClient::new(vec![Step::Hang]);
    let pipeline = pipeline(&client);

    let waited = tokio::time::timeout(Duration::from_millis(50), pipeline.generate(request())).await;
    assert!(waited.is_err());
    assert_eq!(client.calls().len(), 1);

    // The aborted task releases its pipeline clone once the runtime drops it.
    for _ in 0..10 {
        if Arc::strong_count(&client) == 2 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(Arc::strong_count(&client), 2);
}
