//! Integration tests for finai-core
//!
//! These tests exercise the full classify → extract → enrich → merge flow
//! through the public API only.

use chrono::{NaiveDate, NaiveDateTime};
use finai_core::{
    classify, extract, AnalyticsPeriod, EnrichPolicy, ExtractionSource, Intent, LlmClient,
    MockBackend, Orchestrator, PromptLibrary, CATCH_ALL_CATEGORY,
};

fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(20, 15, 0)
        .unwrap()
}

fn noon(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0)
}

fn orchestrator(backend: MockBackend) -> Orchestrator {
    Orchestrator::new(LlmClient::Mock(backend)).with_prompts(PromptLibrary::embedded_only())
}

// =============================================================================
// Heuristic pipeline
// =============================================================================

#[test]
fn test_heuristic_expense() {
    let tx = extract("потратил 1200,50 ₽ на такси", reference());

    assert_eq!(tx.intent, Intent::AddExpense);
    assert_eq!(tx.amount, Some(1200.5));
    assert_eq!(tx.category, "transport");
    assert_eq!(tx.source, ExtractionSource::Heuristic);
}

#[test]
fn test_category_is_never_empty() {
    let samples = [
        "",
        "привет",
        "500",
        "на",
        "for",
        "🙂🙂🙂",
        "купил что-то непонятное",
        "spent 20 on books",
    ];
    for text in samples {
        let tx = extract(text, reference());
        assert!(!tx.category.is_empty(), "empty category for {:?}", text);
    }
    assert_eq!(extract("привет", reference()).category, CATCH_ALL_CATEGORY);
}

#[test]
fn test_relative_day_ignores_other_dates() {
    let tx = extract("вчера вернул долг за 01.02.2023, 500 руб", reference());
    assert_eq!(tx.date, noon(2024, 3, 9));

    let tx = extract("позавчера кино 700", reference());
    assert_eq!(tx.date, noon(2024, 3, 8));
}

#[test]
fn test_extraction_is_idempotent() {
    let text = "Вчера купил кофе за 250,5 руб в кафе";
    let runs: Vec<_> = (0..5).map(|_| extract(text, reference())).collect();
    assert!(runs.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_intent_tie_break() {
    // Hits both add_expense ("bought") and show_analytics ("how much")
    let text = "how much have I bought this week";
    for _ in 0..3 {
        assert_eq!(classify(text), Some(Intent::AddExpense));
    }
    assert_eq!(classify("how much this week"), Some(Intent::ShowAnalytics));
}

// =============================================================================
// Enrichment
// =============================================================================

#[tokio::test]
async fn test_pipeline_enriches_ambiguous_expense() {
    let backend = MockBackend::replying(
        r#"Sure! {"intent":"add_expense","amount":"350","currency":"RUB","category":"food","date":"2024-03-09","note":"хлеб и молоко"} Anything else?"#,
    );
    let orch = orchestrator(backend.clone());

    let tx = orch
        .parse("купил хлеб и молоко", reference(), EnrichPolicy::WhenAmbiguous)
        .await;

    assert_eq!(tx.intent, Intent::AddExpense);
    assert_eq!(tx.amount, Some(350.0));
    assert_eq!(tx.currency.as_deref(), Some("RUB"));
    assert_eq!(tx.category, "food");
    assert_eq!(
        tx.date,
        Some(
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_time(reference().time())
        )
    );
    assert_eq!(tx.note, "хлеб и молоко");
    assert_eq!(tx.source, ExtractionSource::Enriched);
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_pipeline_analytics_and_advice() {
    let analytics = orchestrator(MockBackend::replying(
        r#"{"intent":"show_analytics","period":"this_month","category":"food"}"#,
    ));
    let tx = analytics
        .refine("сколько я потратил на еду", Some(Intent::ShowAnalytics), reference())
        .await;
    assert_eq!(tx.intent, Intent::ShowAnalytics);
    assert_eq!(tx.period, Some(AnalyticsPeriod::ThisMonth));
    assert_eq!(tx.category, "food");

    let advice = orchestrator(MockBackend::replying(
        r#"{"intent":"give_advice","advice":["Готовьте дома","Покупайте оптом","Отмените подписки"]}"#,
    ));
    let tx = advice
        .refine("дай совет как экономить", Some(Intent::GiveAdvice), reference())
        .await;
    assert_eq!(tx.intent, Intent::GiveAdvice);
    assert_eq!(tx.advice.len(), 3);
}

#[tokio::test]
async fn test_pipeline_survives_outage() {
    let orch = orchestrator(MockBackend::failing("connection refused"));
    let text = "вчера заплатил 990 руб за аптека";

    let tx = orch.parse(text, reference(), EnrichPolicy::Always).await;
    let heuristic = extract(text, reference());

    assert_eq!(tx.amount, heuristic.amount);
    assert_eq!(tx.category, heuristic.category);
    assert_eq!(tx.date, heuristic.date);
    assert_eq!(tx.note, text);
    assert_eq!(tx.source, ExtractionSource::Heuristic);
}

#[tokio::test]
async fn test_orchestrator_shared_across_tasks() {
    let backend = MockBackend::replying(r#"{"amount": 10}"#);
    let orch = orchestrator(backend.clone());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let orch = orch.clone();
            tokio::spawn(async move {
                orch.refine(&format!("запись {}", i), None, reference())
                    .await
            })
        })
        .collect();

    for handle in handles {
        let tx = handle.await.unwrap();
        assert_eq!(tx.amount, Some(10.0));
    }
    assert_eq!(backend.requests().len(), 4);
}

// =============================================================================
// HTTP backend (needs the mock server)
// =============================================================================

#[cfg(feature = "test-utils")]
mod http {
    use super::*;
    use finai_core::test_utils::{MockChatServer, ServerReply};
    use finai_core::OpenAICompatibleBackend;

    #[tokio::test]
    async fn test_pipeline_over_http() {
        let server = MockChatServer::start(
            r#"{"intent":"add_expense","amount":0,"category":"","date":null,"note":""}"#,
        )
        .await;
        let backend = OpenAICompatibleBackend::with_api_key(&server.url(), "gpt-4o-mini", "sk-x");
        let orch = Orchestrator::new(backend.into()).with_prompts(PromptLibrary::embedded_only());

        let text = "заплатил 450 руб за обед";
        let tx = orch.parse(text, reference(), EnrichPolicy::Always).await;
        let heuristic = extract(text, reference());

        // Zero amount and empty strings all fall back to heuristics
        assert_eq!(tx.amount, Some(450.0));
        assert_eq!(tx.category, "food");
        assert_eq!(tx.note, heuristic.note);
        assert_eq!(tx.source, ExtractionSource::Enriched);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body["max_tokens"], 300);
        assert!(requests[0].body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains(text));
    }

    #[tokio::test]
    async fn test_pipeline_http_error_degrades() {
        let server =
            MockChatServer::start_with(ServerReply::Status(500, "upstream down".into())).await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "m");
        let orch = Orchestrator::new(backend.into()).with_prompts(PromptLibrary::embedded_only());

        let text = "такси 300";
        let tx = orch.refine(text, None, reference()).await;
        assert_eq!(tx.amount, Some(300.0));
        assert_eq!(tx.category, "transport");
        assert_eq!(tx.note, text);
        assert_eq!(tx.source, ExtractionSource::Heuristic);
    }
}
