//! Facade behavior against a scripted completion service

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flag_detector::clients::{CompletionRequest, CompletionService};
use flag_detector::config::ClassificationConfig;
use flag_detector::{
    AnalysisType, AssessmentLimits, ClassificationRequest, ClassificationSource, FlagClassifier,
    FlagDetectorError, FlagKind,
};

enum Script {
    Reply(String),
    Status(u16),
    Unreachable,
}

struct ScriptedService {
    script: Script,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedService {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn reply(text: &str) -> Arc<Self> {
        Self::new(Script::Reply(text.to_string()))
    }

    fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn submit(&self, request: &CompletionRequest) -> flag_detector::Result<String> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Status(status) => Err(FlagDetectorError::Service {
                status: *status,
                body: "upstream unavailable".to_string(),
            }),
            Script::Unreachable => Err(FlagDetectorError::Transport {
                message: "connection refused".to_string(),
            }),
        }
    }
}

fn with_fallback() -> ClassificationConfig {
    ClassificationConfig {
        fallback_to_rules: true,
        ..ClassificationConfig::default()
    }
}

#[tokio::test]
async fn blank_content_fails_without_remote_call() {
    let service = ScriptedService::reply("{}");
    let classifier = FlagClassifier::new(service.clone());
    let err = classifier.classify("  \n\t ").await.unwrap_err();
    assert!(matches!(err, FlagDetectorError::EmptyInput));
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn classify_parses_remote_reply() {
    let service = ScriptedService::reply(
        r#"Here is the analysis: {"type":"green","category":"Respect","confidence":98,"severity":"excellent"}"#,
    );
    let classifier = FlagClassifier::new(service.clone());
    let result = classifier
        .classify("  he asks before making plans for both of us  ")
        .await
        .unwrap();
    assert_eq!(result.kind, FlagKind::Green);
    assert_eq!(result.category, "Respect");
    assert_eq!(result.confidence, 98);

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0]
        .prompt
        .contains("he asks before making plans for both of us"));
    assert!(calls[0].prompt.contains("<input>"));
}

#[tokio::test]
async fn batch_is_one_exchange_in_input_order() {
    let service = ScriptedService::reply(
        r#"[
          {"inputIndex":1,"type":"red","category":"Control"},
          {"inputIndex":2,"type":"green","category":"Support"},
          {"inputIndex":3,"type":"red","category":"Jealousy"}
        ]"#,
    );
    let classifier = FlagClassifier::new(service.clone()).with_batch_max_tokens(2000);
    let inputs = vec![
        "he picks my clothes".to_string(),
        "   ".to_string(),
        "she cheers me on".to_string(),
        "".to_string(),
        "he checks my phone".to_string(),
    ];
    let results = classifier.classify_batch(&inputs).await.unwrap();

    let categories: Vec<_> = results.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(categories, vec!["Control", "Support", "Jealousy"]);

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].max_tokens, Some(2000));
    assert!(calls[0].prompt.contains("<input index=\"3\">"));
    assert!(!calls[0].prompt.contains("<input index=\"4\">"));
}

#[tokio::test]
async fn all_blank_batch_makes_no_call() {
    let service = ScriptedService::reply("[]");
    let classifier = FlagClassifier::new(service.clone());
    let err = classifier
        .classify_batch(&[" ".to_string(), String::new()])
        .await
        .unwrap_err();
    assert!(matches!(err, FlagDetectorError::EmptyBatch));
    assert!(service.calls().is_empty());

    let err = classifier.classify_batch(&[]).await.unwrap_err();
    assert!(matches!(err, FlagDetectorError::EmptyBatch));
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn short_batch_reply_fails_whole_batch() {
    let service = ScriptedService::reply(r#"[{"type":"red"}]"#);
    let classifier = FlagClassifier::new(service);
    let err = classifier
        .classify_batch(&["one".to_string(), "two".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FlagDetectorError::IncompleteBatch {
            expected: 2,
            received: 1
        }
    ));
}

#[tokio::test]
async fn remote_failure_surfaces_without_fallback() {
    let classifier = FlagClassifier::new(ScriptedService::new(Script::Status(503)));
    assert!(!classifier.fallback_enabled());

    let err = classifier
        .classify_with_fallback("he checks my phone")
        .await
        .unwrap_err();
    assert!(matches!(err, FlagDetectorError::Service { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn fallback_answers_from_rule_engine() {
    let classifier =
        FlagClassifier::with_policy(ScriptedService::new(Script::Unreachable), &with_fallback());
    let classified = classifier
        .classify_with_fallback("he always checks my phone")
        .await
        .unwrap();
    assert_eq!(classified.source, ClassificationSource::Local);
    assert_eq!(classified.result.kind, FlagKind::Red);
    assert_eq!(classified.result.category, "Jealousy");
    assert!(classified.result.confidence <= 95);
}

#[tokio::test]
async fn fallback_covers_unparseable_replies() {
    let classifier =
        FlagClassifier::with_policy(ScriptedService::reply("I'd rather not say."), &with_fallback());
    let classified = classifier
        .classify_with_fallback("she respects boundaries")
        .await
        .unwrap();
    assert_eq!(classified.source, ClassificationSource::Local);
    assert_eq!(classified.result.kind, FlagKind::Green);
}

#[tokio::test]
async fn fallback_does_not_swallow_blank_input() {
    let service = ScriptedService::new(Script::Unreachable);
    let classifier = FlagClassifier::with_policy(service.clone(), &with_fallback());
    let err = classifier.classify_with_fallback("   ").await.unwrap_err();
    assert!(matches!(err, FlagDetectorError::EmptyInput));
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn remote_success_is_tagged_remote() {
    let classifier = FlagClassifier::with_policy(
        ScriptedService::reply(r#"{"type":"red","confidence":91}"#),
        &with_fallback(),
    );
    let classified = classifier
        .classify_with_fallback("he reads my messages")
        .await
        .unwrap();
    assert_eq!(classified.source, ClassificationSource::Remote);
    assert_eq!(classified.result.confidence, 91);
}

#[tokio::test]
async fn local_classification_never_calls_remote() {
    let service = ScriptedService::new(Script::Unreachable);
    let classifier = FlagClassifier::new(service.clone());
    let result = classifier.classify_locally("he is so controlling");
    assert_eq!(result.kind, FlagKind::Red);
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn content_assessment_round_trip() {
    let service = ScriptedService::reply(
        r#"```json
        {
          "redFlags": [{"category":"Control","severity":"high","description":"Decides finances alone","evidence":"he handles all the money"}],
          "greenFlags": [{"category":"Support","strength":"strong","description":"Shows up","evidence":"came to every game"}],
          "overallAssessment": {"score": 42, "summary": "Mixed signals", "recommendations": ["Discuss shared finances"]},
          "communicationPatterns": {"tone":"tense","emotionalIntelligence":55,"respectLevel":40,"conflictStyle":"avoidant"}
        }
        ```"#,
    );
    let classifier = FlagClassifier::new(service.clone())
        .with_batch_max_tokens(1500)
        .with_assessment_limits(AssessmentLimits {
            max_tokens: 2000,
            temperature: 0.7,
        });
    let request = ClassificationRequest::new("he handles all the money but came to every game")
        .with_context("dating two years")
        .with_analysis_type(AnalysisType::Communication);
    let assessment = classifier.classify_content(&request).await.unwrap();

    assert_eq!(assessment.red_flags.len(), 1);
    assert_eq!(assessment.red_flags[0].category, "Control");
    assert_eq!(assessment.green_flags.len(), 1);
    assert_eq!(assessment.overall_assessment.score, 42);
    assert_eq!(assessment.communication_patterns.conflict_style, "avoidant");

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("dating two years"));
    assert_eq!(calls[0].max_tokens, Some(2000));
    assert_eq!(calls[0].temperature, Some(0.7));
}

#[tokio::test]
async fn single_classification_keeps_configured_sampling() {
    let service = ScriptedService::reply(r#"{"type":"red"}"#);
    let classifier = FlagClassifier::new(service.clone()).with_assessment_limits(AssessmentLimits {
        max_tokens: 2000,
        temperature: 0.7,
    });
    classifier.classify("he reads my messages").await.unwrap();
    let calls = service.calls();
    assert_eq!(calls[0].max_tokens, None);
    assert_eq!(calls[0].temperature, None);
}

#[tokio::test]
async fn content_assessment_rejects_blank_content() {
    let service = ScriptedService::reply("{}");
    let classifier = FlagClassifier::new(service.clone());
    let err = classifier
        .classify_content(&ClassificationRequest::new("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, FlagDetectorError::EmptyInput));
    assert!(service.calls().is_empty());
}
