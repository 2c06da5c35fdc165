//! End-to-end extraction flow tests

#[cfg(test)]
mod tests {
    use crate::{
        ExtractionPipeline, ExtractionStrategy, ExtractorConfig, PromptBuilder, RecordExtractor,
    };
    use async_trait::async_trait;
    use mailsheet_domain::{ProjectRecord, SENTINEL};
    use mailsheet_llm::{LlmProvider, MockProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const LISTING: &str = "【案件名】 Web開発\n【期間】 4月〜6月\n【募集人数】1名\n【勤務地】東京\n【作業内容】 API実装\n【必須スキル】Go経験\n【勤務時間】フレックス";

    const PROSE: &str = "いつもお世話になっております。\n先日の件、引き続きよろしくお願いいたします。";

    fn pipeline(strategy: ExtractionStrategy, provider: Option<Arc<dyn LlmProvider>>) -> ExtractionPipeline {
        let config = ExtractorConfig {
            strategy,
            ..ExtractorConfig::default()
        };
        ExtractionPipeline::new(&config, provider).unwrap()
    }

    #[tokio::test]
    async fn test_labelled_listing_uses_pattern() {
        let provider = Arc::new(MockProvider::new(r#"[{"案件名": "from llm"}]"#));
        let outcome = pipeline(ExtractionStrategy::PatternThenLlm, Some(provider.clone()))
            .run(LISTING)
            .await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.source, Some("pattern"));
        let record = &outcome.records[0];
        assert_eq!(record.title, "Web開発");
        assert_eq!(record.duration, "4月〜6月");
        assert_eq!(record.headcount, "1名");
        assert_eq!(record.location, "東京");
        assert_eq!(record.work_description, "API実装");
        assert_eq!(record.requirements, "Go経験");
        assert_eq!(record.other_notes, "フレックス");

        // Language model is not consulted when patterns succeed
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prose_with_pattern_only_yields_nothing() {
        let outcome = pipeline(ExtractionStrategy::Pattern, None).run(PROSE).await;

        assert!(outcome.is_empty());
        assert_eq!(outcome.source, None);
        // The all-sentinel record was produced and then dropped
        assert_eq!(outcome.candidates, 1);
    }

    #[tokio::test]
    async fn test_prose_falls_back_to_llm() {
        let provider = Arc::new(MockProvider::new(
            "Here is the result: [{\"案件名\":\"X\", \"勤務場所\": \"不明\"}] done",
        ));
        let outcome = pipeline(ExtractionStrategy::PatternThenLlm, Some(provider.clone()))
            .run(PROSE)
            .await;

        assert_eq!(outcome.source, Some("llm"));
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].title, "X");
        assert_eq!(outcome.records[0].location, SENTINEL);
        assert_eq!(outcome.candidates, 2);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_llm_failure_degrades_to_empty() {
        let mut provider = MockProvider::default();
        provider.add_error(PromptBuilder::new(PROSE).user_prompt());

        let outcome = pipeline(ExtractionStrategy::PatternThenLlm, Some(Arc::new(provider)))
            .run(PROSE)
            .await;

        assert!(outcome.is_empty());
    }

    #[tokio::test]
    async fn test_llm_only_strategy() {
        let provider = Arc::new(MockProvider::new(
            r#"[{"案件名": "A", "募集人数": 3}, {"案件名": "未記入"}]"#,
        ));
        let outcome = pipeline(ExtractionStrategy::Llm, Some(provider))
            .run(LISTING)
            .await;

        assert_eq!(outcome.source, Some("llm"));
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].headcount, "3");
    }

    #[tokio::test]
    async fn test_multi_project_email() {
        let text = "お疲れ様です。下記案件のご紹介です。\n\n\
            【案件名】決済基盤リプレイス\n【勤務地】大手町\n【必須スキル】\n・Java\n・Spring Boot\n\n\
            【案件名】ECサイト保守\n【勤務地】フルリモート\n【期間】長期\n\n\
            以上、よろしくお願いいたします。";

        let outcome = pipeline(ExtractionStrategy::Pattern, None).run(text).await;

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].title, "決済基盤リプレイス");
        assert_eq!(outcome.records[0].requirements, "・Java\n・Spring Boot");
        assert_eq!(outcome.records[1].title, "ECサイト保守");
        assert_eq!(outcome.records[1].location, "フルリモート");
    }

    struct CountingExtractor {
        calls: Arc<AtomicUsize>,
        records: Vec<ProjectRecord>,
    }

    #[async_trait]
    impl RecordExtractor for CountingExtractor {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn extract(&self, _text: &str) -> Vec<ProjectRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records.clone()
        }
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_non_empty() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let hit = ProjectRecord::empty().with(mailsheet_domain::Field::Title, "hit");

        let pipeline = ExtractionPipeline::with_chain(
            ExtractionStrategy::PatternThenLlm,
            1_000,
            vec![
                Box::new(CountingExtractor {
                    calls: first.clone(),
                    records: vec![hit.clone()],
                }),
                Box::new(CountingExtractor {
                    calls: second.clone(),
                    records: vec![],
                }),
            ],
        );

        let outcome = pipeline.run("text").await;
        assert_eq!(outcome.records, vec![hit]);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }
}
