use std::sync::Arc;

use crate::error::{EnrichmentError, GenerationError};

use super::gemini::TextGenerator;

const SUMMARY_PROMPT: &str = "Summarize the following article: ";
const TAGS_PROMPT: &str = "Generate a comma-separated list of tags for the following article: ";

/// Turns article body text into a summary and a tag list with exactly one
/// provider call each. The two calls fail independently.
pub struct Enricher {
    generator: Arc<dyn TextGenerator>,
}

impl Enricher {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn summarize(&self, body: &str) -> Result<String, EnrichmentError> {
        let summary = self
            .generator
            .generate(&format!("{SUMMARY_PROMPT}{body}"))
            .await
            .map_err(EnrichmentError::Summary)?;

        if summary.is_empty() {
            return Err(EnrichmentError::Summary(GenerationError::Empty));
        }
        Ok(summary)
    }

    /// Tag text is split on commas as-is. No trimming, no deduplication;
    /// callers tolerate whitespace inside tag strings.
    pub async fn tag_list(&self, body: &str) -> Result<Vec<String>, EnrichmentError> {
        let text = self
            .generator
            .generate(&format!("{TAGS_PROMPT}{body}"))
            .await
            .map_err(EnrichmentError::Tags)?;

        if text.is_empty() {
            return Err(EnrichmentError::Tags(GenerationError::Empty));
        }
        Ok(text.split(',').map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<String, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .expect("no scripted response left")
        }
    }

    #[tokio::test]
    async fn tags_are_split_without_trimming() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("a, b,c".to_string())]));
        let enricher = Enricher::new(generator);
        let tags = enricher.tag_list("body").await.unwrap();
        assert_eq!(tags, vec!["a", " b", "c"]);
    }

    #[tokio::test]
    async fn prompts_carry_the_fixed_templates() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("S".to_string()),
            Ok("t1,t2".to_string()),
        ]));
        let enricher = Enricher::new(generator.clone());
        enricher.summarize("the body").await.unwrap();
        enricher.tag_list("the body").await.unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts[0], "Summarize the following article: the body");
        assert_eq!(
            prompts[1],
            "Generate a comma-separated list of tags for the following article: the body"
        );
    }

    #[tokio::test]
    async fn empty_responses_are_failures() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(String::new())]));
        let enricher = Enricher::new(generator);
        let err = enricher.summarize("body").await.unwrap_err();
        assert!(matches!(
            err,
            EnrichmentError::Summary(GenerationError::Empty)
        ));
    }

    #[tokio::test]
    async fn failures_name_the_step_that_failed() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Err(GenerationError::Api(
            "quota exceeded".to_string(),
        ))]));
        let enricher = Enricher::new(generator);
        let err = enricher.tag_list("body").await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Tags(_)));
    }
}
