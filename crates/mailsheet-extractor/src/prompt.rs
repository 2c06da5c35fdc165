//! LLM prompt for project-listing extraction

use mailsheet_domain::Field;
use mailsheet_llm::ChatRequest;

/// Builds the chat request sent to the language model
pub struct PromptBuilder {
    text: String,
}

impl PromptBuilder {
    /// Create a new prompt builder for an email body
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// System instruction: role, target schema and output format
    pub fn system_prompt() -> String {
        let mut prompt = String::new();
        prompt.push_str(ROLE_INSTRUCTIONS);
        prompt.push_str("\n\n各案件は以下の形式のJSONにしてください：\n{\n");

        let keys: Vec<String> = Field::ALL
            .iter()
            .map(|f| format!("  \"{}\": \"\"", f.label()))
            .collect();
        prompt.push_str(&keys.join(",\n"));
        prompt.push_str("\n}\n\n");

        prompt.push_str(OUTPUT_RULES);
        prompt
    }

    /// User message wrapping the raw email text
    pub fn user_prompt(&self) -> String {
        format!("以下の案件メール本文を解析してください：\n\n{}", self.text)
    }

    /// Build the complete request
    pub fn build(&self, model: &str, temperature: f32) -> ChatRequest {
        ChatRequest::new(model, Self::system_prompt(), self.user_prompt(), temperature)
    }
}

const ROLE_INSTRUCTIONS: &str =
    "あなたはSES営業担当です。以下のメール本文から複数の案件情報を抽出してください。";

const OUTPUT_RULES: &str = "「未記入」や「不明」の項目があっても構いません。\
複数案件がある場合、JSONのリスト形式で返してください。";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_every_key() {
        let prompt = PromptBuilder::system_prompt();
        for field in Field::ALL {
            assert!(prompt.contains(&format!("\"{}\"", field.label())));
        }
        assert!(prompt.contains("未記入"));
        assert!(prompt.contains("JSONのリスト形式"));
    }

    #[test]
    fn test_user_prompt_includes_text() {
        let builder = PromptBuilder::new("【案件名】Web開発");
        assert!(builder.user_prompt().ends_with("【案件名】Web開発"));
    }

    #[test]
    fn test_build_request() {
        let request = PromptBuilder::new("本文").build("gpt-4", 0.2);
        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(
            request.user_content(),
            Some("以下の案件メール本文を解析してください：\n\n本文")
        );
    }
}
