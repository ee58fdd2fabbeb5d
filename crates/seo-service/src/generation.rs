use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, error};

use llm_common::completion::CompletionClient;
use llm_common::openai::OpenAiClientError;

use crate::markdown::clean_markdown;

/// `{name}` placeholders plus the `{{` / `}}` escapes for literal braces.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex")
});

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("template {template} has no value for placeholder {{{name}}}")]
    MissingVariable { template: &'static str, name: String },

    #[error(transparent)]
    Llm(#[from] OpenAiClientError),
}

/// A prompt with named `{placeholders}`.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    name: &'static str,
    source: &'static str,
}

impl PromptTemplate {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Substitute every placeholder from `request`.
    ///
    /// Values are inserted verbatim and never re-scanned, so user input that
    /// happens to contain braces stays as typed.
    pub fn render(&self, request: &PromptRequest) -> Result<String, GenerationError> {
        let mut out = String::with_capacity(self.source.len() + request.value_len());
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(self.source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&self.source[last..whole.start()]);
            match caps.get(1) {
                Some(name) => {
                    let value = request.get(name.as_str()).ok_or_else(|| {
                        GenerationError::MissingVariable {
                            template: self.name,
                            name: name.as_str().to_string(),
                        }
                    })?;
                    out.push_str(value);
                }
                // "{{" or "}}"
                None => out.push_str(&whole.as_str()[..1]),
            }
            last = whole.end();
        }
        out.push_str(&self.source[last..]);
        Ok(out)
    }
}

/// Named values for a [`PromptTemplate`].
#[derive(Debug, Clone, Default)]
pub struct PromptRequest {
    vars: HashMap<String, String>,
}

impl PromptRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    fn value_len(&self) -> usize {
        self.vars.values().map(String::len).sum()
    }
}

/// Renders prompts, calls the model and cleans what comes back.
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn CompletionClient>,
}

impl Generator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Returns cleaned plain text, or `None` if anything on the way failed.
    /// The cause is logged here; callers only decide the HTTP response.
    pub async fn generate(
        &self,
        template: &PromptTemplate,
        request: &PromptRequest,
    ) -> Option<String> {
        match self.try_generate(template, request).await {
            Ok(text) => Some(text),
            Err(e) => {
                error!(
                    error = %e,
                    template = template.name(),
                    model = %self.client.model(),
                    "text generation failed"
                );
                None
            }
        }
    }

    async fn try_generate(
        &self,
        template: &PromptTemplate,
        request: &PromptRequest,
    ) -> Result<String, GenerationError> {
        let prompt = template.render(request)?;
        let raw = self.client.complete(&prompt).await?;
        debug!(
            template = template.name(),
            raw_len = raw.len(),
            "completion received"
        );
        Ok(clean_markdown(&raw))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use llm_common::completion::CompletionClient;
    use llm_common::openai::OpenAiClientError;

    /// Canned completion backend that records every prompt it receives.
    pub struct FakeClient {
        reply: Option<String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl FakeClient {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, prompt: &str) -> Result<String, OpenAiClientError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().ok_or(OpenAiClientError::MissingApiKey)
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }
}
