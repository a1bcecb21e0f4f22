//! One quiz request: configuration, prompt, model call, output.

use std::io::Write;

use tracing::{debug, info};

use crate::config::{Config, CredentialSource, Settings};
use crate::error::Result;
use crate::llm::TextModel;
use crate::prompt::Prompt;

pub struct QuizPipeline<M> {
    model: M,
}

impl<M: TextModel> QuizPipeline<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Returns the model's text for `topic` exactly as the service produced it.
    pub async fn generate(&self, topic: &str) -> Result<String> {
        let prompt = Prompt::for_topic(topic);
        debug!(topic_len = topic.len(), "built quiz prompt");

        let response = self.model.complete(&prompt).await?;
        info!(response_bytes = response.len(), "received quiz from model service");
        Ok(response)
    }

    pub async fn generate_into<W: Write>(&self, topic: &str, sink: &mut W) -> Result<()> {
        let response = self.generate(topic).await?;
        sink.write_all(response.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

/// Loads configuration, connects a model and writes the quiz for `topic` to `sink`.
///
/// `connect` is only called once a credential has been found, so a missing key never reaches
/// the network. Nothing is written to `sink` unless the whole request succeeds.
pub async fn run<C, M, F, W>(
    credentials: &C,
    settings: Settings,
    connect: F,
    topic: &str,
    sink: &mut W,
) -> Result<()>
where
    C: CredentialSource,
    M: TextModel,
    F: FnOnce(&Config) -> Result<M>,
    W: Write,
{
    let config = Config::load(credentials, settings)?;
    let model = connect(&config)?;
    QuizPipeline::new(model).generate_into(topic, sink).await
}
