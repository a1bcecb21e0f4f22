use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, InputMessage, InputRole, OutputItem, OutputMessageContent,
    },
};

pub async fn request_text_response(
    client: &Client<OpenAIConfig>,
    model: &str,
    max_output_tokens: u32,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String> {
    let request = CreateResponseArgs::default()
        .model(model)
        .max_output_tokens(max_output_tokens)
        .input(vec![
            InputMessage {
                role: InputRole::System,
                content: vec![system_prompt.into()],
                status: None,
            },
            InputMessage {
                role: InputRole::User,
                content: vec![user_prompt.into()],
                status: None,
            },
        ])
        .build()
        .context("Failed to build LLM request")?;

    let response = client
        .responses()
        .create(request)
        .await
        .with_context(|| "Failed to get response from LLM")?;

    let mut parts = Vec::new();
    for item in response.output {
        if let OutputItem::Message(message) = item {
            for content in message.content {
                if let OutputMessageContent::OutputText(text) = content {
                    parts.push(text.text);
                }
            }
        }
    }

    match join_text_parts(parts.iter().map(String::as_str)) {
        Some(text) => Ok(text),
        None => bail!("No text output returned from model"),
    }
}

/// Joins output text parts exactly as received. `None` when the model sent no text part at all.
fn join_text_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut joined: Option<String> = None;
    for part in parts {
        joined.get_or_insert_with(String::new).push_str(part);
    }
    joined
}
