//! Schema-constrained generation.
//!
//! Renders the JSON Schema of the target type into the prompt and
//! deserializes the model's reply into that type.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use support_router_core::{traits::LlmClient, Error, Result};

/// Generate a value of type `T` from the model.
///
/// Fails on generation errors, on replies without a JSON object, and on
/// objects that do not deserialize into `T`. There is no retry here.
pub async fn generate_structured<T>(llm: &dyn LlmClient, prompt: &str) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = schemars::schema_for!(T);
    let schema_json = serde_json::to_string_pretty(&schema)?;

    let full_prompt = format!(
        "{}\n\nRespond with a single JSON object conforming to this JSON Schema. \
         Do not add any other text.\n{}",
        prompt, schema_json
    );

    let response = llm.complete(&full_prompt).await?;

    parse_first_object(&response.content)
}

/// Deserialize the first JSON object in `text`.
///
/// Anything before the first `{` and anything after the object it opens is
/// ignored, so code fences and prose around the object are tolerated.
pub fn parse_first_object<T: DeserializeOwned>(text: &str) -> Result<T> {
    let no_object = || Error::internal(format!("No JSON object in model output: {}", preview(text)));

    let start = text.find('{').ok_or_else(no_object)?;
    let value = serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<T>()
        .next()
        .ok_or_else(no_object)??;
    Ok(value)
}

fn preview(text: &str) -> String {
    let cut: String = text.chars().take(120).collect();
    if cut.len() < text.len() {
        format!("{}...", cut)
    } else {
        cut
    }
}
