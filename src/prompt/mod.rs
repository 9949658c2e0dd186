// src/prompt/mod.rs
//! Composes the generation prompt from the built-in Handlebars template.
//!
//! The JSON shape the template asks for is generated from [`Platform`], the
//! same table the completion parser reads, so the field names requested and
//! the field names expected cannot drift apart.

use crate::constants::{REEL_SCRIPT_SECONDS, TITLE_MAX_WORDS};
use crate::model::Platform;
use crate::types::{AcquiredText, GenerationPrompt};
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::json;

const TEMPLATE_NAME: &str = "social-content";
const TEMPLATE_SOURCE: &str = include_str!("../../templates/social-content.hbs");

static TEMPLATES: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string(TEMPLATE_NAME, TEMPLATE_SOURCE)
        .expect("built-in prompt template should compile");
    handlebars
});

/// Embeds `text` into the fixed instruction template.
///
/// Deterministic: equal inputs give byte-identical prompts.
pub fn build_prompt(text: &AcquiredText) -> GenerationPrompt {
    let platforms: Vec<_> = Platform::ALL
        .iter()
        .map(|p| json!({ "name": p.name(), "caption_key": p.caption_key() }))
        .collect();

    let data = json!({
        "title_max_words": TITLE_MAX_WORDS,
        "reel_seconds": REEL_SCRIPT_SECONDS,
        "platforms": platforms,
        "source_text": text.as_str(),
    });

    // The template is fixed and the data always complete, so rendering
    // cannot fail at runtime.
    let prompt = TEMPLATES
        .render(TEMPLATE_NAME, &data)
        .expect("built-in prompt template should render");

    log::debug!(
        "Prompt composed: {} bytes around {} bytes of source text",
        prompt.len(),
        text.len()
    );

    GenerationPrompt::new(prompt)
}
