// Resume optimizer: prompt templates, interchangeable backends, the
// orchestration boundary, and HTTP handlers.
// All LLM calls go through llm_client.

pub mod backend;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
