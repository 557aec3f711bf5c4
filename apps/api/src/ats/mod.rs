// ATS scan: scoring call, typed report, and HTTP handlers.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod report;
pub mod scoring;
