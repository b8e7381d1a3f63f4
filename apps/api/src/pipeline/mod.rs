// Candidate evaluation pipeline.
// Implements: fact extraction, risk critique, decision, batch orchestration.
// All generation calls go through llm_client — stages never talk to the API directly.

pub mod critique;
pub mod decision;
pub mod evaluator;
pub mod extraction;
pub mod handlers;
pub mod prompts;
