// Candidate ranking: prompt construction, the single model call, response
// validation and the per-invocation pipeline that ties them together.
// All model traffic goes through llm_client.

pub mod client;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod validation;
