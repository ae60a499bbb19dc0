// Lesson planning: form inputs → prompt → generated plan text, plus the
// layout preview and export endpoints that consume that text.

pub mod generator;
pub mod handlers;
pub mod inputs;
pub mod prompts;
pub mod reference;
