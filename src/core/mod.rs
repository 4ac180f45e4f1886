pub mod batch;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod rate_limiter;
pub mod recovery;
pub mod renamer;
pub mod scanner;
pub mod tagger;

#[cfg(test)]
pub mod fakes;
