// Library root: configuration, file-backed data and run orchestration for
// the fplsquad binary, exposed for integration tests.

pub mod config;
pub mod data;
pub mod run;
