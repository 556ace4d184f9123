//! notodiff
pub mod compare;
pub mod core;
pub mod fonts;
pub mod github;
pub mod logging;
pub mod manifest;
pub mod report;
#[cfg(test)]
mod tests;
