//! Apiprobe Infrastructure - Adapters and engines
//!
//! Concrete implementations behind the application ports: the reqwest HTTP
//! adapter, the assertion check runner, suite orchestration, suite-file
//! loading, and the console reporter.

pub mod adapters;
pub mod checks;
pub mod loader;
pub mod report;
pub mod runner;

pub use adapters::ReqwestHttpClient;
pub use checks::CheckRunner;
pub use loader::{LoadError, load_suite};
pub use report::render_report;
pub use runner::{RunError, RunMode, SuiteRunner};
