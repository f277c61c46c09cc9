//! The `send` and `render` subcommands.

mod report;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use report::{build_report, render, send, ReportSummary};

/// What a command hands back to `main`: a line for the operator and a summary of the run.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    message: String,
    structure: T,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> &T {
        &self.structure
    }

    /// Logs the message at info and the summary as JSON at debug.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Ok(json) = serde_json::to_string_pretty(&self.structure) {
            debug!("Command output:\n\n{json}\n\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_accessors() {
        let out = Out::new("done", vec![1, 2]);
        assert_eq!(out.message(), "done");
        assert_eq!(out.structure(), &vec![1, 2]);
        out.print();
    }
}
