//! Quotebook command-line entry point.
//!
//! All setup lives in `quotebook_lib::run`.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    quotebook_lib::run().await
}
