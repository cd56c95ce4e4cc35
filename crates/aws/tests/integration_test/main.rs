//! Integration tests for sdkcache-aws.
//!
//! Everything runs against stub config sources or static credentials, so no
//! AWS account or network access is needed.

mod concurrency;
mod lifecycle;
mod resolve;
mod support;
