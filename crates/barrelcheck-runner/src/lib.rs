//! barrelcheck-runner: request dispatch and the contract suite

pub mod dispatch;
pub mod endpoints;
pub mod suite;

pub use dispatch::{ApiResponse, DispatchError, Dispatcher, Exchange};
pub use endpoints::ApiUrls;
pub use suite::{CaseFailure, Group, Selection, SuiteContext, SuiteError};

use barrelcheck_core::{ResolvedEndpoint, SuiteReport};

/// Run the selected part of the suite against `endpoint`.
///
/// # Errors
///
/// Returns error if the suite context cannot be built. Case failures are
/// recorded in the report, not returned.
pub fn run_suite(
    endpoint: &ResolvedEndpoint,
    selection: &Selection,
) -> Result<SuiteReport, SuiteError> {
    let ctx = SuiteContext::new(endpoint)?;
    let mut report = SuiteReport::new(&endpoint.environment, &endpoint.base_url);
    tracing::info!(
        environment = %endpoint.environment,
        base_url = %endpoint.base_url,
        "running suite"
    );
    suite::run(&ctx, selection, &mut report);
    Ok(report)
}
