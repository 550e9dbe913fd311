//! Ordered fallback over a fixed list of attempts.

use std::future::Future;

use crate::error::ProviderError;

/// Runs `attempt` for each step in order and returns the first success along
/// with the step that produced it.
///
/// Each failure is logged and the next step is tried. When every step fails
/// the last error is folded into [`ProviderError::Exhausted`].
pub(crate) async fn first_success<T, F, Fut>(
    steps: &[&'static str],
    mut attempt: F,
) -> Result<(&'static str, T), ProviderError>
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut last_error: Option<ProviderError> = None;

    for &step in steps {
        match attempt(step).await {
            Ok(value) => return Ok((step, value)),
            Err(err) => {
                tracing::warn!(step, error = %err, "attempt failed; trying next");
                last_error = Some(err);
            }
        }
    }

    Err(ProviderError::Exhausted {
        last: last_error.map_or_else(|| "no steps configured".to_string(), |e| e.to_string()),
    })
}
