//! Error handling utilities

use crate::error::FederationError;
use tracing::error;

/// Report a fatal error and exit with its status code
///
/// A `FederationError` anywhere in the chain decides the exit code and the
/// message shown; verbose mode adds the full cause chain.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);
    std::process::exit(report(&error, verbose))
}

fn report(error: &anyhow::Error, verbose: u8) -> i32 {
    if let Some(federation_err) = error.downcast_ref::<FederationError>() {
        eprintln!("{}", federation_err.user_message());
        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", federation_err.developer_message());
        }
        return federation_err.exit_code();
    }

    eprintln!("Error: {error}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_from_federation_error() {
        let err = anyhow::Error::new(FederationError::mode_disagreement());
        assert_eq!(report(&err, 0), 3);

        let err = anyhow::Error::new(FederationError::config("bad"));
        assert_eq!(report(&err, 1), 2);
    }

    #[test]
    fn test_exit_code_for_foreign_error() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(report(&err, 0), 1);
    }
}
