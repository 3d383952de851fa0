//! Rendering CLI errors as miette reports.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // The library error carries its own code and help.
        CliError::Vendor(e) => Report::new(e),
        CliError::Config(e) => config_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::InvalidValue { field, value, hint } => miette::miette!(
            code = "INVALID_CONFIG",
            help = hint,
            "Invalid value for '{}': {}",
            field,
            value
        ),
        other => miette::miette!(code = "INVALID_CONFIG", "{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_errors_keep_code() {
        let report = cli_error_to_miette(CliError::Vendor(chai_vendor::Error::OutputExists(
            "vendor/chai/chai.js".into(),
        )));
        let code = report.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("OUTPUT_EXISTS"));
    }

    #[test]
    fn test_config_errors_have_help() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::InvalidValue {
            field: "corePackage".into(),
            value: "\"\"".into(),
            hint: "Name the package that ships chai.js".into(),
        }));
        assert_eq!(
            report.help().map(|h| h.to_string()).as_deref(),
            Some("Name the package that ships chai.js")
        );
    }
}
