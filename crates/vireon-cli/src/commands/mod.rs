pub mod controls;
pub mod divergence;
pub mod leash;
pub mod toy;
pub mod zone;

use serde::Serialize;
use vireon_core::RealityMode;

/// Parse a reality mode string into the enum.
pub fn parse_reality_mode(s: &str) -> RealityMode {
    match s {
        "constant" | "const" => RealityMode::Constant,
        "noisy" | "noise" => RealityMode::Noisy,
        _ => {
            eprintln!("Unknown reality mode '{s}', using constant");
            RealityMode::Constant
        }
    }
}

/// Parse a comma-separated list of numbers ("0.1, 0.2,0.3").
pub fn parse_series(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|e| format!("invalid number '{part}': {e}"))
        })
        .collect()
}

/// Parse a series argument or exit with status 1.
pub fn series_or_exit(name: &str, s: &str) -> Vec<f64> {
    match parse_series(s) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("--{name}: {e}");
            std::process::exit(1);
        }
    }
}

/// Unwrap a core result or report it and exit with status 1.
pub fn or_exit<T>(result: vireon_core::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Write a pretty JSON report when `--output` was given.
pub fn write_json<T: Serialize>(output_path: Option<&str>, report: &T) {
    let Some(path) = output_path else {
        return;
    };
    let json = match serde_json::to_string_pretty(report) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("\nFailed to serialize report: {e}");
            return;
        }
    };
    match std::fs::write(path, json) {
        Ok(()) => println!("\nResults written to {path}"),
        Err(e) => eprintln!("\nFailed to write {path}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_reality_mode tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_constant_variants() {
        assert_eq!(parse_reality_mode("constant"), RealityMode::Constant);
        assert_eq!(parse_reality_mode("const"), RealityMode::Constant);
    }

    #[test]
    fn test_parse_noisy_variants() {
        assert_eq!(parse_reality_mode("noisy"), RealityMode::Noisy);
        assert_eq!(parse_reality_mode("noise"), RealityMode::Noisy);
    }

    #[test]
    fn test_parse_unknown_defaults_constant() {
        assert_eq!(parse_reality_mode(""), RealityMode::Constant);
        assert_eq!(parse_reality_mode("NOISY"), RealityMode::Constant); // case-sensitive
    }

    // -----------------------------------------------------------------------
    // parse_series tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_series_basic() {
        assert_eq!(
            parse_series("0.1,0.2, 0.2 ,0.2").unwrap(),
            vec![0.1, 0.2, 0.2, 0.2]
        );
    }

    #[test]
    fn test_parse_series_skips_empty_parts() {
        assert_eq!(parse_series("1,,2,").unwrap(), vec![1.0, 2.0]);
        assert!(parse_series("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_series_rejects_garbage() {
        let err = parse_series("1,two,3").unwrap_err();
        assert!(err.contains("two"));
    }

    #[test]
    fn test_write_json_without_path_is_noop() {
        write_json(None, &vec![1.0, 2.0]);
    }
}
