use std::path::PathBuf;

use forge_backend::Language;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub language: Option<Language>,
    pub load: Option<PathBuf>,
    pub help: bool,
}

pub const USAGE: &str = "Usage: autodebugger [--language <python|javascript|cpp|java>] [--load <path>]";

pub fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--language" | "-l" => {
                let value = required_value(&arg, args.next())?;
                parsed.language = Some(value.parse::<Language>()?);
            }
            "--load" => {
                parsed.load = Some(PathBuf::from(required_value(&arg, args.next())?));
            }
            "--help" | "-h" => parsed.help = true,
            flag if flag.starts_with('-') => {
                return Err(format!(
                    "Unknown flag '{flag}'. Run with --help for valid flags."
                ));
            }
            unknown => {
                return Err(format!(
                    "Unexpected argument '{unknown}'. Run with --help for valid flags."
                ));
            }
        }
    }

    Ok(parsed)
}

fn required_value(flag: &str, value: Option<String>) -> Result<String, String> {
    match value.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("Flag '{flag}' requires a non-empty value.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_language_and_load() {
        let parsed = parse_cli_args(args(&["--language", "js", "--load", "main.js"]))
            .expect("valid flags");
        assert_eq!(parsed.language, Some(Language::JavaScript));
        assert_eq!(parsed.load, Some(PathBuf::from("main.js")));
        assert!(!parsed.help);
    }

    #[test]
    fn rejects_missing_values_and_unknown_flags() {
        assert_eq!(
            parse_cli_args(args(&["--load"])),
            Err("Flag '--load' requires a non-empty value.".to_string())
        );
        assert!(parse_cli_args(args(&["--verbose"]))
            .expect_err("unknown flag")
            .starts_with("Unknown flag '--verbose'"));
        assert!(parse_cli_args(args(&["--language", "cobol"]))
            .expect_err("unsupported language")
            .contains("Unsupported language 'cobol'"));
    }
}
