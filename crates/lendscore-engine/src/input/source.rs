use std::fs;
use std::io::{IsTerminal, Read};

use crate::input::invalid_input_error;
use crate::{EngineError, EngineResult};

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
        }
    }
}

/// Raw transaction document plus where it came from.
#[derive(Debug, Clone)]
pub(crate) struct TransactionSource {
    pub(crate) kind: SourceKind,
    pub(crate) reference: Option<String>,
    pub(crate) content: String,
}

/// `-` and a missing path both mean stdin. `stdin_override` stands in for stdin in tests.
pub(crate) fn resolve_source(
    path: Option<String>,
    stdin_override: Option<String>,
) -> EngineResult<TransactionSource> {
    match path {
        Some(path) if path != "-" => read_file(path),
        Some(_) => from_stdin(
            stdin_override,
            "Path `-` means stdin input, but stdin was empty. Pipe JSON/CSV input or pass a file path.",
        ),
        None => from_stdin(
            stdin_override,
            "No transaction source provided. Pass a file path or pipe input via stdin.",
        ),
    }
}

fn read_file(path: String) -> EngineResult<TransactionSource> {
    let content = fs::read_to_string(&path).map_err(|error| {
        EngineError::invalid_argument_with_recovery(
            &format!("Could not read transaction file `{path}`: {error}"),
            vec![
                "Verify the path exists and is readable.".to_string(),
                "Pass `-` to read the statement from stdin instead.".to_string(),
            ],
        )
    })?;
    Ok(TransactionSource {
        kind: SourceKind::File,
        reference: Some(path),
        content,
    })
}

fn from_stdin(stdin_override: Option<String>, empty_message: &str) -> EngineResult<TransactionSource> {
    match read_stdin(stdin_override)? {
        Some(content) if !content.trim().is_empty() => Ok(TransactionSource {
            kind: SourceKind::Stdin,
            reference: None,
            content,
        }),
        _ => Err(invalid_input_error(empty_message)),
    }
}

fn read_stdin(stdin_override: Option<String>) -> EngineResult<Option<String>> {
    if let Some(value) = stdin_override {
        return Ok(Some(value));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| {
            EngineError::invalid_argument_with_recovery(
                &format!("Could not read stdin: {error}"),
                vec![
                    "Retry with an explicit file path argument.".to_string(),
                    "Or rerun with valid stdin content.".to_string(),
                ],
            )
        })?;

    Ok(Some(buffer))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{SourceKind, resolve_source};

    #[test]
    fn dash_path_reads_stdin_override() {
        let resolved = resolve_source(Some("-".to_string()), Some("[]".to_string()));
        assert!(resolved.is_ok());
        if let Ok(source) = resolved {
            assert_eq!(source.kind, SourceKind::Stdin);
            assert_eq!(source.content, "[]");
        }
    }

    #[test]
    fn dash_path_with_blank_stdin_is_rejected() {
        let resolved = resolve_source(Some("-".to_string()), Some("   ".to_string()));
        assert!(resolved.is_err());
    }

    #[test]
    fn file_path_is_read_from_disk() {
        let file = tempfile::NamedTempFile::new();
        assert!(file.is_ok());
        if let Ok(mut handle) = file {
            assert!(handle.write_all(b"description,amount,date\n").is_ok());
            let path = handle.path().display().to_string();
            let resolved = resolve_source(Some(path.clone()), None);
            assert!(resolved.is_ok());
            if let Ok(source) = resolved {
                assert_eq!(source.kind.as_str(), "file");
                assert_eq!(source.reference, Some(path));
            }
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let resolved = resolve_source(Some("/nonexistent/lendscore.csv".to_string()), None);
        assert!(resolved.is_err());
        if let Err(error) = resolved {
            assert!(error.message.contains("/nonexistent/lendscore.csv"));
        }
    }
}
