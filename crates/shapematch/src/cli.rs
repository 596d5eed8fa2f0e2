use crate::error::{Error, Result};
use crate::options::Options;
use clap::Parser;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "shapematch",
    about = "Match JSON data against a structural pattern",
    version
)]
pub struct Cli {
    /// JSON file with the data under test, or "-" to read from stdin
    pub data: PathBuf,

    /// JSON file with the expected pattern, or "-" to read from stdin
    pub pattern: PathBuf,

    /// Load matching options from a JSON file
    #[arg(short, long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Accept data strings that contain the expected string
    #[arg(long)]
    pub loose_strings: bool,

    /// Pass array checks when any element matches instead of all
    #[arg(long)]
    pub loose_arrays: bool,

    /// Separator between path segments in mismatch messages
    #[arg(short, long)]
    pub separator: Option<String>,

    /// Drop this key from object patterns (repeatable)
    #[arg(short = 'i', long = "ignore-property", value_name = "KEY")]
    pub ignore_properties: Vec<String>,

    /// Prefix marking a string pattern as a numeric comparison
    #[arg(long, value_name = "MARKER")]
    pub numeric_marker: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log matcher decisions to stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Options from `--options`, with explicit flags taking precedence.
    pub fn resolve_options(&self) -> Result<Options> {
        let mut options = match &self.options {
            Some(path) => {
                let text = read_source(path)?;
                serde_json::from_str(&text).map_err(|source| Error::Options {
                    path: path.clone(),
                    source,
                })?
            }
            None => Options::default(),
        };

        if self.loose_strings {
            options.strict_strings = false;
        }
        if self.loose_arrays {
            options.strict_arrays = false;
        }
        if let Some(separator) = &self.separator {
            options.separator = separator.clone();
        }
        for key in &self.ignore_properties {
            options.ignore_properties.push(key.clone());
        }
        if let Some(marker) = &self.numeric_marker {
            options.numeric_marker = marker.clone();
        }

        Ok(options)
    }

    /// Reads the data and pattern documents.
    pub fn load_inputs(&self) -> Result<(Value, Value)> {
        if is_stdin(&self.data) && is_stdin(&self.pattern) {
            return Err(Error::StdinTwice);
        }
        Ok((load_json(&self.data)?, load_json(&self.pattern)?))
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_source(path: &Path) -> Result<String> {
    if is_stdin(path) {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_json(path: &Path) -> Result<Value> {
    let text = read_source(path)?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("shapematch").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_options() {
        let cli = parse(&["data.json", "pattern.json"]);
        assert_eq!(cli.resolve_options().unwrap(), Options::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "data.json",
            "pattern.json",
            "--loose-strings",
            "--loose-arrays",
            "--separator",
            ".",
            "-i",
            "id",
            "--ignore-property",
            "etag",
            "--numeric-marker",
            "__numeric__",
        ]);
        let options = cli.resolve_options().unwrap();
        assert!(!options.strict_strings);
        assert!(!options.strict_arrays);
        assert_eq!(options.separator, ".");
        assert!(options.is_ignored("id"));
        assert!(options.is_ignored("etag"));
        assert_eq!(options.numeric_marker, "__numeric__");
    }

    #[test]
    fn test_verbose_count() {
        assert_eq!(parse(&["a", "b"]).verbose, 0);
        assert_eq!(parse(&["a", "b", "-vv"]).verbose, 2);
    }

    #[test]
    fn test_both_stdin_rejected() {
        let cli = parse(&["-", "-"]);
        assert!(matches!(cli.load_inputs(), Err(Error::StdinTwice)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
