//! The source reader (§4.1): resolve a file path, tokenize, and parse into
//! the module-level structure the locator walks next.

pub mod lexer;
pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{parse_error, FlowResult};

pub use parser::Module;

/// A parsed source file: its module structure plus the path it came from,
/// kept for error reporting in later stages.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSource {
    pub path: PathBuf,
    pub module: Module,
}

/// Read and parse one source file. Never falls back to a cached or
/// partial tree: any IO or parse failure aborts with a located error.
pub fn read_source(path: &Path) -> FlowResult<ParsedSource> {
    let text = fs::read_to_string(path).map_err(|e| {
        parse_error(
            path.display(),
            None,
            format!("cannot read file: {e}"),
            "check the path exists and is readable",
        )
    })?;
    let path_str = path.display().to_string();
    let toks = lexer::tokenize(&path_str, &text)?;
    let module = parser::parse_module(&path_str, &toks)?;
    Ok(ParsedSource {
        path: path.to_path_buf(),
        module,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("tmp file");
        f.write_all(contents.as_bytes()).expect("write tmp file");
        f
    }

    #[test]
    fn reads_and_parses_a_minimal_workflow() {
        let f = write_temp(
            "@workflow.defn\nclass Simple:\n    @workflow.run\n    async def run(self):\n        pass\n",
        );
        let parsed = read_source(f.path()).expect("parses");
        assert_eq!(parsed.module.classes.len(), 1);
        assert_eq!(parsed.module.classes[0].name, "Simple");
    }

    #[test]
    fn missing_file_is_a_parse_error() {
        let err = read_source(Path::new("/no/such/file.py"));
        assert!(err.is_err());
    }
}
