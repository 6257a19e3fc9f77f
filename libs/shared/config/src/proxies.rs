// [libs/shared/config/src/proxies.rs]
//! Plain-text proxy list loader: one proxy URL per line, blank lines
//! ignored. An empty or missing file is a fatal start-up error (spec §6).

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyListError {
    #[error("[L0_CONFIG_FAULT]: PROXY_FILE_UNREADABLE -> {0}: {1}")]
    Unreadable(String, std::io::Error),
    #[error("[L0_CONFIG_FAULT]: PROXY_FILE_EMPTY -> {0}")]
    Empty(String),
}

pub fn load_proxy_list(path: impl AsRef<Path>) -> Result<Vec<String>, ProxyListError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ProxyListError::Unreadable(path.display().to_string(), e))?;

    let proxies: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if proxies.is_empty() {
        return Err(ProxyListError::Empty(path.display().to_string()));
    }
    Ok(proxies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_non_blank_lines_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http://proxy-a:8080").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "http://proxy-b:8080").unwrap();
        let proxies = load_proxy_list(file.path()).unwrap();
        assert_eq!(proxies, vec!["http://proxy-a:8080", "http://proxy-b:8080"]);
    }

    #[test]
    fn empty_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = load_proxy_list(file.path());
        assert!(matches!(result, Err(ProxyListError::Empty(_))));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_proxy_list("/nonexistent/path/proxies.txt");
        assert!(matches!(result, Err(ProxyListError::Unreadable(_, _))));
    }
}
