use crate::client::client_script;
use crate::page::render_index;
use crate::{AppConfig, WebError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use treeweb_core::write_markup;

/// What a build pass wrote. `None` means the target was already fresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub index: Option<PathBuf>,
    pub script: Option<PathBuf>,
}

impl BuildReport {
    pub fn is_noop(&self) -> bool {
        self.index.is_none() && self.script.is_none()
    }
}

/// True if `target` is missing or older than any of `sources`.
pub fn needs_build(target: &Path, sources: &[PathBuf]) -> Result<bool, WebError> {
    let Some(target_mtime) = mtime(target)? else {
        return Ok(true);
    };
    for source in sources {
        let source_mtime = mtime(source)?.ok_or_else(|| WebError::MissingSource(source.clone()))?;
        if target_mtime < source_mtime {
            return Ok(true);
        }
    }
    Ok(false)
}

fn mtime(path: &Path) -> Result<Option<SystemTime>, WebError> {
    match fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some).map_err(|source| WebError::Read {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(WebError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Inputs that invalidate the build: the running executable (it embeds the
/// page definition and the client runtime) and the config file.
pub fn default_sources(root: &Path) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    match std::env::current_exe() {
        Ok(exe) => sources.push(exe),
        Err(e) => log::warn!("cannot locate current executable for staleness checks: {e}"),
    }
    let config = root.join(AppConfig::FILE_NAME);
    if config.is_file() {
        sources.push(config);
    }
    sources
}

/// Write `index.html` and the client script when stale (or always with
/// `force`).
pub fn do_build(config: &AppConfig, sources: &[PathBuf], force: bool) -> Result<BuildReport, WebError> {
    let mut report = BuildReport::default();

    let index = config.index_path();
    if force || needs_build(&index, sources)? {
        write_markup(&index, &render_index(config, None)?)?;
        log::info!("built {}", index.display());
        report.index = Some(index);
    }

    let script = config.script_path();
    if force || needs_build(&script, sources)? {
        write_markup(&script, &client_script(config)?)?;
        log::info!("built {}", script.display());
        report.script = Some(script);
    }

    if report.is_noop() {
        log::debug!("build outputs are up to date");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{}-{}-{}", prefix, std::process::id(), ts));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    fn set_mtime(path: &Path, secs_ago: u64) {
        let file = fs::File::options().write(true).open(path).expect("open for mtime");
        file.set_modified(SystemTime::now() - Duration::from_secs(secs_ago))
            .expect("set mtime");
    }

    #[test]
    fn test_missing_target_needs_build() {
        let root = unique_temp_dir("treeweb-build-missing");
        assert!(needs_build(&root.join("nope.html"), &[]).unwrap());
    }

    #[test]
    fn test_target_older_than_source_needs_build() {
        let root = unique_temp_dir("treeweb-build-stale");
        let target = root.join("index.html");
        let source = root.join("treeweb.json");
        fs::write(&target, "old").unwrap();
        fs::write(&source, "{}").unwrap();

        set_mtime(&target, 120);
        set_mtime(&source, 60);
        assert!(needs_build(&target, &[source.clone()]).unwrap());

        set_mtime(&source, 600);
        assert!(!needs_build(&target, &[source]).unwrap());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let root = unique_temp_dir("treeweb-build-nosource");
        let target = root.join("index.html");
        fs::write(&target, "x").unwrap();
        let err = needs_build(&target, &[root.join("gone.json")]).unwrap_err();
        assert!(matches!(err, WebError::MissingSource(_)));
    }

    #[test]
    fn test_do_build_writes_then_skips() {
        let root = unique_temp_dir("treeweb-build-run");
        let config = AppConfig::minimal(&root);
        let source = root.join("treeweb.json");
        fs::write(&source, "{}").unwrap();
        set_mtime(&source, 60);
        let sources = vec![source];

        let first = do_build(&config, &sources, false).unwrap();
        assert_eq!(first.index.as_deref(), Some(config.index_path().as_path()));
        assert_eq!(first.script.as_deref(), Some(config.script_path().as_path()));

        let html = fs::read_to_string(config.index_path()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>\n<html"));
        assert!(html.ends_with("</html>\n"));
        let js = fs::read_to_string(config.script_path()).unwrap();
        assert!(js.starts_with("window.__TREEWEB__ = "));

        let second = do_build(&config, &sources, false).unwrap();
        assert!(second.is_noop());

        let forced = do_build(&config, &sources, true).unwrap();
        assert!(forced.index.is_some() && forced.script.is_some());
    }

    #[test]
    fn test_unwritable_output_dir_is_a_markup_io_error() {
        let root = unique_temp_dir("treeweb-build-blocked");
        let config = AppConfig::minimal(&root);
        fs::write(&config.html_dir, "a file where the output dir should be").unwrap();

        let err = do_build(&config, &[], true).unwrap_err();
        assert!(
            matches!(err, WebError::Markup(treeweb_core::MarkupError::Io { ref path, .. }) if *path == config.html_dir),
            "{err}"
        );
    }
}
