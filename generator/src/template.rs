//! Loading and rendering of the sweep templates.
//!
//! File templates share one environment whose loader resolves paths against
//! the configured search path. The inline name pattern gets an environment of
//! its own. Both treat undefined variables as errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use models::config::TemplateConfig;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

const INLINE_TEMPLATE: &str = "<inline>";

pub struct TemplateLoader {
    env: Arc<Environment<'static>>,
}

impl TemplateLoader {
    pub fn new(config: &TemplateConfig) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(config.trim_blocks);
        env.set_lstrip_blocks(config.lstrip_blocks);

        let search_path = config.search_path.clone();
        env.set_loader(move |name| read_source(&search_path, name));

        Self { env: Arc::new(env) }
    }

    /// Loads and compiles the template at `path`. Missing files and syntax
    /// errors are reported here rather than on first render.
    pub fn load(&self, path: &str) -> Result<CompiledTemplate> {
        self.env.get_template(path)?;
        debug!(template = path, "loaded template");

        Ok(CompiledTemplate {
            env: Arc::clone(&self.env),
            name: path.to_string(),
        })
    }

    /// Compiles a template given as a string, such as the run name pattern.
    pub fn inline(source: &str) -> Result<CompiledTemplate> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template_owned(INLINE_TEMPLATE, source.to_string())?;

        Ok(CompiledTemplate {
            env: Arc::new(env),
            name: INLINE_TEMPLATE.to_string(),
        })
    }
}

/// Splits a template name on `/` into a path below `search_path`. Empty and
/// `.` segments are dropped, so absolute names stay inside the search path;
/// `..` or a segment holding a platform separator yields `None`.
fn resolve(search_path: &Path, name: &str) -> Option<PathBuf> {
    let mut path = search_path.to_path_buf();
    for segment in name.split('/') {
        if segment == ".." || segment.chars().any(std::path::is_separator) {
            return None;
        }
        if !segment.is_empty() && segment != "." {
            path.push(segment);
        }
    }
    Some(path)
}

fn read_source(
    search_path: &Path,
    name: &str,
) -> std::result::Result<Option<String>, minijinja::Error> {
    let Some(path) = resolve(search_path, name) else {
        return Ok(None);
    };
    match fs::read_to_string(&path) {
        Ok(source) => Ok(Some(source)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot read template {}", path.display()),
        )
        .with_source(err)),
    }
}

/// A compiled template that can be rendered any number of times.
#[derive(Clone)]
pub struct CompiledTemplate {
    env: Arc<Environment<'static>>,
    name: String,
}

impl CompiledTemplate {
    pub fn render<S: Serialize>(&self, ctx: &S) -> Result<String> {
        Ok(self.env.get_template(&self.name)?.render(ctx)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use models::{Mesh, RunProperties};
    use tempfile::TempDir;

    fn loader_in(dir: &TempDir) -> TemplateLoader {
        TemplateLoader::new(&TemplateConfig {
            search_path: dir.path().to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn inline_pattern_renders_run_properties() {
        let tmpl = TemplateLoader::inline("m_{{ mesh }}_n_{{ nodes }}").unwrap();
        let props = RunProperties::new(Mesh::Dynamic, 7, 12);

        assert_eq!(tmpl.render(&props).unwrap(), "m_dynamic_n_7");
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let tmpl = TemplateLoader::inline("{{ name }}").unwrap();
        let props = RunProperties::new(Mesh::Static, 1, 12);

        match tmpl.render(&props) {
            Err(Error::Template(err)) => assert_eq!(err.kind(), ErrorKind::UndefinedError),
            other => panic!("expected undefined error, got {:?}", other),
        }
    }

    #[test]
    fn inline_syntax_error_fails_to_compile() {
        assert!(matches!(
            TemplateLoader::inline("{{ mesh "),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn file_template_resolves_against_search_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tmpl")).unwrap();
        fs::write(dir.path().join("tmpl/run.cfg"), "ppn = {{ ppn }}\n").unwrap();

        let tmpl = loader_in(&dir).load("tmpl/run.cfg").unwrap();
        let props = RunProperties::new(Mesh::Static, 2, 16);

        assert_eq!(tmpl.name(), "tmpl/run.cfg");
        assert_eq!(tmpl.render(&props).unwrap(), "ppn = 16");
    }

    #[test]
    fn names_resolve_below_search_path() {
        let base = Path::new("/srv/runs");

        assert_eq!(
            resolve(base, "tmpl/run.cfg"),
            Some(PathBuf::from("/srv/runs/tmpl/run.cfg"))
        );
        assert_eq!(
            resolve(base, "./tmpl//run.cfg"),
            Some(PathBuf::from("/srv/runs/tmpl/run.cfg"))
        );
        assert_eq!(
            resolve(base, "/etc/run.cfg"),
            Some(PathBuf::from("/srv/runs/etc/run.cfg"))
        );
        assert_eq!(resolve(base, "../run.cfg"), None);
        assert_eq!(resolve(base, "tmpl/../../run.cfg"), None);
    }

    #[test]
    fn escaping_search_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(dir.path().join("outside.cfg"), "{{ ppn }}").unwrap();

        let loader = TemplateLoader::new(&TemplateConfig {
            search_path: inner,
            ..Default::default()
        });

        match loader.load("../outside.cfg") {
            Err(Error::Template(err)) => assert_eq!(err.kind(), ErrorKind::TemplateNotFound),
            Ok(_) => panic!("expected template outside the search path to be rejected"),
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn absolute_name_is_read_from_search_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tmpl")).unwrap();
        fs::write(dir.path().join("tmpl/run.pbs"), "nodes={{ nodes }}").unwrap();

        let tmpl = loader_in(&dir).load("/tmpl/run.pbs").unwrap();

        assert_eq!(
            tmpl.render(&RunProperties::new(Mesh::Static, 3, 12)).unwrap(),
            "nodes=3"
        );
    }

    #[test]
    fn file_syntax_error_fails_on_load() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.cfg"), "{% for x in %}{% endfor %}").unwrap();

        match loader_in(&dir).load("broken.cfg") {
            Err(Error::Template(err)) => assert_eq!(err.kind(), ErrorKind::SyntaxError),
            Ok(_) => panic!("expected broken template to fail"),
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_file_template_is_not_found() {
        let dir = TempDir::new().unwrap();

        match loader_in(&dir).load("nope.cfg") {
            Err(Error::Template(err)) => assert_eq!(err.kind(), ErrorKind::TemplateNotFound),
            Ok(_) => panic!("expected missing template to fail"),
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn trim_blocks_and_loop_controls() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hosts.pbs"),
            "{% for n in range(nodes) %}\n{% if n == 3 %}{% break %}{% endif %}node{{ n }}\n{% endfor %}\n",
        )
        .unwrap();

        let tmpl = loader_in(&dir).load("hosts.pbs").unwrap();
        let props = RunProperties::new(Mesh::Static, 5, 12);

        assert_eq!(tmpl.render(&props).unwrap(), "node0\nnode1\nnode2\n");
    }
}
