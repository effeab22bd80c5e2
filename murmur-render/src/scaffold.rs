//! Tera scaffolding: creates a new `<app>.jsonnet` from the app's template.
//!
//! | Input                                  | Output                                   |
//! |----------------------------------------|------------------------------------------|
//! | `<datadir>/tmpl/<app>.jsonnet.tmpl`    | `<datadir>/<team>/<app>/<env>/<app>.jsonnet` |

use std::path::{Path, PathBuf};

use tera::{Context, Tera};

use crate::context::ScaffoldScope;
use crate::error::{io_err, RenderError};

/// Render the template for `scope` into a string without touching disk.
pub fn render_scaffold(datadir: &Path, scope: &ScaffoldScope) -> Result<String, RenderError> {
    let template_path = scope.template_path(datadir);
    if !template_path.exists() {
        return Err(RenderError::TemplateNotFound {
            app: scope.app.clone(),
            path: template_path,
        });
    }
    tracing::debug!("parsing template {}", template_path.display());
    let source = std::fs::read_to_string(&template_path).map_err(|e| io_err(&template_path, e))?;

    let name = template_path.to_string_lossy().replace('\\', "/");
    let mut tera = Tera::default();
    tera.add_raw_template(&name, &source)?;
    let ctx = Context::from_serialize(scope)?;
    Ok(tera.render(&name, &ctx)?)
}

/// Create `<datadir>/<team>/<app>/<env>/<app>.jsonnet` from the app template.
///
/// Directories are created as needed. Refuses to overwrite an existing file
/// with `RenderError::AlreadyExists`.
pub fn create_at(datadir: &Path, scope: &ScaffoldScope) -> Result<PathBuf, RenderError> {
    let dest = scope.output_path(datadir);
    if dest.exists() {
        return Err(RenderError::AlreadyExists { path: dest });
    }

    let rendered = render_scaffold(datadir, scope)?;

    let dir = scope.output_dir(datadir);
    tracing::info!("creating directory {}", dir.display());
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

    tracing::info!("creating file {}", dest.display());
    std::fs::write(&dest, rendered).map_err(|e| io_err(&dest, e))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_template(datadir: &Path, app: &str, body: &str) {
        let dir = datadir.join("tmpl");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{app}.jsonnet.tmpl")), body).unwrap();
    }

    #[test]
    fn renders_scope_variables() {
        let tmp = TempDir::new().unwrap();
        write_template(
            tmp.path(),
            "billing",
            "{ team: '{{ TEAM }}', app: '{{ APP }}', env: '{{ ENV }}' }\n",
        );
        let scope: ScaffoldScope = "ops/billing/prod".parse().unwrap();
        let out = render_scaffold(tmp.path(), &scope).unwrap();
        assert_eq!(out.trim_end(), "{ team: 'ops', app: 'billing', env: 'prod' }");
    }

    #[test]
    fn missing_template_is_reported() {
        let tmp = TempDir::new().unwrap();
        let scope: ScaffoldScope = "ops/ghost/prod".parse().unwrap();
        let err = render_scaffold(tmp.path(), &scope).unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound { .. }), "got: {err}");
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        write_template(tmp.path(), "billing", "{}\n");
        let scope: ScaffoldScope = "ops/billing/prod".parse().unwrap();

        let path = create_at(tmp.path(), &scope).unwrap();
        assert!(path.ends_with("ops/billing/prod/billing.jsonnet"));

        let err = create_at(tmp.path(), &scope).unwrap_err();
        assert!(matches!(err, RenderError::AlreadyExists { .. }), "got: {err}");
    }
}
