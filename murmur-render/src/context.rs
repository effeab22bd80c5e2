//! Scaffold context: the `team/app/env` triple exposed to templates.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::RenderError;

/// Template directory under the data dir.
pub const TEMPLATE_DIR: &str = "tmpl";

/// Template filename suffix; the stem is the app name.
pub const TEMPLATE_SUFFIX: &str = ".jsonnet.tmpl";

/// Variables available to scaffold templates as `{{ TEAM }}`, `{{ APP }}`,
/// and `{{ ENV }}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaffoldScope {
    #[serde(rename = "TEAM")]
    pub team: String,
    #[serde(rename = "APP")]
    pub app: String,
    #[serde(rename = "ENV")]
    pub env: String,
}

impl FromStr for ScaffoldScope {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(3, '/').collect();
        match parts.as_slice() {
            [team, app, env] if !team.is_empty() && !app.is_empty() && !env.is_empty() => {
                Ok(Self {
                    team: (*team).to_string(),
                    app: (*app).to_string(),
                    env: (*env).to_string(),
                })
            }
            _ => Err(RenderError::InvalidScope(s.to_string())),
        }
    }
}

impl ScaffoldScope {
    /// `<datadir>/tmpl/<app>.jsonnet.tmpl`
    pub fn template_path(&self, datadir: &Path) -> PathBuf {
        datadir
            .join(TEMPLATE_DIR)
            .join(format!("{}{TEMPLATE_SUFFIX}", self.app))
    }

    /// `<datadir>/<team>/<app>/<env>`
    pub fn output_dir(&self, datadir: &Path) -> PathBuf {
        datadir.join(&self.team).join(&self.app).join(&self.env)
    }

    /// `<datadir>/<team>/<app>/<env>/<app>.jsonnet`
    pub fn output_path(&self, datadir: &Path) -> PathBuf {
        self.output_dir(datadir).join(format!("{}.jsonnet", self.app))
    }
}
