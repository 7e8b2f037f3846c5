//! Activation script generation.
//!
//! The script is meant to be sourced. It exports one variable per non-`PATH`
//! env entry, prepends every `PATH` entry in manifest order (so the last tool
//! declared wins lookups), decorates the prompt, and defines a `deactivate`
//! function that undoes all of it.

use indexmap::IndexSet;
use std::path::Path;
use tracing::debug;

use crate::manifest::{PATH_KEY, ToolSpec};
use crate::template::{Bindings, UnknownVariablePolicy, expand};
use crate::{Error, Result};

/// Escape text for use inside a double-quoted shell string.
fn shell_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render the activation script.
///
/// `env_dir` should be absolute; it becomes `TOOLENV_DIR`. Env values are
/// expanded with only `version` bound, after escaping any `"` in the raw
/// template.
///
/// # Errors
///
/// Propagates template errors from env values.
pub fn render(
    env_name: &str,
    env_dir: &Path,
    tools: &[ToolSpec],
    policy: UnknownVariablePolicy,
) -> Result<String> {
    let env_name = shell_escape(env_name);
    let mut script = String::new();

    script.push_str(&format!(
        "# This file must be used with \"source {env_name}/bin/activate\"\n"
    ));
    script.push_str("# It modifies the current shell environment.\n");
    script.push_str(&format!(
        "export TOOLENV_DIR=\"{}\"\n",
        shell_escape(&env_dir.to_string_lossy())
    ));
    script.push_str("export PREVIOUS_PATH=\"$PATH\"\n");

    let mut exported = IndexSet::new();
    for tool in tools {
        let bindings = Bindings::for_env(&tool.version);
        for (key, raw) in &tool.env {
            let value = expand(&raw.replace('"', "\\\""), &bindings, policy)?;

            if key == PATH_KEY {
                script.push_str(&format!("export PATH=\"$TOOLENV_DIR/{value}:$PATH\"\n"));
            } else {
                script.push_str(&format!("export {key}=\"$TOOLENV_DIR/{value}\"\n"));
                exported.insert(key.as_str());
            }
        }
    }

    script.push_str("export OLD_PS1=\"$PS1\"\n");
    script.push_str(&format!("export PS1=\"(toolenv:{env_name}) $PS1\"\n"));
    script.push_str("deactivate() {\n");
    script.push_str("\texport PS1=\"$OLD_PS1\"\n");
    script.push_str("\tunset OLD_PS1\n");
    for key in &exported {
        script.push_str(&format!("\tunset {key}\n"));
    }
    script.push_str("\texport PATH=\"$PREVIOUS_PATH\"\n");
    script.push_str("\tunset PREVIOUS_PATH\n");
    script.push_str("\tunset TOOLENV_DIR\n");
    script.push_str("\tunset -f deactivate\n");
    script.push_str("}\n");

    debug!(variables = exported.len(), "Rendered activation script");
    Ok(script)
}

/// Write the script to `path`, executable on unix.
///
/// # Errors
///
/// Returns [`Error::WriteFailed`] on IO failure.
pub fn write(path: &Path, contents: &str) -> Result<()> {
    let write_failed = |source| Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(path, contents).map_err(write_failed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path).map_err(write_failed)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).map_err(write_failed)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn tool(name: &str, version: &str, env: &[(&str, &str)]) -> ToolSpec {
        ToolSpec {
            name: name.to_string(),
            version: version.to_string(),
            url_template: String::new(),
            env: env
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<IndexMap<_, _>>(),
            normalization: None,
        }
    }

    fn render_default(tools: &[ToolSpec]) -> String {
        render(
            "env",
            Path::new("/work/env"),
            tools,
            UnknownVariablePolicy::Empty,
        )
        .unwrap()
    }

    #[test]
    fn test_header_and_bookkeeping() {
        let script = render_default(&[]);
        assert!(script.starts_with("# This file must be used with \"source env/bin/activate\"\n"));
        assert!(script.contains("export TOOLENV_DIR=\"/work/env\"\n"));
        assert!(script.contains("export PREVIOUS_PATH=\"$PATH\"\n"));
        assert!(script.contains("export PS1=\"(toolenv:env) $PS1\"\n"));
        assert!(script.ends_with("\tunset -f deactivate\n}\n"));
    }

    #[test]
    fn test_env_values_expand_version() {
        let script = render_default(&[tool(
            "node",
            "20.11.0",
            &[("PATH", "storage/node@{{version}}/bin"), ("NODE_HOME", "storage/node@{{version}}")],
        )]);

        assert!(script.contains("export PATH=\"$TOOLENV_DIR/storage/node@20.11.0/bin:$PATH\"\n"));
        assert!(script.contains("export NODE_HOME=\"$TOOLENV_DIR/storage/node@20.11.0\"\n"));
        assert!(script.contains("\tunset NODE_HOME\n"));
        assert!(!script.contains("\tunset PATH\n"));
    }

    #[test]
    fn test_later_tool_path_wins() {
        let script = render_default(&[
            tool("a", "1", &[("PATH", "storage/a@{{version}}/bin")]),
            tool("b", "2", &[("PATH", "storage/b@{{version}}/bin")]),
        ]);

        let first = script.find("storage/a@1/bin").unwrap();
        let second = script.find("storage/b@2/bin").unwrap();
        // b wraps the PATH that already has a in front, so b ends up first
        assert!(first < second);
    }

    #[test]
    fn test_deactivate_unsets_each_variable_once() {
        let script = render_default(&[
            tool("a", "1", &[("SHARED_HOME", "storage/a@1")]),
            tool("b", "2", &[("SHARED_HOME", "storage/b@2"), ("B_HOME", "storage/b@2")]),
        ]);

        assert_eq!(script.matches("\tunset SHARED_HOME\n").count(), 1);
        assert_eq!(script.matches("\tunset B_HOME\n").count(), 1);

        let restore_path = script.find("\texport PATH=\"$PREVIOUS_PATH\"").unwrap();
        let unset_shared = script.find("\tunset SHARED_HOME").unwrap();
        assert!(unset_shared < restore_path);
    }

    #[test]
    fn test_quotes_in_values_are_escaped() {
        let script = render_default(&[tool("q", "1", &[("ODD", "dir \"{{version}}\"")])]);
        assert!(script.contains("export ODD=\"$TOOLENV_DIR/dir \\\"1\\\"\"\n"));
    }

    #[test]
    fn test_env_dir_is_escaped() {
        let script = render(
            "env",
            Path::new("/tmp/my $dir"),
            &[],
            UnknownVariablePolicy::Empty,
        )
        .unwrap();
        assert!(script.contains("export TOOLENV_DIR=\"/tmp/my \\$dir\"\n"));
    }

    #[test]
    fn test_template_errors_propagate() {
        let result = render(
            "env",
            Path::new("/work/env"),
            &[tool("bad", "1", &[("X", "{{version")])],
            UnknownVariablePolicy::Empty,
        );
        assert!(matches!(result, Err(Error::TemplateMalformed { .. })));

        let result = render(
            "env",
            Path::new("/work/env"),
            &[tool("bad", "1", &[("X", "{{os}}")])],
            UnknownVariablePolicy::Error,
        );
        assert!(matches!(result, Err(Error::TemplateExpansionFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("activate");
        write(&path, "echo hi\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "echo hi\n");
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("missing").join("activate");
        assert!(matches!(
            write(&path, ""),
            Err(Error::WriteFailed { .. })
        ));
    }
}
