use edir_core::prelude::*;
use log::debug;
use std::env;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

const EDITOR_VARS: [&str; 3] = ["EDIR_EDITOR", "VISUAL", "EDITOR"];
const FALLBACK_EDITOR: &str = "vi";

/// The user's editor, run as a child process on the listing file.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    program: String,
    args: Vec<String>,
}

impl ExternalEditor {
    pub fn from_env() -> Result<Self> {
        let command = EDITOR_VARS
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        Self::parse(&command)
    }

    pub fn parse(command: &str) -> Result<Self> {
        let mut words = shlex::split(command)
            .filter(|words| !words.is_empty())
            .ok_or_else(|| CoreError::Editor(format!("cannot parse editor command {command:?}")))?;
        let program = words.remove(0);
        Ok(Self { program, args: words })
    }
}

/// Editors need the terminal even when our stdin carries a path list.
fn terminal_stdin() -> Stdio {
    File::open("/dev/tty").map(Stdio::from).unwrap_or_else(|_| Stdio::inherit())
}

impl Editor for ExternalEditor {
    fn edit(&self, path: &Path) -> Result<()> {
        debug!("running {} {:?} on {}", self.program, self.args, path.display());
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(terminal_stdin())
            .status()
            .map_err(|err| CoreError::Editor(format!("{}: {err}", self.program)))?;
        if status.success() {
            Ok(())
        } else {
            Err(CoreError::Editor(format!("{} exited with {status}", self.program)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_split_like_a_shell() {
        let editor = ExternalEditor::parse("code --wait 'my dir'").unwrap();
        assert_eq!(editor.program, "code");
        assert_eq!(editor.args, ["--wait", "my dir"]);
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(ExternalEditor::parse("  ").is_err());
    }

    #[test]
    fn failing_editor_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edir.sh");
        std::fs::write(&path, "").unwrap();
        let editor = ExternalEditor::parse("false").unwrap();
        assert!(matches!(editor.edit(&path), Err(CoreError::Editor(_))));
    }
}
