//! Clipboard copy with a file fallback.
//!
//! The prompt is piped into the first platform clipboard command that
//! succeeds. When none does, it is written to a file the user can open and
//! copy from by hand.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use schoolprompt_shared::{Result, SchoolPromptError};

/// Fallback file name inside the configured directory.
const FALLBACK_FILE_NAME: &str = "school-prompt.md";

const COPY_FAILED_MESSAGE: &str =
    "Copy failed. Please select and copy manually. / コピー失敗。手動でコピーしてください。";

/// A clipboard command that reads the text on stdin.
#[derive(Debug, Clone, Copy)]
struct ClipboardTool {
    program: &'static str,
    args: &'static [&'static str],
}

#[cfg(target_os = "macos")]
const PLATFORM_TOOLS: &[ClipboardTool] = &[ClipboardTool {
    program: "pbcopy",
    args: &[],
}];

#[cfg(windows)]
const PLATFORM_TOOLS: &[ClipboardTool] = &[ClipboardTool {
    program: "clip",
    args: &[],
}];

#[cfg(all(unix, not(target_os = "macos")))]
const PLATFORM_TOOLS: &[ClipboardTool] = &[
    ClipboardTool {
        program: "wl-copy",
        args: &[],
    },
    ClipboardTool {
        program: "xclip",
        args: &["-selection", "clipboard"],
    },
    ClipboardTool {
        program: "xsel",
        args: &["--clipboard", "--input"],
    },
];

#[cfg(not(any(unix, windows)))]
const PLATFORM_TOOLS: &[ClipboardTool] = &[];

/// Where the text ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CopyOutcome {
    /// Copied by the named clipboard command.
    Clipboard(&'static str),
    /// No clipboard available; written to this file instead.
    FallbackFile(PathBuf),
}

impl fmt::Display for CopyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clipboard(tool) => write!(f, "Copied! / コピーしました ({tool})"),
            Self::FallbackFile(path) => write!(
                f,
                "Clipboard unavailable. Open {} and copy manually. / \
                 クリップボードを使用できません。ファイルから手動でコピーしてください。",
                path.display()
            ),
        }
    }
}

/// Copy `text` to the system clipboard, falling back to a file in `fallback_dir`.
pub(crate) fn copy_to_clipboard(text: &str, fallback_dir: &Path) -> Result<CopyOutcome> {
    copy_with(PLATFORM_TOOLS, text, fallback_dir)
}

fn copy_with(tools: &[ClipboardTool], text: &str, fallback_dir: &Path) -> Result<CopyOutcome> {
    for tool in tools {
        match pipe_to(tool, text) {
            Ok(()) => {
                info!(tool = tool.program, bytes = text.len(), "copied to clipboard");
                return Ok(CopyOutcome::Clipboard(tool.program));
            }
            Err(e) => debug!(tool = tool.program, error = %e, "clipboard command failed"),
        }
    }

    warn!("no clipboard command succeeded, writing fallback file");
    let path = write_fallback(text, fallback_dir)
        .map_err(|e| SchoolPromptError::Clipboard(format!("{COPY_FAILED_MESSAGE} ({e})")))?;
    Ok(CopyOutcome::FallbackFile(path))
}

fn pipe_to(tool: &ClipboardTool, text: &str) -> std::io::Result<()> {
    let mut child = Command::new(tool.program)
        .args(tool.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // The child is always reaped, even when the write fails.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Err(std::io::Error::other("failed to capture stdin")),
    };

    let status = child.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("{} exited with {status}", tool.program)))
    }
}

fn write_fallback(text: &str, dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(FALLBACK_FILE_NAME);
    std::fs::write(&path, text)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sp-clipboard-{name}-{}", std::process::id()))
    }

    #[test]
    fn no_tools_writes_fallback_file() {
        let dir = temp_dir("none");
        let outcome = copy_with(&[], "# Prompt\n", &dir).unwrap();

        let path = dir.join(FALLBACK_FILE_NAME);
        assert_eq!(outcome, CopyOutcome::FallbackFile(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Prompt\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_tool_falls_through_to_file() {
        let dir = temp_dir("missing");
        let tools = [ClipboardTool {
            program: "schoolprompt-no-such-clipboard-tool",
            args: &[],
        }];

        let outcome = copy_with(&tools, "text", &dir).unwrap();
        assert!(matches!(outcome, CopyOutcome::FallbackFile(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn pipe_reports_exit_status() {
        let cat = ClipboardTool {
            program: "cat",
            args: &[],
        };
        assert!(pipe_to(&cat, "text").is_ok());

        let fail = ClipboardTool {
            program: "false",
            args: &[],
        };
        assert!(pipe_to(&fail, "text").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn tool_that_stops_reading_falls_through() {
        let dir = temp_dir("closed");
        // Exits without reading, so writing a large prompt hits a closed pipe.
        let tools = [ClipboardTool {
            program: "true",
            args: &[],
        }];
        let text = "x".repeat(1 << 20);

        assert!(pipe_to(&tools[0], &text).is_err());
        let outcome = copy_with(&tools, &text, &dir).unwrap();
        assert!(matches!(outcome, CopyOutcome::FallbackFile(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_fallback_is_clipboard_error() {
        let dir = temp_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        // A regular file where the fallback directory should be.
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = copy_with(&[], "text", &blocker).unwrap_err();
        assert!(matches!(err, SchoolPromptError::Clipboard(_)));
        assert!(err.to_string().contains("Copy failed"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn outcome_messages() {
        assert!(CopyOutcome::Clipboard("pbcopy").to_string().contains("pbcopy"));
        let fallback = CopyOutcome::FallbackFile(PathBuf::from("/tmp/school-prompt.md"));
        assert!(fallback.to_string().contains("/tmp/school-prompt.md"));
    }
}
