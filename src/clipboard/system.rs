//! The operating system clipboard.

use crate::error::{GridError, Result};

/// Reads and writes the system clipboard.
///
/// On Linux the command-line tools are tried first since they work from inside a terminal
/// session; elsewhere `arboard` is used directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        #[cfg(target_os = "linux")]
        {
            use std::io::Write;
            use std::process::{Command, Stdio};

            let commands: [(&str, &[&str]); 3] = [
                ("wl-copy", &[]),
                ("xclip", &["-selection", "clipboard"]),
                ("xsel", &["--clipboard", "--input"]),
            ];

            for (cmd, args) in commands {
                let Ok(mut child) = Command::new(cmd)
                    .args(args)
                    .stdin(Stdio::piped())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                else {
                    continue;
                };
                if let Some(mut stdin) = child.stdin.take() {
                    if stdin.write_all(text.as_bytes()).is_ok() {
                        drop(stdin);
                        if child.wait().map(|s| s.success()).unwrap_or(false) {
                            return Ok(());
                        }
                    }
                }
            }
        }

        let mut clipboard = arboard::Clipboard::new().map_err(|e| GridError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| GridError::Clipboard(e.to_string()))
    }

    pub fn get_text(&self) -> Result<String> {
        #[cfg(target_os = "linux")]
        {
            use std::process::Command;

            let commands: [(&str, &[&str]); 3] = [
                ("wl-paste", &["--no-newline"]),
                ("xclip", &["-selection", "clipboard", "-o"]),
                ("xsel", &["--clipboard", "--output"]),
            ];

            for (cmd, args) in commands {
                if let Ok(output) = Command::new(cmd).args(args).output() {
                    if output.status.success() {
                        return String::from_utf8(output.stdout)
                            .map_err(|_| GridError::Clipboard("clipboard contains invalid UTF-8".into()));
                    }
                }
            }
        }

        let mut clipboard = arboard::Clipboard::new().map_err(|e| GridError::Clipboard(e.to_string()))?;
        clipboard.get_text().map_err(|e| GridError::Clipboard(e.to_string()))
    }
}
