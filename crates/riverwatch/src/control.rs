//! Compositor control seam.
//!
//! Consumers request compositor-side mutations by shelling out to
//! `riverctl` (or whatever `control.riverctl` is configured to). This is
//! fire-and-forget from the protocol client's point of view: failures are
//! logged and reported as an absent result, never as an error, and nothing
//! here touches client state. Any resulting compositor change comes back
//! through ordinary protocol events.

use std::ffi::OsStr;
use std::process::Command;

use riverwatch_core::ControlConfig;
use tracing::{debug, warn};

use crate::tags::MAX_TAG;

/// Handle for issuing compositor control commands.
#[derive(Debug, Clone)]
pub struct CommandSink {
    riverctl: String,
}

impl CommandSink {
    /// Build a sink from the control section of the configuration.
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            riverctl: config.riverctl.clone(),
        }
    }

    /// Toggle tag `tag` in the focused tag set of the focused output.
    ///
    /// Out-of-range tags (> 31) are logged and ignored. The command output
    /// is discarded; the state change, if any, arrives as a
    /// `focused_tags` protocol event.
    pub fn toggle_tag(&self, tag: u8) {
        if tag > MAX_TAG {
            warn!("ignoring toggle of out-of-range tag {}", tag);
            return;
        }
        let mask = (1u32 << tag).to_string();
        self.run_external_command(&self.riverctl, ["toggle-focused-tags", mask.as_str()]);
    }

    /// Run an arbitrary external command, returning its stdout on success.
    ///
    /// Returns `None` if the command could not be spawned or exited
    /// non-zero; stderr is logged, the exact exit code is discarded.
    /// Trailing whitespace is trimmed from the captured stdout.
    pub fn run_external_command<I, S>(&self, name: &str, args: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = match Command::new(name).args(args).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("failed to run {}: {}", name, e);
                return None;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} failed: {}", name, stderr.trim_end());
            return None;
        }

        debug!("{} succeeded", name);
        Some(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> CommandSink {
        CommandSink::new(&ControlConfig::default())
    }

    #[test]
    fn captures_stdout_on_success() {
        let out = sink().run_external_command("echo", ["hello"]);
        assert_eq!(out.as_deref(), Some("hello"));
    }

    #[test]
    fn nonzero_exit_yields_none() {
        let out = sink().run_external_command("sh", ["-c", "echo oops >&2; exit 3"]);
        assert_eq!(out, None);
    }

    #[test]
    fn missing_binary_yields_none() {
        let out = sink().run_external_command("riverwatch-no-such-binary", ["x"]);
        assert_eq!(out, None);
    }

    #[test]
    fn toggle_tag_rejects_out_of_range_without_running() {
        // Configured command would fail loudly if invoked; an out-of-range
        // tag must short-circuit before the spawn.
        let sink = CommandSink::new(&ControlConfig {
            riverctl: "riverwatch-no-such-binary".to_string(),
        });
        sink.toggle_tag(32);
    }

    #[test]
    fn toggle_tag_builds_a_bitmask_command() {
        // `true` swallows the arguments and succeeds for any tag.
        let sink = CommandSink::new(&ControlConfig {
            riverctl: "true".to_string(),
        });
        sink.toggle_tag(0);
        sink.toggle_tag(31);
    }
}
