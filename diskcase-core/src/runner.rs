//! Synchronous subprocess capture with a bounded wait.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a child that has not exited yet is re-polled.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs an external program and captures its trimmed stdout.
///
/// The program is spawned directly (argv vector, no shell) with the given
/// working directory. Stdout and stderr are piped and drained on background
/// threads so the child can never stall on a full pipe; stderr is discarded.
/// The exit status is never inspected - produced stdout is the only signal
/// callers get.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Runs `program` with `args` in `working_dir` and returns its stdout
    /// with surrounding whitespace and line terminators trimmed.
    ///
    /// Returns `None` when the program cannot be spawned, produced no
    /// stdout, or did not exit within the timeout (the child is killed and
    /// reaped in that case).
    pub fn run(&self, program: &str, args: &[&str], working_dir: &Path) -> Option<String> {
        let mut child = match Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                log::debug!("Failed to spawn {}: {}", program, e);
                return None;
            }
        };

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        if !self.wait_with_timeout(&mut child) {
            log::debug!(
                "{} {} did not exit within {:?}, killing it",
                program,
                args.join(" "),
                self.timeout
            );
            let _ = child.kill();
            let _ = child.wait();
            // readers hit EOF once the reaped child's pipes close
            join_reader(stdout);
            join_reader(stderr);
            return None;
        }

        join_reader(stderr);
        let output = join_reader(stdout)?;
        let trimmed = output.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Polls the child until it exits or the timeout elapses.
    fn wait_with_timeout(&self, child: &mut Child) -> bool {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return true,
                Ok(None) => {}
                Err(e) => {
                    log::debug!("Failed to poll child: {}", e);
                    return false;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> Option<String> {
    handle?.join().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_returns_none() {
        let runner = CommandRunner::default();
        let tmp = tempfile::tempdir().unwrap();
        let out = runner.run("diskcase-no-such-tool-470f", &["--version"], tmp.path());
        assert_eq!(out, None);
    }

    #[cfg(unix)]
    #[test]
    fn captures_trimmed_stdout() {
        let runner = CommandRunner::default();
        let tmp = tempfile::tempdir().unwrap();
        let out = runner.run("echo", &["  hello  "], tmp.path());
        assert_eq!(out.as_deref(), Some("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn empty_stdout_reads_as_none() {
        let runner = CommandRunner::default();
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(runner.run("true", &[], tmp.path()), None);
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_not_inspected() {
        let runner = CommandRunner::default();
        let tmp = tempfile::tempdir().unwrap();
        let out = runner.run("sh", &["-c", "echo out; exit 3"], tmp.path());
        assert_eq!(out.as_deref(), Some("out"));
    }

    #[cfg(unix)]
    #[test]
    fn stderr_is_discarded() {
        let runner = CommandRunner::default();
        let tmp = tempfile::tempdir().unwrap();
        let out = runner.run("sh", &["-c", "echo noise >&2"], tmp.path());
        assert_eq!(out, None);
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_the_given_working_directory() {
        let runner = CommandRunner::default();
        let tmp = tempfile::tempdir().unwrap();
        let out = runner.run("sh", &["-c", "pwd"], tmp.path()).unwrap();
        let reported = std::fs::canonicalize(out).unwrap();
        let expected = std::fs::canonicalize(tmp.path()).unwrap();
        assert_eq!(reported, expected);
    }

    #[cfg(unix)]
    #[test]
    fn hung_child_is_killed_at_the_deadline() {
        let runner = CommandRunner::new(Duration::from_millis(200));
        let tmp = tempfile::tempdir().unwrap();
        let started = Instant::now();
        let out = runner.run("sleep", &["5"], tmp.path());
        assert_eq!(out, None);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
