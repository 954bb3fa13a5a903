//! Background command jobs for long-running menu actions.
//!
//! A handler that shells out must never block the input loop, so the child
//! runs under a worker thread: one reader thread streams sanitized stdout
//! lines into a channel, while the worker polls the child and the cancel
//! flag. The controller drains the channel between input events and feeds
//! the lines into the content buffer as incremental progress.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use crate::error::CoreError;
use crate::log_debug;

const JOB_CHANNEL_CAPACITY: usize = 128;
const CHILD_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobMessage {
    /// Incremental stdout, ANSI-stripped.
    Lines(Vec<String>),
    Finished { code: i32 },
    Failed(String),
    Canceled,
}

#[derive(Debug)]
pub struct CommandJob {
    pub label: String,
    rx: Receiver<JobMessage>,
    cancel: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    done: bool,
}

impl CommandJob {
    /// Drain whatever the worker has produced; marks the job done when a
    /// terminal message shows up.
    pub fn try_drain(&mut self) -> Vec<JobMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            if matches!(
                message,
                JobMessage::Finished { .. } | JobMessage::Failed(_) | JobMessage::Canceled
            ) {
                self.done = true;
            }
            messages.push(message);
        }
        if self.done {
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
        messages
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Strip ANSI control sequences so captured output cannot corrupt the pane.
pub fn sanitize_line(raw: &str) -> String {
    let stripped = strip_ansi_escapes::strip(raw.as_bytes());
    String::from_utf8_lossy(&stripped)
        .chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .collect()
}

/// Launch `cmdline` (shell-words split, no shell) on a worker thread.
pub fn spawn_command(label: &str, cmdline: &str) -> Result<CommandJob, CoreError> {
    let argv = shell_words::split(cmdline)
        .map_err(|err| CoreError::handler(label, format!("bad command line: {err}")))?;
    if argv.is_empty() {
        return Err(CoreError::handler(label, "empty command line"));
    }

    let (tx, rx) = bounded(JOB_CHANNEL_CAPACITY);
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = cancel.clone();
    let job_label = label.to_string();

    let handle = thread::spawn(move || run_child(job_label, argv, tx, cancel_flag));

    Ok(CommandJob {
        label: label.to_string(),
        rx,
        cancel,
        handle: Some(handle),
        done: false,
    })
}

fn run_child(label: String, argv: Vec<String>, tx: Sender<JobMessage>, cancel: Arc<AtomicBool>) {
    let mut child = match Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            let _ = tx.send(JobMessage::Failed(format!(
                "failed to start `{}`: {err}",
                argv[0]
            )));
            return;
        }
    };

    // stream stdout from its own thread so a chatty child cannot deadlock
    // against a full pipe while we poll for exit
    let reader_handle = child.stdout.take().map(|stdout| {
        let tx = tx.clone();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(JobMessage::Lines(vec![sanitize_line(&line)])).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        })
    });

    let outcome = loop {
        if cancel.load(Ordering::SeqCst) {
            let _ = child.kill();
            let _ = child.wait();
            log_debug(&format!("job `{label}` canceled"));
            break JobMessage::Canceled;
        }
        match child.try_wait() {
            Ok(Some(status)) => {
                break JobMessage::Finished {
                    code: status.code().unwrap_or(-1),
                }
            }
            Ok(None) => thread::sleep(CHILD_POLL),
            Err(err) => break JobMessage::Failed(format!("wait failed: {err}")),
        }
    };

    if let Some(handle) = reader_handle {
        let _ = handle.join();
    }
    let _ = tx.send(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_until_done(job: &mut CommandJob) -> Vec<JobMessage> {
        let mut all = Vec::new();
        for _ in 0..200 {
            all.extend(job.try_drain());
            if job.is_done() {
                return all;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("job did not finish in time");
    }

    #[test]
    fn echo_job_streams_lines_then_finishes() {
        let mut job = spawn_command("cmd:echo", "echo hello").expect("spawn");
        let messages = drain_until_done(&mut job);
        assert!(messages
            .iter()
            .any(|m| matches!(m, JobMessage::Lines(lines) if lines[0] == "hello")));
        assert!(messages
            .iter()
            .any(|m| matches!(m, JobMessage::Finished { code: 0 })));
    }

    #[test]
    fn failing_command_reports_exit_code() {
        let mut job = spawn_command("cmd:false", "false").expect("spawn");
        let messages = drain_until_done(&mut job);
        assert!(messages
            .iter()
            .any(|m| matches!(m, JobMessage::Finished { code } if *code != 0)));
    }

    #[test]
    fn unknown_binary_fails_cleanly() {
        let mut job = spawn_command("cmd:ghost", "/no/such/bin").expect("spawn");
        let messages = drain_until_done(&mut job);
        assert!(messages.iter().any(|m| matches!(m, JobMessage::Failed(_))));
    }

    #[test]
    fn cancel_kills_a_long_runner() {
        let mut job = spawn_command("cmd:sleep", "sleep 30").expect("spawn");
        job.cancel();
        let messages = drain_until_done(&mut job);
        assert!(messages.iter().any(|m| matches!(m, JobMessage::Canceled)));
    }

    #[test]
    fn empty_command_is_a_handler_failure() {
        let err = spawn_command("cmd:empty", "").unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn sanitize_strips_ansi_and_control_bytes() {
        assert_eq!(sanitize_line("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(sanitize_line("a\x07b\tc"), "ab\tc");
    }
}
