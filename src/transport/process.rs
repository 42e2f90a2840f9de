use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use super::{channel, HostEnd, Port, PortEvent, Replier, Transport, TransportError};
use crate::config::BridgeConfig;
use crate::frame::{read_frame, write_frame, MAX_FROM_HOST};
use crate::manifest::{self, HostManifest};

const NATIVE_HOST_EXITED: &str = "Native host has exited.";
const NATIVE_HOST_ERROR: &str = "Error when communicating with the native messaging host.";

/// Talks to the helper the way a browser does: one process per port, framed
/// JSON over its stdin/stdout.
///
/// The process is killed when the port is disconnected or dropped. Anything the
/// helper writes to stderr is forwarded to `tracing` at debug level.
#[derive(Debug, Clone)]
pub struct ProcessTransport {
    host_name: String,
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessTransport {
    pub fn new(host_name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            host_name: host_name.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Launch whatever the manifest points at.
    pub fn from_manifest(manifest: &HostManifest) -> Self {
        Self::new(manifest.name.clone(), manifest.path.clone())
    }

    /// Build from configuration: an explicit `executable` wins, otherwise the
    /// installed manifest for the configured browser and scope is used.
    pub fn from_config(config: &BridgeConfig) -> io::Result<Self> {
        let transport = match &config.executable {
            Some(exe) => Self::new(config.host_name.clone(), exe.clone()),
            None => {
                let manifest = manifest::locate(&config.host_name, config.browser, config.scope)?;
                Self::from_manifest(&manifest)
            }
        };
        Ok(match &config.origin {
            Some(origin) => transport.with_origin(origin),
            None => transport,
        })
    }

    /// Pass the caller's origin as the first argument, as browsers do.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.args.insert(0, origin.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn spawn(&self) -> io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
    }
}

#[async_trait]
impl Transport for ProcessTransport {
    async fn connect_native(&self) -> Result<Port, TransportError> {
        let mut child = self.spawn().map_err(TransportError::Launch)?;
        let missing = |what: &str| {
            TransportError::Launch(io::Error::new(
                io::ErrorKind::Other,
                format!("native host {what} was not captured"),
            ))
        };
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr = child.stderr.take();

        tracing::debug!(
            host = %self.host_name,
            program = %self.program.display(),
            pid = child.id(),
            "launched native host"
        );
        let (port, host) = channel(self.host_name.clone());
        tokio::spawn(pump(child, stdin, stdout, stderr, host));
        Ok(port)
    }
}

async fn pump(
    mut child: Child,
    mut stdin: ChildStdin,
    stdout: ChildStdout,
    stderr: Option<ChildStderr>,
    mut host: HostEnd,
) {
    if let Some(stderr) = stderr {
        tokio::spawn(forward_stderr(stderr));
    }
    let replier = host.replier();
    let mut reader = tokio::spawn(read_replies(stdout, replier.clone()));

    loop {
        tokio::select! {
            request = host.recv() => match request {
                Some(msg) => {
                    if let Err(e) = write_frame(&mut stdin, &msg).await {
                        tracing::warn!(error = %e, "failed to write to native host");
                        let _ = replier.send(PortEvent::Disconnected(Some(NATIVE_HOST_ERROR.into())));
                        break;
                    }
                }
                None => {
                    tracing::debug!("port closed by client, stopping native host");
                    break;
                }
            },
            _ = &mut reader => break,
        }
    }

    drop(stdin);
    reader.abort();
    match child.try_wait() {
        Ok(Some(status)) => tracing::debug!(%status, "native host exited"),
        _ => {
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "failed to stop native host");
            }
        }
    }
}

async fn read_replies(stdout: ChildStdout, replier: Replier) {
    let mut reader = BufReader::new(stdout);
    loop {
        let event = match read_frame(&mut reader, MAX_FROM_HOST).await {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => {
                    tracing::trace!(reply = %value, "native host reply");
                    PortEvent::Message(value)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "native host sent invalid JSON");
                    PortEvent::Disconnected(Some(NATIVE_HOST_ERROR.into()))
                }
            },
            Ok(None) => PortEvent::Disconnected(Some(NATIVE_HOST_EXITED.into())),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read from native host");
                PortEvent::Disconnected(Some(NATIVE_HOST_ERROR.into()))
            }
        };
        let last = matches!(event, PortEvent::Disconnected(_));
        if replier.send(event).is_err() || last {
            break;
        }
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(target: "bloss_bridge::host", "{line}");
    }
}
