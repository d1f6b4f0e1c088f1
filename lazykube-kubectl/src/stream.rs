use crate::command::KubectlConfig;
use lazykube_framework::{Chunk, LeafRef, LogSource, LogStream, StreamError};
use std::{process::Stdio, sync::Arc, time::Duration};
use tokio::{
    io::AsyncReadExt,
    process::{Child, ChildStderr, ChildStdout, Command},
    runtime::{Builder, Runtime},
    task::JoinHandle,
};

// stderr kept for error reports; earlier output is dropped
const STDERR_TAIL_BYTES: usize = 4 * 1024;

/// Opens `kubectl logs -f` streams.
pub struct KubectlLogSource {
    config: Arc<KubectlConfig>,
}

impl KubectlLogSource {
    pub fn new(config: Arc<KubectlConfig>) -> Self {
        Self { config }
    }
}

impl LogSource for KubectlLogSource {
    fn open_stream(&self, leaf: &LeafRef) -> Result<Box<dyn LogStream>, StreamError> {
        let args = self.config.args(&[
            "logs",
            "-f",
            leaf.name.as_str(),
            "-n",
            leaf.namespace.as_str(),
        ]);
        let stream = KubectlLogStream::spawn(
            &self.config.program,
            &args,
            leaf.to_string(),
            self.config.read_timeout,
            self.config.chunk_size,
        )?;
        Ok(Box::new(stream))
    }
}

/// A child process whose stdout is the log feed.
///
/// Each stream drives its own current-thread runtime, so reads can be bounded
/// by `read_timeout` from the blocking worker thread that owns it.
pub struct KubectlLogStream {
    target: String,
    child: Child,
    stdout: ChildStdout,
    stderr_tail: Option<JoinHandle<String>>,
    streamed: bool,
    buf: Vec<u8>,
    read_timeout: Duration,
    runtime: Runtime, // dropped last
}

impl KubectlLogStream {
    pub fn spawn(
        program: &str,
        args: &[String],
        target: String,
        read_timeout: Duration,
        chunk_size: usize,
    ) -> Result<Self, StreamError> {
        let open_error = |reason: String| StreamError::Open {
            target: target.clone(),
            reason,
        };

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| open_error(format!("cannot start runtime: {}", e)))?;

        // pipes register with the runtime's reactor, so spawn inside it
        let mut child = runtime
            .block_on(async {
                Command::new(program)
                    .args(args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .kill_on_drop(true)
                    .spawn()
            })
            .map_err(|e| open_error(format!("cannot run {}: {}", program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| open_error("stdout not captured".to_string()))?;
        // drained while reads drive the runtime, so a chatty stderr cannot
        // fill its pipe and stall the child
        let stderr_tail = child
            .stderr
            .take()
            .map(|stderr| runtime.spawn(drain_stderr(stderr)));
        log::debug!("Spawned {} for {}", program, target);

        Ok(Self {
            target,
            child,
            stdout,
            stderr_tail,
            streamed: false,
            buf: vec![0; chunk_size.max(1)],
            read_timeout,
            runtime,
        })
    }

    /// after stdout closed: the reason the process failed, if it did
    fn exit_failure(&mut self) -> Option<String> {
        let Self {
            runtime,
            child,
            stderr_tail,
            ..
        } = self;

        runtime.block_on(async {
            let status = child.wait().await.ok()?;
            if status.success() {
                return None;
            }
            let message = match stderr_tail.take() {
                Some(handle) => handle.await.unwrap_or_default(),
                None => String::new(),
            };
            let message = message.trim();
            Some(if message.is_empty() {
                format!("exited with {}", status)
            } else {
                message.to_string()
            })
        })
    }
}

async fn drain_stderr(mut stderr: ChildStderr) -> String {
    let mut tail = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match stderr.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                tail.extend_from_slice(&buf[..n]);
                if tail.len() > STDERR_TAIL_BYTES {
                    tail.drain(..tail.len() - STDERR_TAIL_BYTES);
                }
            }
        }
    }
    String::from_utf8_lossy(&tail).into_owned()
}

impl LogStream for KubectlLogStream {
    fn read_chunk(&mut self) -> Result<Chunk, StreamError> {
        let Self {
            runtime,
            stdout,
            buf,
            read_timeout,
            ..
        } = self;

        // the timer needs the runtime's context, so build it inside block_on
        let read_timeout = *read_timeout;
        let read = runtime
            .block_on(async { tokio::time::timeout(read_timeout, stdout.read(buf)).await });
        match read {
            Err(_) => Ok(Chunk::Idle),
            Ok(Ok(0)) => match self.exit_failure() {
                Some(reason) if self.streamed => Err(StreamError::Exited {
                    target: self.target.clone(),
                    reason,
                }),
                Some(reason) => Err(StreamError::Open {
                    target: self.target.clone(),
                    reason,
                }),
                None => Ok(Chunk::End),
            },
            Ok(Ok(n)) => {
                self.streamed = true;
                Ok(Chunk::Data(self.buf[..n].to_vec()))
            }
            Ok(Err(e)) => Err(StreamError::Read(e)),
        }
    }

    fn close(&mut self) -> Result<(), StreamError> {
        let Self { runtime, child, .. } = self;
        runtime.block_on(async {
            if let Ok(Some(status)) = child.try_wait() {
                log::debug!("Log process already exited with {}", status);
                return Ok(());
            }
            child
                .kill()
                .await
                .map_err(|e| StreamError::Close(e.to_string()))
        })
    }
}
