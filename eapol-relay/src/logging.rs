use crate::error::{RelayError, Result};
use std::ffi::CString;
use std::io::{self, Write};
use std::sync::Once;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Where log lines go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogSink {
    Console,
    Syslog,
}

const DEFAULT_FILTER: &str = "info";
const SYSLOG_IDENT: &[u8] = b"eapol-relay\0";

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init(sink: LogSink) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match sink {
        LogSink::Console => builder.try_init(),
        LogSink::Syslog => builder
            .without_time()
            .with_ansi(false)
            .with_level(false)
            .with_target(false)
            .with_writer(SyslogWriter::open())
            .try_init(),
    };
    installed.map_err(|err| RelayError::Logging(err.to_string()))
}

/// Hands each formatted event to the local syslog daemon, with the event's level mapped to a
/// syslog priority.
#[derive(Clone, Copy, Debug)]
pub struct SyslogWriter {
    _private: (),
}

static OPENLOG: Once = Once::new();

impl SyslogWriter {
    pub fn open() -> SyslogWriter {
        OPENLOG.call_once(|| unsafe {
            libc::openlog(
                SYSLOG_IDENT.as_ptr() as *const libc::c_char,
                libc::LOG_PID,
                libc::LOG_DAEMON,
            );
        });
        SyslogWriter { _private: () }
    }
}

pub fn priority(level: &Level) -> libc::c_int {
    match *level {
        Level::ERROR => libc::LOG_ERR,
        Level::WARN => libc::LOG_WARNING,
        Level::INFO => libc::LOG_INFO,
        Level::DEBUG | Level::TRACE => libc::LOG_DEBUG,
    }
}

impl<'a> MakeWriter<'a> for SyslogWriter {
    type Writer = SyslogLine;

    fn make_writer(&'a self) -> SyslogLine {
        SyslogLine::new(libc::LOG_INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> SyslogLine {
        SyslogLine::new(priority(meta.level()))
    }
}

/// One log line, buffered until dropped and then sent as a single syslog record.
pub struct SyslogLine {
    priority: libc::c_int,
    buf: Vec<u8>,
}

impl SyslogLine {
    fn new(priority: libc::c_int) -> SyslogLine {
        SyslogLine {
            priority,
            buf: Vec::with_capacity(128),
        }
    }

    fn message(&self) -> Option<CString> {
        let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
        if line.is_empty() {
            return None;
        }
        let line: Vec<u8> = line.iter().map(|&b| if b == 0 { b' ' } else { b }).collect();
        CString::new(line).ok()
    }
}

impl Write for SyslogLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogLine {
    fn drop(&mut self) {
        if let Some(message) = self.message() {
            unsafe {
                libc::syslog(
                    self.priority,
                    b"%s\0".as_ptr() as *const libc::c_char,
                    message.as_ptr(),
                );
            }
        }
    }
}
