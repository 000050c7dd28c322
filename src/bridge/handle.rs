//! One-request credential handle.

use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::bridge::pipe::{pipe, PipeReader, PipeWriter};

/// Read end plus feeder thread. Released exactly once, by `close` or on drop.
#[derive(Debug)]
struct Feed {
    reader: Option<PipeReader>,
    feeder: Option<JoinHandle<()>>,
}

impl Feed {
    fn start(password: &SecretString) -> io::Result<Self> {
        let (writer, reader) = pipe();
        let mut line = Zeroizing::new(Vec::with_capacity(password.expose_secret().len() + 1));
        line.extend_from_slice(password.expose_secret().as_bytes());
        line.push(b'\n');

        let feeder = thread::Builder::new()
            .name("password-feeder".to_string())
            .spawn(move || feed(writer, line))?;

        Ok(Self {
            reader: Some(reader),
            feeder: Some(feeder),
        })
    }

    fn close(&mut self) {
        // Dropping the reader first unblocks a feeder stuck on a full channel.
        drop(self.reader.take());
        if let Some(feeder) = self.feeder.take() {
            if feeder.join().is_err() {
                tracing::warn!("Password feeder thread panicked");
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.reader.is_none() && self.feeder.is_none()
    }
}

impl Drop for Feed {
    fn drop(&mut self) {
        self.close();
    }
}

/// Write `line` until it is exhausted or the pipe refuses more bytes.
fn feed(mut writer: PipeWriter, line: Zeroizing<Vec<u8>>) {
    let mut offset = 0;
    while offset < line.len() {
        match writer.write(&line[offset..]) {
            Ok(0) | Err(_) => break,
            Ok(n) => offset += n,
        }
    }
}

/// An unlocked store together with the pipe that unlocked it.
///
/// The store's opener reads the password from a [`BufRead`] exactly as it
/// would from a terminal. The handle owns the reading end and the feeder thread
/// for its whole life and tears both down on [`close`](Self::close) or drop,
/// whichever comes first.
#[derive(Debug)]
pub struct CredentialHandle<S> {
    store: S,
    feed: Feed,
}

impl<S> CredentialHandle<S> {
    /// Feed `password` to `opener` through a fresh pipe.
    ///
    /// If the opener fails, the half-built pipe is closed before the error is
    /// returned.
    pub fn open<E, F>(password: &SecretString, opener: F) -> Result<Self, E>
    where
        F: FnOnce(&mut dyn BufRead) -> Result<S, E>,
        E: From<io::Error>,
    {
        let mut feed = Feed::start(password)?;
        let store = match feed.reader.as_mut() {
            Some(reader) => opener(reader)?,
            None => return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed").into()),
        };
        Ok(Self { store, feed })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Release the pipe and join the feeder. Safe to call more than once.
    pub fn close(&mut self) {
        self.feed.close();
    }

    pub fn is_closed(&self) -> bool {
        self.feed.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_opener_reads_password_line() {
        let handle = CredentialHandle::open(&secret("hunter22"), |input| {
            let mut line = String::new();
            input.read_line(&mut line)?;
            Ok::<_, io::Error>(line)
        })
        .unwrap();
        assert_eq!(handle.store(), "hunter22\n");
    }

    #[test]
    fn test_close_without_reading_does_not_deadlock() {
        let long = "p".repeat(4096);
        let started = Instant::now();

        let mut handle =
            CredentialHandle::open(&secret(&long), |_input| Ok::<_, io::Error>(())).unwrap();
        handle.close();

        assert!(handle.is_closed());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut handle =
            CredentialHandle::open(&secret("pw"), |_input| Ok::<_, io::Error>(7u8)).unwrap();
        handle.close();
        handle.close();
        assert!(handle.is_closed());
        assert_eq!(*handle.store(), 7);
    }

    #[test]
    fn test_failed_open_releases_pipe() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();

        let result: Result<CredentialHandle<()>, io::Error> =
            CredentialHandle::open(&secret(&"q".repeat(1024)), move |input| {
                seen.fetch_add(1, Ordering::SeqCst);
                let mut first = [0u8; 4];
                input.read_exact(&mut first)?;
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "wrong passphrase"))
            });

        let err = result.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_eof_after_password() {
        let handle = CredentialHandle::open(&secret("abc"), |input| {
            let mut all = String::new();
            input.read_to_string(&mut all)?;
            Ok::<_, io::Error>(all)
        })
        .unwrap();
        assert_eq!(handle.store(), "abc\n");
    }
}
