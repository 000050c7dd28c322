//! Bounded in-process byte pipe.
//!
//! The write end pushes owned chunks through a `sync_channel` of capacity one,
//! so a writer can never run more than one chunk ahead of the reader. Dropping
//! either end disconnects the other: writes fail with `BrokenPipe`, reads see
//! end-of-file.

use std::io::{self, BufRead, Read, Write};
use std::sync::mpsc::{self, Receiver, SyncSender};

use zeroize::Zeroizing;

/// Largest chunk a single `write` call moves across the pipe.
pub const CHUNK_SIZE: usize = 32;

/// Create a connected writer/reader pair.
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::sync_channel(1);
    (
        PipeWriter { tx },
        PipeReader {
            rx,
            buf: Zeroizing::new(Vec::new()),
            pos: 0,
        },
    )
}

#[derive(Debug)]
pub struct PipeWriter {
    tx: SyncSender<Zeroizing<Vec<u8>>>,
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let n = data.len().min(CHUNK_SIZE);
        self.tx
            .send(Zeroizing::new(data[..n].to_vec()))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader closed"))?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct PipeReader {
    rx: Receiver<Zeroizing<Vec<u8>>>,
    buf: Zeroizing<Vec<u8>>,
    pos: usize,
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for PipeReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.buf.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                Err(_) => return Ok(&[]),
            }
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}
