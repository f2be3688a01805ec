// irkbd Input Layer - lirc scancode receiver
// Reads kernel-decoded IR scancodes from a /dev/lircN character device

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::mem;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::{ioctl_read, ioctl_write_ptr};

use super::event::{Clock, Decoder, DecoderError, IrCode, IrEvent, Timestamp};
use crate::transform::DEFAULT_RELEASE_TIMEOUT_MS;

const LIRC_MAGIC: u8 = b'i';
const LIRC_GET_FEATURES: u8 = 0x00;
const LIRC_SET_REC_MODE: u8 = 0x12;

const LIRC_MODE_SCANCODE: u32 = 0x0000_0008;
const LIRC_CAN_REC_SCANCODE: u32 = LIRC_MODE_SCANCODE << 16;

/// Protocol toggle bit; RC6 MCE flips it on every new button press
pub const LIRC_SCANCODE_FLAG_TOGGLE: u16 = 1;
/// Frame is a protocol repeat of the previous one (NEC-style repeat codes)
pub const LIRC_SCANCODE_FLAG_REPEAT: u16 = 2;

ioctl_read!(lirc_get_features, LIRC_MAGIC, LIRC_GET_FEATURES, u32);
ioctl_write_ptr!(lirc_set_rec_mode, LIRC_MAGIC, LIRC_SET_REC_MODE, u32);

/// Record layout of `struct lirc_scancode` from the kernel uapi
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct LircScancode {
    pub timestamp: u64,
    pub flags: u16,
    pub rc_proto: u16,
    pub keycode: u32,
    pub scancode: u64,
}

impl LircScancode {
    fn from_bytes(buf: &[u8; mem::size_of::<LircScancode>()]) -> Self {
        let u64_at = |i: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&buf[i..i + 8]);
            u64::from_ne_bytes(b)
        };
        Self {
            timestamp: u64_at(0),
            flags: u16::from_ne_bytes([buf[8], buf[9]]),
            rc_proto: u16::from_ne_bytes([buf[10], buf[11]]),
            keycode: u32::from_ne_bytes([buf[12], buf[13], buf[14], buf[15]]),
            scancode: u64_at(16),
        }
    }

    pub fn is_repeat(&self) -> bool {
        self.flags & LIRC_SCANCODE_FLAG_REPEAT != 0
    }

    /// Scancode as an IR code; `None` when it does not fit in 32 bits
    pub fn code(&self) -> Option<IrCode> {
        u32::try_from(self.scancode).ok().map(IrCode)
    }

    pub fn toggle(&self) -> bool {
        self.flags & LIRC_SCANCODE_FLAG_TOGGLE != 0
    }
}

/// Classifies scancode frames as fresh presses or held-button repeats.
///
/// Toggle protocols such as RC6 MCE send every frame of a held button as a
/// full keydown with the same toggle bit; only a new press flips it. A
/// frame is a repeat when the kernel flags it as one, or when it carries
/// the previous frame's scancode and toggle bit within `window_ms`.
#[derive(Debug, Clone, Copy)]
pub struct RepeatTracker {
    window_ms: u32,
    last: Option<(u64, bool, Timestamp)>,
}

impl RepeatTracker {
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            last: None,
        }
    }

    /// Record a frame received at `now` and report whether it repeats
    pub fn classify(&mut self, record: &LircScancode, now: Timestamp) -> bool {
        let same_press = match self.last {
            Some((scancode, toggle, seen)) => {
                scancode == record.scancode
                    && toggle == record.toggle()
                    && now.millis_since(seen) <= self.window_ms
            }
            None => false,
        };
        self.last = Some((record.scancode, record.toggle(), now));
        record.is_repeat() || same_press
    }
}

impl Default for RepeatTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASE_TIMEOUT_MS)
    }
}

/// Decoder backed by the kernel rc-core protocol decoders.
///
/// The device is switched to scancode mode on open, so protocol decoding
/// (RC6 for MCE remotes, NEC, ...) happens in the kernel and only
/// finished frames reach this process.
pub struct LircDecoder<C: Clock> {
    path: PathBuf,
    file: File,
    clock: C,
    repeats: RepeatTracker,
}

impl<C: Clock> LircDecoder<C> {
    /// Open a lirc chardev such as "/dev/lirc0" in scancode mode
    pub fn open<P: AsRef<Path>>(path: P, clock: C) -> Result<Self, DecoderError> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).open(path)?;
        let mut features = 0u32;

        // SAFETY: the fd is open for the lifetime of `file` and `features`
        // is a valid u32 out-pointer
        match unsafe { lirc_get_features(file.as_raw_fd(), &mut features) } {
            Ok(_) => {}
            Err(_) => return Err(DecoderError::NotLirc(path.display().to_string())),
        }

        if features & LIRC_CAN_REC_SCANCODE == 0 {
            return Err(DecoderError::NoScancodeSupport(path.display().to_string()));
        }

        let mode = LIRC_MODE_SCANCODE;
        // SAFETY: as above, `mode` outlives the call
        unsafe { lirc_set_rec_mode(file.as_raw_fd(), &mode) }.map_err(io::Error::from)?;

        log::info!("Opened {} in scancode mode", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file,
            clock,
            repeats: RepeatTracker::default(),
        })
    }

    /// Frames of one press arriving further apart than this start a new
    /// press; normally the engine's release timeout
    pub fn repeat_window(mut self, window_ms: u32) -> Self {
        self.repeats = RepeatTracker::new(window_ms);
        self
    }

    /// Device path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait up to `timeout` for the fd to become readable
    fn wait_readable(&self, timeout: Duration) -> Result<bool, DecoderError> {
        let mut poll_fd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;

        // SAFETY: one valid pollfd, length 1
        let poll_result = unsafe { libc::poll(&mut poll_fd, 1, timeout_ms) };

        if poll_result < 0 {
            let err = io::Error::last_os_error();
            // A signal (Ctrl+C) interrupted the wait; the caller checks its
            // running flag, so report a quiet cycle
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(DecoderError::Io(err));
        }

        Ok(poll_result > 0 && poll_fd.revents & libc::POLLIN != 0)
    }
}

impl<C: Clock> Decoder for LircDecoder<C> {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<IrEvent>, DecoderError> {
        if !self.wait_readable(timeout)? {
            return Ok(None);
        }

        let mut buf = [0u8; mem::size_of::<LircScancode>()];
        let n = match self.file.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(e) => return Err(DecoderError::Io(e)),
        };
        if n != buf.len() {
            log::debug!("{}: short read of {} bytes, dropping", self.path.display(), n);
            return Ok(None);
        }

        let record = LircScancode::from_bytes(&buf);
        log::trace!(
            "{}: scancode={:#x} flags={:#x} proto={} ts={}ns",
            self.path.display(),
            record.scancode,
            record.flags,
            record.rc_proto,
            record.timestamp
        );

        let Some(code) = record.code() else {
            log::debug!(
                "{}: scancode {:#x} wider than 32 bits, dropping",
                self.path.display(),
                record.scancode
            );
            return Ok(None);
        };
        let timestamp = self.clock.now();
        let repeat = self.repeats.classify(&record, timestamp);

        Ok(Some(IrEvent {
            code,
            repeat,
            timestamp,
        }))
    }
}
