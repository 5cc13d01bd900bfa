//! Cassette USART: the data port (0x00, interrupt line 4) and its control
//! port (0x01).
//!
//! The two devices share one [`TapeTransport`] holding the currently-bound
//! tape file. Control writes select the transport mode:
//!
//! - `0x96` opens the next queued file for input; with an empty queue the
//!   machine raises media-wanted and waits for the shell to supply a path
//! - `0x26`/`0x21` opens the next queued file for output
//! - `0x00` stops the transport: input closes immediately, output stays
//!   open for a ~3 second grace so programs that toggle the tape off
//!   between records don't truncate their own file
//!
//! Reading the control port returns a status byte (bit 1 input ready,
//! bit 0 output bound), but every other read deliberately reports 0: the
//! ROM monitor's polling loop crashes if the tape claims ready on the very
//! first poll, so the hardware's settling time is modeled as a flip-flop.
//!
//! The data port is rate limited to about 2,000 service interrupts per
//! second; each data-port access clears the request and the poll raises it
//! again when the interval has passed, which holds the emulated tape to
//! roughly its physical bandwidth.

use crate::media::MediaQueue;
use lib8080::Device;
use std::any::Any;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Tape data port.
pub const USART_DATA_PORT: u8 = 0x00;
/// Tape service interrupt line.
pub const USART_IRQ: u8 = 4;
/// Transport control/status port.
pub const USART_CONTROL_PORT: u8 = 0x01;

/// Control command: open the next queued file for input.
const CMD_OPEN_INPUT: u8 = 0x96;
/// Control commands: open the next queued file for output.
const CMD_OPEN_OUTPUT: u8 = 0x26;
const CMD_OPEN_OUTPUT_ALT: u8 = 0x21;
/// Control command: stop the transport.
const CMD_STOP: u8 = 0x00;

/// Status bit: input file bound and not at end of file.
const STATUS_INPUT_READY: u8 = 0x02;
/// Status bit: output file bound.
const STATUS_OUTPUT_READY: u8 = 0x01;

/// How long a stopped output file lingers before it is really closed.
const OUTPUT_CLOSE_GRACE: Duration = Duration::from_secs(3);

/// Service-interrupt spacing (~2 kHz).
const SERVICE_INTERVAL: Duration = Duration::from_micros(500);

enum TapeFile {
    Input { file: File, eof: bool },
    Output { file: File },
}

/// The tape file shared by the data and control devices.
pub struct TapeTransport {
    file: Option<TapeFile>,
    /// False once the program has written the stop command.
    running: bool,
    /// When the stop command arrived, for the output close grace.
    stopped_at: Option<Instant>,
    last_service: Option<Instant>,
}

impl TapeTransport {
    fn new() -> Self {
        Self {
            file: None,
            running: false,
            stopped_at: None,
            last_service: None,
        }
    }

    fn open_input(&mut self, path: &Path) -> std::io::Result<()> {
        let file = File::open(path)?;
        log::info!("open input tape: {}", path.display());
        self.file = Some(TapeFile::Input { file, eof: false });
        self.running = true;
        self.stopped_at = None;
        Ok(())
    }

    fn open_output(&mut self, path: &Path) -> std::io::Result<()> {
        let file = File::create(path)?;
        log::info!("open output tape: {}", path.display());
        self.file = Some(TapeFile::Output { file });
        self.running = true;
        self.stopped_at = None;
        Ok(())
    }

    /// Next byte from the input file; 0 when nothing is bound or the file
    /// is exhausted.
    fn read_byte(&mut self) -> u8 {
        if let Some(TapeFile::Input { file, eof }) = &mut self.file {
            let mut buf = [0u8; 1];
            match file.read(&mut buf) {
                Ok(1) => return buf[0],
                Ok(_) => *eof = true,
                Err(err) => {
                    log::warn!("tape read failed: {}", err);
                    *eof = true;
                }
            }
        }
        0
    }

    fn write_byte(&mut self, value: u8) {
        if let Some(TapeFile::Output { file }) = &mut self.file {
            if let Err(err) = file.write_all(&[value]) {
                log::warn!("tape write failed: {}", err);
            }
        }
    }

    /// True while the bound file can still move data.
    fn ready(&self) -> bool {
        match &self.file {
            Some(TapeFile::Input { eof, .. }) => !eof,
            Some(TapeFile::Output { .. }) => true,
            None => false,
        }
    }

    fn is_input(&self) -> bool {
        matches!(self.file, Some(TapeFile::Input { .. }))
    }

    fn is_output(&self) -> bool {
        matches!(self.file, Some(TapeFile::Output { .. }))
    }

    fn close(&mut self) {
        match self.file.take() {
            Some(TapeFile::Output { mut file }) => {
                if let Err(err) = file.flush() {
                    log::warn!("tape flush failed: {}", err);
                }
                log::info!("closed output tape");
            }
            Some(TapeFile::Input { .. }) => log::info!("closed input tape"),
            None => {}
        }
        self.running = false;
        self.stopped_at = None;
    }
}

impl Drop for TapeTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// The tape data port on interrupt line 4.
pub struct Usart {
    transport: Arc<Mutex<TapeTransport>>,
    pending: Arc<AtomicBool>,
}

impl Usart {
    pub fn new() -> Self {
        Self {
            transport: Arc::new(Mutex::new(TapeTransport::new())),
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn transport(&self) -> Arc<Mutex<TapeTransport>> {
        Arc::clone(&self.transport)
    }

    pub(crate) fn pending_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pending)
    }
}

impl Default for Usart {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Usart {
    fn name(&self) -> &str {
        "USART"
    }

    fn irq_line(&self) -> Option<u8> {
        Some(USART_IRQ)
    }

    fn input_port(&self) -> Option<u8> {
        Some(USART_DATA_PORT)
    }

    fn output_port(&self) -> Option<u8> {
        Some(USART_DATA_PORT)
    }

    /// Read the next tape byte. The request always drops afterwards; the
    /// control poll raises it again, which is what rate limits the stream.
    fn read(&mut self) -> u8 {
        let byte = self.transport.lock().unwrap().read_byte();
        self.pending.store(false, Ordering::SeqCst);
        log::debug!("usart read: {:02x}", byte);
        byte
    }

    fn write(&mut self, value: u8) {
        self.transport.lock().unwrap().write_byte(value);
        self.pending.store(false, Ordering::SeqCst);
    }

    fn interrupt_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The transport control/status port.
pub struct UsartControl {
    transport: Arc<Mutex<TapeTransport>>,
    pending: Arc<AtomicBool>,
    media: Arc<MediaQueue>,
    shutting_down: Arc<AtomicBool>,
    /// Status flip-flop; never reset, by design.
    report_idle: bool,
}

impl UsartControl {
    /// Pair a control port with the given data device.
    pub fn new(usart: &Usart, media: Arc<MediaQueue>, shutting_down: Arc<AtomicBool>) -> Self {
        Self {
            transport: usart.transport(),
            pending: usart.pending_flag(),
            media,
            shutting_down,
            report_idle: false,
        }
    }

    /// Periodic service from the run loop: finishes delayed output closes
    /// and paces the data interrupts to ~2 kHz.
    pub fn poll(&mut self) {
        let mut transport = self.transport.lock().unwrap();
        if !transport.ready() {
            return;
        }

        if transport.is_output() && !transport.running {
            let expired = transport
                .stopped_at
                .map_or(false, |at| at.elapsed() >= OUTPUT_CLOSE_GRACE);
            if expired {
                transport.close();
                self.pending.store(false, Ordering::SeqCst);
                return;
            }
        }

        let due = transport
            .last_service
            .map_or(true, |at| at.elapsed() >= SERVICE_INTERVAL);
        if due {
            transport.last_service = Some(Instant::now());
            self.pending.store(true, Ordering::SeqCst);
        }
    }

    fn open_for_input(&mut self) {
        let mut transport = self.transport.lock().unwrap();
        if transport.file.is_some() {
            return;
        }
        let Some(path) = self.media.wait_for_media(&self.shutting_down) else {
            return;
        };
        match transport.open_input(&path) {
            Ok(()) => self.pending.store(true, Ordering::SeqCst),
            Err(err) => {
                log::error!("tape operation failed: {}: {}", path.display(), err);
                self.media.request_media();
            }
        }
    }

    fn open_for_output(&mut self) {
        let mut transport = self.transport.lock().unwrap();
        if transport.file.is_some() {
            return;
        }
        let Some(path) = self.media.wait_for_media(&self.shutting_down) else {
            return;
        };
        match transport.open_output(&path) {
            Ok(()) => self.pending.store(true, Ordering::SeqCst),
            Err(err) => {
                log::error!("tape operation failed: {}: {}", path.display(), err);
                self.media.request_media();
            }
        }
    }

    fn stop_transport(&mut self) {
        let mut transport = self.transport.lock().unwrap();
        if transport.file.is_none() {
            return;
        }
        if transport.is_input() {
            log::info!("stop the tape transport");
            transport.close();
            self.pending.store(false, Ordering::SeqCst);
        } else {
            // Output lingers; the poll closes it after the grace period
            // unless another record restarts the transport first.
            transport.running = false;
            transport.stopped_at = Some(Instant::now());
        }
    }
}

impl Device for UsartControl {
    fn name(&self) -> &str {
        "USART control"
    }

    fn input_port(&self) -> Option<u8> {
        Some(USART_CONTROL_PORT)
    }

    fn output_port(&self) -> Option<u8> {
        Some(USART_CONTROL_PORT)
    }

    /// Status byte, reported only on alternate reads.
    fn read(&mut self) -> u8 {
        self.report_idle = !self.report_idle;
        if self.report_idle {
            return 0;
        }

        let transport = self.transport.lock().unwrap();
        if !transport.ready() {
            return 0;
        }
        if transport.is_input() {
            STATUS_INPUT_READY
        } else {
            STATUS_OUTPUT_READY
        }
    }

    fn write(&mut self, value: u8) {
        log::debug!("usart control write: {:02x}", value);
        match value {
            CMD_OPEN_INPUT => self.open_for_input(),
            CMD_OPEN_OUTPUT | CMD_OPEN_OUTPUT_ALT => self.open_for_output(),
            CMD_STOP => self.stop_transport(),
            other => {
                // The monitor also writes sync-configuration bytes here;
                // the emulated transport has no use for them.
                log::debug!("usart control: ignored command {:02x}", other);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "poly88_usart_{}_{}_{:?}",
            tag,
            std::process::id(),
            std::thread::current().id()
        ))
    }

    fn queue_with(path: &Path) -> Arc<MediaQueue> {
        let media = Arc::new(MediaQueue::new());
        media.add(path.to_path_buf());
        media
    }

    #[test]
    fn test_status_flip_flop() {
        let usart = Usart::new();
        let media = Arc::new(MediaQueue::new());
        let mut control =
            UsartControl::new(&usart, media, Arc::new(AtomicBool::new(false)));

        // Nothing bound: always 0, but the flip-flop still alternates
        assert_eq!(control.read(), 0);
        assert_eq!(control.read(), 0);

        let path = temp_path("flipflop");
        std::fs::write(&path, [0x11u8, 0x22]).unwrap();
        control.media = queue_with(&path);
        control.write(CMD_OPEN_INPUT);

        // Alternate reads report idle even though input is ready
        assert_eq!(control.read(), 0);
        assert_eq!(control.read(), STATUS_INPUT_READY);
        assert_eq!(control.read(), 0);
        assert_eq!(control.read(), STATUS_INPUT_READY);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_input_stream_and_interrupt_clearing() {
        let path = temp_path("input");
        std::fs::write(&path, [0xE6u8, 0x01, 0x42]).unwrap();

        let mut usart = Usart::new();
        let mut control = UsartControl::new(
            &usart,
            queue_with(&path),
            Arc::new(AtomicBool::new(false)),
        );

        control.write(CMD_OPEN_INPUT);
        assert!(usart.interrupt_pending());

        assert_eq!(usart.read(), 0xE6);
        assert!(!usart.interrupt_pending()); // cleared by the read

        control.poll(); // service raises it again
        assert!(usart.interrupt_pending());
        assert_eq!(usart.read(), 0x01);
        assert_eq!(usart.read(), 0x42);

        // Exhausted input reads 0 and reports not ready
        assert_eq!(usart.read(), 0x00);
        assert_eq!(control.read(), 0);
        assert_eq!(control.read(), 0);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_input_stop_closes_immediately() {
        let path = temp_path("stop_input");
        std::fs::write(&path, [0x55u8]).unwrap();

        let mut usart = Usart::new();
        let mut control = UsartControl::new(
            &usart,
            queue_with(&path),
            Arc::new(AtomicBool::new(false)),
        );
        control.write(CMD_OPEN_INPUT);
        control.write(CMD_STOP);

        assert!(!usart.interrupt_pending());
        assert_eq!(usart.read(), 0); // unbound

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_write_and_grace() {
        let path = temp_path("output");

        let mut usart = Usart::new();
        let mut control = UsartControl::new(
            &usart,
            queue_with(&path),
            Arc::new(AtomicBool::new(false)),
        );
        control.write(CMD_OPEN_OUTPUT);
        usart.write(0xAA);
        usart.write(0xBB);

        // Stop: the file must survive the grace window so the next record
        // can keep writing.
        control.write(CMD_STOP);
        control.poll();
        usart.write(0xCC);

        // Force the grace to expire and let the poll close the file.
        control.transport.lock().unwrap().stopped_at =
            Some(Instant::now() - OUTPUT_CLOSE_GRACE);
        control.poll();
        assert!(!control.transport.lock().unwrap().ready());

        assert_eq!(std::fs::read(&path).unwrap(), vec![0xAA, 0xBB, 0xCC]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rate_limit_spacing() {
        let path = temp_path("rate");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let mut usart = Usart::new();
        let mut control = UsartControl::new(
            &usart,
            queue_with(&path),
            Arc::new(AtomicBool::new(false)),
        );
        control.write(CMD_OPEN_INPUT);
        usart.read();
        assert!(!usart.interrupt_pending());

        control.poll(); // first service is immediate
        assert!(usart.interrupt_pending());
        usart.read();

        // Too soon: the interval has not passed
        control.transport.lock().unwrap().last_service = Some(Instant::now());
        control.poll();
        assert!(!usart.interrupt_pending());

        std::thread::sleep(SERVICE_INTERVAL + Duration::from_micros(200));
        control.poll();
        assert!(usart.interrupt_pending());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_with_empty_queue_raises_media_wanted() {
        let usart = Usart::new();
        let media = Arc::new(MediaQueue::new());
        let shutting_down = Arc::new(AtomicBool::new(true)); // abandon the wait
        let mut control = UsartControl::new(&usart, Arc::clone(&media), shutting_down);

        control.write(CMD_OPEN_INPUT);

        assert!(media.media_wanted());
        assert!(!usart.interrupt_pending());
    }
}
