//! 60 Hz real-time clock on interrupt line 6.
//!
//! A dedicated host thread sleeps one tick at a time and sets an atomic
//! pending flag; the ROM's ISR acknowledges with an OUT to port 8. Tests
//! and headless run loops can inject ticks directly with [`Timer::tick`]
//! instead of starting the thread.

use lib8080::Device;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// OUT to this port acknowledges the tick.
pub const TIMER_ACK_PORT: u8 = 0x08;
/// Timer interrupt line.
pub const TIMER_IRQ: u8 = 6;

/// Tick period: 1/60 second.
const TICK: Duration = Duration::from_micros(16_666);

pub struct Timer {
    pending: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            ticker: None,
        }
    }

    /// Inject one tick, as the ticker thread would.
    pub fn tick(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Timer {
    fn name(&self) -> &str {
        "Timer"
    }

    fn irq_line(&self) -> Option<u8> {
        Some(TIMER_IRQ)
    }

    fn output_port(&self) -> Option<u8> {
        Some(TIMER_ACK_PORT)
    }

    fn startup(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        self.stop.store(false, Ordering::SeqCst);
        let pending = Arc::clone(&self.pending);
        let stop = Arc::clone(&self.stop);
        self.ticker = Some(std::thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                std::thread::sleep(TICK);
                pending.store(true, Ordering::SeqCst);
            }
        }));
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(ticker) = self.ticker.take() {
            if ticker.join().is_err() {
                log::warn!("timer ticker thread panicked");
            }
        }
    }

    fn read(&mut self) -> u8 {
        0
    }

    /// The ROM's timer ISR writes a byte here to rearm for the next tick.
    fn write(&mut self, _value: u8) {
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

impl Drop for Timer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
