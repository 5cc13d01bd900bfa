//! The media queue: the ordered list of tape-file paths the USART consumes
//! on successive opens.
//!
//! The queue persists to `.poly88_media_files` in the working directory,
//! one path per line. Each entry carries the probed file size and a
//! `ready` flag; the cursor advances on every take and wraps to the start
//! on exhaustion, so a looping program can reread its tape set.
//!
//! The shell mutates the queue from its UI thread while the execution
//! thread takes entries, so all state sits behind one mutex. The condvar
//! lets a control-port open block until the shell supplies a path; the
//! `media wanted` flag is the edge-triggered notification the shell polls
//! to know it should raise its picker.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Default persistence file, one path per line.
pub const MEDIA_LIST_FILE: &str = ".poly88_media_files";

/// One queued tape file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    pub path: PathBuf,
    pub size: u64,
    pub ready: bool,
}

impl MediaEntry {
    fn probe(path: PathBuf) -> Self {
        match std::fs::metadata(&path) {
            Ok(meta) => Self {
                path,
                size: meta.len(),
                ready: true,
            },
            Err(_) => Self {
                path,
                size: 0,
                ready: false,
            },
        }
    }
}

#[derive(Default)]
struct QueueState {
    entries: Vec<MediaEntry>,
    /// Index of the next entry to hand out; `None` when empty.
    cursor: Option<usize>,
}

impl QueueState {
    fn fix_cursor_after_insert(&mut self, index: usize) {
        match self.cursor {
            None => self.cursor = Some(0),
            Some(cursor) if cursor >= index && self.entries.len() > 1 => {
                self.cursor = Some(cursor + 1);
            }
            _ => {}
        }
    }
}

/// Thread-safe media queue with persistence and a media-wanted signal.
pub struct MediaQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    media_wanted: AtomicBool,
}

impl MediaQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            available: Condvar::new(),
            media_wanted: AtomicBool::new(false),
        }
    }

    /// Create a queue preloaded from `.poly88_media_files` in the working
    /// directory, if present.
    pub fn from_media_list() -> Self {
        let queue = Self::new();
        queue.load_from(Path::new(MEDIA_LIST_FILE));
        queue
    }

    /// Replace the queue contents from a list file; missing file leaves the
    /// queue empty.
    pub fn load_from(&self, path: &Path) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return,
        };
        let mut state = self.state.lock().unwrap();
        state.entries = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| MediaEntry::probe(PathBuf::from(line.trim())))
            .collect();
        state.cursor = if state.entries.is_empty() {
            None
        } else {
            Some(0)
        };
        drop(state);
        self.available.notify_all();
    }

    /// Write the queue back out, one path per line.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let state = self.state.lock().unwrap();
        let mut text = String::new();
        for entry in &state.entries {
            text.push_str(&entry.path.to_string_lossy());
            text.push('\n');
        }
        std::fs::write(path, text)
    }

    /// Append a path, probing its size and readiness.
    pub fn add(&self, path: PathBuf) {
        let mut state = self.state.lock().unwrap();
        state.entries.push(MediaEntry::probe(path));
        if state.cursor.is_none() {
            state.cursor = Some(0);
        }
        drop(state);
        self.available.notify_all();
    }

    /// Insert a path before `index` (clamped to the end).
    pub fn insert(&self, index: usize, path: PathBuf) {
        let mut state = self.state.lock().unwrap();
        let index = index.min(state.entries.len());
        state.entries.insert(index, MediaEntry::probe(path));
        state.fix_cursor_after_insert(index);
        drop(state);
        self.available.notify_all();
    }

    /// Remove the entry at `index`; out-of-range indices are ignored.
    pub fn remove(&self, index: usize) {
        let mut state = self.state.lock().unwrap();
        if index >= state.entries.len() {
            return;
        }
        state.entries.remove(index);
        state.cursor = match state.cursor {
            _ if state.entries.is_empty() => None,
            Some(cursor) if cursor > index => Some(cursor - 1),
            Some(cursor) => Some(cursor.min(state.entries.len() - 1)),
            None => None,
        };
    }

    /// Move an entry, carrying the cursor with it if it pointed there.
    pub fn move_entry(&self, from: usize, to: usize) {
        let mut state = self.state.lock().unwrap();
        if from >= state.entries.len() || to >= state.entries.len() || from == to {
            return;
        }
        let entry = state.entries.remove(from);
        state.entries.insert(to, entry);
        if state.cursor == Some(from) {
            state.cursor = Some(to);
        }
    }

    /// Replace the entry at `index` with a new path.
    pub fn replace(&self, index: usize, path: PathBuf) {
        let mut state = self.state.lock().unwrap();
        if index >= state.entries.len() {
            return;
        }
        state.entries[index] = MediaEntry::probe(path);
        drop(state);
        self.available.notify_all();
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.entries.clear();
        state.cursor = None;
    }

    pub fn count(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    /// A snapshot of the entries for display.
    pub fn entries(&self) -> Vec<MediaEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    /// Take the next path: marks the entry consumed, advances the cursor,
    /// wraps to the start on exhaustion. `None` if the queue is empty.
    pub fn next_media_path(&self) -> Option<PathBuf> {
        let mut state = self.state.lock().unwrap();
        let cursor = state.cursor?;
        let path = state.entries[cursor].path.clone();
        state.entries[cursor].ready = false;
        let next = cursor + 1;
        state.cursor = Some(if next >= state.entries.len() { 0 } else { next });
        Some(path)
    }

    /// Raise the media-wanted signal for the shell.
    pub fn request_media(&self) {
        self.media_wanted.store(true, Ordering::SeqCst);
    }

    /// Edge-triggered: returns true once per raise, then resets.
    pub fn media_wanted(&self) -> bool {
        self.media_wanted.swap(false, Ordering::SeqCst)
    }

    /// Take the next path, blocking until one is queued.
    ///
    /// Raises media-wanted, then waits on the queue; gives up and returns
    /// `None` once `cancelled` reads true (machine shutdown).
    pub fn wait_for_media(&self, cancelled: &AtomicBool) -> Option<PathBuf> {
        loop {
            if let Some(path) = self.next_media_path() {
                return Some(path);
            }
            self.request_media();
            if cancelled.load(Ordering::SeqCst) {
                return None;
            }
            let state = self.state.lock().unwrap();
            // The timeout bounds the shutdown latency, not the wait itself.
            let (_state, _timeout) = self
                .available
                .wait_timeout(state, Duration::from_millis(100))
                .unwrap();
        }
    }
}

impl Default for MediaQueue {
    fn default() -> Self {
        Self::new()
    }
}
