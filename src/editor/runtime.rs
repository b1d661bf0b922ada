//! The editing thread.
//!
//! `EditorRuntime` owns an `Editor` on a dedicated thread and multiplexes user
//! intents, playback ticks and preview results with `select!`. Each message is
//! handled to completion before the next one, so a tick never interleaves with
//! an intent. Frame extraction runs on the `PreviewWorker` thread; media
//! probing runs on the caller's thread before the intent is sent.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, select, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::core::time::Seconds;
use crate::editor::intent::{Feedback, Intent};
use crate::editor::session::{Editor, EditorSnapshot, PreviewUpdate};
use crate::media::{Frame, FrameExtractor, MediaProbe};
use crate::playback::TickOutcome;
use crate::preview::PreviewWorker;

/// Notifications from the editing thread.
#[derive(Debug)]
pub enum EditorEvent {
    Feedback(Feedback),
    PlayheadAdvanced(Seconds),
    /// Playback reached the end of the timeline and stopped
    PlaybackFinished(Seconds),
    PlaybackFaulted(String),
    PreviewFrame(Frame),
    /// Nothing under the playhead
    PreviewCleared,
    PreviewFailed { path: PathBuf, message: String },
}

enum Message {
    Intent(Intent),
    Snapshot(Sender<EditorSnapshot>),
    Shutdown,
}

pub struct EditorRuntime {
    messages: Sender<Message>,
    events: Receiver<EditorEvent>,
    probe: Arc<dyn MediaProbe>,
    thread: Option<JoinHandle<()>>,
}

impl EditorRuntime {
    /// Start the editing thread and its preview worker.
    pub fn spawn(
        config: EngineConfig,
        probe: Arc<dyn MediaProbe>,
        extractor: Arc<dyn FrameExtractor>,
    ) -> std::io::Result<Self> {
        let (message_tx, message_rx) = channel::unbounded();
        let (event_tx, event_rx) = channel::unbounded();

        let tick_interval = config.tick_interval();
        let preview = PreviewWorker::spawn(extractor, config.frame_cache_capacity)?;
        let editor = Editor::new(config);

        let thread = thread::Builder::new()
            .name("editor".into())
            .spawn(move || run(editor, preview, message_rx, event_tx, tick_interval))?;

        info!(tick_ms = tick_interval.as_millis() as u64, "editor runtime started");
        Ok(Self {
            messages: message_tx,
            events: event_rx,
            probe,
            thread: Some(thread),
        })
    }

    /// Queue an intent for the editing thread.
    pub fn send(&self, intent: Intent) {
        if self.messages.send(Message::Intent(intent)).is_err() {
            warn!("editor thread is gone; intent dropped");
        }
    }

    /// Probe `path` on this thread, then queue the add.
    pub fn add_media(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let duration = match self.probe.probe_duration(path) {
            Ok(duration) => Some(duration),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "media probe unavailable; using default duration");
                None
            }
        };
        self.send(Intent::AddMedia {
            path: path.to_path_buf(),
            duration,
        });
    }

    /// Current editor state. Waits for every previously sent intent to finish.
    pub fn snapshot(&self) -> Option<EditorSnapshot> {
        let (reply_tx, reply_rx) = channel::bounded(1);
        self.messages.send(Message::Snapshot(reply_tx)).ok()?;
        reply_rx.recv().ok()
    }

    /// Notifications channel.
    pub fn events(&self) -> &Receiver<EditorEvent> {
        &self.events
    }

    /// Stop the editing thread and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.messages.send(Message::Shutdown);
            if thread.join().is_err() {
                warn!("editor thread panicked");
            }
        }
    }
}

impl Drop for EditorRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Loop {
    editor: Editor,
    preview: PreviewWorker,
    events: Sender<EditorEvent>,
    showing_preview: bool,
}

impl Loop {
    fn emit(&self, event: EditorEvent) {
        // The receiver may be gone during shutdown
        let _ = self.events.send(event);
    }

    fn refresh_preview(&mut self) {
        match self.editor.preview_update() {
            PreviewUpdate::Fetch(request) => {
                let generation = self.preview.submit(request);
                debug!(generation, "preview requested");
            }
            PreviewUpdate::Clear => {
                self.preview.invalidate();
                if self.showing_preview {
                    self.showing_preview = false;
                    self.emit(EditorEvent::PreviewCleared);
                }
            }
            PreviewUpdate::Unchanged => {}
        }
    }

    fn handle_intent(&mut self, intent: Intent) {
        let feedback = self.editor.apply(intent);
        self.emit(EditorEvent::Feedback(feedback));
        self.refresh_preview();
    }

    fn handle_tick(&mut self, now: std::time::Instant) {
        match self.editor.tick(now) {
            TickOutcome::Idle => {}
            TickOutcome::Advanced(position) => {
                self.emit(EditorEvent::PlayheadAdvanced(position));
                self.refresh_preview();
            }
            TickOutcome::Finished(position) => {
                info!(position, "playback finished");
                self.emit(EditorEvent::PlaybackFinished(position));
                self.refresh_preview();
            }
            TickOutcome::Faulted(err) => {
                self.emit(EditorEvent::PlaybackFaulted(err.to_string()));
            }
        }
    }

    fn handle_preview(&mut self, result: crate::preview::PreviewResult) {
        if !self.preview.is_current(&result) {
            debug!(generation = result.generation, "stale preview result ignored");
            return;
        }

        match result.frame {
            Ok(frame) => {
                self.showing_preview = true;
                self.emit(EditorEvent::PreviewFrame(frame));
            }
            Err(err) => {
                warn!(path = %result.request.source_path.display(), error = %err, "frame extraction failed");
                self.emit(EditorEvent::PreviewFailed {
                    path: result.request.source_path,
                    message: err.to_string(),
                });
            }
        }
    }
}

fn run(
    editor: Editor,
    preview: PreviewWorker,
    messages: Receiver<Message>,
    events: Sender<EditorEvent>,
    tick_interval: Duration,
) {
    let ticker = channel::tick(tick_interval);
    let mut preview_results = preview.results().clone();
    let mut state = Loop {
        editor,
        preview,
        events,
        showing_preview: false,
    };

    loop {
        let mut preview_gone = false;
        select! {
            recv(messages) -> message => match message {
                Ok(Message::Intent(intent)) => state.handle_intent(intent),
                Ok(Message::Snapshot(reply)) => {
                    let _ = reply.send(state.editor.snapshot());
                }
                Ok(Message::Shutdown) | Err(_) => break,
            },
            recv(ticker) -> now => {
                if let Ok(now) = now {
                    state.handle_tick(now);
                }
            },
            recv(preview_results) -> result => match result {
                Ok(result) => state.handle_preview(result),
                Err(_) => preview_gone = true,
            },
        }

        // A disconnected receiver is always ready; stop selecting on it
        if preview_gone {
            warn!("preview worker is gone; previews disabled");
            preview_results = channel::never();
        }
    }
    debug!("editor thread exiting");
}
