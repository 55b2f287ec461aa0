//! Attachment and playback state machine.
//!
//! ```text
//! Detached --attach--> Paused --start--> Playing --stop--> Paused --detach--> Detached
//!                                        Playing --detach--> Detached
//! ```
//!
//! Removal of the container or surface by the host (a forced detach) also
//! leads to `Detached`. Explicit and forced detach share one teardown; the
//! second to run finds nothing left to do.

use std::time::Duration;

use crate::error::AttachmentError;
use crate::platform::{Document, RemovalObserver, Surface};

use super::{Spinner, Timer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Detached,
    /// Attached, not animating
    Paused,
    /// Attached and animating
    Playing,
}

impl<D: Document, S: Surface> Spinner<D, S> {
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state != PlaybackState::Detached
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Node the spinner replaces while attached, or will reattach at.
    pub fn insertion_point(&self) -> Option<&D::Node> {
        self.insertion_point.as_ref()
    }

    /// Insert the spinner in place of `target`, or of the remembered insertion
    /// point when `target` is `None`. Returns the replaced node.
    ///
    /// With autostart enabled playback begins on the next [`update`](Self::update),
    /// never inside this call.
    pub fn attach(&mut self, target: Option<D::Node>) -> Result<D::Node, AttachmentError> {
        self.attach_at(target, true)
    }

    fn attach_at(
        &mut self,
        target: Option<D::Node>,
        allow_autostart: bool,
    ) -> Result<D::Node, AttachmentError> {
        if self.is_attached() {
            log::debug!("Already attached, detaching before reattaching");
            self.teardown();
        }

        let target = target
            .or_else(|| self.insertion_point.clone())
            .ok_or(AttachmentError::NoTarget)?;
        if !self.document.is_connected(&target) {
            return Err(AttachmentError::NotInDocument);
        }

        self.document.replace_with(&target, &self.container)?;
        self.insertion_point = Some(target.clone());
        self.observer = Some(
            self.document
                .observe_removal(&[self.container.clone(), self.canvas.clone()]),
        );
        self.state = PlaybackState::Paused;

        if let Err(e) = self.recompute() {
            log::error!("Drawing surface failed during attach: {}", e);
            self.teardown();
            return Err(e.into());
        }

        if allow_autostart && self.config.autostart {
            self.pending_autostart = true;
        }
        log::debug!("Spinner attached in place of {:?}", target);
        Ok(target)
    }

    /// Remove the spinner and put the replaced node back. Returns the restored
    /// node, or `None` if nothing was attached or the container was already gone.
    pub fn detach(&mut self) -> Option<D::Node> {
        if !self.is_attached() {
            log::warn!("detach() called on a spinner that is not attached");
            return None;
        }
        self.teardown()
    }

    /// Begin animating. Attaches at the remembered insertion point first when
    /// detached.
    pub fn start(&mut self) -> Result<(), AttachmentError> {
        match self.state {
            PlaybackState::Playing => {
                log::warn!("start() called on a spinner that is already playing");
                return Ok(());
            }
            PlaybackState::Detached => {
                self.attach_at(None, false)?;
            }
            PlaybackState::Paused => {}
        }
        self.pending_autostart = false;
        let now = self.now();
        self.resume_playing(now);
        Ok(())
    }

    pub fn play(&mut self) -> Result<(), AttachmentError> {
        self.start()
    }

    pub fn resume(&mut self) -> Result<(), AttachmentError> {
        self.start()
    }

    pub fn animate(&mut self) -> Result<(), AttachmentError> {
        self.start()
    }

    /// Freeze the animation on the current frame.
    pub fn stop(&mut self) {
        if !self.is_playing() {
            log::warn!("stop() called on a spinner that is not playing");
            return;
        }
        let now = self.now();
        self.engine.advance(now);
        self.timer = None;
        self.state = PlaybackState::Paused;
        log::debug!("Spinner paused at frame {:.3}", self.engine.frame());
    }

    pub fn pause(&mut self) {
        self.stop()
    }

    /// Drive the spinner from the host's event loop.
    ///
    /// Delivers pending removal notifications, runs a deferred autostart and
    /// draws a frame when one is due. Returns how long the host may wait
    /// before calling again, or `None` when nothing is scheduled.
    pub fn update(&mut self) -> Option<Duration> {
        self.process_removals();

        if self.pending_autostart {
            self.pending_autostart = false;
            if self.state == PlaybackState::Paused {
                if let Err(e) = self.start() {
                    log::error!("Autostart failed: {}", e);
                }
            } else {
                log::debug!("Skipping autostart, spinner is {:?}", self.state);
            }
        }

        let timer = self.timer?;
        let now = self.now();
        let next_due = if now >= timer.next_due {
            self.draw_frame();
            // Schedule from now; missed ticks are not replayed
            now + self.engine.frame_delay()
        } else {
            timer.next_due
        };
        self.timer = Some(Timer { next_due });
        let wait = (next_due - now).max(0.0) / 1000.0;
        Some(Duration::try_from_secs_f64(wait).unwrap_or(Duration::MAX))
    }

    /// Handle removal records from the document observer.
    pub fn process_removals(&mut self) {
        let removed = match self.observer.as_mut() {
            Some(observer) => observer.take_records(),
            None => return,
        };
        if removed.is_empty() {
            return;
        }
        log::warn!(
            "Spinner nodes {:?} were removed from the document externally, detaching",
            removed
        );
        self.teardown();
    }

    pub(super) fn resume_playing(&mut self, now: f64) {
        self.engine.reanchor(now, self.config.clockwise);
        self.state = PlaybackState::Playing;
        self.draw_frame();
        self.timer = Some(Timer {
            next_due: now + self.engine.frame_delay(),
        });
        log::debug!(
            "Spinner playing from frame {:.3}, every {:.2}ms",
            self.engine.frame(),
            self.engine.frame_delay()
        );
    }

    /// Shared end of explicit and forced detach. Safe to call in any state.
    fn teardown(&mut self) -> Option<D::Node> {
        if !self.is_attached() {
            return None;
        }
        if self.is_playing() {
            let now = self.now();
            self.engine.advance(now);
        }
        self.timer = None;
        self.pending_autostart = false;
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
        self.state = PlaybackState::Detached;

        let node = self.insertion_point.clone()?;
        let restored = if self.document.is_connected(&self.container) {
            match self.document.replace_with(&self.container, &node) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("Could not restore {:?}: {}", node, e);
                    false
                }
            }
        } else {
            log::debug!("Container already gone, nothing to restore");
            false
        };

        // Keep the surface inside the container for the next attach
        if self.document.parent_of(&self.canvas).as_ref() != Some(&self.container) {
            if let Err(e) = self.document.append_child(&self.container, &self.canvas) {
                log::error!("Could not reclaim the drawing surface: {}", e);
            }
        }

        log::debug!("Spinner detached");
        restored.then_some(node)
    }
}
