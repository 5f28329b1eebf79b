//! Preview engine wiring the pipeline together
//!
//! The PreviewEngine coordinates one preview surface:
//! 1. The scheduler decides when an update is due
//! 2. The synthesizer builds a document from the current source snapshot
//! 3. The sandbox host replaces the running document when it changed
//! 4. The diagnostics bridge follows the new document generation

mod driver;

pub use driver::{drive, PreviewInput};

use crate::bridge::{DiagnosticLog, DiagnosticsBridge, IncomingMessage, Receipt};
use crate::config::PreviewConfig;
use crate::project::ArtifactSource;
use crate::sandbox::{ApplyOutcome, ExecutionContext, SandboxHost};
use crate::scheduler::{PreviewMode, UpdateScheduler};
use crate::synth::Synthesizer;
use crate::utils::Result;
use std::time::Instant;

/// What a call to [`PreviewEngine::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing was due
    Idle,
    /// Due, but the document matched the one already running
    Unchanged,
    /// Due, but the execution context was not ready
    Skipped,
    Applied { generation: u64 },
}

pub struct PreviewEngine<S, C> {
    source: S,
    synthesizer: Synthesizer,
    host: SandboxHost<C>,
    scheduler: UpdateScheduler,
    bridge: DiagnosticsBridge,
    /// Mounted, but no document has been applied yet
    mount_pending: bool,
}

impl<S: ArtifactSource, C: ExecutionContext> PreviewEngine<S, C> {
    pub fn new(source: S, context: C, config: &PreviewConfig) -> Self {
        Self {
            source,
            synthesizer: Synthesizer::new(&config.bridge, config.capabilities.clone()),
            host: SandboxHost::new(context, config.policy.clone()),
            scheduler: UpdateScheduler::new(config.mode(), config.quiet_period()),
            bridge: DiagnosticsBridge::new(&config.bridge, &config.policy),
            mount_pending: false,
        }
    }

    /// Mount the surface and schedule the first render
    pub fn mount(&mut self, now: Instant) -> Result<()> {
        self.host.mount()?;
        self.scheduler.request_mount(now);
        self.mount_pending = true;
        Ok(())
    }

    /// A source artifact or asset changed.
    ///
    /// Until the first document is applied, a change renders right away in
    /// either mode.
    pub fn notify_changed(&mut self, now: Instant) {
        if self.mount_pending {
            log::debug!("first document still pending, rearming mount render");
            self.scheduler.request_mount(now);
        } else {
            self.scheduler.input_changed(now);
        }
    }

    /// The refresh counter moved
    pub fn notify_refresh(&mut self, counter: u64, now: Instant) -> bool {
        self.scheduler.refresh_requested(counter, now)
    }

    pub fn set_mode(&mut self, mode: PreviewMode, refresh_counter: u64) {
        self.scheduler.set_mode(mode, refresh_counter);
    }

    /// When [`PreviewEngine::tick`] next has work to do
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Run a due update, if any
    pub fn tick(&mut self, now: Instant) -> Result<UpdateOutcome> {
        if !self.scheduler.take_due(now) {
            return Ok(UpdateOutcome::Idle);
        }

        let html = self.synthesizer.synthesize(&self.source);
        if self.scheduler.is_unchanged(&html) {
            log::debug!("document unchanged, not reapplying");
            return Ok(UpdateOutcome::Unchanged);
        }

        match self.host.apply(&html)? {
            ApplyOutcome::Applied { generation } => {
                self.bridge.begin_generation(generation);
                self.scheduler.record_applied(html);
                self.mount_pending = false;
                Ok(UpdateOutcome::Applied { generation })
            }
            ApplyOutcome::Skipped => Ok(UpdateOutcome::Skipped),
        }
    }

    /// Hand a message from the surface to the diagnostics bridge
    pub fn receive_message(&mut self, message: &IncomingMessage) -> Receipt {
        self.bridge.receive(message)
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        self.bridge.log()
    }

    pub fn clear_diagnostics(&mut self) {
        self.bridge.clear();
    }

    /// Cancel pending updates and release the surface
    pub fn unmount(&mut self) {
        self.mount_pending = false;
        self.scheduler.cancel();
        self.bridge.tear_down();
        self.host.unmount();
    }

    pub fn mode(&self) -> PreviewMode {
        self.scheduler.mode()
    }

    /// Generation of the running document
    pub fn generation(&self) -> u64 {
        self.host.generation()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn host(&self) -> &SandboxHost<C> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut SandboxHost<C> {
        &mut self.host
    }

    pub fn bridge(&self) -> &DiagnosticsBridge {
        &self.bridge
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }
}
