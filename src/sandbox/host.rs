use super::{ExecutionContext, SandboxPolicy};
use crate::synth::markers::set_generation;
use crate::utils::SandboxError;

/// Lifecycle of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Unmounted,
    Mounted,
    Released,
}

/// Result of applying a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { generation: u64 },
    /// The context was not ready; nothing changed and no retry is queued
    Skipped,
}

/// Drives one execution context
pub struct SandboxHost<C> {
    context: C,
    policy: SandboxPolicy,
    state: HostState,
    generation: u64,
}

impl<C: ExecutionContext> SandboxHost<C> {
    pub fn new(context: C, policy: SandboxPolicy) -> Self {
        Self {
            context,
            policy,
            state: HostState::Unmounted,
            generation: 0,
        }
    }

    /// Validate the policy and configure the context
    pub fn mount(&mut self) -> Result<(), SandboxError> {
        match self.state {
            HostState::Mounted => return Ok(()),
            HostState::Released => return Err(SandboxError::Unmounted),
            HostState::Unmounted => {}
        }

        self.policy.validate()?;
        self.context.configure(&self.policy)?;
        self.state = HostState::Mounted;
        log::info!("sandbox mounted ({})", self.policy.sandbox_attribute());
        Ok(())
    }

    /// Replace the running document.
    ///
    /// The document gets the next generation number stamped into its
    /// diagnostics block before it is written.
    pub fn apply(&mut self, document: &str) -> Result<ApplyOutcome, SandboxError> {
        if self.state != HostState::Mounted {
            return Err(SandboxError::Unmounted);
        }
        if !self.context.is_ready() {
            log::debug!("execution context not ready, skipping update");
            return Ok(ApplyOutcome::Skipped);
        }

        let generation = self.generation + 1;
        let stamped = set_generation(document, generation);
        match self.context.replace_document(&stamped) {
            Ok(()) => {}
            Err(SandboxError::NotReady) => {
                log::debug!("execution context became unavailable, skipping update");
                return Ok(ApplyOutcome::Skipped);
            }
            Err(e) => return Err(e),
        }

        self.generation = generation;
        log::info!("applied document generation {} ({} bytes)", generation, stamped.len());
        Ok(ApplyOutcome::Applied { generation })
    }

    /// Release the context; later applies fail with `Unmounted`
    pub fn unmount(&mut self) {
        if self.state == HostState::Released {
            return;
        }
        self.context.release();
        self.state = HostState::Released;
        log::info!("sandbox released after generation {}", self.generation);
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    /// Generation of the document currently running; 0 before the first apply
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }
}
