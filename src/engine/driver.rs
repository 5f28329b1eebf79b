//! Async loop feeding an engine from an input channel

use super::PreviewEngine;
use crate::bridge::IncomingMessage;
use crate::project::ArtifactSource;
use crate::sandbox::ExecutionContext;
use crate::scheduler::PreviewMode;
use crate::utils::Result;
use std::ops::ControlFlow;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};

/// Events delivered to a running preview
#[derive(Debug, Clone)]
pub enum PreviewInput {
    /// A source artifact or asset changed
    Changed,
    /// The refresh counter moved to this value
    Refresh(u64),
    SetMode { mode: PreviewMode, refresh_counter: u64 },
    /// A message posted by the surface
    Message(IncomingMessage),
    ClearDiagnostics,
    Unmount,
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

async fn sleep_until_opt(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Run the engine until `Unmount` arrives or every sender is dropped.
///
/// The initial mount waits for the runtime to be idle once. Pending
/// updates are cancelled on exit and the engine is handed back.
pub async fn drive<S, C>(
    mut engine: PreviewEngine<S, C>,
    mut inputs: UnboundedReceiver<PreviewInput>,
) -> Result<PreviewEngine<S, C>>
where
    S: ArtifactSource,
    C: ExecutionContext,
{
    tokio::task::yield_now().await;
    engine.mount(now())?;

    loop {
        if let Err(e) = engine.tick(now()) {
            log::warn!("preview update failed: {}", e);
        }

        tokio::select! {
            input = inputs.recv() => {
                let Some(input) = input else { break };
                if handle(&mut engine, input).is_break() {
                    break;
                }
            }
            _ = sleep_until_opt(engine.deadline()) => {}
        }
    }

    engine.unmount();
    Ok(engine)
}

/// Apply one input; `Break` ends the loop
fn handle<S, C>(engine: &mut PreviewEngine<S, C>, input: PreviewInput) -> ControlFlow<()>
where
    S: ArtifactSource,
    C: ExecutionContext,
{
    match input {
        PreviewInput::Changed => engine.notify_changed(now()),
        PreviewInput::Refresh(counter) => {
            engine.notify_refresh(counter, now());
        }
        PreviewInput::SetMode { mode, refresh_counter } => engine.set_mode(mode, refresh_counter),
        PreviewInput::Message(message) => {
            engine.receive_message(&message);
        }
        PreviewInput::ClearDiagnostics => engine.clear_diagnostics(),
        PreviewInput::Unmount => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}
