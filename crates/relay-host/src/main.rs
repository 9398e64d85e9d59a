//! Input-Relay controlling host entry point.
//!
//! Loads the configuration, resolves the selected target, and starts the
//! Tokio runtime.  On Windows a dedicated thread installs the low-level mouse
//! hook and pumps its message loop; captured events flow through the
//! [`ForwardingObserver`] into a bounded queue drained by a Tokio task.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- targets, selection, capture settings
//!  └─ SelectedTarget::resolve()
//!  └─ start services
//!       ├─ relay-hook-loop   (OS thread: InputHook + message loop)
//!       └─ drain_to_log      (Tokio task)
//! ```

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use relay_host::application::forward_input::{drain_to_log, ForwardingObserver};
use relay_host::application::manage_targets::TargetList;
use relay_host::application::select_target::SelectedTarget;
use relay_host::infrastructure::storage::config::{self, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = config::load_config();
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.host.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    info!("Input-Relay host starting");

    let mut cfg = loaded.unwrap_or_else(|e| {
        warn!("failed to load config, using defaults: {e}");
        AppConfig::default()
    });

    // ── Target selection ──────────────────────────────────────────────────────
    let targets = TargetList::from_saved(&cfg.targets);
    info!(saved = targets.len(), "loaded saved targets");

    let mut selected = SelectedTarget::new();
    let mut selected_position = None;
    if let Some(index) = cfg.selected_target {
        match targets
            .position_of_saved(&cfg.targets, index)
            .and_then(|position| selected.select_saved(&targets, position).map(|()| position))
        {
            Ok(position) => selected_position = Some(position),
            Err(e) => warn!("selected_target {index} ignored: {e}"),
        }
    }

    // Write back the deduplicated list so the stored selection index matches it.
    if targets.len() != cfg.targets.len() || selected_position != cfg.selected_target {
        cfg.targets = targets.to_saved();
        cfg.selected_target = selected_position;
        match config::save_config(&cfg) {
            Ok(()) => info!("saved normalised target list"),
            Err(e) => warn!("failed to save normalised config: {e}"),
        }
    }

    let address = match selected.resolve() {
        Ok(address) => address,
        Err(e) => {
            error!("cannot relay input: {e}");
            anyhow::bail!("no usable target configured: {e}");
        }
    };
    info!(%address, "relaying input to selected target");

    // ── Forward queue ─────────────────────────────────────────────────────────
    let (observer, control, rx) = ForwardingObserver::new(
        cfg.capture.forward_queue_capacity,
        cfg.capture.suppress_while_forwarding,
    );
    let relay = tokio::spawn(drain_to_log(rx, address));

    // ── Capture ───────────────────────────────────────────────────────────────
    let hook_thread = capture::start(observer).await?;
    control.set_active(true);

    info!("Input-Relay host ready.  Press Ctrl-C to exit.");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    control.set_active(false);
    hook_thread.stop().await?;

    let relayed = relay.await?;
    info!(relayed, dropped = control.dropped(), "Input-Relay host stopped");
    Ok(())
}

#[cfg(target_os = "windows")]
mod capture {
    //! Hook thread management for the Windows low-level mouse hook.

    use anyhow::Context;
    use tokio::sync::oneshot;
    use tracing::info;

    use relay_host::application::forward_input::ForwardingObserver;
    use relay_host::infrastructure::input_capture::windows as win_hook;
    use relay_host::infrastructure::input_capture::{HookError, InputHook};

    /// The running hook thread and the id used to stop its message loop.
    pub struct HookThread {
        thread_id: u32,
        join: std::thread::JoinHandle<()>,
    }

    /// Spawns `relay-hook-loop`, installs the hook there, and waits for the
    /// installation outcome.
    pub async fn start(observer: ForwardingObserver) -> anyhow::Result<HookThread> {
        let (ready_tx, ready_rx) = oneshot::channel::<Result<u32, HookError>>();

        let join = std::thread::Builder::new()
            .name("relay-hook-loop".to_string())
            .spawn(move || {
                let mut hook = InputHook::new(win_hook::WindowsMouseHookSource::new());
                hook.subscribe(observer);
                let handle = match hook.install() {
                    Ok(handle) => handle,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(win_hook::current_thread_id()));
                win_hook::run_message_loop();
                hook.uninstall(&handle);
            })
            .context("failed to spawn hook thread")?;

        let thread_id = ready_rx
            .await
            .context("hook thread exited before reporting")?
            .context("cannot capture mouse input")?;
        info!(thread_id, "mouse hook active");

        Ok(HookThread { thread_id, join })
    }

    impl HookThread {
        /// Ends the message loop and waits for the hook to be removed.
        pub async fn stop(self) -> anyhow::Result<()> {
            win_hook::post_quit(self.thread_id).context("failed to stop hook thread")?;
            let join = self.join;
            tokio::task::spawn_blocking(move || join.join())
                .await?
                .map_err(|_| anyhow::anyhow!("hook thread panicked"))?;
            Ok(())
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod capture {
    //! Low-level capture has no backend on this platform.

    use relay_host::application::forward_input::ForwardingObserver;

    pub struct HookThread;

    pub async fn start(_observer: ForwardingObserver) -> anyhow::Result<HookThread> {
        anyhow::bail!("low-level mouse capture is only supported on Windows")
    }

    impl HookThread {
        pub async fn stop(self) -> anyhow::Result<()> {
            Ok(())
        }
    }
}
