//! Windows low-level mouse hook source.
//!
//! Installs a `WH_MOUSE_LL` hook on the calling thread.  Windows delivers the
//! hook callback on that same thread while it pumps messages, so the caller
//! must run [`run_message_loop`] after installing; this module never spawns a
//! thread of its own.  [`post_quit`] ends the loop from any thread.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use relay_core::{EventFlags, Point, RawInputEvent};
use tracing::warn;
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, HC_ACTION, HHOOK, LLMHF_INJECTED, MSG, MSLLHOOKSTRUCT, WH_MOUSE_LL,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEHWHEEL, WM_MOUSEMOVE,
    WM_MOUSEWHEEL, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
};

use super::{HookDispatcher, HookError, HookSource};

/// Dispatcher fed by the hook callback.  Windows allows one callback pointer
/// per hook, so the process holds at most one active dispatcher.
static DISPATCHER: RwLock<Option<Arc<HookDispatcher>>> = RwLock::new(None);

/// [`HookSource`] backed by `SetWindowsHookExW(WH_MOUSE_LL)`.
#[derive(Default)]
pub struct WindowsMouseHookSource {
    hook: Option<HHOOK>,
}

impl WindowsMouseHookSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HookSource for WindowsMouseHookSource {
    fn register(&mut self, dispatcher: Arc<HookDispatcher>) -> Result<(), HookError> {
        let mut slot = DISPATCHER.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(HookError::AlreadyInstalled);
        }

        // SAFETY: `mouse_hook_proc` matches HOOKPROC and lives for the whole
        // program.  Low-level hooks accept a null module with thread id 0.
        let hook = unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) }
            .map_err(|e| HookError::PermissionDenied(e.to_string()))?;

        *slot = Some(dispatcher);
        self.hook = Some(hook);
        Ok(())
    }

    fn unregister(&mut self) {
        if let Some(hook) = self.hook.take() {
            // SAFETY: `hook` was returned by SetWindowsHookExW and is removed once.
            if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
                warn!("UnhookWindowsHookEx failed: {e}");
            }
        }
        *DISPATCHER.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Pumps messages on the current thread until [`post_quit`] is called for it.
///
/// The hook callback only runs while this loop is pumping.
pub fn run_message_loop() {
    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
    }
}

/// Id of the calling thread, for use with [`post_quit`].
pub fn current_thread_id() -> u32 {
    // SAFETY: GetCurrentThreadId has no preconditions.
    unsafe { GetCurrentThreadId() }
}

/// Asks the message loop running on `thread_id` to exit.
pub fn post_quit(thread_id: u32) -> windows::core::Result<()> {
    // SAFETY: Posting WM_QUIT carries no pointers.
    unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
}

/// Maps a low-level mouse window message to [`EventFlags`] bits.
fn flags_for_message(message: u32) -> Option<u32> {
    let flags = match message {
        WM_MOUSEMOVE => EventFlags::MOVE,
        WM_LBUTTONDOWN => EventFlags::LEFT_DOWN,
        WM_LBUTTONUP => EventFlags::LEFT_UP,
        WM_RBUTTONDOWN => EventFlags::RIGHT_DOWN,
        WM_RBUTTONUP => EventFlags::RIGHT_UP,
        WM_MBUTTONDOWN => EventFlags::MIDDLE_DOWN,
        WM_MBUTTONUP => EventFlags::MIDDLE_UP,
        WM_XBUTTONDOWN => EventFlags::X_DOWN,
        WM_XBUTTONUP => EventFlags::X_UP,
        WM_MOUSEWHEEL => EventFlags::WHEEL,
        WM_MOUSEHWHEEL => EventFlags::HWHEEL,
        _ => return None,
    };
    Some(flags)
}

/// Builds the portable event for one hook notification.
fn event_from_hook(message: u32, info: &MSLLHOOKSTRUCT) -> Option<RawInputEvent> {
    let mut flags = EventFlags(flags_for_message(message)?);
    if info.flags & LLMHF_INJECTED != 0 {
        flags = flags | EventFlags::INJECTED;
    }
    Some(RawInputEvent::new(
        Point::new(info.pt.x, info.pt.y),
        info.mouseData,
        flags,
        info.time,
        info.dwExtraInfo as u64,
    ))
}

/// Runs the active dispatcher; `true` means suppress the event.
///
/// Never unwinds: a panic anywhere in dispatch lets the event through.
fn dispatch_to_observers(event: &RawInputEvent) -> bool {
    let dispatcher = DISPATCHER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let Some(dispatcher) = dispatcher else {
        return false;
    };
    panic::catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(event).handled)).unwrap_or(false)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows on the installing thread while it pumps messages.  It
/// must return quickly or Windows silently removes the hook.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: Must call CallNextHookEx when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
    let info = &*(l_param.0 as *const MSLLHOOKSTRUCT);

    let suppress = match event_from_hook(w_param.0 as u32, info) {
        Some(event) => dispatch_to_observers(&event),
        None => false,
    };
    if suppress {
        return LRESULT(1);
    }

    // SAFETY: Forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
