//! Paints active/inactive decoration colors, redraws the title text, and
//! manages the click-to-focus trap.

use crate::decoration::arm_focus_trap;
use crate::registry::Registry;
use crate::session::Session;
use libc::c_int;
use x11::xlib::{
    RevertToNone, Window, XClearWindow, XDefaultGC, XDrawString, XFetchName, XFree,
    XRaiseWindow, XSetInputFocus, XSetWindowBackground, XSetWindowBorder,
};

const TITLE_TEXT_X: c_int = 2;
const TITLE_TEXT_Y: c_int = 13;

/// No-op for an unregistered client (a root click, or an orphaned window).
pub fn focus_and_raise(session: &Session, registry: &Registry, client: Window) {
    let triple = match registry.lookup_by_client(client) {
        Some(t) => t,
        None => return,
    };

    unsafe {
        XSetInputFocus(session.display, triple.client, RevertToNone, 0);
        XRaiseWindow(session.display, triple.frame);
    }
}

/// Paints the active colors and redraws the title text.
pub fn on_focus_in(session: &Session, registry: &Registry, frame: Window) {
    let triple = match registry.lookup_by_frame(frame) {
        Some(t) => t,
        None => return,
    };

    let status = unsafe {
        XSetWindowBorder(session.display, triple.frame, session.palette.active_frame)
    };
    if status == 0 {
        // The frame has been destroyed asynchronously; abort remaining paints.
        return;
    }

    unsafe {
        XSetWindowBackground(session.display, triple.title, session.palette.active_title);
        XSetWindowBorder(
            session.display,
            triple.title,
            session.palette.active_title_border,
        );
        XClearWindow(session.display, triple.title);
    }

    redraw_title(session, triple.title, triple.client);
}

/// Symmetric with `on_focus_in`, using inactive colors, and re-arms the
/// focus trap on the client.
pub fn on_focus_out(session: &Session, registry: &Registry, frame: Window) {
    let triple = match registry.lookup_by_frame(frame) {
        Some(t) => t,
        None => return,
    };

    let status = unsafe {
        XSetWindowBorder(session.display, triple.frame, session.palette.inactive_frame)
    };
    if status == 0 {
        return;
    }

    unsafe {
        XSetWindowBackground(
            session.display,
            triple.title,
            session.palette.inactive_title,
        );
        XSetWindowBorder(
            session.display,
            triple.title,
            session.palette.inactive_title_border,
        );
        XClearWindow(session.display, triple.title);
    }

    redraw_title(session, triple.title, triple.client);
    arm_focus_trap(session.display, triple.client);
}

/// Redraws the client's current name if `title` is a known title window.
pub fn on_expose(session: &Session, registry: &Registry, title: Window) {
    let triple = match registry.lookup_by_title(title) {
        Some(t) => t,
        None => return,
    };
    redraw_title(session, triple.title, triple.client);
}

fn redraw_title(session: &Session, title: Window, client: Window) {
    let name = fetch_name(session.display, client);
    if name.is_empty() {
        return;
    }

    unsafe {
        let gc = XDefaultGC(session.display, x11::xlib::XDefaultScreen(session.display));
        XDrawString(
            session.display,
            title,
            gc,
            TITLE_TEXT_X,
            TITLE_TEXT_Y,
            name.as_ptr() as *const libc::c_char,
            name.len() as c_int,
        );
    }
}

/// Fetches a window's name via `XFetchName`. A failure (no name property
/// set) is treated as an empty name; callers paint nothing for it.
fn fetch_name(display: *mut x11::xlib::Display, window: Window) -> String {
    let mut ptr: *mut libc::c_char = std::ptr::null_mut();
    let ok = unsafe { XFetchName(display, window, &mut ptr) };
    if ok == 0 || ptr.is_null() {
        return String::new();
    }
    let name = unsafe { std::ffi::CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned();
    unsafe {
        XFree(ptr as *mut libc::c_void);
    }
    name
}
