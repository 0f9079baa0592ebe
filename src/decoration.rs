//! Creates/destroys the frame+title pair around a client and reparents the
//! client into the frame.

use crate::geometry::Geometry;
use crate::registry::{DecorationTriple, Registry};
use crate::session::Session;
use libc::c_uint;
use x11::xlib::{
    AnyModifier, Button1, Button1MotionMask, ButtonPressMask, ButtonReleaseMask,
    Display, ExposureMask, FocusChangeMask, GrabModeAsync, GrabModeSync, SubstructureNotifyMask,
    SubstructureRedirectMask, Window, XAddToSaveSet, XCreateSimpleWindow, XDefineCursor,
    XDestroyWindow, XGetWindowAttributes, XGrabButton, XMapWindow, XReparentWindow, XSelectInput,
    XUnmapWindow, XWindowAttributes,
};

/// Idempotent: a client already present in the registry is left untouched.
pub fn frame(session: &Session, registry: &mut Registry, geometry: &Geometry, client: Window) {
    if registry.contains_client(client) {
        debug!("frame: {:?} already framed, ignoring", client);
        return;
    }

    let attrs = match get_attributes(session.display, client) {
        Some(a) => a,
        None => {
            warn!("frame: could not fetch attributes for {:?}", client);
            return;
        }
    };

    let display = session.display;
    let inner = geometry.inner_border;
    let title_height = geometry.title_height;
    let border_width = geometry.frame_border_width;

    let title = unsafe {
        XCreateSimpleWindow(
            display,
            session.root,
            attrs.x,
            attrs.y,
            (attrs.width - 2 * inner).max(1) as c_uint,
            (title_height - 2 * inner).max(1) as c_uint,
            inner as c_uint,
            session.palette.inactive_title_border,
            session.palette.inactive_title,
        )
    };

    let frame_x = (attrs.x - border_width).max(0);
    let frame_y = (attrs.y - (title_height + border_width)).max(0);

    let frame = unsafe {
        XCreateSimpleWindow(
            display,
            session.root,
            frame_x,
            frame_y,
            attrs.width as c_uint,
            (attrs.height + title_height) as c_uint,
            border_width as c_uint,
            session.palette.inactive_frame,
            session.palette.window_background,
        )
    };

    unsafe {
        XSelectInput(
            display,
            title,
            ButtonPressMask | ButtonReleaseMask | Button1MotionMask | ExposureMask,
        );
        XSelectInput(
            display,
            frame,
            ButtonPressMask
                | ButtonReleaseMask
                | Button1MotionMask
                | FocusChangeMask
                | SubstructureRedirectMask
                | SubstructureNotifyMask,
        );

        XDefineCursor(display, title, session.cursors.title_drag);
        XDefineCursor(display, frame, session.cursors.frame_resize);

        XReparentWindow(display, title, frame, 0, 0);
        XReparentWindow(display, client, frame, 0, title_height);

        XMapWindow(display, title);
        XMapWindow(display, frame);

        XAddToSaveSet(display, client);

        // Focus trap: a passive grab of button 1 so the manager sees the
        // first click on an unfocused client before it reaches the client.
        XGrabButton(
            display,
            Button1 as u32,
            AnyModifier,
            client,
            0,
            (ButtonPressMask) as u32,
            GrabModeSync,
            GrabModeAsync,
            0,
            0,
        );
    }

    registry.insert(DecorationTriple {
        title,
        client,
        frame,
    });

    info!(
        "Framed client {:?} as frame {:?} title {:?}",
        client, frame, title
    );
}

/// No-op if the client is absent. The client itself is not destroyed; the
/// server reparents it back to root as part of destroying the frame.
pub fn unframe(session: &Session, registry: &mut Registry, client: Window) {
    let triple = match registry.remove_by_client(client) {
        Some(t) => t,
        None => return,
    };

    unsafe {
        XUnmapWindow(session.display, triple.frame);
        XDestroyWindow(session.display, triple.frame);
    }

    info!("Unframed client {:?}", client);
}

/// Re-arms the focus trap on a client (used when focus moves away from it).
pub fn arm_focus_trap(display: *mut Display, client: Window) {
    unsafe {
        XGrabButton(
            display,
            Button1 as u32,
            AnyModifier,
            client,
            0,
            (ButtonPressMask) as u32,
            GrabModeSync,
            GrabModeAsync,
            0,
            0,
        );
    }
}

/// Releases the focus trap on a client (used when the client itself is
/// clicked and should receive subsequent presses directly).
pub fn disarm_focus_trap(display: *mut Display, client: Window) {
    unsafe {
        x11::xlib::XUngrabButton(display, Button1 as u32, AnyModifier, client);
    }
}

fn get_attributes(display: *mut Display, window: Window) -> Option<XWindowAttributes> {
    let mut attrs: XWindowAttributes = unsafe { std::mem::zeroed() };
    let ok = unsafe { XGetWindowAttributes(display, window, &mut attrs) };
    if ok == 0 {
        None
    } else {
        Some(attrs)
    }
}
