//! Opens the X connection, claims substructure redirection on the root,
//! installs the error handler, and allocates cursors and colors. Lifetime
//! is process-wide (built once at startup, never rebuilt).

use lazy_static::lazy_static;
use libc::{c_char, c_int};
use std::ffi::CString;
use std::sync::Mutex;
use x11::cursorfont::{XC_fleur, XC_left_ptr, XC_sizing};
use x11::xlib::{
    self, BadAccess, ButtonPressMask, Colormap, Cursor, Display, KeyPressMask,
    SubstructureNotifyMask, SubstructureRedirectMask, Window, XAllocNamedColor, XCloseDisplay,
    XClearWindow, XCreateFontCursor, XDefaultColormap, XDefaultRootWindow, XDefaultScreen,
    XDisplayHeight, XDisplayWidth, XErrorEvent, XGetErrorText, XOpenDisplay, XSelectInput,
    XSetErrorHandler, XSetWindowBackground, XSync,
};

lazy_static! {
    /// Set by the installed error handler when a startup BadAccess is seen
    /// (another window manager already holds substructure redirection).
    /// The error handler itself cannot unwind the call stack, so this flag
    /// is the join point back to `main`.
    static ref WM_DETECTED: Mutex<bool> = Mutex::new(false);
}

/// The eight named pixel values, plus the desktop background.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub active_frame: u64,
    pub inactive_frame: u64,
    pub active_title: u64,
    pub inactive_title: u64,
    pub active_title_border: u64,
    pub inactive_title_border: u64,
    pub desktop_background: u64,
    pub window_background: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Cursors {
    pub normal: Cursor,
    pub title_drag: Cursor,
    pub frame_resize: Cursor,
}

/// Process-wide X11 resources: the display connection, the root window id,
/// cursor handles and the color palette.
#[derive(Debug)]
pub struct Session {
    pub display: *mut Display,
    pub root: Window,
    pub screen_width: i32,
    pub screen_height: i32,
    pub cursors: Cursors,
    pub palette: Palette,
}

impl Session {
    /// Opens the default display named by `DISPLAY`. Returns `None` if the
    /// display name is empty or the connection cannot be opened (the
    /// caller is expected to log at Error and exit 1).
    /// `colors` names the eight pixels to allocate, resolved from config
    /// with compiled-in defaults.
    pub fn open(colors: &crate::config::ColorNames) -> Option<Self> {
        let display = unsafe { XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            return None;
        }

        let root = unsafe { XDefaultRootWindow(display) };
        let screen = unsafe { XDefaultScreen(display) };
        let screen_width = unsafe { XDisplayWidth(display, screen) };
        let screen_height = unsafe { XDisplayHeight(display, screen) };

        debug!("Display {:?} Root {:?} Screen {}x{}", display, root, screen_width, screen_height);

        let cursors = unsafe {
            Cursors {
                normal: XCreateFontCursor(display, XC_left_ptr),
                title_drag: XCreateFontCursor(display, XC_fleur),
                frame_resize: XCreateFontCursor(display, XC_sizing),
            }
        };

        let colormap = unsafe { XDefaultColormap(display, screen) };
        let palette = Palette {
            active_frame: alloc_color(display, colormap, &colors.active_frame),
            inactive_frame: alloc_color(display, colormap, &colors.inactive_frame),
            active_title: alloc_color(display, colormap, &colors.active_title),
            inactive_title: alloc_color(display, colormap, &colors.inactive_title),
            active_title_border: alloc_color(display, colormap, &colors.active_title_border),
            inactive_title_border: alloc_color(display, colormap, &colors.inactive_title_border),
            desktop_background: alloc_color(display, colormap, &colors.desktop_background),
            window_background: alloc_color(display, colormap, &colors.window_background),
        };

        Some(Session {
            display,
            root,
            screen_width,
            screen_height,
            cursors,
            palette,
        })
    }

    /// Claims the window-manager role: installs the error handler, selects
    /// substructure redirection on the root, and flushes synchronously so a
    /// startup BadAccess is delivered before any further work.
    ///
    /// Returns `false` if another window manager already holds redirection.
    pub fn claim_redirection(&self) -> bool {
        unsafe {
            XSetErrorHandler(Some(on_x_error));

            XSelectInput(
                self.display,
                self.root,
                SubstructureRedirectMask | SubstructureNotifyMask | ButtonPressMask | KeyPressMask,
            );

            XSync(self.display, 0);
        }

        !*WM_DETECTED.lock().unwrap()
    }

    /// Sets the root background pixel and clears the root to force a
    /// repaint.
    pub fn paint_desktop(&self) {
        unsafe {
            XSetWindowBackground(self.display, self.root, self.palette.desktop_background);
            XClearWindow(self.display, self.root);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        unsafe {
            XCloseDisplay(self.display);
        }
        info!("Closed display OK");
    }
}

fn alloc_color(display: *mut Display, colormap: Colormap, name: &str) -> u64 {
    let cname = match CString::new(name) {
        Ok(c) => c,
        Err(_) => return 0,
    };
    let mut exact: xlib::XColor = unsafe { std::mem::zeroed() };
    let mut screen: xlib::XColor = unsafe { std::mem::zeroed() };
    let ok = unsafe {
        XAllocNamedColor(display, colormap, cname.as_ptr(), &mut screen, &mut exact)
    };
    if ok == 0 {
        error!("Could not allocate color {:?}", name);
        0
    } else {
        screen.pixel
    }
}

/// Installed as the Xlib error handler for the whole process lifetime.
/// BadAccess from the startup `XSelectInput` call means another window
/// manager already claimed substructure redirection; every other error is
/// logged at Warn and swallowed.
unsafe extern "C" fn on_x_error(display: *mut Display, event: *mut XErrorEvent) -> c_int {
    let code = (*event).error_code;
    if code as c_int == BadAccess {
        error!("Another window manager is already running");
        *WM_DETECTED.lock().unwrap() = true;
        return 0;
    }

    const BUF_LEN: usize = 256;
    let mut buf: [c_char; BUF_LEN] = [0; BUF_LEN];
    XGetErrorText(display, code as c_int, buf.as_mut_ptr(), BUF_LEN as c_int);
    let text = std::ffi::CStr::from_ptr(buf.as_ptr())
        .to_string_lossy()
        .into_owned();
    warn!("X error {}: {}", code, text);
    0
}
