//! Layered Win32 host window
//!
//! A borderless, topmost popup whose pixels come straight from the
//! rasterizer through `UpdateLayeredWindow`, so the glass panel's rounded
//! corners and shadow blend with the desktop behind it.

#![allow(unsafe_op_in_unsafe_fn)]

use std::ffi::c_void;
use std::slice;

use tiny_skia::Pixmap;
use windows::core::w;
use windows::Win32::Foundation::{
    COLORREF, GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, SIZE, WIN32_ERROR, WPARAM,
};
use windows::Win32::Graphics::Gdi::{
    AC_SRC_ALPHA, AC_SRC_OVER, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION, CreateCompatibleDC,
    CreateDIBSection, DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, HGDIOBJ, ReleaseDC, SelectObject,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::domain::core::Vec2;
use crate::input::{InputCollector, Key, RawInput};
use crate::platform::{HostWindow, PlatformError};

// Matches the Win32 ERROR_CLASS_ALREADY_EXISTS (1410) code.
const CLASS_ALREADY_EXISTS_ERR: WIN32_ERROR = WIN32_ERROR(1410);

/// Events recorded by the window procedure between pumps
#[derive(Debug, Default)]
struct WindowState {
    events: Vec<RawInput>,
    open: bool,
}

pub struct LayeredWindow {
    hwnd: HWND,
    size: (u32, u32),
    state: *mut WindowState,
}

impl LayeredWindow {
    /// Creates and shows the window centered on the primary display
    pub fn new(size: (u32, u32)) -> Result<Self, PlatformError> {
        let state = Box::into_raw(Box::new(WindowState {
            events: Vec::new(),
            open: true,
        }));

        match unsafe { create_layered_window(size, state) } {
            Ok(hwnd) => {
                unsafe {
                    ShowWindow(hwnd, SW_SHOW);
                }
                tracing::info!(width = size.0, height = size.1, "layered window created");
                Ok(Self { hwnd, size, state })
            }
            Err(err) => {
                drop(unsafe { Box::from_raw(state) });
                Err(err)
            }
        }
    }

    fn state(&mut self) -> &mut WindowState {
        unsafe { &mut *self.state }
    }
}

unsafe fn create_layered_window(size: (u32, u32), state: *mut WindowState) -> Result<HWND, PlatformError> {
    let module = GetModuleHandleW(None).map_err(|e| PlatformError::Win32Error(format!("{:?}", e)))?;
    let instance: HINSTANCE = module.into();

    register_layered_class(instance)?;

    let (width, height) = (size.0 as i32, size.1 as i32);
    let x = (GetSystemMetrics(SM_CXSCREEN) - width).max(0) / 2;
    let y = (GetSystemMetrics(SM_CYSCREEN) - height).max(0) / 2;

    let hwnd = CreateWindowExW(
        WS_EX_LAYERED | WS_EX_TOPMOST,
        w!("EmberGateLayeredWindow"),
        w!("Ember Gate"),
        WS_POPUP | WS_MINIMIZEBOX,
        x,
        y,
        width,
        height,
        None,
        None,
        instance,
        Some(state as *const c_void),
    );

    if hwnd.0 == 0 {
        return Err(PlatformError::WindowCreationFailed);
    }

    Ok(hwnd)
}

fn register_layered_class(instance: HINSTANCE) -> Result<(), PlatformError> {
    unsafe {
        let wnd_class = WNDCLASSW {
            lpfnWndProc: Some(layered_wnd_proc),
            hInstance: instance,
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            lpszClassName: w!("EmberGateLayeredWindow"),
            ..Default::default()
        };

        if RegisterClassW(&wnd_class) == 0 {
            match GetLastError() {
                Err(err) if err.code() == CLASS_ALREADY_EXISTS_ERR.to_hresult() => {}
                _ => return Err(PlatformError::ClassRegistrationFailed),
            }
        }
    }

    Ok(())
}

unsafe extern "system" fn layered_wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_CREATE => {
            let createstruct = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, createstruct.lpCreateParams as isize);
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            push_event(hwnd, pointer_moved(lparam));
            LRESULT(0)
        }
        WM_LBUTTONDOWN => {
            // Keep receiving moves while dragging outside the window
            SetCapture(hwnd);
            push_event(hwnd, pointer_moved(lparam));
            push_event(hwnd, RawInput::PointerDown);
            LRESULT(0)
        }
        WM_LBUTTONUP => {
            let _ = ReleaseCapture();
            push_event(hwnd, pointer_moved(lparam));
            push_event(hwnd, RawInput::PointerUp);
            LRESULT(0)
        }
        WM_CHAR => {
            if let Some(c) = char::from_u32(wparam.0 as u32) {
                push_event(hwnd, RawInput::Char(c));
            }
            LRESULT(0)
        }
        WM_KEYDOWN => {
            if let Some(key) = Key::from_vk_code(wparam.0 as u32) {
                push_event(hwnd, RawInput::KeyDown(key));
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            // The session fades out first; the window is destroyed afterwards.
            push_event(hwnd, RawInput::CloseRequested);
            LRESULT(0)
        }
        WM_DESTROY => {
            if let Some(state) = window_state_mut(hwnd) {
                state.open = false;
            }
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

unsafe fn window_state_mut(hwnd: HWND) -> Option<&'static mut WindowState> {
    let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut WindowState;
    if ptr.is_null() { None } else { Some(&mut *ptr) }
}

unsafe fn push_event(hwnd: HWND, event: RawInput) {
    if let Some(state) = window_state_mut(hwnd) {
        state.events.push(event);
    }
}

/// Client coordinates from the message, screen coordinates from the cursor
unsafe fn pointer_moved(lparam: LPARAM) -> RawInput {
    let x = (lparam.0 & 0xFFFF) as u16 as i16 as f32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16 as f32;

    let mut cursor = POINT::default();
    let screen = if GetCursorPos(&mut cursor).is_ok() {
        (cursor.x, cursor.y)
    } else {
        (0, 0)
    };

    RawInput::PointerMoved {
        local: Vec2::new(x, y),
        screen,
    }
}

impl HostWindow for LayeredWindow {
    fn pump(&mut self, input: &mut InputCollector) {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    self.state().events.push(RawInput::CloseRequested);
                    break;
                }
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        for event in self.state().events.drain(..) {
            input.feed(event);
        }
    }

    /// Present the pixmap via UpdateLayeredWindow for flicker-free rendering
    fn present(&mut self, pixmap: &Pixmap) -> Result<(), PlatformError> {
        let actual = (pixmap.width(), pixmap.height());
        if actual != self.size {
            return Err(PlatformError::FrameSizeMismatch {
                expected: self.size,
                actual,
            });
        }

        let width = pixmap.width() as i32;
        let height = pixmap.height() as i32;

        unsafe {
            let screen_dc = GetDC(HWND(0));
            if screen_dc.0 == 0 {
                return Err(PlatformError::DeviceContextFailed);
            }

            let memory_dc = CreateCompatibleDC(screen_dc);
            if memory_dc.0 == 0 {
                ReleaseDC(HWND(0), screen_dc);
                return Err(PlatformError::MemoryDeviceContextFailed);
            }

            let mut bitmap_info = BITMAPINFO::default();
            bitmap_info.bmiHeader = BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // top-down bitmap so rows copy directly
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            };

            let mut pixel_ptr: *mut c_void = std::ptr::null_mut();
            let dib = match CreateDIBSection(memory_dc, &bitmap_info, DIB_RGB_COLORS, &mut pixel_ptr, None, 0) {
                Ok(bitmap) => bitmap,
                Err(_) => {
                    DeleteDC(memory_dc);
                    ReleaseDC(HWND(0), screen_dc);
                    return Err(PlatformError::DibSectionCreationFailed);
                }
            };

            let dib_object: HGDIOBJ = dib.into();

            if pixel_ptr.is_null() {
                DeleteObject(dib_object);
                DeleteDC(memory_dc);
                ReleaseDC(HWND(0), screen_dc);
                return Err(PlatformError::DibSectionCreationFailed);
            }

            {
                // tiny-skia is premultiplied RGBA, the DIB premultiplied BGRA
                let dst = slice::from_raw_parts_mut(pixel_ptr as *mut u8, pixmap.data().len());
                for (out, px) in dst.chunks_exact_mut(4).zip(pixmap.data().chunks_exact(4)) {
                    out.copy_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            }

            let old_bitmap = SelectObject(memory_dc, dib_object);
            if old_bitmap.0 == 0 {
                DeleteObject(dib_object);
                DeleteDC(memory_dc);
                ReleaseDC(HWND(0), screen_dc);
                return Err(PlatformError::BitmapSelectionFailed);
            }

            let size = SIZE {
                cx: width,
                cy: height,
            };
            let src_point = POINT { x: 0, y: 0 };
            let blend = BLENDFUNCTION {
                BlendOp: AC_SRC_OVER as u8,
                BlendFlags: 0,
                SourceConstantAlpha: 255,
                AlphaFormat: AC_SRC_ALPHA as u8,
            };

            // No destination point: the window keeps its current position.
            let update_result = UpdateLayeredWindow(
                self.hwnd,
                screen_dc,
                None,
                Some(&size),
                memory_dc,
                Some(&src_point),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            );

            // Clean up GDI objects
            SelectObject(memory_dc, old_bitmap);
            DeleteObject(dib_object);
            DeleteDC(memory_dc);
            ReleaseDC(HWND(0), screen_dc);

            if update_result.is_err() {
                return Err(PlatformError::LayerUpdateFailed);
            }
        }

        Ok(())
    }

    fn minimize(&mut self) {
        unsafe {
            ShowWindow(self.hwnd, SW_MINIMIZE);
        }
    }

    fn move_by(&mut self, dx: i32, dy: i32) {
        unsafe {
            let mut rect = RECT::default();
            if GetWindowRect(self.hwnd, &mut rect).is_err() {
                tracing::warn!("failed to read window position");
                return;
            }
            if let Err(err) = SetWindowPos(
                self.hwnd,
                HWND(0),
                rect.left + dx,
                rect.top + dy,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            ) {
                tracing::warn!(error = ?err, "failed to move window");
            }
        }
    }

    fn is_open(&self) -> bool {
        unsafe { (*self.state).open }
    }

    fn close(&mut self) {
        if self.is_open() {
            unsafe {
                DestroyWindow(self.hwnd).ok();
            }
        }
    }
}

impl Drop for LayeredWindow {
    fn drop(&mut self) {
        self.close();
        // WM_DESTROY has run by now; nothing references the state any more.
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            drop(Box::from_raw(self.state));
        }
    }
}
