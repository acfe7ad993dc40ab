use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use web_sys::{Document, Element, Event, HtmlElement, HtmlImageElement};

use promptgallery_core::{ClickTarget, OverlayState};

use crate::dom;

/// The page's single lightbox surface and its inner image.
pub(crate) struct Overlay {
    surface: HtmlElement,
    image: HtmlImageElement,
    state: RefCell<OverlayState>,
    listeners: RefCell<Vec<EventListener>>,
    debug: bool,
}

impl Overlay {
    fn show(&self, src: &str) {
        self.state.borrow_mut().enlarge(src);
        self.image.set_src(src);
        self.sync_display();
        if self.debug {
            gloo::console::debug!("lightbox: open", src.to_string());
        }
    }

    pub(crate) fn dismiss(&self) {
        let was_visible = self.state.borrow_mut().dismiss();
        self.sync_display();
        if self.debug && was_visible {
            gloo::console::debug!("lightbox: close");
        }
    }

    fn surface_click(&self, event: &Event) {
        let target = match event.target() {
            Some(target) if dom::is_same(&self.surface, &target) => ClickTarget::Surface,
            _ => ClickTarget::Descendant,
        };
        let closes = self.state.borrow_mut().surface_click(target);
        if closes {
            self.sync_display();
            if self.debug {
                gloo::console::debug!("lightbox: close (outside click)");
            }
        }
    }

    fn sync_display(&self) {
        let display = self.state.borrow().display();
        dom::set_style(&self.surface, "display", display);
    }

    fn install_dismissal(self: &Rc<Self>, close: Option<Element>) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(close) = close {
            let overlay = Rc::downgrade(self);
            listeners.push(EventListener::new(&close, "click", move |_event: &Event| {
                if let Some(overlay) = overlay.upgrade() {
                    overlay.dismiss();
                }
            }));
        }
        let overlay = Rc::downgrade(self);
        listeners.push(EventListener::new(
            &self.surface,
            "click",
            move |event: &Event| {
                if let Some(overlay) = overlay.upgrade() {
                    overlay.surface_click(event);
                }
            },
        ));
    }
}

/// Handle for wiring click-to-enlarge onto gallery images.
///
/// Inert when the page has no lightbox markup; every operation is then a no-op.
#[derive(Clone, Default)]
pub(crate) struct Enlarger {
    overlay: Option<Rc<Overlay>>,
}

impl Enlarger {
    pub(crate) fn install(document: &Document, debug: bool) -> Self {
        let surface = dom::element_by_id::<HtmlElement>(document, dom::OVERLAY_ID);
        let image = dom::element_by_id::<HtmlImageElement>(document, dom::OVERLAY_IMAGE_ID);
        let (Some(surface), Some(image)) = (surface, image) else {
            if debug {
                gloo::console::debug!("lightbox: no overlay markup on this page");
            }
            return Self::default();
        };
        let overlay = Rc::new(Overlay {
            surface,
            image,
            state: RefCell::new(OverlayState::Hidden),
            listeners: RefCell::new(Vec::new()),
            debug,
        });
        overlay.install_dismissal(dom::query_one::<Element>(document, dom::CLOSE_SELECTOR));
        Self {
            overlay: Some(overlay),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.overlay.is_some()
    }

    pub(crate) fn attach_enlarge(&self, image: &HtmlImageElement) {
        let Some(overlay) = self.overlay.as_ref() else {
            return;
        };
        dom::set_style(image, "cursor", "pointer");
        let weak = Rc::downgrade(overlay);
        let clicked = image.clone();
        let listener = EventListener::new(image, "click", move |_event: &Event| {
            let Some(overlay) = weak.upgrade() else {
                return;
            };
            overlay.show(&clicked.src());
        });
        overlay.listeners.borrow_mut().push(listener);
    }

    /// Wires every image already in the gallery grid. Returns how many were bound.
    /// The pointer cursor is set even when the page has no lightbox.
    pub(crate) fn bind_initial_images(&self, document: &Document) -> usize {
        let images = dom::query_images(document, dom::GRID_IMAGE_SELECTOR);
        for image in &images {
            dom::set_style(image, "cursor", "pointer");
        }
        if !self.is_active() {
            return 0;
        }
        for image in &images {
            self.attach_enlarge(image);
        }
        images.len()
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn state(&self) -> Option<OverlayState> {
        self.overlay
            .as_ref()
            .map(|overlay| overlay.state.borrow().clone())
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn dismiss(&self) {
        if let Some(overlay) = self.overlay.as_ref() {
            overlay.dismiss();
        }
    }
}
