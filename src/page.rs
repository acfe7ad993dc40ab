use std::cell::RefCell;

use gloo::events::EventListener;
use web_sys::Document;

use promptgallery_core::FeedConfig;

use crate::channel::{self, PushChannel};
use crate::config;
use crate::dom;
use crate::feed::LiveFeed;
use crate::overlay::Enlarger;

thread_local! {
    static PAGE: RefCell<Option<PageController>> = RefCell::new(None);
}

/// Owns the lightbox and the live feed for the lifetime of the page.
pub(crate) struct PageController {
    enlarger: Enlarger,
    feed: Option<LiveFeed>,
}

impl PageController {
    pub(crate) fn install(
        document: &Document,
        config: &FeedConfig,
        channel: Box<dyn PushChannel>,
    ) -> Self {
        let enlarger = Enlarger::install(document, config.debug);
        let bound = enlarger.bind_initial_images(document);
        if config.debug {
            gloo::console::debug!("lightbox: bound gallery images", bound as u32);
        }
        let feed = LiveFeed::connect(document, config, channel, enlarger.clone());
        Self { enlarger, feed }
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn enlarger(&self) -> &Enlarger {
        &self.enlarger
    }

    pub(crate) fn feed_active(&self) -> bool {
        self.feed.is_some()
    }
}

/// Installs once the document has been parsed.
pub(crate) fn start() {
    let Some(document) = dom::document() else {
        return;
    };
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", |_event| install_page()).forget();
        return;
    }
    install_page();
}

fn install_page() {
    let Some(document) = dom::document() else {
        return;
    };
    let config = config::load_feed_config(&document);
    let channel = channel::probe(&config);
    let controller = PageController::install(&document, &config, channel);
    if config.debug {
        gloo::console::debug!("page ready; live feed active:", controller.feed_active());
    }
    PAGE.with(|slot| {
        slot.borrow_mut().replace(controller);
    });
}
