use std::cell::Cell;
use std::rc::Rc;

use web_sys::{Document, Element, HtmlElement, HtmlImageElement};

use promptgallery_core::{
    decode_published, FeedConfig, GalleryItem, ImagePublished, GALLERY_ITEM_CLASS,
};

use crate::channel::{MessageHandler, PushChannel};
use crate::dom;
use crate::overlay::Enlarger;

struct FeedView {
    document: Document,
    gallery: Element,
    enlarger: Enlarger,
    static_prefix: String,
    received: Cell<u32>,
    debug: bool,
}

impl FeedView {
    fn on_message(&self, raw: &str) {
        match decode_published(raw) {
            Ok(event) => {
                self.insert(&event);
            }
            Err(err) => {
                gloo::console::warn!("live feed: dropped message", err.to_string());
            }
        }
    }

    fn insert(&self, event: &ImagePublished) -> Option<HtmlImageElement> {
        let item = GalleryItem::from_published(event, &self.static_prefix);
        let Some((node, image)) = render_item(&self.document, &item) else {
            gloo::console::warn!("live feed: could not build gallery item", item.src);
            return None;
        };
        self.enlarger.attach_enlarge(&image);
        if self.gallery.prepend_with_node_1(&node).is_err() {
            gloo::console::warn!("live feed: could not insert gallery item", item.src);
            return None;
        }
        let count = self.received.get().saturating_add(1);
        self.received.set(count);
        if self.debug {
            gloo::console::debug!("live feed: inserted", item.src, count);
        }
        Some(image)
    }
}

/// Builds `<div class="gallery-item"><img src alt><p>caption</p></div>`.
///
/// Fields are assigned as attributes and text, never parsed as markup.
pub(crate) fn render_item(
    document: &Document,
    item: &GalleryItem,
) -> Option<(HtmlElement, HtmlImageElement)> {
    let node = dom::create::<HtmlElement>(document, "div")?;
    node.class_list().add_1(GALLERY_ITEM_CLASS).ok()?;
    let image = dom::create::<HtmlImageElement>(document, "img")?;
    image.set_src(&item.src);
    image.set_alt(&item.alt);
    let caption = dom::create::<HtmlElement>(document, "p")?;
    caption.set_text_content(Some(&item.caption));
    node.append_child(&image).ok()?;
    node.append_child(&caption).ok()?;
    Some((node, image))
}

/// Subscription that prepends published images into the feed gallery.
pub(crate) struct LiveFeed {
    view: Rc<FeedView>,
    _channel: Box<dyn PushChannel>,
}

impl LiveFeed {
    /// Returns `None` when the feed is disabled, the page has no feed gallery,
    /// or the channel refuses the subscription. There is no retry.
    pub(crate) fn connect(
        document: &Document,
        config: &FeedConfig,
        channel: Box<dyn PushChannel>,
        enlarger: Enlarger,
    ) -> Option<Self> {
        if !config.enabled() {
            gloo::console::log!("live feed disabled by configuration");
            return None;
        }
        let gallery = document.get_element_by_id(dom::FEED_GALLERY_ID)?;
        let view = Rc::new(FeedView {
            document: document.clone(),
            gallery,
            enlarger,
            static_prefix: config.static_prefix.clone(),
            received: Cell::new(0),
            debug: config.debug,
        });
        let handler: MessageHandler = {
            let view = view.clone();
            Rc::new(move |raw: String| view.on_message(&raw))
        };
        match channel.subscribe(&config.event_name, handler) {
            Ok(()) => {
                gloo::console::log!(
                    "live feed subscribed",
                    channel.name(),
                    config.event_name.clone()
                );
                Some(Self {
                    view,
                    _channel: channel,
                })
            }
            Err(err) => {
                gloo::console::log!("live feed inactive:", err.to_string());
                None
            }
        }
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn received(&self) -> u32 {
        self.view.received.get()
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::channel::{InertChannel, ManualChannel};
    use crate::dom::fixture::{Fixture, GALLERY_PAGE};
    use console_error_panic_hook::set_once as set_panic_hook;
    use promptgallery_core::{FeedTransport, NEW_IMAGE_EVENT};
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const CAT: &str = r#"{"path":"img/1.png","prompt":"a cat","author":"alice"}"#;

    fn first_item(document: &Document) -> Element {
        document
            .get_element_by_id(dom::FEED_GALLERY_ID)
            .and_then(|gallery| gallery.first_element_child())
            .expect("gallery has items")
    }

    fn item_image(item: &Element) -> HtmlImageElement {
        item.query_selector("img")
            .unwrap()
            .unwrap()
            .dyn_into::<HtmlImageElement>()
            .unwrap()
    }

    fn item_count(document: &Document) -> u32 {
        document
            .get_element_by_id(dom::FEED_GALLERY_ID)
            .map(|gallery| gallery.child_element_count())
            .unwrap_or(0)
    }

    #[wasm_bindgen_test]
    fn new_image_is_rendered_first() {
        set_panic_hook();
        let fixture = Fixture::mount(GALLERY_PAGE);
        let document = fixture.document();
        let channel = ManualChannel::default();
        let enlarger = Enlarger::install(&document, false);
        let feed = LiveFeed::connect(
            &document,
            &FeedConfig::default(),
            Box::new(channel.clone()),
            enlarger,
        )
        .expect("feed subscribes");

        channel.emit(NEW_IMAGE_EVENT, CAT);

        let item = first_item(&document);
        assert!(item.class_list().contains("gallery-item"));
        let image = item_image(&item);
        assert_eq!(image.get_attribute("src").as_deref(), Some("/static/img/1.png"));
        assert_eq!(image.alt(), "a cat");
        let caption = item.query_selector("p").unwrap().unwrap();
        assert_eq!(caption.text_content().as_deref(), Some("\"a cat\" by alice"));
        assert_eq!(feed.received(), 1);
        assert_eq!(item_count(&document), 3);
    }

    #[wasm_bindgen_test]
    fn pushed_image_opens_overlay() {
        set_panic_hook();
        let fixture = Fixture::mount(GALLERY_PAGE);
        let document = fixture.document();
        let channel = ManualChannel::default();
        let enlarger = Enlarger::install(&document, false);
        let _feed = LiveFeed::connect(
            &document,
            &FeedConfig::default(),
            Box::new(channel.clone()),
            enlarger.clone(),
        )
        .expect("feed subscribes");

        channel.emit(NEW_IMAGE_EVENT, CAT);
        let image = item_image(&first_item(&document));
        assert_eq!(image.style().get_property_value("cursor").unwrap(), "pointer");
        image.click();

        let state = enlarger.state().expect("overlay present");
        assert!(state.is_visible());
        assert_eq!(state.src(), Some(image.src().as_str()));
    }

    #[wasm_bindgen_test]
    fn messages_prepend_in_arrival_order() {
        set_panic_hook();
        let fixture = Fixture::mount(GALLERY_PAGE);
        let document = fixture.document();
        let channel = ManualChannel::default();
        let _feed = LiveFeed::connect(
            &document,
            &FeedConfig::default(),
            Box::new(channel.clone()),
            Enlarger::install(&document, false),
        )
        .expect("feed subscribes");

        for idx in 0..3 {
            let payload = format!(r#"{{"path":"img/{idx}.png","prompt":"p{idx}","author":"a"}}"#);
            channel.emit(NEW_IMAGE_EVENT, &payload);
        }

        let gallery = document.get_element_by_id(dom::FEED_GALLERY_ID).unwrap();
        let children = gallery.children();
        assert_eq!(children.length(), 5);
        let sources: Vec<String> = (0..children.length())
            .filter_map(|idx| children.item(idx))
            .map(|item| item_image(&item).get_attribute("src").unwrap_or_default())
            .collect();
        assert_eq!(
            sources,
            vec![
                "/static/img/2.png",
                "/static/img/1.png",
                "/static/img/0.png",
                "/static/public_images/a.png",
                "/static/public_images/b.png",
            ]
        );
    }

    #[wasm_bindgen_test]
    fn malformed_and_foreign_messages_are_dropped() {
        set_panic_hook();
        let fixture = Fixture::mount(GALLERY_PAGE);
        let document = fixture.document();
        let channel = ManualChannel::default();
        let feed = LiveFeed::connect(
            &document,
            &FeedConfig::default(),
            Box::new(channel.clone()),
            Enlarger::install(&document, false),
        )
        .expect("feed subscribes");

        channel.emit(NEW_IMAGE_EVENT, r#"{"path":"img/1.png"}"#);
        channel.emit("chat_message", CAT);
        assert_eq!(feed.received(), 0);
        assert_eq!(item_count(&document), 2);
    }

    #[wasm_bindgen_test]
    fn markup_in_fields_stays_text() {
        set_panic_hook();
        let fixture = Fixture::mount(GALLERY_PAGE);
        let document = fixture.document();
        let channel = ManualChannel::default();
        let _feed = LiveFeed::connect(
            &document,
            &FeedConfig::default(),
            Box::new(channel.clone()),
            Enlarger::install(&document, false),
        )
        .expect("feed subscribes");

        channel.emit(
            NEW_IMAGE_EVENT,
            r#"{"path":"x.png","prompt":"<b>bold</b>","author":"<i>eve</i>"}"#,
        );
        let item = first_item(&document);
        assert!(item.query_selector("b").unwrap().is_none());
        assert_eq!(
            item.query_selector("p").unwrap().unwrap().text_content().as_deref(),
            Some("\"<b>bold</b>\" by <i>eve</i>")
        );
    }

    #[wasm_bindgen_test]
    fn configured_prefix_and_event_are_used() {
        set_panic_hook();
        let fixture = Fixture::mount(GALLERY_PAGE);
        let document = fixture.document();
        let channel = ManualChannel::default();
        let mut config = FeedConfig::default();
        config.apply("static-prefix", "/media").unwrap();
        config.apply("event", "image_published").unwrap();
        let _feed = LiveFeed::connect(
            &document,
            &config,
            Box::new(channel.clone()),
            Enlarger::install(&document, false),
        )
        .expect("feed subscribes");

        channel.emit(NEW_IMAGE_EVENT, CAT);
        assert_eq!(item_count(&document), 2);
        channel.emit("image_published", CAT);
        let image = item_image(&first_item(&document));
        assert_eq!(image.get_attribute("src").as_deref(), Some("/media/img/1.png"));
    }

    #[wasm_bindgen_test]
    fn no_subscription_without_feed_gallery() {
        set_panic_hook();
        let fixture = Fixture::mount(r#"<div class="gallery-grid"></div>"#);
        let document = fixture.document();
        let channel = ManualChannel::default();
        let feed = LiveFeed::connect(
            &document,
            &FeedConfig::default(),
            Box::new(channel.clone()),
            Enlarger::install(&document, false),
        );
        assert!(feed.is_none());
        assert_eq!(channel.subscription_count(), 0);
    }

    #[wasm_bindgen_test]
    fn unavailable_channel_leaves_gallery_untouched() {
        set_panic_hook();
        let fixture = Fixture::mount(GALLERY_PAGE);
        let document = fixture.document();
        let feed = LiveFeed::connect(
            &document,
            &FeedConfig::default(),
            Box::new(InertChannel::new("no socket.io client on page")),
            Enlarger::install(&document, false),
        );
        assert!(feed.is_none());
        assert_eq!(item_count(&document), 2);
    }

    #[wasm_bindgen_test]
    fn disabled_transport_skips_subscription() {
        set_panic_hook();
        let fixture = Fixture::mount(GALLERY_PAGE);
        let document = fixture.document();
        let channel = ManualChannel::default();
        let config = FeedConfig {
            transport: FeedTransport::Off,
            ..FeedConfig::default()
        };
        let feed = LiveFeed::connect(
            &document,
            &config,
            Box::new(channel.clone()),
            Enlarger::install(&document, false),
        );
        assert!(feed.is_none());
        assert_eq!(channel.subscription_count(), 0);
    }
}
