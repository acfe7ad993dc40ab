use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement};

pub(crate) const OVERLAY_ID: &str = "lightbox-modal";
pub(crate) const OVERLAY_IMAGE_ID: &str = "lightbox-image";
pub(crate) const CLOSE_SELECTOR: &str = ".close-btn";
pub(crate) const FEED_GALLERY_ID: &str = "real-time-gallery";
pub(crate) const GRID_IMAGE_SELECTOR: &str = ".gallery-grid img";

pub(crate) fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub(crate) fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub(crate) fn query_one<T: JsCast>(document: &Document, selector: &str) -> Option<T> {
    document.query_selector(selector).ok()??.dyn_into::<T>().ok()
}

pub(crate) fn query_images(document: &Document, selector: &str) -> Vec<HtmlImageElement> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|idx| nodes.item(idx))
        .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
        .collect()
}

pub(crate) fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

pub(crate) fn create<T: JsCast>(document: &Document, tag: &str) -> Option<T> {
    document.create_element(tag).ok()?.dyn_into::<T>().ok()
}

pub(crate) fn is_same(a: &Element, b: &web_sys::EventTarget) -> bool {
    b.dyn_ref::<web_sys::Node>()
        .map(|node| a.is_same_node(Some(node)))
        .unwrap_or(false)
}

#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) mod fixture {
    use web_sys::{Document, Element};

    pub(crate) const GALLERY_PAGE: &str = r#"
<div id="lightbox-modal" style="display: none">
  <span class="close-btn">&times;</span>
  <img id="lightbox-image" alt="">
</div>
<div class="gallery-grid" id="real-time-gallery">
  <div class="gallery-item"><img src="/static/public_images/a.png" alt="a"><p>"a" by x</p></div>
  <div class="gallery-item"><img src="/static/public_images/b.png" alt="b"><p>"b" by y</p></div>
</div>
"#;

    /// Markup mounted under `<body>` for one test, removed on drop.
    pub(crate) struct Fixture {
        root: Element,
    }

    impl Fixture {
        pub(crate) fn mount(html: &str) -> Self {
            let document = super::document().expect("document available");
            let root = document.create_element("div").expect("create fixture root");
            root.set_inner_html(html);
            document
                .body()
                .expect("body available")
                .append_child(&root)
                .expect("mount fixture");
            Self { root }
        }

        pub(crate) fn document(&self) -> Document {
            super::document().expect("document available")
        }

        pub(crate) fn root(&self) -> &Element {
            &self.root
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.root.remove();
        }
    }
}
