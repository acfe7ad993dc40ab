use std::cell::RefCell;

use js_sys::{Function, Reflect, JSON};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use promptgallery_core::FeedError;

use crate::channel::{MessageHandler, PushChannel};

const CLIENT_GLOBAL: &str = "io";

/// Socket.IO client shipped by the page as `window.io`.
pub(crate) struct PageClientChannel {
    factory: Function,
    socket: RefCell<Option<JsValue>>,
    callbacks: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl PageClientChannel {
    pub(crate) fn probe() -> Option<Self> {
        let window = web_sys::window()?;
        let value = Reflect::get(&window, &JsValue::from_str(CLIENT_GLOBAL)).ok()?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        let factory = value.dyn_into::<Function>().ok()?;
        Some(Self::with_factory(factory))
    }

    pub(crate) fn with_factory(factory: Function) -> Self {
        Self {
            factory,
            socket: RefCell::new(None),
            callbacks: RefCell::new(Vec::new()),
        }
    }

    fn socket(&self) -> Result<JsValue, FeedError> {
        if let Some(socket) = self.socket.borrow().as_ref() {
            return Ok(socket.clone());
        }
        let socket = self
            .factory
            .call0(&JsValue::NULL)
            .map_err(|err| FeedError::setup(js_message(&err)))?;
        if socket.is_null() || socket.is_undefined() {
            return Err(FeedError::setup("client returned no socket"));
        }
        *self.socket.borrow_mut() = Some(socket.clone());
        Ok(socket)
    }
}

impl PushChannel for PageClientChannel {
    fn name(&self) -> &'static str {
        "socket.io page client"
    }

    fn subscribe(&self, event: &str, handler: MessageHandler) -> Result<(), FeedError> {
        let socket = self.socket()?;
        let on = Reflect::get(&socket, &JsValue::from_str("on"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| FeedError::setup("socket has no on()"))?;
        let event_name = event.to_string();
        let callback = Closure::wrap(Box::new(move |data: JsValue| {
            let raw = JSON::stringify(&data)
                .ok()
                .and_then(|json| JsValue::from(json).as_string());
            let Some(raw) = raw else {
                gloo::console::warn!("live feed: payload is not JSON", event_name.clone());
                return;
            };
            handler(raw);
        }) as Box<dyn FnMut(JsValue)>);
        on.call2(&socket, &JsValue::from_str(event), callback.as_ref())
            .map_err(|err| FeedError::setup(js_message(&err)))?;
        self.callbacks.borrow_mut().push(callback);
        Ok(())
    }
}

pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}
