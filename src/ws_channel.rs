use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

use promptgallery_core::{FeedError, Session, SessionAction};

use crate::channel::{MessageHandler, PushChannel};
use crate::page_client::js_message;

type Subscriptions = Rc<RefCell<Vec<(String, MessageHandler)>>>;

#[allow(dead_code)]
struct WsHandlers {
    onopen: Closure<dyn FnMut(Event)>,
    onmessage: Closure<dyn FnMut(MessageEvent)>,
    onerror: Closure<dyn FnMut(ErrorEvent)>,
    onclose: Closure<dyn FnMut(Event)>,
}

/// Socket.IO over a plain browser WebSocket, for pages that do not ship the
/// JS client. One connection per channel; closed connections stay closed.
pub(crate) struct WebSocketChannel {
    url: String,
    ws: Rc<RefCell<Option<WebSocket>>>,
    handlers: RefCell<Option<WsHandlers>>,
    subscriptions: Subscriptions,
}

fn dispatch(subscriptions: &Subscriptions, event: &str, payload: String) {
    let handlers: Vec<MessageHandler> = subscriptions
        .borrow()
        .iter()
        .filter(|(name, _)| name == event)
        .map(|(_, handler)| handler.clone())
        .collect();
    for handler in handlers {
        handler(payload.clone());
    }
}

fn send_frame(ws: &Rc<RefCell<Option<WebSocket>>>, frame: &str) {
    let ws_guard = ws.borrow();
    let Some(ws) = ws_guard.as_ref() else {
        return;
    };
    if ws.ready_state() != WebSocket::OPEN {
        return;
    }
    let _ = ws.send_with_str(frame);
}

impl WebSocketChannel {
    pub(crate) fn new(url: String) -> Self {
        Self {
            url,
            ws: Rc::new(RefCell::new(None)),
            handlers: RefCell::new(None),
            subscriptions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn open(&self) -> Result<(), FeedError> {
        if self.handlers.borrow().is_some() {
            return Ok(());
        }
        let ws = WebSocket::new(&self.url).map_err(|err| FeedError::setup(js_message(&err)))?;
        *self.ws.borrow_mut() = Some(ws.clone());
        let session = Rc::new(RefCell::new(Session::default()));

        let onopen = {
            let url = self.url.clone();
            Closure::wrap(Box::new(move |_event: Event| {
                gloo::console::log!("live feed websocket connected", url.clone());
            }) as Box<dyn FnMut(Event)>)
        };
        let onmessage = {
            let ws_ref = self.ws.clone();
            let subscriptions = self.subscriptions.clone();
            let session = session.clone();
            Closure::wrap(Box::new(move |event: MessageEvent| {
                let Some(frame) = event.data().as_string() else {
                    return;
                };
                let actions = match session.borrow_mut().handle_frame(&frame) {
                    Ok(actions) => actions,
                    Err(err) => {
                        gloo::console::warn!("live feed: ignored frame", err.to_string());
                        return;
                    }
                };
                for action in actions {
                    match action {
                        SessionAction::Send(reply) => send_frame(&ws_ref, &reply),
                        SessionAction::Deliver { event, payload } => {
                            dispatch(&subscriptions, &event, payload);
                        }
                        SessionAction::Close { reason } => {
                            gloo::console::warn!("live feed session ended", reason);
                            if let Some(ws) = ws_ref.borrow().as_ref() {
                                let _ = ws.close();
                            }
                        }
                    }
                }
            }) as Box<dyn FnMut(MessageEvent)>)
        };
        let onerror = {
            let url = self.url.clone();
            Closure::wrap(Box::new(move |_event: ErrorEvent| {
                gloo::console::warn!("live feed websocket error", url.clone());
            }) as Box<dyn FnMut(ErrorEvent)>)
        };
        let onclose = {
            let ws_ref = self.ws.clone();
            let url = self.url.clone();
            Closure::wrap(Box::new(move |event: Event| {
                ws_ref.borrow_mut().take();
                match event.dyn_ref::<CloseEvent>() {
                    Some(close) => {
                        gloo::console::log!(
                            "live feed websocket closed; not reconnecting",
                            url.clone(),
                            close.code()
                        );
                    }
                    None => {
                        gloo::console::log!(
                            "live feed websocket closed; not reconnecting",
                            url.clone()
                        );
                    }
                }
            }) as Box<dyn FnMut(Event)>)
        };

        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        *self.handlers.borrow_mut() = Some(WsHandlers {
            onopen,
            onmessage,
            onerror,
            onclose,
        });
        Ok(())
    }
}

impl PushChannel for WebSocketChannel {
    fn name(&self) -> &'static str {
        "socket.io websocket"
    }

    fn subscribe(&self, event: &str, handler: MessageHandler) -> Result<(), FeedError> {
        self.subscriptions
            .borrow_mut()
            .push((event.to_string(), handler));
        self.open()
    }
}

impl Drop for WebSocketChannel {
    fn drop(&mut self) {
        if let Some(ws) = self.ws.borrow_mut().take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onerror(None);
            ws.set_onclose(None);
            let _ = ws.close();
        }
    }
}
