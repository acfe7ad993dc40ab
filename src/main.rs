mod channel;
mod config;
mod dom;
mod feed;
mod overlay;
mod page;
mod page_client;
mod ws_channel;

fn main() {
    console_error_panic_hook::set_once();
    page::start();
}
