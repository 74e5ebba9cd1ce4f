#[tokio::main]
async fn main() {
    extern crate filter_preview;

    if let Err(e) = filter_preview::desktop_main().await {
        log::error!("{e:?}");
        std::process::exit(1);
    }
}
