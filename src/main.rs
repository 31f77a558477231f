use goshop_chat_service::api;
use goshop_chat_service::common::init;
use goshop_chat_service::settings::AppSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings);
    api::serve(settings).await
}
