use track_tourney::log::initialize_logger;
use track_tourney::{env, run, SpotifyCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::load_dotenv();
    initialize_logger()?;
    log::info!("Starting track-tourney v{}.", track_tourney::VERSION);

    let credentials = env::spotify_api_credentials()?;
    let settings = env::supplier_settings()?;

    for track in run(SpotifyCatalog::new(credentials), settings).await? {
        println!("{track}");
    }

    Ok(())
}
