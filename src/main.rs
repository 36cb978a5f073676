use wp_agent::app::App;
use wp_agent::config::AgentConfig;
use wp_agent::http::start_server;

#[tokio::main]
async fn main() {
    let config = AgentConfig::from_env();
    let app = match App::initialize(config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Failed to initialize agent: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = start_server(app).await {
        eprintln!("Agent terminated: {}", err);
        std::process::exit(1);
    }
}
