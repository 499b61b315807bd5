//! Headless CLI: fetch users and landmass, mount a scene, run autorotation
//!
//! Run with: cargo run --bin globe-cli --features cli -- [ticks]

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use hacker_globe::config::AppConfig;
    use hacker_globe::core::{
        build_user_nodes, parse_users, GlobeScene, LandmassState, NodeList, PrefetchedTopology,
        SignupStats,
    };
    use hacker_globe::http_native::get_text;
    use hacker_globe::time::unix_seconds;
    use tracing::{info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    const WIDTH: f64 = 1280.0;
    const HEIGHT: f64 = 720.0;
    const FPS: f64 = 60.0;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hacker_globe=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let ticks: u64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 600,
    };
    let config = AppConfig::from_env();

    let users = match get_text(&config.users_url()).await {
        Ok(body) => parse_users(&body),
        Err(e) => {
            warn!(error = %e, "Users unavailable, continuing with an empty list");
            Vec::new()
        }
    };
    let stats = SignupStats::compute(users.len(), config.total_seats, config.launch_unix, unix_seconds());
    info!(
        signups = stats.signups,
        seats_remaining = stats.seats_remaining,
        days_until_launch = stats.days_until_launch,
        "stats"
    );

    let landmass = PrefetchedTopology {
        body: get_text(&config.landmass_url).await.map_err(|e| e.to_string()),
        object: config.landmass_object.clone(),
    };

    let nodes = build_user_nodes(&users, &NodeList::default());
    let mut scene = GlobeScene::mount(WIDTH, HEIGHT, &config.globe, nodes, &landmass);
    match scene.landmass_state() {
        LandmassState::Loaded(land) => info!(
            countries = land.countries.len(),
            rings = land.ring_count(),
            "Landmass loaded"
        ),
        LandmassState::Failed(reason) => warn!(%reason, "Rendering without landmass"),
        LandmassState::Pending => {}
    }

    for i in 0..ticks {
        scene.tick(i as f64 / FPS);
        if i % FPS as u64 == 0 {
            let frame = scene.frame();
            info!(
                tick = i,
                lambda = format!("{:.3}", scene.state().rotation.lambda),
                visible = frame.visible_count(),
                total = frame.markers.len(),
                land_segments = frame.land.len(),
                "frame"
            );
        }
    }

    let frame = scene.frame();
    info!(
        ticks,
        lambda = format!("{:.3}", scene.state().rotation.lambda),
        visible = frame.visible_count(),
        total = frame.markers.len(),
        "done"
    );
    scene.teardown();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
