/// Defaults shipped with the app, used when no `.env` is found.
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

fn load_environment() {
    #[cfg(not(target_arch = "wasm32"))]
    if dotenvy::dotenv().is_ok() {
        return;
    }
    apply_bundled_defaults();
}

fn apply_bundled_defaults() {
    for entry in dotenvy::from_read_iter(BUNDLED_CONFIG.as_bytes()) {
        let Ok((key, value)) = entry else {
            continue;
        };
        if std::env::var_os(&key).is_some() {
            continue;
        }
        // SAFETY: runs before the UI starts any threads.
        unsafe {
            std::env::set_var(key, value);
        }
    }
}

fn main() {
    load_environment();
    dreamcanvas::telemetry::init();
    dioxus::launch(dreamcanvas::ui::App);
}
