use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // テスト中はタイマーで勝手にターンが進まないようにする
        if std::env::var("AUTO_SKIP_TURNS").is_err() {
            std::env::set_var("AUTO_SKIP_TURNS", "false");
        }
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
