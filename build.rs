use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    // sqlx::migrate! embeds the migration files at compile time.
    println!("cargo:rerun-if-changed=migrations");

    // Dev marker so the startup log shows whether the running server is the newest binary.
    let build_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=REACTIVITIES_BUILD_ID={}", build_id);
}
