fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MAPBOX_STYLE");
    println!("cargo:rerun-if-env-changed=MAPBOX_KEY");

    // An absent secret becomes an empty string; the app refuses to mount the
    // dashboard without both, so the failure surfaces at startup rather than
    // here.
    let style = std::env::var("MAPBOX_STYLE").unwrap_or_default();
    let key = std::env::var("MAPBOX_KEY").unwrap_or_default();
    println!("cargo:rustc-env=MAPBOX_STYLE={style}");
    println!("cargo:rustc-env=MAPBOX_KEY={key}");
}
