fn main() {
    // Compiled-in defaults are read with `option_env!` in src/config.rs.
    println!("cargo:rerun-if-env-changed=MACHMON_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=MACHMON_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=MACHMON_BROKER_HOST");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
