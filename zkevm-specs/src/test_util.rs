use env_logger::Env;

/// Installs the test logger once, `RUST_LOG` overrides the `info` default.
pub(crate) fn init_logger() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}
