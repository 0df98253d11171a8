pub mod build_info;
pub mod paths;

const DEFAULT_DIRECTIVE: &str = "asset_tracker=info";

/// Installs the global tracing subscriber, honouring `RUST_LOG` when set.
/// Called once from [`crate::init`].
pub(crate) fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // A subscriber installed by the host application wins.
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn second_install_is_ignored() {
        super::init_tracing();
        super::init_tracing();
    }
}
